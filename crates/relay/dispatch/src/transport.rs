//! Transport boundary.
//!
//! A transport only moves envelope bytes to the network. Acceptance means
//! the bytes were taken for broadcast, not that they executed.

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Why a submission did not go through. Both kinds are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, envelope: &[u8]) -> Result<(), TransportError>;
}

/// Accepts and records every envelope.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    submitted: Mutex<Vec<Vec<u8>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn submit(&self, envelope: &[u8]) -> Result<(), TransportError> {
        self.submitted.lock().await.push(envelope.to_vec());
        Ok(())
    }
}

/// Replays scripted outcomes in order, then falls back to a fixed outcome.
/// Every call is recorded, accepted or not.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<(), TransportError>>>,
    fallback: Result<(), TransportError>,
    calls: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    /// Play `script`, then accept everything.
    pub fn new(script: Vec<Result<(), TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reject `n` times with `cause`, then accept.
    pub fn reject_then_accept(n: usize, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        Self::new(vec![Err(TransportError::Rejected(cause)); n])
    }

    pub fn always_reject(cause: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(TransportError::Rejected(cause.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<Vec<u8>> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, envelope: &[u8]) -> Result<(), TransportError> {
        self.calls.lock().await.push(envelope.to_vec());
        match self.script.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => self.fallback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_records_submissions() {
        let transport = InMemoryTransport::new();
        transport.submit(b"one").await.unwrap();
        transport.submit(b"two").await.unwrap();
        assert_eq!(transport.submitted().await, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[tokio::test]
    async fn scripted_replays_then_accepts() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Unavailable("503".into())),
            Err(TransportError::Rejected("seqno".into())),
        ]);
        assert_eq!(
            transport.submit(b"a").await,
            Err(TransportError::Unavailable("503".into()))
        );
        assert_eq!(
            transport.submit(b"b").await,
            Err(TransportError::Rejected("seqno".into()))
        );
        assert_eq!(transport.submit(b"c").await, Ok(()));
        assert_eq!(transport.call_count().await, 3);
    }

    #[tokio::test]
    async fn always_reject_never_accepts() {
        let transport = ScriptedTransport::always_reject("down");
        for _ in 0..5 {
            assert!(transport.submit(b"x").await.is_err());
        }
        assert_eq!(transport.calls().await.len(), 5);
    }
}
