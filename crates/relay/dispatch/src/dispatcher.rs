//! Bounded-retry submission.
//!
//! Each attempt rebuilds the envelope through the caller's factory, so
//! attempt-local fields such as the creation time are fresh every time.
//! Delays only happen between attempts, never after the final one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use relay_envelope::{Envelope, EnvelopeError};
use relay_types::ContentHash;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::policy::DispatchPolicy;
use crate::transport::{Transport, TransportError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    Failed(TransportError),
}

/// Record of one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchAttempt {
    /// 1-based.
    pub attempt: u32,
    pub hash: ContentHash,
    pub submitted_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

/// Successful dispatch. The hash names the accepted envelope; it says
/// nothing about on-chain execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub dispatch_id: Uuid,
    pub hash: ContentHash,
    pub attempts: Vec<DispatchAttempt>,
}

pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn send<F>(
        &self,
        build_envelope: F,
        policy: &DispatchPolicy,
    ) -> Result<DispatchReceipt, DispatchError>
    where
        F: FnMut(u32) -> Result<Envelope, EnvelopeError> + Send,
    {
        self.send_with_cancel(build_envelope, policy, &CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send), stopping early once `cancel` fires. The
    /// token is checked before each attempt and raced against each delay;
    /// an in-flight submission is left to finish.
    #[instrument(
        skip_all,
        fields(dispatch_id = tracing::field::Empty, max_attempts = policy.attempts)
    )]
    pub async fn send_with_cancel<F>(
        &self,
        mut build_envelope: F,
        policy: &DispatchPolicy,
        cancel: &CancellationToken,
    ) -> Result<DispatchReceipt, DispatchError>
    where
        F: FnMut(u32) -> Result<Envelope, EnvelopeError> + Send,
    {
        if policy.attempts == 0 {
            return Err(DispatchError::InvalidPolicy(
                "attempts must be at least 1".into(),
            ));
        }

        let dispatch_id = Uuid::new_v4();
        tracing::Span::current().record("dispatch_id", tracing::field::display(dispatch_id));

        let mut history = Vec::new();
        let mut last_cause = None;

        for attempt in 1..=policy.attempts {
            if cancel.is_cancelled() {
                info!(attempt, "dispatch cancelled before attempt");
                return Err(DispatchError::Cancelled {
                    attempts: attempt - 1,
                });
            }

            let envelope = build_envelope(attempt)?;
            let hash = envelope.hash();
            let submitted_at = Utc::now();
            debug!(attempt, hash = %hash, len = envelope.bytes().len(), "submitting envelope");

            match self.transport.submit(envelope.bytes()).await {
                Ok(()) => {
                    history.push(DispatchAttempt {
                        attempt,
                        hash,
                        submitted_at,
                        outcome: AttemptOutcome::Accepted,
                    });
                    info!(attempt, hash = %hash, "envelope accepted");
                    return Ok(DispatchReceipt {
                        dispatch_id,
                        hash,
                        attempts: history,
                    });
                }
                Err(cause) => {
                    if policy.verbose {
                        warn!(attempt, max_attempts = policy.attempts, error = %cause, "attempt failed");
                    } else {
                        debug!(attempt, max_attempts = policy.attempts, error = %cause, "attempt failed");
                    }
                    if let Some(hook) = &policy.on_failure {
                        hook(attempt, &cause);
                    }
                    history.push(DispatchAttempt {
                        attempt,
                        hash,
                        submitted_at,
                        outcome: AttemptOutcome::Failed(cause.clone()),
                    });
                    last_cause = Some(cause);

                    if attempt < policy.attempts {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                info!(attempt, "dispatch cancelled during retry delay");
                                return Err(DispatchError::Cancelled { attempts: attempt });
                            }
                            _ = tokio::time::sleep(policy.interval()) => {}
                        }
                    }
                }
            }
        }

        match last_cause {
            Some(last_cause) => {
                error!(attempts = policy.attempts, error = %last_cause, "dispatch exhausted");
                Err(DispatchError::Exhausted {
                    attempts: policy.attempts,
                    last_cause,
                })
            }
            None => Err(DispatchError::InvalidPolicy(
                "no attempt was made".into(),
            )),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
