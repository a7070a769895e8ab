//! Account state boundary.
//!
//! Senders read the multisig's next order seqno and a wallet's current
//! seqno through [`StateReader`]; how the state is fetched is up to the
//! implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use relay_types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// On-chain view of a multisig account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub next_order_seqno: u64,
    pub threshold: u8,
    pub signers: Vec<Address>,
    pub proposers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("unknown account {0}")]
    UnknownAccount(Address),

    #[error("state unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait StateReader: Send + Sync {
    async fn query_state(&self, address: &Address) -> Result<AccountState, StateError>;

    /// Seqno the wallet at `address` expects on its next message.
    async fn query_seqno(&self, address: &Address) -> Result<u32, StateError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStateReader {
    accounts: RwLock<HashMap<Address, AccountState>>,
    seqnos: RwLock<HashMap<Address, u32>>,
}

impl InMemoryStateReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, address: Address, state: AccountState) {
        self.accounts.write().await.insert(address, state);
    }

    pub async fn set_seqno(&self, address: Address, seqno: u32) {
        self.seqnos.write().await.insert(address, seqno);
    }
}

#[async_trait]
impl StateReader for InMemoryStateReader {
    async fn query_state(&self, address: &Address) -> Result<AccountState, StateError> {
        self.accounts
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or(StateError::UnknownAccount(*address))
    }

    async fn query_seqno(&self, address: &Address) -> Result<u32, StateError> {
        self.seqnos
            .read()
            .await
            .get(address)
            .copied()
            .ok_or(StateError::UnknownAccount(*address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new(0, [n; 32])
    }

    #[tokio::test]
    async fn in_memory_state_reader() {
        let reader = InMemoryStateReader::new();
        assert_eq!(
            reader.query_state(&addr(1)).await,
            Err(StateError::UnknownAccount(addr(1)))
        );
        let state = AccountState {
            next_order_seqno: 4,
            threshold: 1,
            signers: vec![addr(2)],
            proposers: vec![],
        };
        reader.insert(addr(1), state.clone()).await;
        assert_eq!(reader.query_state(&addr(1)).await.unwrap(), state);
    }

    #[tokio::test]
    async fn seqnos_are_tracked_per_wallet() {
        let reader = InMemoryStateReader::new();
        reader.set_seqno(addr(1), 7).await;
        assert_eq!(reader.query_seqno(&addr(1)).await, Ok(7));
        assert_eq!(
            reader.query_seqno(&addr(2)).await,
            Err(StateError::UnknownAccount(addr(2)))
        );
        // multisig state and wallet seqnos are separate
        assert!(reader.query_state(&addr(1)).await.is_err());
    }
}
