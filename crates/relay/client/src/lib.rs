//! Relay client.
//!
//! Entry points over the codec, envelope and dispatch crates:
//!
//! - [`HighloadSender`]: packs, signs and dispatches action batches from a
//!   high-load wallet
//! - [`MultisigOrders`]: builds new-order and approval bodies for a multisig
//! - [`SeqnoWallet`]: single-message sender for v4/v5 seqno wallets
//! - [`StateReader`]: account state lookups
//! - [`RelayConfig`]: TOML configuration
//! - [`telemetry::init_tracing`]: subscriber setup

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod highload;
pub mod multisig;
pub mod state;
pub mod telemetry;
pub mod wallet;

pub use config::{ConfigError, DispatchSettings, RelayConfig};
pub use error::{ClientError, ClientResult};
pub use highload::{HighloadSender, SendOptions};
pub use multisig::{
    MultisigConfig, MultisigOrders, NewOrder, SenderRole, APPROVE_OP,
    DEFAULT_ORDER_LIFETIME_SECS, NEW_ORDER_OP,
};
pub use state::{AccountState, InMemoryStateReader, StateError, StateReader};
pub use wallet::{Network, SeqnoWallet, WalletSendOptions, DEFAULT_VALID_FOR_SECS};
