//! Envelope dispatch with bounded, fixed-interval retries.

#![deny(unsafe_code)]

pub mod dispatcher;
pub mod error;
pub mod policy;
pub mod transport;

pub use dispatcher::{AttemptOutcome, DispatchAttempt, DispatchReceipt, Dispatcher};
pub use error::DispatchError;
pub use policy::{DispatchPolicy, FailureHook, DEFAULT_ATTEMPTS, DEFAULT_INTERVAL_MS};
pub use transport::{InMemoryTransport, ScriptedTransport, Transport, TransportError};

pub use tokio_util::sync::CancellationToken;
