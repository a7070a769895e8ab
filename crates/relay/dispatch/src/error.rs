use relay_envelope::EnvelopeError;
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("invalid dispatch policy: {0}")]
    InvalidPolicy(String),

    /// Building the envelope failed. Never retried.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Every attempt failed. Only the final cause is kept.
    #[error("dispatch failed after {attempts} attempts: {last_cause}")]
    Exhausted {
        attempts: u32,
        last_cause: TransportError,
    },

    #[error("dispatch cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}
