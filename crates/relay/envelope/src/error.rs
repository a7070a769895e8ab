use relay_codec::CodecError;
use thiserror::Error;

/// Key material and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Errors from building or decoding an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("signature failure: {0}")]
    SignatureFailure(#[source] KeyError),

    #[error("invalid addressing: {0}")]
    InvalidAddressing(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
