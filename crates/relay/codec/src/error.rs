use relay_types::ContentHash;
use thiserror::Error;

/// Errors from node encoding, decoding and batch packing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("action batch is empty")]
    EmptyBatch,

    /// A node was asked to hold more entries than its fan-out allows.
    /// The packer never produces this; seeing it means a splitting bug.
    #[error("node capacity exceeded: {count} entries, cap is {cap}")]
    CapacityExceeded { count: usize, cap: usize },

    #[error("malformed node: {0}")]
    Malformed(String),

    #[error("embedded reference mismatch: expected {expected}, computed {computed}")]
    ReferenceMismatch {
        expected: ContentHash,
        computed: ContentHash,
    },
}

impl CodecError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
