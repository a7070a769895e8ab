use thiserror::Error;

/// Hex decoding errors for hashes and raw addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("invalid hex length: {actual} (expected {expected})")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex character {c:?} at {index}")]
    InvalidCharacter { c: char, index: usize },
}

/// Address parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("raw address must look like '<workchain>:<64 hex>', got '{0}'")]
    Format(String),

    #[error("invalid workchain '{0}'")]
    Workchain(String),

    #[error("invalid account hash: {0}")]
    Hash(#[from] HexError),
}

/// Action construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("threshold {threshold} is invalid for {signers} signers")]
    InvalidThreshold { threshold: u8, signers: usize },

    #[error("{role} list holds {count} entries, limit is {limit}")]
    TooManyMembers {
        role: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("duplicate {role} address: {address}")]
    DuplicateMember { role: &'static str, address: String },
}

/// Query id arithmetic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryIdError {
    #[error("shift {0} out of range (max {max})", max = crate::query_id::MAX_SHIFT)]
    ShiftOutOfRange(u16),

    #[error("bit number {0} out of range (max {max})", max = crate::query_id::MAX_BIT_NUMBER)]
    BitNumberOutOfRange(u16),

    #[error("query id {0} does not fit in 23 bits")]
    QueryIdOutOfRange(u32),

    #[error("query id space exhausted")]
    Exhausted,
}
