use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HexError;

/// 32-byte digest naming a node or an envelope.
///
/// Nodes are always named by BLAKE3 over their bytes; envelopes by whatever
/// `Hasher` the builder was given.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// BLAKE3 over `data`.
    pub fn hash(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly 64 hex digits.
    pub fn from_hex(text: &str) -> Result<Self, HexError> {
        decode_32(text).map(Self)
    }
}

/// Decode 64 hex digits into 32 bytes.
pub(crate) fn decode_32(text: &str) -> Result<[u8; 32], HexError> {
    if text.len() != 64 {
        return Err(HexError::InvalidLength {
            expected: 64,
            actual: text.len(),
        });
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(text, &mut out).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidCharacter { c, index },
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            HexError::InvalidLength {
                expected: 64,
                actual: text.len(),
            }
        }
    })?;
    Ok(out)
}

impl FromStr for ContentHash {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}..)", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
