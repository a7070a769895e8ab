use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::hash::decode_32;

/// Account address: workchain id plus 32-byte account hash.
///
/// Textual form is the raw `"<workchain>:<64 hex>"` representation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl Address {
    /// Encoded size: one workchain byte plus the account hash.
    pub const ENCODED_LEN: usize = 33;

    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    pub fn parse_raw(raw: &str) -> Result<Self, AddressError> {
        let (wc, hash_hex) = raw
            .split_once(':')
            .ok_or_else(|| AddressError::Format(raw.to_string()))?;
        let workchain = wc
            .parse::<i8>()
            .map_err(|_| AddressError::Workchain(wc.to_string()))?;
        if hash_hex.len() != 64 {
            return Err(AddressError::Format(raw.to_string()));
        }
        let hash = decode_32(hash_hex)?;
        Ok(Self { workchain, hash })
    }

    pub fn to_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = self.workchain as u8;
        out[1..].copy_from_slice(&self.hash);
        out
    }

    pub fn from_bytes(bytes: &[u8; 33]) -> Self {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[1..]);
        Self {
            workchain: bytes[0] as i8,
            hash,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address({}:{}..)",
            self.workchain,
            hex::encode(&self.hash[..4])
        )
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_raw(s)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse_raw(&raw).map_err(serde::de::Error::custom)
    }
}
