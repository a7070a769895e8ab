use relay_types::ContentHash;
use sha2::{Digest, Sha256};

/// Digest used to identify a submitted envelope.
pub trait Hasher: Send + Sync {
    fn digest(&self, bytes: &[u8]) -> ContentHash;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn digest(&self, bytes: &[u8]) -> ContentHash {
        ContentHash::from_bytes(*blake3::hash(bytes).as_bytes())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> ContentHash {
        let out: [u8; 32] = Sha256::digest(bytes).into();
        ContentHash::from_bytes(out)
    }
}
