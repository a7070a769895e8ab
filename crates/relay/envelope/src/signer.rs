use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::KeyError;

pub const SIGNATURE_LEN: usize = 64;

/// Produces the signature over an envelope's inner message.
pub trait Signer: Send + Sync {
    fn public_key(&self) -> [u8; 32];
    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], KeyError>;
}

pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut *seed);
        Self::from_seed(&seed)
    }

    /// Check `signature` over `message` against a raw public key.
    pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; SIGNATURE_LEN]) -> bool {
        use ed25519_dalek::Verifier;
        let Ok(key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(signature)).is_ok()
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        use ed25519_dalek::Signer as _;
        Ok(self.key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let signer = Ed25519Signer::from_seed(&[42u8; 32]);
        let sig = signer.sign(b"payload").unwrap();
        assert!(Ed25519Signer::verify(&signer.public_key(), b"payload", &sig));
        assert!(!Ed25519Signer::verify(&signer.public_key(), b"tampered", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let a = Ed25519Signer::from_seed(&[42u8; 32]);
        let b = Ed25519Signer::from_seed(&[99u8; 32]);
        let sig = a.sign(b"payload").unwrap();
        assert!(!Ed25519Signer::verify(&b.public_key(), b"payload", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let signer = Ed25519Signer::from_seed(&[1u8; 32]);
        assert_eq!(signer.sign(b"m").unwrap(), signer.sign(b"m").unwrap());
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(
            Ed25519Signer::generate().public_key(),
            Ed25519Signer::generate().public_key()
        );
    }

    #[test]
    fn debug_hides_secret() {
        let signer = Ed25519Signer::from_seed(&[7u8; 32]);
        let out = format!("{:?}", signer);
        assert!(out.contains("public_key"));
        assert!(!out.contains(&hex::encode([7u8; 32])));
    }
}
