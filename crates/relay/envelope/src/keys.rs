//! Key derivation from a word list.

use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::signer::Ed25519Signer;

const SEED_CONTEXT: &str = "relay 2024-06 mnemonic ed25519 seed v1";

/// Turns a mnemonic into a signing key pair.
pub trait KeyDeriver: Send + Sync {
    type Signer: crate::signer::Signer;

    fn derive_keypair(&self, words: &[&str]) -> Result<Self::Signer, KeyError>;
}

/// Derives an ed25519 seed as `blake3::derive_key(context, normalized words)`.
///
/// Words are trimmed, lowercased and joined with single spaces, so casing
/// and stray whitespace do not change the resulting key.
#[derive(Debug, Clone)]
pub struct MnemonicKeyDeriver {
    password: Option<String>,
}

impl MnemonicKeyDeriver {
    pub fn new() -> Self {
        Self { password: None }
    }

    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
        }
    }

    fn normalize(words: &[&str]) -> Result<Zeroizing<String>, KeyError> {
        if words.is_empty() {
            return Err(KeyError::InvalidMnemonic("empty word list".into()));
        }
        let mut phrase = Zeroizing::new(String::new());
        for (i, word) in words.iter().enumerate() {
            let word = word.trim();
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(KeyError::InvalidMnemonic(format!(
                    "word {} is not alphabetic",
                    i + 1
                )));
            }
            if i > 0 {
                phrase.push(' ');
            }
            phrase.extend(word.chars().map(|c| c.to_ascii_lowercase()));
        }
        Ok(phrase)
    }
}

impl Default for MnemonicKeyDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDeriver for MnemonicKeyDeriver {
    type Signer = Ed25519Signer;

    fn derive_keypair(&self, words: &[&str]) -> Result<Ed25519Signer, KeyError> {
        let mut material = Self::normalize(words)?;
        if let Some(password) = &self.password {
            material.push('\n');
            material.push_str(password);
        }
        let seed = Zeroizing::new(blake3::derive_key(SEED_CONTEXT, material.as_bytes()));
        Ok(Ed25519Signer::from_seed(&seed))
    }
}
