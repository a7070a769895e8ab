//! Signed envelopes.
//!
//! An [`EnvelopeBuilder`] wraps the head node of a packed chain with
//! addressing, signs the inner message with a [`Signer`] and identifies the
//! result with a [`Hasher`] digest. Key pairs come from a [`KeyDeriver`].
//! Seqno wallet messages share the outer layer; see [`seqno`].

#![deny(unsafe_code)]

pub mod builder;
pub mod error;
pub mod hasher;
pub mod keys;
pub mod seqno;
pub mod signer;

pub use builder::{
    Addressing, DecodedEnvelope, Envelope, EnvelopeBuilder, ENVELOPE_VERSION,
    INTERNAL_TRANSFER_OP, MAX_TIMEOUT,
};
pub use error::{EnvelopeError, KeyError};
pub use hasher::{Blake3Hasher, Hasher, Sha256Hasher};
pub use keys::{KeyDeriver, MnemonicKeyDeriver};
pub use seqno::{
    DecodedSeqnoEnvelope, SeqnoAddressing, WalletVersion, MAINNET_WALLET_ID, TESTNET_WALLET_ID,
};
pub use signer::{Ed25519Signer, Signer, SIGNATURE_LEN};
