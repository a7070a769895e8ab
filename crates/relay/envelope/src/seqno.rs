//! Envelopes for seqno-ordered wallets.
//!
//! ```text
//! inner    := version:u8 wallet_id:i32 valid_until:u32 seqno:u32 mode:u8
//!             body_hash[32] body_len:u32 body
//! envelope := target signature[64] inner_len:u32 inner
//! ```
//!
//! The outer layer is the same as the high-load envelope; the leading
//! version byte tells the two apart.

use relay_codec::wire::{put_bytes, put_u32, put_u8, Reader};
use relay_codec::{CodecError, Node};
use relay_types::{Address, ContentHash, SendMode};
use tracing::debug;

use crate::builder::{malformed, open, Envelope, EnvelopeBuilder};
use crate::error::EnvelopeError;
use crate::signer::SIGNATURE_LEN;

/// Wallet id of accounts on the main network.
pub const MAINNET_WALLET_ID: i32 = -239;
/// Wallet id of accounts on the test network.
pub const TESTNET_WALLET_ID: i32 = -3;

/// Seqno wallet contract generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletVersion {
    V4,
    V5,
}

impl WalletVersion {
    pub fn tag(self) -> u8 {
        match self {
            WalletVersion::V4 => 4,
            WalletVersion::V5 => 5,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            4 => Some(WalletVersion::V4),
            5 => Some(WalletVersion::V5),
            _ => None,
        }
    }

    /// Most transfers one message may carry.
    pub fn max_actions(self) -> usize {
        match self {
            WalletVersion::V4 => 4,
            WalletVersion::V5 => relay_codec::CAP,
        }
    }
}

/// Replay and routing fields of a seqno wallet message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqnoAddressing {
    pub version: WalletVersion,
    pub target: Address,
    pub wallet_id: i32,
    pub seqno: u32,
    /// Unix seconds after which the wallet refuses the message.
    pub valid_until: u32,
    pub mode: SendMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSeqnoEnvelope {
    pub addressing: SeqnoAddressing,
    pub signature: [u8; SIGNATURE_LEN],
    pub inner: Vec<u8>,
    pub body: Node,
}

impl DecodedSeqnoEnvelope {
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let (outer_target, signature, inner) = open(bytes)?;

        let mut r = Reader::new(&inner);
        let tag = r.u8()?;
        let version = WalletVersion::from_tag(tag)
            .ok_or_else(|| malformed(format!("not a seqno wallet message (version {})", tag)))?;
        let wallet_id = r.u32()? as i32;
        let valid_until = r.u32()?;
        let seqno = r.u32()?;
        let mode = SendMode::from_bits(r.u8()?);
        let expected = ContentHash::from_bytes(r.hash()?);
        let body = Node::from_bytes(r.bytes()?.to_vec())?;
        r.finish()?;
        if body.hash() != expected {
            return Err(CodecError::ReferenceMismatch {
                expected,
                computed: body.hash(),
            }
            .into());
        }

        Ok(Self {
            addressing: SeqnoAddressing {
                version,
                target: outer_target,
                wallet_id,
                seqno,
                valid_until,
                mode,
            },
            signature,
            inner,
            body,
        })
    }
}

impl EnvelopeBuilder {
    /// Sign a seqno wallet message carrying the transfers in `body`.
    pub fn build_seqno(
        &self,
        body: &Node,
        addressing: &SeqnoAddressing,
    ) -> Result<Envelope, EnvelopeError> {
        if body.has_continuation() {
            return Err(EnvelopeError::InvalidAddressing(
                "seqno wallets cannot follow chain links".into(),
            ));
        }
        let limit = addressing.version.max_actions();
        if body.entry_count() > limit {
            return Err(EnvelopeError::InvalidAddressing(format!(
                "{:?} wallet carries at most {} transfers, got {}",
                addressing.version,
                limit,
                body.entry_count()
            )));
        }

        let mut inner = Vec::with_capacity(body.bytes().len() + 64);
        put_u8(&mut inner, addressing.version.tag());
        put_u32(&mut inner, addressing.wallet_id as u32);
        put_u32(&mut inner, addressing.valid_until);
        put_u32(&mut inner, addressing.seqno);
        put_u8(&mut inner, addressing.mode.bits());
        inner.extend_from_slice(body.hash().as_bytes());
        put_bytes(&mut inner, body.bytes())?;

        let envelope = self.seal(&addressing.target, &inner)?;
        debug!(
            hash = %envelope.hash(),
            seqno = addressing.seqno,
            valid_until = addressing.valid_until,
            transfers = body.entry_count(),
            "built seqno envelope"
        );
        Ok(envelope)
    }
}
