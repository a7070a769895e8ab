//! Envelope assembly.
//!
//! ```text
//! inner    := version:u8 subwallet_id:u32 mode:u8 query_id:u32 created_at:u64
//!             timeout:u32 target INTERNAL_TRANSFER_OP:u32 query_id:u64
//!             head_hash[32] head_len:u32 head
//! envelope := target signature[64] inner_len:u32 inner
//! ```

use std::sync::Arc;

use relay_codec::wire::{put_address, put_bytes, put_u32, put_u64, put_u8, Reader};
use relay_codec::Node;
use relay_types::{Address, ContentHash, QueryId, SendMode};
use tracing::debug;

use crate::error::EnvelopeError;
use crate::hasher::{Blake3Hasher, Hasher};
use crate::signer::{Signer, SIGNATURE_LEN};

pub const ENVELOPE_VERSION: u8 = 1;
/// Op of the wallet's self-addressed transfer that executes the head node.
pub const INTERNAL_TRANSFER_OP: u32 = 0xAE42_E5A4;
/// Timeouts are stored in 22 bits.
pub const MAX_TIMEOUT: u32 = (1 << 22) - 1;

/// Routing and replay fields stamped into an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Addressing {
    pub target: Address,
    pub subwallet_id: u32,
    pub mode: SendMode,
    pub query_id: QueryId,
    /// Unix seconds. Senders stamp this slightly in the past so clock skew
    /// against the receiver does not make a fresh envelope look early.
    pub created_at: i64,
    /// Validity window in seconds, `1..=MAX_TIMEOUT`.
    pub timeout: u32,
}

impl Addressing {
    fn validate(&self) -> Result<u64, EnvelopeError> {
        if self.timeout == 0 || self.timeout > MAX_TIMEOUT {
            return Err(EnvelopeError::InvalidAddressing(format!(
                "timeout {} outside 1..={}",
                self.timeout, MAX_TIMEOUT
            )));
        }
        u64::try_from(self.created_at).map_err(|_| {
            EnvelopeError::InvalidAddressing(format!("negative created_at {}", self.created_at))
        })
    }
}

/// A built envelope: immutable bytes plus the digest that identifies them.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Vec<u8>,
    hash: ContentHash,
    signature: [u8; SIGNATURE_LEN],
}

impl Envelope {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("hash", &self.hash)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Envelope fields read back from bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEnvelope {
    pub addressing: Addressing,
    pub signature: [u8; SIGNATURE_LEN],
    /// The signed region.
    pub inner: Vec<u8>,
    pub head: Node,
}

impl DecodedEnvelope {
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let (outer_target, signature, inner) = open(bytes)?;

        let mut r = Reader::new(&inner);
        let version = r.u8()?;
        if version != ENVELOPE_VERSION {
            return Err(malformed(format!("unsupported envelope version {}", version)));
        }
        let subwallet_id = r.u32()?;
        let mode = SendMode::from_bits(r.u8()?);
        let query_id = QueryId::from_query_id(r.u32()?)
            .map_err(|e| malformed(format!("query id: {}", e)))?;
        let created_at = i64::try_from(r.u64()?)
            .map_err(|_| malformed("created_at out of range".to_string()))?;
        let timeout = r.u32()?;
        let target = r.address()?;
        if target != outer_target {
            return Err(malformed("outer and inner targets differ".to_string()));
        }
        let op = r.u32()?;
        if op != INTERNAL_TRANSFER_OP {
            return Err(malformed(format!("bad transfer op {:#010x}", op)));
        }
        let transfer_query_id = r.u64()?;
        if transfer_query_id != u64::from(query_id.query_id()) {
            return Err(malformed("transfer query id differs from header".to_string()));
        }
        let expected = ContentHash::from_bytes(r.hash()?);
        let head = Node::from_bytes(r.bytes()?.to_vec())?;
        r.finish()?;
        if head.hash() != expected {
            return Err(relay_codec::CodecError::ReferenceMismatch {
                expected,
                computed: head.hash(),
            }
            .into());
        }

        let addressing = Addressing {
            target,
            subwallet_id,
            mode,
            query_id,
            created_at,
            timeout,
        };
        Ok(Self {
            addressing,
            signature,
            inner,
            head,
        })
    }
}

/// Split the outer layer into target, signature and signed region.
pub(crate) fn open(bytes: &[u8]) -> Result<(Address, [u8; SIGNATURE_LEN], Vec<u8>), EnvelopeError> {
    let mut r = Reader::new(bytes);
    let target = r.address()?;
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(r.take(SIGNATURE_LEN)?);
    let inner = r.bytes()?.to_vec();
    r.finish()?;
    Ok((target, signature, inner))
}

pub(crate) fn malformed(msg: String) -> EnvelopeError {
    EnvelopeError::Codec(relay_codec::CodecError::Malformed(msg))
}

/// Wraps a head node into a signed envelope.
///
/// The signer runs once over the inner message and the hasher once over the
/// finished envelope, per build.
#[derive(Clone)]
pub struct EnvelopeBuilder {
    signer: Arc<dyn Signer>,
    hasher: Arc<dyn Hasher>,
}

impl EnvelopeBuilder {
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer,
            hasher: Arc::new(Blake3Hasher),
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signer.public_key()
    }

    pub fn build(&self, head: &Node, addressing: &Addressing) -> Result<Envelope, EnvelopeError> {
        let created_at = addressing.validate()?;
        let query_id = addressing.query_id.query_id();

        let mut inner = Vec::with_capacity(head.bytes().len() + 128);
        put_u8(&mut inner, ENVELOPE_VERSION);
        put_u32(&mut inner, addressing.subwallet_id);
        put_u8(&mut inner, addressing.mode.bits());
        put_u32(&mut inner, query_id);
        put_u64(&mut inner, created_at);
        put_u32(&mut inner, addressing.timeout);
        put_address(&mut inner, &addressing.target);
        put_u32(&mut inner, INTERNAL_TRANSFER_OP);
        put_u64(&mut inner, u64::from(query_id));
        inner.extend_from_slice(head.hash().as_bytes());
        put_bytes(&mut inner, head.bytes())?;

        let envelope = self.seal(&addressing.target, &inner)?;
        debug!(
            hash = %envelope.hash,
            head = %head.hash(),
            query_id,
            created_at,
            len = envelope.bytes.len(),
            "built envelope"
        );
        Ok(envelope)
    }

    /// Sign `inner` once, wrap it behind `target`, hash the result once.
    pub(crate) fn seal(&self, target: &Address, inner: &[u8]) -> Result<Envelope, EnvelopeError> {
        let signature = self
            .signer
            .sign(inner)
            .map_err(EnvelopeError::SignatureFailure)?;

        let mut bytes = Vec::with_capacity(inner.len() + 128);
        put_address(&mut bytes, target);
        bytes.extend_from_slice(&signature);
        put_bytes(&mut bytes, inner)?;

        let hash = self.hasher.digest(&bytes);
        Ok(Envelope {
            bytes,
            hash,
            signature,
        })
    }
}

impl std::fmt::Debug for EnvelopeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeBuilder").finish_non_exhaustive()
    }
}
