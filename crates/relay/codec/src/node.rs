use relay_types::{Action, Address, ContentHash, SendMode};

use crate::error::CodecError;
use crate::wire::{put_address, put_bytes, put_u128, put_u32, put_u64, put_u8, Reader};

/// Maximum entries a single node may hold, forward action included.
pub const CAP: usize = 254;

pub const NODE_MAGIC: u8 = 0xB7;
/// Op prefix of a chain link payload: asks the recipient to execute the
/// embedded node as if it had been submitted directly.
pub const EXECUTE_INTERNAL_OP: u32 = 0xA32C_59BF;

const FLAG_CONTINUATION: u8 = 0b0000_0001;
const TAG_TRANSFER: u8 = 0x01;
const TAG_UPDATE: u8 = 0x02;

/// An encoded node. Bytes are immutable once built; the hash is the node's
/// identity and is what a parent embeds next to the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    bytes: Vec<u8>,
    hash: ContentHash,
    entry_count: usize,
    has_continuation: bool,
}

impl Node {
    /// Wrap already-encoded bytes, validating the header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        let mut r = Reader::new(&bytes);
        let (count, flags) = read_header(&mut r)?;
        let hash = ContentHash::hash(&bytes);
        Ok(Self {
            bytes,
            hash,
            entry_count: count,
            has_continuation: flags & FLAG_CONTINUATION != 0,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Total entries, forward action included.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn has_continuation(&self) -> bool {
        self.has_continuation
    }

    /// Entries that came from the caller's action list.
    pub fn genuine_count(&self) -> usize {
        self.entry_count - usize::from(self.has_continuation)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("hash", &self.hash)
            .field("entries", &self.entry_count)
            .field("continuation", &self.has_continuation)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Encode up to [`CAP`] entries into one node.
///
/// With `continuation` set, the last entry must be the forward action
/// produced by [`chain_link_action`]; the flag lets decoders split it off
/// without guessing from the payload.
pub fn encode_node(entries: &[Action], continuation: bool) -> Result<Node, CodecError> {
    if entries.len() > CAP {
        return Err(CodecError::CapacityExceeded {
            count: entries.len(),
            cap: CAP,
        });
    }
    if continuation && entries.is_empty() {
        return Err(CodecError::malformed("continuation flag on an empty node"));
    }

    let mut bytes = Vec::with_capacity(3 + entries.len() * 64);
    put_u8(&mut bytes, NODE_MAGIC);
    put_u8(&mut bytes, if continuation { FLAG_CONTINUATION } else { 0 });
    put_u8(&mut bytes, entries.len() as u8);

    let mut body = Vec::new();
    for (index, action) in entries.iter().enumerate() {
        body.clear();
        encode_action(&mut body, action)?;
        put_u8(&mut bytes, index as u8);
        put_bytes(&mut bytes, &body)?;
    }

    let hash = ContentHash::hash(&bytes);
    Ok(Node {
        bytes,
        hash,
        entry_count: entries.len(),
        has_continuation: continuation,
    })
}

fn encode_action(buf: &mut Vec<u8>, action: &Action) -> Result<(), CodecError> {
    match action {
        Action::Transfer {
            mode,
            target,
            value,
            payload,
        } => {
            put_u8(buf, TAG_TRANSFER);
            put_u8(buf, mode.bits());
            put_address(buf, target);
            put_u128(buf, *value);
            match payload {
                Some(payload) => {
                    put_u8(buf, 1);
                    put_bytes(buf, payload)?;
                }
                None => put_u8(buf, 0),
            }
        }
        Action::Update {
            threshold,
            signers,
            proposers,
        } => {
            put_u8(buf, TAG_UPDATE);
            put_u8(buf, *threshold);
            put_members(buf, "signers", signers)?;
            put_members(buf, "proposers", proposers)?;
        }
    }
    Ok(())
}

fn put_members(buf: &mut Vec<u8>, role: &str, members: &[Address]) -> Result<(), CodecError> {
    let count = u8::try_from(members.len())
        .map_err(|_| CodecError::malformed(format!("{} {} exceed 255", members.len(), role)))?;
    put_u8(buf, count);
    for member in members {
        put_address(buf, member);
    }
    Ok(())
}

/// Forward action that makes `recipient` execute `child` next.
pub fn chain_link_action(
    child: &Node,
    recipient: Address,
    mode: SendMode,
    value: u128,
    query_id: u64,
) -> Result<Action, CodecError> {
    let mut payload = Vec::with_capacity(child.bytes.len() + 48);
    put_u32(&mut payload, EXECUTE_INTERNAL_OP);
    put_u64(&mut payload, query_id);
    payload.extend_from_slice(child.hash.as_bytes());
    put_bytes(&mut payload, &child.bytes)?;
    Ok(Action::Transfer {
        mode,
        target: recipient,
        value,
        payload: Some(payload),
    })
}

/// Decoded chain link carried by a node's forward entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub recipient: Address,
    pub mode: SendMode,
    pub value: u128,
    pub query_id: u64,
    pub child: Node,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedNode {
    /// Genuine entries in index order.
    pub actions: Vec<Action>,
    pub continuation: Option<ChainLink>,
}

/// Decode node bytes back into entries, verifying any embedded reference.
pub fn decode_node(bytes: &[u8]) -> Result<DecodedNode, CodecError> {
    let mut r = Reader::new(bytes);
    let (count, flags) = read_header(&mut r)?;

    let mut actions = Vec::with_capacity(count);
    for expected in 0..count {
        let index = r.u8()? as usize;
        if index != expected {
            return Err(CodecError::malformed(format!(
                "entry index {} out of order (expected {})",
                index, expected
            )));
        }
        let body = r.bytes()?;
        let mut entry = Reader::new(body);
        let action = decode_action(&mut entry)?;
        entry.finish()?;
        actions.push(action);
    }
    r.finish()?;

    let continuation = if flags & FLAG_CONTINUATION != 0 {
        let forward = actions
            .pop()
            .ok_or_else(|| CodecError::malformed("continuation flag on an empty node"))?;
        Some(decode_link(forward)?)
    } else {
        None
    };

    Ok(DecodedNode {
        actions,
        continuation,
    })
}

fn read_header(r: &mut Reader<'_>) -> Result<(usize, u8), CodecError> {
    let magic = r.u8()?;
    if magic != NODE_MAGIC {
        return Err(CodecError::malformed(format!("bad node magic {:#04x}", magic)));
    }
    let flags = r.u8()?;
    if flags & !FLAG_CONTINUATION != 0 {
        return Err(CodecError::malformed(format!("unknown node flags {:#04x}", flags)));
    }
    let count = r.u8()? as usize;
    if count > CAP {
        return Err(CodecError::CapacityExceeded { count, cap: CAP });
    }
    Ok((count, flags))
}

fn decode_action(r: &mut Reader<'_>) -> Result<Action, CodecError> {
    match r.u8()? {
        TAG_TRANSFER => {
            let mode = SendMode::from_bits(r.u8()?);
            let target = r.address()?;
            let value = r.u128()?;
            let payload = match r.u8()? {
                0 => None,
                1 => Some(r.bytes()?.to_vec()),
                other => {
                    return Err(CodecError::malformed(format!(
                        "bad payload marker {}",
                        other
                    )))
                }
            };
            Ok(Action::Transfer {
                mode,
                target,
                value,
                payload,
            })
        }
        TAG_UPDATE => {
            let threshold = r.u8()?;
            let signers = read_members(r)?;
            let proposers = read_members(r)?;
            Ok(Action::Update {
                threshold,
                signers,
                proposers,
            })
        }
        tag => Err(CodecError::malformed(format!("unknown action tag {:#04x}", tag))),
    }
}

fn read_members(r: &mut Reader<'_>) -> Result<Vec<Address>, CodecError> {
    let count = r.u8()? as usize;
    (0..count).map(|_| r.address()).collect()
}

fn decode_link(forward: Action) -> Result<ChainLink, CodecError> {
    let (mode, recipient, value, payload) = match forward {
        Action::Transfer {
            mode,
            target,
            value,
            payload: Some(payload),
        } => (mode, target, value, payload),
        other => {
            return Err(CodecError::malformed(format!(
                "forward entry is a {} without link payload",
                other.kind()
            )))
        }
    };

    let mut r = Reader::new(&payload);
    let op = r.u32()?;
    if op != EXECUTE_INTERNAL_OP {
        return Err(CodecError::malformed(format!("bad link op {:#010x}", op)));
    }
    let query_id = r.u64()?;
    let expected = ContentHash::from_bytes(r.hash()?);
    let child_bytes = r.bytes()?.to_vec();
    r.finish()?;

    let child = Node::from_bytes(child_bytes)?;
    if child.hash != expected {
        return Err(CodecError::ReferenceMismatch {
            expected,
            computed: child.hash,
        });
    }

    Ok(ChainLink {
        recipient,
        mode,
        value,
        query_id,
        child,
    })
}
