//! Splits an arbitrary-length action list into a chain of nodes.
//!
//! Every node except the tail reserves its last slot for a forward action
//! that carries the next node, so intermediate nodes hold `CAP - 1`
//! genuine actions. The remainder lands in the tail, which is built first
//! so each parent can embed its child's hash.

use relay_types::{Action, Address, SendMode};
use tracing::debug;

use crate::error::CodecError;
use crate::node::{chain_link_action, decode_node, encode_node, Node, CAP};

/// Value attached to each forward action: 0.01 in nano units.
pub const DEFAULT_FORWARD_VALUE: u128 = 10_000_000;

/// Where forward actions are addressed and what they carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainTarget {
    pub recipient: Address,
    pub query_id: u64,
    pub forward_value: u128,
    pub forward_mode: SendMode,
}

impl ChainTarget {
    pub fn new(recipient: Address, query_id: u64) -> Self {
        Self {
            recipient,
            query_id,
            forward_value: DEFAULT_FORWARD_VALUE,
            forward_mode: SendMode::PAY_GAS_SEPARATELY,
        }
    }

    pub fn with_forward_value(mut self, value: u128) -> Self {
        self.forward_value = value;
        self
    }

    pub fn with_forward_mode(mut self, mode: SendMode) -> Self {
        self.forward_mode = mode;
        self
    }

    pub fn forward_action(&self, child: &Node) -> Result<Action, CodecError> {
        chain_link_action(
            child,
            self.recipient,
            self.forward_mode,
            self.forward_value,
            self.query_id,
        )
    }
}

/// Result of packing: the head node plus chain length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBatch {
    pub head: Node,
    pub chain_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpackedChain {
    pub actions: Vec<Action>,
    pub node_count: usize,
}

/// Genuine-action count per node, tail first.
pub fn plan_chunks(n: usize) -> Result<Vec<usize>, CodecError> {
    if n == 0 {
        return Err(CodecError::EmptyBatch);
    }
    if n <= CAP {
        return Ok(vec![n]);
    }
    let per_link = CAP - 1;
    let intermediate = (n - CAP).div_ceil(per_link);
    let tail = n - intermediate * per_link;
    let mut sizes = Vec::with_capacity(intermediate + 1);
    sizes.push(tail);
    sizes.extend(std::iter::repeat(per_link).take(intermediate));
    Ok(sizes)
}

/// Pack `actions` into a chain and return its head.
///
/// Concatenating the genuine entries from head to tail yields `actions`
/// in their original order.
pub fn pack_batch(actions: &[Action], target: &ChainTarget) -> Result<PackedBatch, CodecError> {
    let sizes = plan_chunks(actions.len())?;

    let mut end = actions.len();
    let mut next: Option<Node> = None;
    for size in &sizes {
        let start = end - size;
        let chunk = &actions[start..end];
        let node = match next.take() {
            None => encode_node(chunk, false)?,
            Some(child) => {
                let mut entries = Vec::with_capacity(chunk.len() + 1);
                entries.extend_from_slice(chunk);
                entries.push(target.forward_action(&child)?);
                encode_node(&entries, true)?
            }
        };
        debug!(
            start,
            end,
            hash = %node.hash(),
            len = node.bytes().len(),
            "packed node"
        );
        next = Some(node);
        end = start;
    }

    let head = next.ok_or(CodecError::EmptyBatch)?;
    debug!(
        actions = actions.len(),
        chain_len = sizes.len(),
        head = %head.hash(),
        "packed batch"
    );
    Ok(PackedBatch {
        head,
        chain_len: sizes.len(),
    })
}

/// Walk a chain from its head, verifying every embedded reference.
pub fn unpack_chain(head: &Node) -> Result<UnpackedChain, CodecError> {
    let mut actions = Vec::new();
    let mut node_count = 0;
    let mut current = head.clone();
    loop {
        let decoded = decode_node(current.bytes())?;
        node_count += 1;
        actions.extend(decoded.actions);
        match decoded.continuation {
            Some(link) => current = link.child,
            None => break,
        }
    }
    Ok(UnpackedChain {
        actions,
        node_count,
    })
}
