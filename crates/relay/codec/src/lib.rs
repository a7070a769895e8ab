//! Node codec and batch packer.
//!
//! A node holds at most [`CAP`] entries. Batches larger than that are
//! split into a chain where each node's last entry forwards the next one
//! by embedding its bytes and content hash.

#![deny(unsafe_code)]

pub mod error;
pub mod node;
pub mod packer;
pub mod wire;

pub use error::CodecError;
pub use node::{
    chain_link_action, decode_node, encode_node, ChainLink, DecodedNode, Node, CAP,
    EXECUTE_INTERNAL_OP, NODE_MAGIC,
};
pub use packer::{
    pack_batch, plan_chunks, unpack_chain, ChainTarget, PackedBatch, UnpackedChain,
    DEFAULT_FORWARD_VALUE,
};
