//! Relay data model.
//!
//! Leaf types shared by the codec, envelope and dispatch crates:
//!
//! - [`Action`]: one outbound instruction (transfer or signer-set update)
//! - [`Address`]: workchain + account hash
//! - [`SendMode`]: outbound message flags
//! - [`QueryId`]: 23-bit high-load query id and its allocator
//! - [`ContentHash`]: 32-byte content address

#![deny(unsafe_code)]

pub mod action;
pub mod address;
pub mod error;
pub mod hash;
pub mod query_id;
pub mod send_mode;

pub use action::{validate_members, Action, MAX_MEMBERS};
pub use address::Address;
pub use error::{ActionError, AddressError, HexError, QueryIdError};
pub use hash::ContentHash;
pub use query_id::{QueryId, QueryIdAllocator, SequentialQueryIds};
pub use send_mode::SendMode;
