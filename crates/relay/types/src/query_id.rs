//! High-load query ids.
//!
//! A query id is 23 bits: a 13-bit `shift` and a 10-bit `bit_number`. The
//! receiving wallet remembers processed ids per timeout window, so a sender
//! walks the space with [`QueryId::next`] and never reuses an id inside the
//! window. The final `(MAX_SHIFT, MAX_BIT_NUMBER)` slot is kept back for
//! emergency sends and is never handed out by `next`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::error::QueryIdError;

pub const BIT_NUMBER_SIZE: u32 = 10;
pub const SHIFT_SIZE: u32 = 13;
pub const MAX_BIT_NUMBER: u16 = 1022;
pub const MAX_SHIFT: u16 = 8191;
const QUERY_ID_BITS: u32 = BIT_NUMBER_SIZE + SHIFT_SIZE;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryId {
    shift: u16,
    bit_number: u16,
}

impl QueryId {
    pub fn new(shift: u16, bit_number: u16) -> Result<Self, QueryIdError> {
        if shift > MAX_SHIFT {
            return Err(QueryIdError::ShiftOutOfRange(shift));
        }
        if bit_number > MAX_BIT_NUMBER {
            return Err(QueryIdError::BitNumberOutOfRange(bit_number));
        }
        Ok(Self { shift, bit_number })
    }

    pub fn shift(&self) -> u16 {
        self.shift
    }

    pub fn bit_number(&self) -> u16 {
        self.bit_number
    }

    /// Packed 23-bit value as stored on the wire.
    pub fn query_id(&self) -> u32 {
        ((self.shift as u32) << BIT_NUMBER_SIZE) | self.bit_number as u32
    }

    pub fn from_query_id(query_id: u32) -> Result<Self, QueryIdError> {
        if query_id >> QUERY_ID_BITS != 0 {
            return Err(QueryIdError::QueryIdOutOfRange(query_id));
        }
        let shift = (query_id >> BIT_NUMBER_SIZE) as u16;
        let bit_number = (query_id & ((1 << BIT_NUMBER_SIZE) - 1)) as u16;
        Self::new(shift, bit_number)
    }

    /// Position of this id in the allocation sequence.
    pub fn to_seqno(&self) -> u64 {
        self.shift as u64 * (MAX_BIT_NUMBER as u64 + 1) + self.bit_number as u64
    }

    pub fn from_seqno(seqno: u64) -> Result<Self, QueryIdError> {
        let per_shift = MAX_BIT_NUMBER as u64 + 1;
        let shift = seqno / per_shift;
        if shift > MAX_SHIFT as u64 {
            return Err(QueryIdError::Exhausted);
        }
        Self::new(shift as u16, (seqno % per_shift) as u16)
    }

    pub fn has_next(&self) -> bool {
        let at_end = self.bit_number >= MAX_BIT_NUMBER - 1 && self.shift == MAX_SHIFT;
        !at_end
    }

    pub fn next(&self) -> Result<Self, QueryIdError> {
        let mut bit_number = self.bit_number + 1;
        let mut shift = self.shift;

        if shift == MAX_SHIFT && bit_number > MAX_BIT_NUMBER - 1 {
            return Err(QueryIdError::Exhausted);
        }
        if bit_number > MAX_BIT_NUMBER {
            bit_number = 0;
            shift += 1;
            if shift > MAX_SHIFT {
                return Err(QueryIdError::Exhausted);
            }
        }
        Ok(Self { shift, bit_number })
    }
}

impl fmt::Debug for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryId({}:{})", self.shift, self.bit_number)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query_id())
    }
}

/// Source of query ids for successive dispatches.
pub trait QueryIdAllocator: Send + Sync {
    fn allocate(&self) -> Result<QueryId, QueryIdError>;
}

/// Hands out ids in sequence starting from a given id.
#[derive(Debug)]
pub struct SequentialQueryIds {
    next: Mutex<Option<QueryId>>,
}

impl SequentialQueryIds {
    pub fn starting_at(first: QueryId) -> Self {
        Self {
            next: Mutex::new(Some(first)),
        }
    }
}

impl Default for SequentialQueryIds {
    fn default() -> Self {
        Self::starting_at(QueryId::default())
    }
}

impl QueryIdAllocator for SequentialQueryIds {
    fn allocate(&self) -> Result<QueryId, QueryIdError> {
        let mut guard = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let current = guard.ok_or(QueryIdError::Exhausted)?;
        *guard = current.next().ok();
        Ok(current)
    }
}
