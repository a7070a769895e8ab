use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Outbound message send mode flags (8 bits).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendMode(u8);

impl SendMode {
    pub const NONE: SendMode = SendMode(0);
    pub const PAY_GAS_SEPARATELY: SendMode = SendMode(1);
    pub const IGNORE_ERRORS: SendMode = SendMode(2);
    pub const DESTROY_ACCOUNT_IF_ZERO: SendMode = SendMode(32);
    pub const CARRY_ALL_REMAINING_INCOMING_VALUE: SendMode = SendMode(64);
    pub const CARRY_ALL_REMAINING_BALANCE: SendMode = SendMode(128);

    pub const fn from_bits(bits: u8) -> Self {
        SendMode(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: SendMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Mode used for a wallet-level message: gas is paid separately when value
    /// is attached, otherwise the whole balance is carried.
    pub fn for_attached_value(value: u128) -> Self {
        if value > 0 {
            Self::PAY_GAS_SEPARATELY
        } else {
            Self::CARRY_ALL_REMAINING_BALANCE
        }
    }
}

impl BitOr for SendMode {
    type Output = SendMode;

    fn bitor(self, rhs: SendMode) -> SendMode {
        SendMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for SendMode {
    fn bitor_assign(&mut self, rhs: SendMode) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SendMode({:#04x})", self.0)
    }
}
