use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::address::Address;
use crate::error::ActionError;
use crate::send_mode::SendMode;

/// Signer and proposer lists are indexed with 8 bits.
pub const MAX_MEMBERS: usize = 255;

/// One outbound instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Send `value` to `target` with an optional message body.
    Transfer {
        mode: SendMode,
        target: Address,
        value: u128,
        payload: Option<Vec<u8>>,
    },
    /// Replace the account's signer set, proposer set and approval threshold.
    Update {
        threshold: u8,
        signers: Vec<Address>,
        proposers: Vec<Address>,
    },
}

impl Action {
    pub fn transfer(mode: SendMode, target: Address, value: u128) -> Self {
        Action::Transfer {
            mode,
            target,
            value,
            payload: None,
        }
    }

    pub fn transfer_with_payload(
        mode: SendMode,
        target: Address,
        value: u128,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Action::Transfer {
            mode,
            target,
            value,
            payload: Some(payload.into()),
        }
    }

    /// Build a validated `Update`. Order of both lists is kept as given.
    pub fn update(
        threshold: u8,
        signers: Vec<Address>,
        proposers: Vec<Address>,
    ) -> Result<Self, ActionError> {
        validate_members("signer", &signers)?;
        validate_members("proposer", &proposers)?;
        if threshold == 0 || threshold as usize > signers.len() {
            return Err(ActionError::InvalidThreshold {
                threshold,
                signers: signers.len(),
            });
        }
        Ok(Action::Update {
            threshold,
            signers,
            proposers,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Transfer { .. } => "transfer",
            Action::Update { .. } => "update",
        }
    }
}

/// Ordered-set check shared by `Update` and multisig configuration.
pub fn validate_members(role: &'static str, members: &[Address]) -> Result<(), ActionError> {
    if members.len() > MAX_MEMBERS {
        return Err(ActionError::TooManyMembers {
            role,
            count: members.len(),
            limit: MAX_MEMBERS,
        });
    }
    let mut seen = BTreeSet::new();
    for member in members {
        if !seen.insert(member) {
            return Err(ActionError::DuplicateMember {
                role,
                address: member.to_raw(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new(0, [n; 32])
    }

    #[test]
    fn update_keeps_order() {
        let action = Action::update(2, vec![addr(3), addr(1)], vec![addr(9)]).unwrap();
        match action {
            Action::Update { signers, .. } => assert_eq!(signers, vec![addr(3), addr(1)]),
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn update_rejects_zero_threshold() {
        let err = Action::update(0, vec![addr(1)], vec![]).unwrap_err();
        assert!(matches!(err, ActionError::InvalidThreshold { threshold: 0, .. }));
    }

    #[test]
    fn update_rejects_threshold_above_signers() {
        let err = Action::update(3, vec![addr(1), addr(2)], vec![]).unwrap_err();
        assert!(matches!(err, ActionError::InvalidThreshold { signers: 2, .. }));
    }

    #[test]
    fn update_rejects_duplicate_signer() {
        let err = Action::update(1, vec![addr(1), addr(1)], vec![]).unwrap_err();
        assert!(matches!(err, ActionError::DuplicateMember { role: "signer", .. }));
    }

    #[test]
    fn update_rejects_oversized_proposers() {
        let proposers: Vec<Address> = (0..=255u16)
            .map(|i| {
                let mut hash = [0u8; 32];
                hash[..2].copy_from_slice(&i.to_be_bytes());
                Address::new(0, hash)
            })
            .collect();
        let err = Action::update(1, vec![addr(1)], proposers).unwrap_err();
        assert!(matches!(err, ActionError::TooManyMembers { count: 256, .. }));
    }

    #[test]
    fn serde_tags_variants() {
        let action = Action::transfer(SendMode::PAY_GAS_SEPARATELY, addr(5), 42);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "transfer");
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }
}
