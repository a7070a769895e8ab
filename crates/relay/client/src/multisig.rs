//! Multisig orders.
//!
//! A new order carries the packed action chain plus the sender's role and
//! index in the multisig's member lists. Approvals are signer-only.

use relay_codec::wire::{put_bytes, put_u32, put_u64, put_u8};
use relay_codec::{pack_batch, ChainTarget, Node, DEFAULT_FORWARD_VALUE};
use relay_types::{validate_members, Action, ActionError, Address};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ClientError, ClientResult};
use crate::state::StateReader;

pub const NEW_ORDER_OP: u32 = 0xF718_510F;
pub const APPROVE_OP: u32 = 0xA762_230F;
/// Orders expire an hour out unless the caller says otherwise.
pub const DEFAULT_ORDER_LIFETIME_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigConfig {
    pub threshold: u8,
    pub signers: Vec<Address>,
    pub proposers: Vec<Address>,
    pub allow_arbitrary_seqno: bool,
}

impl MultisigConfig {
    pub fn new(
        threshold: u8,
        signers: Vec<Address>,
        proposers: Vec<Address>,
        allow_arbitrary_seqno: bool,
    ) -> Result<Self, ActionError> {
        let config = Self {
            threshold,
            signers,
            proposers,
            allow_arbitrary_seqno,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        validate_members("signer", &self.signers)?;
        validate_members("proposer", &self.proposers)?;
        if self.threshold == 0 || self.threshold as usize > self.signers.len() {
            return Err(ActionError::InvalidThreshold {
                threshold: self.threshold,
                signers: self.signers.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRole {
    Signer(u8),
    Proposer(u8),
}

impl SenderRole {
    pub fn is_signer(&self) -> bool {
        matches!(self, SenderRole::Signer(_))
    }

    pub fn index(&self) -> u8 {
        match self {
            SenderRole::Signer(i) | SenderRole::Proposer(i) => *i,
        }
    }
}

/// A new-order message ready to be sent to the multisig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_seqno: u64,
    pub role: SenderRole,
    pub expiration: u64,
    pub head: Node,
    pub chain_len: usize,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MultisigOrders {
    address: Address,
    config: MultisigConfig,
    forward_value: u128,
}

impl MultisigOrders {
    pub fn new(address: Address, config: MultisigConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            address,
            config,
            forward_value: DEFAULT_FORWARD_VALUE,
        })
    }

    pub fn with_forward_value(mut self, value: u128) -> Self {
        self.forward_value = value;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &MultisigConfig {
        &self.config
    }

    /// Signer index wins over proposer index.
    pub fn resolve_role(&self, sender: &Address) -> ClientResult<SenderRole> {
        if let Some(i) = self.config.signers.iter().position(|a| a == sender) {
            return Ok(SenderRole::Signer(i as u8));
        }
        if let Some(i) = self.config.proposers.iter().position(|a| a == sender) {
            return Ok(SenderRole::Proposer(i as u8));
        }
        Err(ClientError::NotAuthorized {
            address: *sender,
            role: "signer or proposer",
        })
    }

    /// Build a new-order body for `actions`.
    ///
    /// The order seqno is random when the multisig allows arbitrary
    /// seqnos, otherwise read from `state`. `expiration` defaults to one
    /// hour from now.
    #[instrument(skip(self, actions, state), fields(multisig = %self.address, actions = actions.len()))]
    pub async fn new_order(
        &self,
        sender: &Address,
        actions: &[Action],
        expiration: Option<u64>,
        state: &dyn StateReader,
    ) -> ClientResult<NewOrder> {
        let role = self.resolve_role(sender)?;

        let order_seqno = if self.config.allow_arbitrary_seqno {
            rand::random::<u64>()
        } else {
            state.query_state(&self.address).await?.next_order_seqno
        };

        let expiration = expiration.unwrap_or_else(|| {
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            now + DEFAULT_ORDER_LIFETIME_SECS
        });

        let target = ChainTarget::new(self.address, 0).with_forward_value(self.forward_value);
        let packed = pack_batch(actions, &target)?;

        let mut body = Vec::with_capacity(packed.head.bytes().len() + 64);
        put_u32(&mut body, NEW_ORDER_OP);
        put_u64(&mut body, 0);
        put_u64(&mut body, order_seqno);
        put_u8(&mut body, u8::from(role.is_signer()));
        put_u8(&mut body, role.index());
        put_u64(&mut body, expiration);
        body.extend_from_slice(packed.head.hash().as_bytes());
        put_bytes(&mut body, packed.head.bytes())?;

        debug!(
            order_seqno,
            signer = role.is_signer(),
            index = role.index(),
            nodes = packed.chain_len,
            "built new order"
        );
        Ok(NewOrder {
            order_seqno,
            role,
            expiration,
            head: packed.head,
            chain_len: packed.chain_len,
            body,
        })
    }

    /// Approval body for order `order_seqno`. Only signers may approve.
    pub fn approve(&self, sender: &Address, order_seqno: u64, query_id: u64) -> ClientResult<Vec<u8>> {
        let index = match self.resolve_role(sender) {
            Ok(SenderRole::Signer(i)) => i,
            Ok(SenderRole::Proposer(_)) | Err(_) => {
                return Err(ClientError::NotAuthorized {
                    address: *sender,
                    role: "signer",
                })
            }
        };
        let mut body = Vec::with_capacity(21);
        put_u32(&mut body, APPROVE_OP);
        put_u64(&mut body, query_id);
        put_u64(&mut body, order_seqno);
        put_u8(&mut body, index);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new(0, [n; 32])
    }

    fn orders(arbitrary: bool) -> MultisigOrders {
        let config = MultisigConfig::new(2, vec![addr(1), addr(2), addr(3)], vec![addr(9)], arbitrary).unwrap();
        MultisigOrders::new(addr(100), config).unwrap()
    }

    #[test]
    fn config_validation() {
        assert!(matches!(
            MultisigConfig::new(0, vec![addr(1)], vec![], false),
            Err(ActionError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            MultisigConfig::new(2, vec![addr(1)], vec![], false),
            Err(ActionError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            MultisigConfig::new(1, vec![addr(1), addr(1)], vec![], false),
            Err(ActionError::DuplicateMember { .. })
        ));
    }

    #[test]
    fn role_resolution() {
        let orders = orders(false);
        assert_eq!(orders.resolve_role(&addr(2)).unwrap(), SenderRole::Signer(1));
        assert_eq!(orders.resolve_role(&addr(9)).unwrap(), SenderRole::Proposer(0));
        assert!(matches!(
            orders.resolve_role(&addr(50)),
            Err(ClientError::NotAuthorized { .. })
        ));
    }

    #[test]
    fn signer_listed_as_proposer_resolves_as_signer() {
        let config = MultisigConfig::new(1, vec![addr(1)], vec![addr(1)], false).unwrap();
        let orders = MultisigOrders::new(addr(100), config).unwrap();
        assert_eq!(orders.resolve_role(&addr(1)).unwrap(), SenderRole::Signer(0));
    }

    #[test]
    fn approve_requires_signer() {
        let orders = orders(false);
        let body = orders.approve(&addr(3), 11, 0).unwrap();
        assert_eq!(&body[..4], &APPROVE_OP.to_be_bytes());
        assert_eq!(body[body.len() - 1], 2);
        assert!(orders.approve(&addr(9), 11, 0).is_err());
        assert!(orders.approve(&addr(50), 11, 0).is_err());
    }
}
