//! Seqno-ordered wallet senders (v4 and v5).
//!
//! Each message carries the wallet's current seqno and a deadline. There
//! is no chaining: v4 takes at most four transfers, v5 one node's worth.
//! A message is submitted once; a stale seqno cannot succeed on retry.

use std::sync::Arc;

use relay_codec::{encode_node, CodecError};
use relay_dispatch::{DispatchPolicy, Dispatcher, Transport};
use relay_envelope::{
    EnvelopeBuilder, Hasher, KeyDeriver, MnemonicKeyDeriver, SeqnoAddressing, Signer,
    WalletVersion, MAINNET_WALLET_ID, TESTNET_WALLET_ID,
};
use relay_types::{Action, Address, ContentHash, SendMode};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{ClientError, ClientResult};
use crate::state::StateReader;

/// Messages stay valid this long unless the caller sets a deadline.
pub const DEFAULT_VALID_FOR_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn wallet_id(self) -> i32 {
        match self {
            Network::Mainnet => MAINNET_WALLET_ID,
            Network::Testnet => TESTNET_WALLET_ID,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSendOptions {
    /// Skip the state lookup and use this seqno.
    pub seqno: Option<u32>,
    /// Applied to every transfer. Defaults to paying gas separately.
    pub mode: Option<SendMode>,
    /// Unix deadline. Defaults to [`DEFAULT_VALID_FOR_SECS`] from now.
    pub valid_until: Option<u32>,
}

pub struct SeqnoWallet {
    version: WalletVersion,
    network: Network,
    address: Address,
    builder: EnvelopeBuilder,
    dispatcher: Dispatcher,
    state: Arc<dyn StateReader>,
}

impl SeqnoWallet {
    pub fn new(
        version: WalletVersion,
        network: Network,
        address: Address,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
        state: Arc<dyn StateReader>,
    ) -> Self {
        Self {
            version,
            network,
            address,
            builder: EnvelopeBuilder::new(signer),
            dispatcher: Dispatcher::new(transport),
            state,
        }
    }

    pub fn from_mnemonic(
        words: &[&str],
        version: WalletVersion,
        network: Network,
        address: Address,
        transport: Arc<dyn Transport>,
        state: Arc<dyn StateReader>,
    ) -> ClientResult<Self> {
        let signer = MnemonicKeyDeriver::new().derive_keypair(words)?;
        Ok(Self::new(version, network, address, Arc::new(signer), transport, state))
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.builder = self.builder.with_hasher(hasher);
        self
    }

    pub fn version(&self) -> WalletVersion {
        self.version
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.builder.public_key()
    }

    /// Sign and submit `transfers` in one message, returning its hash.
    #[instrument(skip_all, fields(wallet = %self.address, version = ?self.version, transfers = transfers.len()))]
    pub async fn send(
        &self,
        transfers: &[Action],
        options: WalletSendOptions,
    ) -> ClientResult<ContentHash> {
        if transfers.is_empty() {
            return Err(CodecError::EmptyBatch.into());
        }
        let limit = self.version.max_actions();
        if transfers.len() > limit {
            return Err(ClientError::TooManyTransfers {
                count: transfers.len(),
                limit,
            });
        }

        let mode = options.mode.unwrap_or(SendMode::PAY_GAS_SEPARATELY);
        let entries = transfers
            .iter()
            .map(|action| match action {
                Action::Transfer {
                    target,
                    value,
                    payload,
                    ..
                } => Ok(Action::Transfer {
                    mode,
                    target: *target,
                    value: *value,
                    payload: payload.clone(),
                }),
                other => Err(ClientError::UnsupportedAction { kind: other.kind() }),
            })
            .collect::<ClientResult<Vec<_>>>()?;

        let seqno = match options.seqno {
            Some(seqno) => seqno,
            None => self.state.query_seqno(&self.address).await?,
        };
        let valid_until = options.valid_until.unwrap_or_else(|| {
            let now = chrono::Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
            now.saturating_add(DEFAULT_VALID_FOR_SECS)
        });

        let body = encode_node(&entries, false)?;
        let addressing = SeqnoAddressing {
            version: self.version,
            target: self.address,
            wallet_id: self.network.wallet_id(),
            seqno,
            valid_until,
            mode,
        };
        let envelope = self.builder.build_seqno(&body, &addressing)?;

        let receipt = self
            .dispatcher
            .send(|_| Ok(envelope.clone()), &DispatchPolicy::new(1, 0))
            .await?;
        info!(seqno, valid_until, hash = %receipt.hash, "wallet message sent");
        Ok(receipt.hash)
    }
}

impl std::fmt::Debug for SeqnoWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqnoWallet")
            .field("version", &self.version)
            .field("network", &self.network)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
