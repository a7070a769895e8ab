//! High-load wallet sender.
//!
//! Packs an action list once, then hands the dispatcher a factory that
//! re-stamps the creation time on every attempt.

use std::sync::Arc;

use relay_codec::wire::{put_u32, put_u64};
use relay_codec::{pack_batch, ChainTarget};
use relay_dispatch::{CancellationToken, DispatchReceipt, Dispatcher, Transport};
use relay_envelope::{Addressing, EnvelopeBuilder, Hasher, KeyDeriver, MnemonicKeyDeriver, Signer};
use relay_types::{Action, Address, QueryId, QueryIdAllocator, SendMode};
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::error::ClientResult;

/// Per-send overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Value attached to the wallet's internal transfer and to each chain
    /// link. Zero carries the whole balance instead.
    pub value: u128,
    /// Envelope timeout in seconds. Falls back to `send_timeout_secs`.
    pub timeout_secs: Option<u32>,
    pub verbose: Option<bool>,
    /// Pin the creation time instead of stamping `now - skew` per attempt.
    pub created_at: Option<i64>,
}

pub struct HighloadSender {
    wallet: Address,
    builder: EnvelopeBuilder,
    dispatcher: Dispatcher,
    config: RelayConfig,
}

impl HighloadSender {
    pub fn new(
        wallet: Address,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
        config: RelayConfig,
    ) -> Self {
        Self {
            wallet,
            builder: EnvelopeBuilder::new(signer),
            dispatcher: Dispatcher::new(transport),
            config,
        }
    }

    pub fn from_mnemonic(
        words: &[&str],
        wallet: Address,
        transport: Arc<dyn Transport>,
        config: RelayConfig,
    ) -> ClientResult<Self> {
        let signer = MnemonicKeyDeriver::new().derive_keypair(words)?;
        Ok(Self::new(wallet, Arc::new(signer), transport, config))
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.builder = self.builder.with_hasher(hasher);
        self
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.builder.public_key()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Initial storage of the wallet this sender signs for.
    ///
    /// ```text
    /// public_key[32] subwallet_id:u32 last_clean:u64 timeout:u32
    /// ```
    ///
    /// The replay window is `wallet_timeout_secs`; query ids older than it
    /// are cleaned and may be reused.
    pub fn init_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(48);
        data.extend_from_slice(&self.public_key());
        put_u32(&mut data, self.config.subwallet_id);
        put_u64(&mut data, 0);
        put_u32(&mut data, self.config.wallet_timeout_secs);
        data
    }

    pub async fn send(
        &self,
        actions: &[Action],
        query_id: QueryId,
        options: SendOptions,
    ) -> ClientResult<DispatchReceipt> {
        self.send_with_cancel(actions, query_id, options, &CancellationToken::new())
            .await
    }

    /// Allocate the next query id from `ids`, then send.
    pub async fn send_next(
        &self,
        actions: &[Action],
        ids: &dyn QueryIdAllocator,
        options: SendOptions,
    ) -> ClientResult<DispatchReceipt> {
        let query_id = ids.allocate()?;
        self.send(actions, query_id, options).await
    }

    pub async fn send_with_cancel(
        &self,
        actions: &[Action],
        query_id: QueryId,
        options: SendOptions,
        cancel: &CancellationToken,
    ) -> ClientResult<DispatchReceipt> {
        // wallet message and every forward link carry the caller's value
        let mode = SendMode::for_attached_value(options.value);
        let target = ChainTarget::new(self.wallet, u64::from(query_id.query_id()))
            .with_forward_value(options.value)
            .with_forward_mode(mode);
        let packed = pack_batch(actions, &target)?;

        let template = Addressing {
            target: self.wallet,
            subwallet_id: self.config.subwallet_id,
            mode,
            query_id,
            created_at: 0,
            timeout: options.timeout_secs.unwrap_or(self.config.send_timeout_secs),
        };
        let skew = i64::from(self.config.created_at_skew_secs);
        let pinned = options.created_at;
        let head = &packed.head;
        let builder = &self.builder;
        let factory = move |_attempt: u32| {
            let mut addressing = template.clone();
            addressing.created_at =
                pinned.unwrap_or_else(|| chrono::Utc::now().timestamp() - skew);
            builder.build(head, &addressing)
        };

        let policy = self
            .config
            .dispatch_policy()
            .verbose(options.verbose.unwrap_or(self.config.dispatch.verbose))
            .on_failure(|attempt, cause| {
                error!(attempt, error = %cause, "failed to send message");
            });

        let receipt = self
            .dispatcher
            .send_with_cancel(factory, &policy, cancel)
            .await?;
        info!(
            wallet = %self.wallet,
            query_id = query_id.query_id(),
            actions = actions.len(),
            nodes = packed.chain_len,
            hash = %receipt.hash,
            "batch sent"
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for HighloadSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighloadSender")
            .field("wallet", &self.wallet)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
