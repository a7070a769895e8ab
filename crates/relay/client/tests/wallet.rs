//! Seqno wallet sends over in-memory state and transports.

use std::sync::Arc;

use relay_client::*;
use relay_codec::decode_node;
use relay_dispatch::{DispatchError, InMemoryTransport, ScriptedTransport};
use relay_envelope::{DecodedSeqnoEnvelope, Ed25519Signer, Hasher, Sha256Hasher, WalletVersion};
use relay_types::{Action, Address, SendMode};

const WORDS: [&str; 4] = ["amber", "quartz", "meadow", "signal"];

fn wallet() -> Address {
    Address::new(0, [0x3C; 32])
}

fn transfers(n: usize) -> Vec<Action> {
    (0..n)
        .map(|i| Action::transfer(SendMode::NONE, Address::new(0, [i as u8; 32]), 1_000 + i as u128))
        .collect()
}

async fn state_at(seqno: u32) -> Arc<InMemoryStateReader> {
    let state = Arc::new(InMemoryStateReader::new());
    state.set_seqno(wallet(), seqno).await;
    state
}

fn sender(
    version: WalletVersion,
    transport: Arc<InMemoryTransport>,
    state: Arc<InMemoryStateReader>,
) -> SeqnoWallet {
    SeqnoWallet::from_mnemonic(&WORDS, version, Network::Mainnet, wallet(), transport, state).unwrap()
}

#[tokio::test]
async fn v5_send_reads_seqno_and_applies_defaults() {
    let transport = Arc::new(InMemoryTransport::new());
    let wallet_sender = sender(WalletVersion::V5, transport.clone(), state_at(12).await);

    let now = chrono::Utc::now().timestamp() as u32;
    let hash = wallet_sender
        .send(&transfers(10), WalletSendOptions::default())
        .await
        .unwrap();

    let submitted = transport.submitted().await;
    assert_eq!(submitted.len(), 1);
    let decoded = DecodedSeqnoEnvelope::decode(&submitted[0]).unwrap();
    assert_eq!(decoded.addressing.version, WalletVersion::V5);
    assert_eq!(decoded.addressing.seqno, 12);
    assert_eq!(decoded.addressing.wallet_id, -239);
    assert_eq!(decoded.addressing.mode, SendMode::PAY_GAS_SEPARATELY);
    assert!(decoded.addressing.valid_until >= now + DEFAULT_VALID_FOR_SECS);
    assert!(decoded.addressing.valid_until <= now + DEFAULT_VALID_FOR_SECS + 5);
    assert!(Ed25519Signer::verify(
        &wallet_sender.public_key(),
        &decoded.inner,
        &decoded.signature
    ));

    let body = decode_node(decoded.body.bytes()).unwrap();
    assert!(body.continuation.is_none());
    assert_eq!(body.actions.len(), 10);
    for (sent, given) in body.actions.iter().zip(transfers(10)) {
        match (sent, given) {
            (
                Action::Transfer { mode, target, value, .. },
                Action::Transfer {
                    target: t, value: v, ..
                },
            ) => {
                assert_eq!(*mode, SendMode::PAY_GAS_SEPARATELY);
                assert_eq!((*target, *value), (t, v));
            }
            _ => panic!("unexpected action kind"),
        }
    }

    // the returned hash names the submitted bytes
    assert_eq!(hash, relay_envelope::Blake3Hasher.digest(&submitted[0]));
}

#[tokio::test]
async fn explicit_seqno_mode_and_deadline_win() {
    let transport = Arc::new(InMemoryTransport::new());
    // no seqno stored: a state lookup would fail
    let state = Arc::new(InMemoryStateReader::new());
    let wallet_sender = SeqnoWallet::from_mnemonic(
        &WORDS,
        WalletVersion::V4,
        Network::Testnet,
        wallet(),
        transport.clone(),
        state,
    )
    .unwrap()
    .with_hasher(Arc::new(Sha256Hasher));

    let options = WalletSendOptions {
        seqno: Some(3),
        mode: Some(SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS),
        valid_until: Some(1_900_000_000),
    };
    let hash = wallet_sender.send(&transfers(4), options).await.unwrap();

    let bytes = &transport.submitted().await[0];
    let decoded = DecodedSeqnoEnvelope::decode(bytes).unwrap();
    assert_eq!(decoded.addressing.seqno, 3);
    assert_eq!(decoded.addressing.wallet_id, -3);
    assert_eq!(decoded.addressing.valid_until, 1_900_000_000);
    assert_eq!(decoded.addressing.mode.bits(), 3);
    assert_eq!(hash, Sha256Hasher.digest(bytes));
}

#[tokio::test]
async fn v4_refuses_a_fifth_transfer() {
    let transport = Arc::new(InMemoryTransport::new());
    let wallet_sender = sender(WalletVersion::V4, transport.clone(), state_at(0).await);

    let err = wallet_sender
        .send(&transfers(5), WalletSendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::TooManyTransfers { count: 5, limit: 4 }));
    assert!(transport.submitted().await.is_empty());
}

#[tokio::test]
async fn updates_and_empty_lists_are_rejected() {
    let transport = Arc::new(InMemoryTransport::new());
    let wallet_sender = sender(WalletVersion::V5, transport.clone(), state_at(0).await);

    let update = Action::update(1, vec![wallet()], vec![]).unwrap();
    let err = wallet_sender
        .send(&[update], WalletSendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnsupportedAction { kind: "update" }));

    let err = wallet_sender
        .send(&[], WalletSendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Codec(_)));
    assert!(transport.submitted().await.is_empty());
}

#[tokio::test]
async fn unknown_wallet_state_is_reported() {
    let transport = Arc::new(InMemoryTransport::new());
    let wallet_sender = sender(
        WalletVersion::V5,
        transport.clone(),
        Arc::new(InMemoryStateReader::new()),
    );
    let err = wallet_sender
        .send(&transfers(1), WalletSendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::State(StateError::UnknownAccount(_))));
}

#[tokio::test]
async fn rejected_message_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::always_reject("bad seqno"));
    let wallet_sender = SeqnoWallet::new(
        WalletVersion::V5,
        Network::Mainnet,
        wallet(),
        Arc::new(Ed25519Signer::from_seed(&[2; 32])),
        transport.clone(),
        state_at(1).await,
    );

    let err = wallet_sender
        .send(&transfers(1), WalletSendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Dispatch(DispatchError::Exhausted { attempts: 1, .. })
    ));
    assert_eq!(transport.call_count().await, 1);
}
