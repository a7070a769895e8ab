//! Envelope building against counting capabilities and a packed chain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relay_codec::{pack_batch, unpack_chain, ChainTarget};
use relay_envelope::*;
use relay_types::{Action, Address, ContentHash, QueryId, SendMode};

#[derive(Default)]
struct CountingSigner {
    calls: AtomicUsize,
    inner: Option<Ed25519Signer>,
}

impl Signer for CountingSigner {
    fn public_key(&self) -> [u8; 32] {
        self.inner.as_ref().map(|s| s.public_key()).unwrap_or([0; 32])
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(signer) => signer.sign(message),
            None => Ok([0; SIGNATURE_LEN]),
        }
    }
}

#[derive(Default)]
struct CountingHasher {
    calls: AtomicUsize,
}

impl Hasher for CountingHasher {
    fn digest(&self, bytes: &[u8]) -> ContentHash {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ContentHash::hash(bytes)
    }
}

fn wallet() -> Address {
    Address::new(-1, [0x11; 32])
}

fn actions(n: usize) -> Vec<Action> {
    (0..n)
        .map(|i| Action::transfer(SendMode::PAY_GAS_SEPARATELY, Address::new(0, [i as u8; 32]), 1))
        .collect()
}

fn addressing(query_id: QueryId) -> Addressing {
    Addressing {
        target: wallet(),
        subwallet_id: 0,
        mode: SendMode::for_attached_value(0),
        query_id,
        created_at: 1_700_000_000,
        timeout: 60,
    }
}

#[test]
fn signer_and_hasher_run_once_per_build() {
    let signer = Arc::new(CountingSigner::default());
    let hasher = Arc::new(CountingHasher::default());
    let builder = EnvelopeBuilder::new(signer.clone()).with_hasher(hasher.clone());

    let query_id = QueryId::new(0, 1).unwrap();
    let packed = pack_batch(&actions(600), &ChainTarget::new(wallet(), 1)).unwrap();
    builder.build(&packed.head, &addressing(query_id)).unwrap();

    assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(hasher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn envelope_carries_whole_chain() {
    let signer = Arc::new(CountingSigner {
        calls: AtomicUsize::new(0),
        inner: Some(MnemonicKeyDeriver::new()
            .derive_keypair(&["coral", "timber", "mosaic", "velvet"])
            .unwrap()),
    });
    let builder = EnvelopeBuilder::new(signer.clone());

    let query_id = QueryId::new(3, 9).unwrap();
    let input = actions(600);
    let target = ChainTarget::new(wallet(), u64::from(query_id.query_id()));
    let packed = pack_batch(&input, &target).unwrap();
    let env = builder.build(&packed.head, &addressing(query_id)).unwrap();

    let decoded = DecodedEnvelope::decode(env.bytes()).unwrap();
    assert_eq!(decoded.head.hash(), packed.head.hash());
    assert!(Ed25519Signer::verify(
        &signer.public_key(),
        &decoded.inner,
        &decoded.signature
    ));

    let unpacked = unpack_chain(&decoded.head).unwrap();
    assert_eq!(unpacked.node_count, 3);
    assert_eq!(unpacked.actions, input);
}

#[test]
fn identical_inputs_give_identical_envelopes() {
    let builder = EnvelopeBuilder::new(Arc::new(Ed25519Signer::from_seed(&[5; 32])));
    let query_id = QueryId::new(1, 1).unwrap();
    let build = || {
        let packed = pack_batch(&actions(300), &ChainTarget::new(wallet(), 7)).unwrap();
        builder.build(&packed.head, &addressing(query_id)).unwrap()
    };
    let a = build();
    let b = build();
    assert_eq!(a.bytes(), b.bytes());
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn query_id_changes_the_envelope() {
    let builder = EnvelopeBuilder::new(Arc::new(Ed25519Signer::from_seed(&[5; 32])));
    let packed = pack_batch(&actions(10), &ChainTarget::new(wallet(), 7)).unwrap();
    let a = builder
        .build(&packed.head, &addressing(QueryId::new(0, 1).unwrap()))
        .unwrap();
    let b = builder
        .build(&packed.head, &addressing(QueryId::new(0, 2).unwrap()))
        .unwrap();
    assert_ne!(a.hash(), b.hash());
}
