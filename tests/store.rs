//! Store behavior across immutable and mutable items, including concurrent writers.
//!
//! Run with: cargo test --test store

use mainline_store::{
    target_from_key, BadItem, Error, Id, ImmutableItem, Item, MemoryStore, MutableItem,
    SigningKey, Store,
};
use rand::seq::SliceRandom;
use rayon::prelude::*;

fn signer() -> SigningKey {
    SigningKey::from_bytes(&[
        56, 171, 62, 85, 105, 58, 155, 209, 189, 8, 59, 109, 137, 84, 84, 201, 221, 115, 7, 228,
        127, 70, 4, 204, 182, 64, 77, 98, 92, 215, 27, 103,
    ])
}

fn mutable(value: &[u8], seq: u64) -> MutableItem {
    MutableItem::new(&signer(), value, seq, Some(b"salt"), None).unwrap()
}

#[test]
fn sequence_numbers_only_increase() {
    let store = MemoryStore::new();

    let five = mutable(b"five", 5);
    let target = *five.target();
    store.put(five.clone().into()).unwrap();

    for seq in [5, 3].iter() {
        let result = store.put(mutable(b"stale", *seq).into());

        assert!(matches!(
            result,
            Err(Error::StaleSequence { current: 5, incoming }) if incoming == *seq
        ));
        assert_eq!(
            store.get(&target).unwrap(),
            Some(Item::Mutable(five.clone()))
        );
    }

    let six = mutable(b"six", 6);
    store.put(six.clone().into()).unwrap();

    let stored = store.get(&target).unwrap().unwrap();
    assert_eq!(stored.seq(), Some(6));
    assert_eq!(stored, Item::Mutable(six));
}

#[test]
fn absence_is_not_an_error() {
    let store = MemoryStore::new();

    assert_eq!(store.get(&Id::random()).unwrap(), None);
}

#[test]
fn first_immutable_writer_wins() {
    let store = MemoryStore::new();

    let first = ImmutableItem::new(b"Hello world!").unwrap();
    let second = ImmutableItem::new(b"Hello world!").unwrap();
    assert_eq!(first.target(), second.target());

    store.put(first.clone().into()).unwrap();
    store.put(second.into()).unwrap();

    let stored = store.get(first.target()).unwrap().unwrap();
    assert!(stored.validate().is_ok());
    assert_eq!(stored, Item::Immutable(first));
    assert_eq!(store.len(), 1);
}

#[test]
fn forged_target_is_rejected() {
    let store = MemoryStore::new();
    let item = mutable(b"v", 1);

    // Valid signature, but claimed under someone else's target.
    let victim = target_from_key(&[3; 32], None);
    let forged = MutableItem::from_parts(
        victim,
        *item.key(),
        *item.signature(),
        item.value(),
        item.seq(),
        item.salt(),
        None,
    );

    assert!(matches!(
        store.put(forged.into()),
        Err(Error::BadItem(BadItem::TargetMismatch))
    ));
    assert_eq!(store.get(&victim).unwrap(), None);
}

/// Its public key starts with `60:`, so `sha1(key ‖ salt)` with a 31 byte salt
/// is also the target of the immutable value `key[3..] ‖ salt`.
fn colliding_signer() -> SigningKey {
    let mut seed = [0_u8; 32];
    seed[..4].copy_from_slice(&[0, 8, 220, 156]);

    SigningKey::from_bytes(&seed)
}

fn colliding_items(seq: u64) -> (MutableItem, ImmutableItem) {
    let signer = colliding_signer();
    let key = signer.verifying_key().to_bytes();
    assert_eq!(&key[..3], b"60:");

    let salt = [b'x'; 31];
    let mutable = MutableItem::new(&signer, b"mutable", seq, Some(&salt), None).unwrap();

    let mut value = key[3..].to_vec();
    value.extend_from_slice(&salt);
    let immutable = ImmutableItem::new(&value).unwrap();

    assert_eq!(mutable.target(), immutable.target());

    (mutable, immutable)
}

#[test]
fn immutable_cannot_replace_mutable() {
    let store = MemoryStore::new();
    let (five, immutable) = colliding_items(5);
    let target = *five.target();

    store.put(five.clone().into()).unwrap();

    assert!(matches!(
        store.put(immutable.into()),
        Err(Error::BadItem(BadItem::KindMismatch))
    ));
    assert_eq!(
        store.get(&target).unwrap(),
        Some(Item::Mutable(five.clone()))
    );

    // The stored sequence number still guards against older writes.
    let (one, _) = colliding_items(1);
    assert!(matches!(
        store.put(one.into()),
        Err(Error::StaleSequence {
            current: 5,
            incoming: 1
        })
    ));
    assert_eq!(store.get(&target).unwrap(), Some(Item::Mutable(five)));
}

#[test]
fn mutable_cannot_replace_immutable() {
    let store = MemoryStore::new();
    let (mutable, immutable) = colliding_items(5);
    let target = *immutable.target();

    store.put(immutable.clone().into()).unwrap();

    assert!(matches!(
        store.put(mutable.into()),
        Err(Error::BadItem(BadItem::KindMismatch))
    ));
    assert_eq!(
        store.get(&target).unwrap(),
        Some(Item::Immutable(immutable))
    );
}

#[test]
fn tampered_immutable_is_rejected() {
    let store = MemoryStore::new();
    let item = ImmutableItem::new(b"Hello world!").unwrap();

    let tampered = ImmutableItem::from_parts(*item.target(), b"Hello world?");

    assert!(matches!(
        store.put(tampered.into()),
        Err(Error::BadItem(BadItem::TargetMismatch))
    ));
    assert!(store.is_empty());
}

#[test]
fn targets_are_deterministic() {
    let a = MutableItem::new(&signer(), b"a", 1, Some(b"salt"), None).unwrap();
    let b = MutableItem::new(&signer(), b"b", 2, Some(b"salt"), Some(b"cas")).unwrap();
    let unsalted = MutableItem::new(&signer(), b"a", 1, None, None).unwrap();

    assert_eq!(a.target(), b.target());
    assert_ne!(a.target(), unsalted.target());
}

#[test]
fn concurrent_writers_keep_the_highest_sequence() {
    const WRITERS: u64 = 64;

    let store = MemoryStore::new();

    let mut items: Vec<MutableItem> = (1..=WRITERS)
        .map(|seq| mutable(format!("value {}", seq).as_bytes(), seq))
        .collect();
    items.shuffle(&mut rand::thread_rng());

    let target = *items[0].target();

    items.par_iter().for_each(|item| {
        match store.put(item.clone().into()) {
            Ok(()) | Err(Error::StaleSequence { .. }) => {}
            Err(error) => panic!("unexpected error: {}", error),
        }
    });

    let stored = store.get(&target).unwrap().unwrap();
    assert_eq!(stored.seq(), Some(WRITERS));
    assert_eq!(stored.value(), format!("value {}", WRITERS).as_bytes());
    assert!(stored.validate().is_ok());
    assert_eq!(store.len(), 1);
}

#[test]
fn concurrent_readers_and_writers() {
    const ROUNDS: u64 = 200;

    let store = MemoryStore::new();
    let target = *mutable(b"", 0).target();

    let items: Vec<MutableItem> = (1..=ROUNDS).map(|seq| mutable(b"v", seq)).collect();

    rayon::join(
        || {
            items.par_iter().for_each(|item| {
                match store.put(item.clone().into()) {
                    Ok(()) | Err(Error::StaleSequence { .. }) => {}
                    Err(error) => panic!("unexpected error: {}", error),
                }
            })
        },
        || {
            let mut last_seen = 0;

            for _ in 0..ROUNDS {
                if let Some(item) = store.get(&target).unwrap() {
                    let seq = item.seq().unwrap();
                    // Readers never observe the stored sequence going backwards.
                    assert!(seq >= last_seen);
                    last_seen = seq;
                }
            }
        },
    );

    assert_eq!(store.get(&target).unwrap().unwrap().seq(), Some(ROUNDS));
}
