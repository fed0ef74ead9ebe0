//! End-to-end contract tests over an in-memory database.

use bytes::Bytes;
use lattice_kv::{Database, KvError, RangeIter};
use std::collections::BTreeMap;

fn put(db: &Database, key: &[u8], value: &[u8]) {
    db.update(|txn| txn.set(key, value)).unwrap();
}

fn get(db: &Database, key: &[u8]) -> Result<Bytes, KvError> {
    db.view(|snap| Ok(snap.get(key)?.into_bytes()))
}

/// Seeds single-letter keys a..e, each mapped to its own bytes.
fn seed_letters(db: &Database) {
    for key in [b"a", b"b", b"c", b"d", b"e"] {
        put(db, key, key);
    }
}

fn collect_keys(iter: &mut RangeIter<'_>) -> Vec<Bytes> {
    iter.map(|(key, _)| key).collect()
}

#[test]
fn non_existent_key_not_found() {
    let db = Database::in_memory();
    assert!(matches!(get(&db, b"missing"), Err(KvError::NotFound)));
}

#[test]
fn empty_key_invalid_on_every_handle_type() {
    let db = Database::in_memory();

    let txn = db.new_transaction().unwrap();
    assert!(matches!(
        txn.get(b""),
        Err(KvError::InvalidArgument { .. })
    ));

    let snapshot = db.new_snapshot().unwrap();
    assert!(matches!(
        snapshot.get(b""),
        Err(KvError::InvalidArgument { .. })
    ));
}

#[test]
fn transaction_visibility() {
    let db = Database::in_memory();
    let mut writer = db.new_transaction().unwrap();
    writer.set(b"a", &b"1"[..]).unwrap();

    // Own reads see the buffered write.
    assert_eq!(writer.get(b"a").unwrap().into_bytes(), &b"1"[..]);

    // Nobody else does until commit.
    let concurrent = db.new_transaction().unwrap();
    assert!(matches!(concurrent.get(b"a"), Err(KvError::NotFound)));
    let snapshot = db.new_snapshot().unwrap();
    assert!(matches!(snapshot.get(b"a"), Err(KvError::NotFound)));

    writer.commit().unwrap();

    // New handles see it; the old snapshot still does not.
    assert_eq!(get(&db, b"a").unwrap(), &b"1"[..]);
    assert!(matches!(snapshot.get(b"a"), Err(KvError::NotFound)));
}

#[test]
fn transaction_delete_visibility() {
    let db = Database::in_memory();
    put(&db, b"a", b"1");

    let mut writer = db.new_transaction().unwrap();
    writer.delete(b"a").unwrap();
    assert!(matches!(writer.get(b"a"), Err(KvError::NotFound)));

    // The deletion is buffered; others still see the key.
    assert_eq!(get(&db, b"a").unwrap(), &b"1"[..]);

    writer.commit().unwrap();
    assert!(matches!(get(&db, b"a"), Err(KvError::NotFound)));
}

#[test]
fn transaction_delete_recreate() {
    let db = Database::in_memory();
    put(&db, b"a", b"old");

    db.update(|txn| {
        txn.delete(b"a")?;
        assert!(matches!(txn.get(b"a"), Err(KvError::NotFound)));
        txn.set(b"a", &b"new"[..])?;
        assert_eq!(txn.get(b"a").unwrap().into_bytes(), &b"new"[..]);
        Ok(())
    })
    .unwrap();

    assert_eq!(get(&db, b"a").unwrap(), &b"new"[..]);
}

#[test]
fn transaction_rollback_visibility() {
    let db = Database::in_memory();
    put(&db, b"keep", b"1");

    let mut txn = db.new_transaction().unwrap();
    txn.set(b"discard-me", &b"2"[..]).unwrap();
    txn.delete(b"keep").unwrap();
    txn.rollback().unwrap();

    assert_eq!(get(&db, b"keep").unwrap(), &b"1"[..]);
    assert!(matches!(get(&db, b"discard-me"), Err(KvError::NotFound)));
}

#[test]
fn snapshot_frozen_at_creation() {
    let db = Database::in_memory();
    let snapshot = db.new_snapshot().unwrap();

    // Commit happens after the snapshot was created but before it is read.
    put(&db, b"a", b"1");

    assert!(matches!(snapshot.get(b"a"), Err(KvError::NotFound)));
}

#[test]
fn disjoint_transactions_both_commit() {
    let db = Database::in_memory();
    let mut t1 = db.new_transaction().unwrap();
    let mut t2 = db.new_transaction().unwrap();
    t1.set(b"left", &b"1"[..]).unwrap();
    t2.set(b"right", &b"2"[..]).unwrap();

    t1.commit().unwrap();
    t2.commit().unwrap();

    assert_eq!(get(&db, b"left").unwrap(), &b"1"[..]);
    assert_eq!(get(&db, b"right").unwrap(), &b"2"[..]);
}

#[test]
fn conflicting_transaction_commit() {
    let db = Database::in_memory();
    let mut t1 = db.new_transaction().unwrap();
    let mut t2 = db.new_transaction().unwrap();
    t1.set(b"shared", &b"1"[..]).unwrap();
    t2.set(b"shared", &b"2"[..]).unwrap();

    t1.commit().unwrap();
    assert!(matches!(t2.commit(), Err(KvError::Conflict { .. })));

    // The losing write never landed; a fresh transaction retries cleanly.
    assert_eq!(get(&db, b"shared").unwrap(), &b"1"[..]);
    db.update(|txn| txn.set(b"shared", &b"2"[..])).unwrap();
    assert_eq!(get(&db, b"shared").unwrap(), &b"2"[..]);
}

#[test]
fn range_begin_end_invalid() {
    let db = Database::in_memory();
    seed_letters(&db);

    let txn = db.new_transaction().unwrap();
    assert!(matches!(
        txn.ascend(b"d", b"b").err(),
        Some(KvError::InvalidArgument { .. })
    ));
    assert!(matches!(
        txn.descend(b"d", b"b").err(),
        Some(KvError::InvalidArgument { .. })
    ));

    let snapshot = db.new_snapshot().unwrap();
    assert!(matches!(
        snapshot.ascend(b"z", b"a").err(),
        Some(KvError::InvalidArgument { .. })
    ));
}

#[test]
fn full_database_scan() {
    let db = Database::in_memory();
    seed_letters(&db);

    let snapshot = db.new_snapshot().unwrap();
    let mut iter = snapshot.scan().unwrap();
    // Scan order is unspecified; compare as a map.
    let found: BTreeMap<Bytes, Bytes> = iter
        .by_ref()
        .map(|(key, value)| (key, value.into_bytes()))
        .collect();
    iter.finish().unwrap();

    assert_eq!(found.len(), 5);
    for key in [b"a", b"b", b"c", b"d", b"e"] {
        assert_eq!(found.get(&Bytes::copy_from_slice(key)).unwrap(), &key[..]);
    }
}

#[test]
fn range_bounds_inclusion() {
    let db = Database::in_memory();
    seed_letters(&db);
    let txn = db.new_transaction().unwrap();

    // Begin is inclusive, end is exclusive.
    let mut iter = txn.ascend(b"b", b"d").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"b"[..], &b"c"[..]]);
    iter.finish().unwrap();

    // Empty begin runs from the smallest key.
    let mut iter = txn.ascend(b"", b"c").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"a"[..], &b"b"[..]]);
    iter.finish().unwrap();

    // Empty end runs to the largest.
    let mut iter = txn.ascend(b"d", b"").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"d"[..], &b"e"[..]]);
    iter.finish().unwrap();

    // Both empty: everything, ascending.
    let mut iter = txn.ascend(b"", b"").unwrap();
    assert_eq!(collect_keys(&mut iter).len(), 5);
    iter.finish().unwrap();

    // Equal bounds name an empty interval.
    let mut iter = txn.ascend(b"c", b"c").unwrap();
    assert!(iter.next().is_none());
    iter.finish().unwrap();
}

#[test]
fn range_descend_bounds() {
    let db = Database::in_memory();
    seed_letters(&db);
    let txn = db.new_transaction().unwrap();

    // Same half-open interval as ascend, reversed order.
    let mut iter = txn.descend(b"b", b"d").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"c"[..], &b"b"[..]]);
    iter.finish().unwrap();

    let mut iter = txn.descend(b"", b"c").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"b"[..], &b"a"[..]]);
    iter.finish().unwrap();

    let mut iter = txn.descend(b"c", b"").unwrap();
    assert_eq!(
        collect_keys(&mut iter),
        vec![&b"e"[..], &b"d"[..], &b"c"[..]]
    );
    iter.finish().unwrap();

    let mut iter = txn.descend(b"", b"").unwrap();
    assert_eq!(
        collect_keys(&mut iter),
        vec![&b"e"[..], &b"d"[..], &b"c"[..], &b"b"[..], &b"a"[..]]
    );
    iter.finish().unwrap();
}

#[test]
fn ascend_sees_buffered_writes() {
    let db = Database::in_memory();
    put(&db, b"b", b"committed");

    let mut txn = db.new_transaction().unwrap();
    txn.set(b"a", &b"buffered"[..]).unwrap();
    txn.delete(b"b").unwrap();
    txn.set(b"c", &b"buffered"[..]).unwrap();

    let mut iter = txn.ascend(b"", b"").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"a"[..], &b"c"[..]]);
    iter.finish().unwrap();
}

#[test]
fn snapshot_iterator_stability() {
    let db = Database::in_memory();
    seed_letters(&db);

    let snapshot = db.new_snapshot().unwrap();
    let mut iter = snapshot.ascend(b"", b"").unwrap();
    let first = iter.next().unwrap().0;
    assert_eq!(first, &b"a"[..]);

    // Concurrent commits must not leak into the frozen view.
    put(&db, b"aa", b"interloper");
    put(&db, b"c", b"rewritten");

    let rest = collect_keys(&mut iter);
    assert_eq!(rest, vec![&b"b"[..], &b"c"[..], &b"d"[..], &b"e"[..]]);
    iter.finish().unwrap();

    assert_eq!(snapshot.get(b"c").unwrap().into_bytes(), &b"c"[..]);
}

#[test]
fn snapshot_iterator_prefix_range() {
    let db = Database::in_memory();
    put(&db, b"user/1", b"alice");
    put(&db, b"user/2", b"bob");
    put(&db, b"user0", b"excluded");
    put(&db, b"other", b"excluded");

    let snapshot = db.new_snapshot().unwrap();
    // "user0" is the smallest key after every "user/..." key.
    let mut iter = snapshot.ascend(b"user/", b"user0").unwrap();
    assert_eq!(
        collect_keys(&mut iter),
        vec![&b"user/1"[..], &b"user/2"[..]]
    );
    iter.finish().unwrap();
}

#[test]
fn trailing_ff_exclusive_upper_bound() {
    let db = Database::in_memory();
    for key in [&b"k"[..], &b"k\xfe"[..], &b"k\xff"[..], &b"k\xff\x01"[..]] {
        put(&db, key, b"v");
    }

    let txn = db.new_transaction().unwrap();
    // The bound excludes "k\xff" itself and its continuations, nothing
    // below it.
    let mut iter = txn.ascend(b"k", b"k\xff").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"k"[..], &b"k\xfe"[..]]);
    iter.finish().unwrap();

    let mut iter = txn.descend(b"k", b"k\xff").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"k\xfe"[..], &b"k"[..]]);
    iter.finish().unwrap();
}

#[test]
fn early_abandon_releases_cursor() {
    let db = Database::in_memory();
    seed_letters(&db);

    let mut txn = db.new_transaction().unwrap();
    {
        let mut iter = txn.ascend(b"", b"").unwrap();
        let (key, _) = iter.next().unwrap();
        assert_eq!(key, &b"a"[..]);
        // Consumer stops pulling here; drop releases the cursor.
    }

    // The handle stays fully usable afterwards.
    txn.set(b"f", &b"6"[..]).unwrap();
    let mut iter = txn.ascend(b"e", b"").unwrap();
    assert_eq!(collect_keys(&mut iter), vec![&b"e"[..], &b"f"[..]]);
    iter.finish().unwrap();
    txn.commit().unwrap();
}

#[test]
fn large_value_roundtrip() {
    let db = Database::in_memory();
    let payload: Vec<u8> = (0..1_048_576u32).map(|i| (i % 251) as u8).collect();

    db.update(|txn| txn.set(b"blob", payload.as_slice())).unwrap();

    let got = get(&db, b"blob").unwrap();
    assert_eq!(got.len(), payload.len());
    assert_eq!(got, payload.as_slice());
}

#[test]
fn discarded_snapshot_behavior() {
    let db = Database::in_memory();
    seed_letters(&db);

    let mut snapshot = db.new_snapshot().unwrap();
    snapshot.discard().unwrap();

    assert!(matches!(snapshot.get(b"a"), Err(KvError::Done)));
    assert!(matches!(snapshot.scan().err(), Some(KvError::Done)));
    assert!(matches!(
        snapshot.ascend(b"", b"").err(),
        Some(KvError::Done)
    ));
    assert!(matches!(
        snapshot.descend(b"", b"").err(),
        Some(KvError::Done)
    ));
    assert!(matches!(snapshot.discard(), Err(KvError::Done)));
}

#[test]
fn commits_establish_total_order() {
    let db = Database::in_memory();
    put(&db, b"k", b"1");
    put(&db, b"k", b"2");
    put(&db, b"k", b"3");

    // A later reader sees the latest committed value, every time.
    for _ in 0..3 {
        assert_eq!(get(&db, b"k").unwrap(), &b"3"[..]);
    }
}
