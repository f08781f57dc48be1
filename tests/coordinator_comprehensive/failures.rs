//! Failure Policy Tests
//!
//! Transient store failures are returned at once and never consume retry
//! budget; only optimistic-lock conflicts are retried. Deadlines are a
//! separate failure from exhaustion.

use crate::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tally::FaultKind;

#[test]
fn test_unavailable_store_fails_fast() {
    let db = create_tally();
    db.store().faults().set_unavailable(true);

    let err = db.incr("k").unwrap_err();

    assert!(matches!(err, Error::StoreUnavailable(_)));
    assert_eq!(db.metrics().failed, 1);
    assert_eq!(db.metrics().conflicts, 0);
}

#[test]
fn test_timeout_on_watch_is_not_retried() {
    let db = create_tally();
    db.store().faults().fail_next_transactions(1, FaultKind::Timeout);

    let err = db.incr("k").unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));

    // One fault only: the store recovers and nothing was applied
    assert_eq!(db.get_int("k").unwrap(), 0);
    assert_eq!(db.incr("k").unwrap(), 1);
}

#[test]
fn test_read_failure_inside_watch_is_not_retried() {
    let db = create_tally();
    db.store().faults().fail_next_reads(1, FaultKind::Unavailable);

    let err = db.incr("k").unwrap_err();

    assert!(err.is_transient());
    assert_eq!(db.stats().watched_transactions, 1);
    assert_eq!(db.stats().commits, 0);
}

#[test]
fn test_transient_error_after_conflict_surfaces_instead_of_retrying() {
    let store = create_store();
    let rival = RivalStore::new(Arc::clone(&store), 1);
    let coordinator = Coordinator::new(rival);

    // Rival aborts attempt 1; attempt 2 hits a dead connection
    let key = Key::new("k");
    let result = coordinator.transact(&[key.clone()], &RetryConfig::new(10), |tx| {
        let n = Value::counter(tx.get(&key)?.as_ref())?;
        if n > 0 {
            // Second attempt: the connection drops before anything is staged
            return Err(Error::StoreUnavailable("connection reset".into()));
        }
        let mut batch = Batch::new();
        batch.set(key.clone(), n + 1);
        Ok(batch)
    });

    assert_eq!(
        result.unwrap_err(),
        Error::StoreUnavailable("connection reset".into())
    );
    assert_eq!(coordinator.store().calls(), 2);
    assert_eq!(store.get(&key).unwrap(), Some(Value::Int(100)));
}

#[test]
fn test_deadline_exceeded_under_endless_contention() {
    let store = Arc::new(MemoryStore::with_config(tally::MemoryStoreConfig {
        commit_delay_ms: 2,
    }));
    let config = RetryConfig::new(10_000).with_deadline(Duration::from_millis(20));
    let coordinator = Coordinator::with_config(RivalStore::new(Arc::clone(&store), u32::MAX), config);

    let err = coordinator.increment(&Key::new("k"), 10_000).unwrap_err();

    match err {
        Error::DeadlineExceeded { deadline, attempts } => {
            assert_eq!(deadline, Duration::from_millis(20));
            assert!(attempts < 10_000);
        }
        other => panic!("expected DeadlineExceeded, got {:?}", other),
    }
    assert!(!matches!(
        coordinator.increment(&Key::new("k"), 1).unwrap_err(),
        Error::DeadlineExceeded { .. }
    ));
}

#[test]
fn test_random_faults_never_double_apply() {
    let mut rng = StdRng::seed_from_u64(0x7a11);
    let db = create_tally();
    let mut committed = 0i64;

    for _ in 0..200 {
        match rng.gen_range(0..4) {
            0 => db.store().faults().fail_next_reads(1, FaultKind::Timeout),
            1 => db
                .store()
                .faults()
                .fail_next_transactions(1, FaultKind::Unavailable),
            _ => {}
        }
        match db.incr("k") {
            Ok(value) => {
                committed += 1;
                assert_eq!(value, committed);
            }
            Err(e) => assert!(e.is_transient(), "unexpected error {:?}", e),
        }
    }

    assert!(committed > 0);
    assert_eq!(db.get_int("k").unwrap(), committed);
}
