//! Concurrency Tests
//!
//! Many callers racing on shared keys with no coordination other than the
//! store:
//! - the two-caller interleaving, step by step
//! - no lost updates under fan-out
//! - disjoint keys never conflict
//! - multi-key watches preserve cross-key invariants

use crate::*;
use std::thread;
use std::time::Duration;

/// Both callers read 0 and compute 1; one commits, the other aborts,
/// re-reads 1 and commits 2.
#[test]
fn test_two_callers_one_conflict() {
    let store = create_store();
    let coordinator = Coordinator::new(RendezvousStore::new(Arc::clone(&store), 2));
    let key = Key::new("counter");

    let mut results: Vec<_> = thread::scope(|scope| {
        let coordinator = &coordinator;
        let key = &key;
        let handles: Vec<_> = (0..2)
            .map(|_| scope.spawn(move || coordinator.increment(key, 10)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });
    results.sort_by_key(|committed| committed.attempts);

    assert_eq!(results[0].value, 1);
    assert_eq!(results[0].attempts, 1);
    assert_eq!(results[1].value, 2);
    assert_eq!(results[1].attempts, 2);

    assert_eq!(store.get(&key).unwrap(), Some(Value::Int(2)));
    let stats = store.stats();
    assert_eq!(stats.commits, 2);
    assert_eq!(stats.aborts, 1);
    assert_eq!(coordinator.metrics().conflicts, 1);
}

#[test]
fn test_hundred_workers_no_lost_updates() {
    let db = create_tally();

    let report = db.race("counter3", 100).unwrap();

    assert!(report.all_committed(), "failures: {:?}", report.failures);
    assert_eq!(db.get_int("counter3").unwrap(), 100);
    assert_eq!(db.stats().commits, 100);
}

#[test]
fn test_no_lost_updates_with_wide_watch_window() {
    // A commit delay makes nearly every round contended
    let db = Tally::builder()
        .commit_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    let report = db.race("counter", 16).unwrap();

    assert!(report.all_committed(), "failures: {:?}", report.failures);
    assert_eq!(db.get_int("counter").unwrap(), 16);
    assert_eq!(db.stats().aborts, report.attempts - 16);
}

#[test]
fn test_threads_each_incrementing_many_times() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let db = Arc::new(create_tally());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..PER_THREAD {
                    // Aborts per call are bounded by the other threads'
                    // total commits (175 here)
                    db.coordinator()
                        .increment(&Key::new("shared"), 1_000)
                        .unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.get_int("shared").unwrap(), (THREADS * PER_THREAD) as i64);
}

#[test]
fn test_mixed_deltas_sum_exactly() {
    const THREADS: i64 = 6;

    let db = create_tally();
    let barrier = Barrier::new(THREADS as usize);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let db = &db;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let delta = if t % 2 == 0 { t + 1 } else { -t };
                for _ in 0..10 {
                    db.incr_by("balance", delta).unwrap();
                }
            });
        }
    });

    let expected: i64 = (0..THREADS)
        .map(|t| if t % 2 == 0 { t + 1 } else { -t })
        .sum::<i64>()
        * 10;
    assert_eq!(db.get_int("balance").unwrap(), expected);
}

#[test]
fn test_disjoint_keys_never_conflict() {
    const THREADS: usize = 8;

    let db = create_tally();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let db = &db;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    db.incr(format!("counter_{}", t)).unwrap();
                }
            });
        }
    });

    for t in 0..THREADS {
        assert_eq!(db.get_int(format!("counter_{}", t)).unwrap(), 20);
    }
    assert_eq!(db.metrics().conflicts, 0);
    assert_eq!(db.stats().aborts, 0);
}

#[test]
fn test_multi_key_transfer_preserves_total() {
    const THREADS: usize = 4;
    const TRANSFERS: usize = 25;

    let db = create_tally();
    db.set("a", 1_000).unwrap();
    db.set("b", 1_000).unwrap();
    let keys = [Key::new("a"), Key::new("b")];
    let barrier = Barrier::new(THREADS);
    let config = RetryConfig::new(1_000);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let db = &db;
            let keys = &keys;
            let barrier = &barrier;
            let config = &config;
            scope.spawn(move || {
                let (from, to) = if t % 2 == 0 {
                    (&keys[0], &keys[1])
                } else {
                    (&keys[1], &keys[0])
                };
                barrier.wait();
                for _ in 0..TRANSFERS {
                    db.coordinator()
                        .transact(keys, config, |tx| {
                            let source = Value::counter(tx.get(from)?.as_ref())?;
                            let target = Value::counter(tx.get(to)?.as_ref())?;
                            let mut batch = Batch::new();
                            batch.set(from.clone(), source - 3).set(to.clone(), target + 3);
                            Ok(batch)
                        })
                        .unwrap();
                }
            });
        }
    });

    let a = db.get_int("a").unwrap();
    let b = db.get_int("b").unwrap();
    assert_eq!(a + b, 2_000);
    // Two threads each way, same amount: balances end where they started
    assert_eq!(a, 1_000);
}
