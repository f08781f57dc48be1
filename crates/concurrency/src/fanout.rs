//! Fan-out of concurrent increment workers
//!
//! Spawns N scoped worker threads against one key, holds them at a start
//! barrier so they race from the same instant, and joins every one of them
//! before reporting. Workers share nothing but the coordinator (and through
//! it, the store).

use crate::config::RetryConfig;
use crate::coordinator::Coordinator;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};
use tally_core::{Error, Key, Result};
use tally_storage::StoreClient;

/// Outcome of a fan-out run
#[derive(Debug, Clone)]
pub struct FanOutReport {
    /// Workers spawned
    pub workers: usize,
    /// Workers whose increment committed
    pub committed: usize,
    /// Attempts used by the committed workers
    pub attempts: u64,
    /// Most attempts any single committed worker needed
    pub max_attempts_seen: u32,
    /// Errors from workers that did not commit
    pub failures: Vec<Error>,
    /// Wall-clock time from release to the last join
    pub elapsed: Duration,
}

impl FanOutReport {
    /// True if every worker committed
    pub fn all_committed(&self) -> bool {
        self.committed == self.workers
    }
}

/// Race `workers` increments of `key`, each bounded by `max_attempts`
///
/// Fails with `InvalidArgument` up front for zero workers or zero attempts;
/// per-worker failures are collected in the report instead.
pub fn fan_out<S: StoreClient>(
    coordinator: &Coordinator<S>,
    key: &Key,
    workers: usize,
    max_attempts: u32,
) -> Result<FanOutReport> {
    if workers == 0 {
        return Err(Error::InvalidArgument(
            "at least one worker is required".to_string(),
        ));
    }
    RetryConfig::new(max_attempts).validate()?;

    let barrier = Barrier::new(workers);
    let started = Instant::now();

    let results: Vec<Result<u32>> = thread::scope(|scope| {
        let barrier = &barrier;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    coordinator
                        .increment(key, max_attempts)
                        .map(|committed| committed.attempts)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::Internal("increment worker panicked".to_string())))
            })
            .collect()
    });

    let mut report = FanOutReport {
        workers,
        committed: 0,
        attempts: 0,
        max_attempts_seen: 0,
        failures: Vec::new(),
        elapsed: started.elapsed(),
    };
    for result in results {
        match result {
            Ok(attempts) => {
                report.committed += 1;
                report.attempts += u64::from(attempts);
                report.max_attempts_seen = report.max_attempts_seen.max(attempts);
            }
            Err(e) => report.failures.push(e),
        }
    }

    tracing::debug!(
        key = %key,
        workers,
        committed = report.committed,
        failed = report.failures.len(),
        attempts = report.attempts,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "fan-out finished"
    );
    Ok(report)
}
