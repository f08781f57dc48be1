//! Coordinator counters
//!
//! Counters only; the coordinator itself never logs.

use std::sync::atomic::{AtomicU64, Ordering};
use tally_core::{Error, Result};

#[derive(Debug, Default)]
pub(crate) struct MetricsCounters {
    invocations: AtomicU64,
    committed: AtomicU64,
    conflicts: AtomicU64,
    exhausted: AtomicU64,
    failed: AtomicU64,
}

impl MetricsCounters {
    pub(crate) fn invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record(&self, result: &Result<u32>) {
        let counter = match result {
            Ok(_) => &self.committed,
            Err(Error::RetriesExhausted { .. }) | Err(Error::DeadlineExceeded { .. }) => {
                &self.exhausted
            }
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CoordinatorMetrics {
        CoordinatorMetrics {
            invocations: self.invocations.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Coordinator metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorMetrics {
    /// Invocations that passed argument validation
    pub invocations: u64,
    /// Invocations that committed
    pub committed: u64,
    /// Attempts aborted by a watch
    pub conflicts: u64,
    /// Invocations that ran out of attempts or time
    pub exhausted: u64,
    /// Invocations that failed for any other reason
    pub failed: u64,
}

impl CoordinatorMetrics {
    /// Average attempts per committed invocation (0.0 if none committed)
    pub fn attempts_per_commit(&self) -> f64 {
        if self.committed == 0 {
            0.0
        } else {
            (self.committed + self.conflicts) as f64 / self.committed as f64
        }
    }
}
