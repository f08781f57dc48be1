//! Store-side counters

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) reads: AtomicU64,
    pub(crate) watched_transactions: AtomicU64,
    pub(crate) commits: AtomicU64,
    pub(crate) aborts: AtomicU64,
    pub(crate) batches: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            watched_transactions: self.watched_transactions.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time store counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Reads served, plain and in-transaction
    pub reads: u64,
    /// Watched transactions started (including failed ones)
    pub watched_transactions: u64,
    /// Watched transactions that committed
    pub commits: u64,
    /// Watched transactions aborted by a watch
    pub aborts: u64,
    /// Unwatched batches applied
    pub batches: u64,
}

impl StoreStats {
    /// Fraction of decided watched transactions that aborted (0.0 - 1.0)
    pub fn abort_rate(&self) -> f64 {
        let decided = self.commits + self.aborts;
        if decided == 0 {
            0.0
        } else {
            self.aborts as f64 / decided as f64
        }
    }
}
