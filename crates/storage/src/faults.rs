//! Fault injection for store clients
//!
//! Lets tests and demos make a store misbehave the way a remote store does
//! when the network goes away: every call fails while the store is marked
//! unavailable, and the next N reads or watched transactions can be made to
//! fail with a chosen error.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tally_core::Error;

/// Kind of transient failure to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Connectivity loss
    Unavailable,
    /// Operation did not finish in time
    Timeout,
}

impl FaultKind {
    fn to_error(self, op: &str) -> Error {
        match self {
            FaultKind::Unavailable => Error::StoreUnavailable(format!("{} failed: connection lost", op)),
            FaultKind::Timeout => Error::Timeout(format!("{} timed out", op)),
        }
    }
}

#[derive(Debug, Default)]
struct Pending {
    kind: Option<FaultKind>,
    remaining: u32,
}

impl Pending {
    fn take(&mut self) -> Option<FaultKind> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.kind
    }
}

/// Scheduled failures for a store
#[derive(Debug, Default)]
pub struct FaultInjector {
    unavailable: AtomicBool,
    reads: Mutex<Pending>,
    transactions: Mutex<Pending>,
}

impl FaultInjector {
    /// Injector with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store reachable or unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        if unavailable {
            tracing::warn!("store marked unavailable");
        }
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Whether the store is currently marked unreachable
    pub fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }

    /// Fail the next `count` reads (plain or in-transaction) with `kind`
    pub fn fail_next_reads(&self, count: u32, kind: FaultKind) {
        tracing::warn!(count, ?kind, "injecting read faults");
        *self.reads.lock() = Pending {
            kind: Some(kind),
            remaining: count,
        };
    }

    /// Fail the next `count` watched transactions or batches with `kind`
    ///
    /// The failure is raised before the watch is registered, so the body is
    /// never called.
    pub fn fail_next_transactions(&self, count: u32, kind: FaultKind) {
        tracing::warn!(count, ?kind, "injecting transaction faults");
        *self.transactions.lock() = Pending {
            kind: Some(kind),
            remaining: count,
        };
    }

    /// Drop every scheduled fault and mark the store reachable
    pub fn clear(&self) {
        self.unavailable.store(false, Ordering::SeqCst);
        *self.reads.lock() = Pending::default();
        *self.transactions.lock() = Pending::default();
    }

    pub(crate) fn check_read(&self) -> Result<(), Error> {
        self.check_unavailable("get")?;
        match self.reads.lock().take() {
            Some(kind) => Err(kind.to_error("get")),
            None => Ok(()),
        }
    }

    pub(crate) fn check_transaction(&self, op: &str) -> Result<(), Error> {
        self.check_unavailable(op)?;
        match self.transactions.lock().take() {
            Some(kind) => Err(kind.to_error(op)),
            None => Ok(()),
        }
    }

    fn check_unavailable(&self, op: &str) -> Result<(), Error> {
        if self.is_unavailable() {
            return Err(FaultKind::Unavailable.to_error(op));
        }
        Ok(())
    }
}
