//! Store client contract
//!
//! The coordinator only talks to a store through [`StoreClient`]. Any store
//! that can watch keys and apply a batch conditionally on those watches can
//! back it; [`crate::MemoryStore`] is the in-process implementation.
//!
//! ## Watched transaction contract
//!
//! `run_watched_transaction(keys, body)`:
//! 1. registers a watch on every key in `keys`
//! 2. calls `body` exactly once, synchronously, with a [`TxHandle`] for reads
//! 3. applies the returned [`Batch`] atomically if no watched key changed
//!    since step 1, returning `Committed`; otherwise applies nothing and
//!    returns `Aborted`
//!
//! A `body` error discards the transaction and is returned unchanged.
//! There is no partial commit.

use std::sync::Arc;
use tally_core::{Batch, CommitOutcome, Key, Result, Value};

/// Read access inside a watched transaction
///
/// Reads through the handle happen after the watch is registered, so any
/// later change to a watched key is caught at commit time.
pub trait TxHandle {
    /// Read the current value of a key
    fn get(&self, key: &Key) -> Result<Option<Value>>;
}

/// Transaction body: a pure function from observed state to staged writes
///
/// Bodies must not have side effects beyond the batch they return; a store
/// implementation is allowed to call them more than once.
pub type TxBody<'a> = dyn Fn(&dyn TxHandle) -> Result<Batch> + 'a;

/// Primitives a key-value store exposes to the coordinator
pub trait StoreClient: Send + Sync {
    /// Read a key outside any transaction
    fn get(&self, key: &Key) -> Result<Option<Value>>;

    /// Watch `keys`, run `body`, and commit its batch only if no watched key
    /// changed in between
    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome>;

    /// Apply a batch atomically without any watch
    ///
    /// Returns the value each command left behind, in order (`None` after a
    /// delete).
    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>>;
}

impl<S: StoreClient + ?Sized> StoreClient for Arc<S> {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        (**self).run_watched_transaction(keys, body)
    }

    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        (**self).exec(batch)
    }
}

impl<S: StoreClient + ?Sized> StoreClient for &S {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        (**self).run_watched_transaction(keys, body)
    }

    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        (**self).exec(batch)
    }
}
