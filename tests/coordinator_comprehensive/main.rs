//! Coordinator Comprehensive Tests
//!
//! End-to-end tests of the optimistic increment protocol over the in-process
//! store, plus store doubles that force specific interleavings.

mod basic_ops;
mod concurrency;
mod failures;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};

pub use tally::{
    Batch, CommitOutcome, Coordinator, Error, Key, MemoryStore, Result, RetryConfig, StoreClient,
    Tally, TxBody, Value,
};

pub fn create_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn create_tally() -> Tally {
    Tally::ephemeral()
}

/// Holds the first `parties` watched transactions inside their watch window
/// until all of them have run their bodies, then lets them race to commit.
pub struct RendezvousStore {
    pub inner: Arc<MemoryStore>,
    barrier: Barrier,
    parties: u32,
    calls: AtomicU32,
}

impl RendezvousStore {
    pub fn new(inner: Arc<MemoryStore>, parties: u32) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties as usize),
            parties,
            calls: AtomicU32::new(0),
        }
    }
}

impl StoreClient for RendezvousStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.inner.get(key)
    }

    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.parties {
            let barrier = &self.barrier;
            self.inner.run_watched_transaction(keys, &|tx| {
                let batch = body(tx)?;
                barrier.wait();
                Ok(batch)
            })
        } else {
            self.inner.run_watched_transaction(keys, body)
        }
    }

    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        self.inner.exec(batch)
    }
}

/// Lets a rival writer change the watched key inside the first `rival_writes`
/// watch windows. The rival writes `100 * n` on its n-th write.
pub struct RivalStore {
    pub inner: Arc<MemoryStore>,
    rival_writes: u32,
    calls: AtomicU32,
}

impl RivalStore {
    pub fn new(inner: Arc<MemoryStore>, rival_writes: u32) -> Self {
        Self {
            inner,
            rival_writes,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StoreClient for RivalStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.inner.get(key)
    }

    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call > self.rival_writes {
            return self.inner.run_watched_transaction(keys, body);
        }

        let inner = &self.inner;
        let target = keys[0].clone();
        inner.run_watched_transaction(keys, &|tx| {
            let batch = body(tx)?;
            inner.set(target.clone(), 100 * call as i64)?;
            Ok(batch)
        })
    }

    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        self.inner.exec(batch)
    }
}

/// Store that loses every optimistic lock
#[derive(Default)]
pub struct AlwaysAbortStore {
    pub watched_calls: AtomicU32,
}

impl StoreClient for AlwaysAbortStore {
    fn get(&self, _key: &Key) -> Result<Option<Value>> {
        Ok(None)
    }

    fn run_watched_transaction(&self, _keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        self.watched_calls.fetch_add(1, Ordering::SeqCst);
        body(&NoValues)?;
        Ok(CommitOutcome::Aborted)
    }

    fn exec(&self, _batch: Batch) -> Result<Vec<Option<Value>>> {
        Err(Error::Internal("exec not supported".to_string()))
    }
}

struct NoValues;

impl tally::TxHandle for NoValues {
    fn get(&self, _key: &Key) -> Result<Option<Value>> {
        Ok(None)
    }
}
