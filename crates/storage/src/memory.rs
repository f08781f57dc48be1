//! In-process store with watch semantics
//!
//! Keys live in a DashMap, so reads never take the commit lock. Every slot
//! carries the version of the batch that last wrote it; a watch is nothing
//! more than a snapshot of those versions.
//!
//! # Commit Sequence
//!
//! ```text
//! 1. snapshot versions of watched keys   (watch registration)
//! 2. run body, collect its batch         (no locks held)
//! 3. acquire commit lock
//! 4. re-read versions of watched keys
//! 5. IF any differ: Aborted, apply nothing
//! 6. stage the whole batch; IF any command fails: error, apply nothing
//! 7. allocate one version, write every staged slot
//! 8. release commit lock, Committed
//! ```
//!
//! Steps 4 through 7 run under one lock, so no writer can slip in between
//! the check and the apply.
//!
//! Deletes leave a tombstone slot with a fresh version, so a watch on a key
//! that was deleted (or deleted and re-created) still sees the change.

use crate::faults::FaultInjector;
use crate::stats::{StatsCounters, StoreStats};
use crate::traits::{StoreClient, TxBody, TxHandle};
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tally_core::{millis_ceil, Batch, Command, CommitOutcome, Error, Key, Result, Value};

/// Tuning knobs for [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Pause between running a transaction body and attempting its commit,
    /// in milliseconds (0 = none)
    ///
    /// Stands in for business logic or network latency inside the watch
    /// window; larger values make conflicts more likely.
    pub commit_delay_ms: u64,
}

impl MemoryStoreConfig {
    /// Set the commit delay, rounding sub-millisecond delays up to 1ms
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay_ms = millis_ceil(delay);
        self
    }

    /// Commit delay as a duration, if any
    pub fn commit_delay(&self) -> Option<Duration> {
        (self.commit_delay_ms > 0).then(|| Duration::from_millis(self.commit_delay_ms))
    }
}

#[derive(Debug, Clone)]
struct Slot {
    /// `None` is a tombstone
    value: Option<Value>,
    version: u64,
}

/// In-memory key-value store implementing [`StoreClient`]
///
/// # Thread Safety
///
/// All operations are thread-safe. Reads are lock-free; watched commits and
/// batches serialize on a single commit lock.
///
/// # Example
///
/// ```
/// use tally_storage::{MemoryStore, StoreClient};
/// use tally_core::{Batch, CommitOutcome, Key, Value};
///
/// let store = MemoryStore::new();
/// let key = Key::new("watch_count");
///
/// let outcome = store
///     .run_watched_transaction(&[key.clone()], &|tx| {
///         let n = Value::counter(tx.get(&key)?.as_ref())?;
///         let mut batch = Batch::new();
///         batch.set(key.clone(), n + 1);
///         Ok(batch)
///     })
///     .unwrap();
///
/// assert_eq!(outcome, CommitOutcome::Committed);
/// assert_eq!(store.get(&key).unwrap(), Some(Value::Int(1)));
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    data: DashMap<Key, Slot>,
    /// Version of the last applied batch
    version: AtomicU64,
    commit_lock: Mutex<()>,
    config: MemoryStoreConfig,
    faults: FaultInjector,
    stats: StatsCounters,
}

impl MemoryStore {
    /// Empty store with default config
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Empty store with the given config
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            data: DashMap::new(),
            version: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            config,
            faults: FaultInjector::new(),
            stats: StatsCounters::default(),
        }
    }

    /// Version of the most recently applied batch
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Active config
    pub fn config(&self) -> &MemoryStoreConfig {
        &self.config
    }

    /// Fault injection controls
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Snapshot of store counters
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }

    /// Number of keys currently holding a value
    pub fn len(&self) -> usize {
        self.data.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// True if no key holds a value
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a key outside any transaction
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let mut batch = Batch::new();
        batch.set(key, value);
        self.exec(batch).map(|_| ())
    }

    /// Remove a key outside any transaction
    pub fn delete(&self, key: impl Into<Key>) -> Result<()> {
        let mut batch = Batch::new();
        batch.delete(key);
        self.exec(batch).map(|_| ())
    }

    #[inline]
    fn slot_version(&self, key: &Key) -> u64 {
        self.data.get(key).map_or(0, |slot| slot.version)
    }

    fn read(&self, key: &Key) -> Result<Option<Value>> {
        self.faults.check_read()?;
        StatsCounters::bump(&self.stats.reads);
        Ok(self.data.get(key).and_then(|slot| slot.value.clone()))
    }

    fn watch(&self, keys: &[Key]) -> FxHashMap<Key, u64> {
        keys.iter()
            .map(|key| (key.clone(), self.slot_version(key)))
            .collect()
    }

    /// First watched key whose version moved since the watch; caller holds
    /// the commit lock
    fn changed_key<'a>(&self, watched: &'a FxHashMap<Key, u64>) -> Option<&'a Key> {
        watched
            .iter()
            .find(|(key, version)| self.slot_version(key) != **version)
            .map(|(key, _)| key)
    }

    /// Stage and apply a batch all-or-nothing; caller holds the commit lock
    fn apply_locked(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        let mut staged: FxHashMap<Key, Option<Value>> = FxHashMap::default();
        let mut results = Vec::with_capacity(batch.len());

        for command in batch {
            match command {
                Command::Set { key, value } => {
                    results.push(Some(value.clone()));
                    staged.insert(key, Some(value));
                }
                Command::Delete { key } => {
                    // Tombstone is never reclaimed and `len()` scans it; fine for
                    // an in-process store
                    results.push(None);
                    staged.insert(key, None);
                }
                Command::IncrBy { key, delta } => {
                    let current = match staged.get(&key) {
                        Some(value) => value.clone(),
                        None => self.data.get(&key).and_then(|slot| slot.value.clone()),
                    };
                    let next = Value::counter(current.as_ref())?
                        .checked_add(delta)
                        .ok_or_else(|| Error::Overflow(key.to_string()))?;
                    results.push(Some(Value::Int(next)));
                    staged.insert(key, Some(Value::Int(next)));
                }
            }
        }

        if staged.is_empty() {
            return Ok(results);
        }

        // One version for the whole batch
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        for (key, value) in staged {
            self.data.insert(key, Slot { value, version });
        }
        Ok(results)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryTx<'a> {
    store: &'a MemoryStore,
}

impl TxHandle for MemoryTx<'_> {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.store.read(key)
    }
}

impl StoreClient for MemoryStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.read(key)
    }

    fn run_watched_transaction(&self, keys: &[Key], body: &TxBody<'_>) -> Result<CommitOutcome> {
        self.faults.check_transaction("watch")?;
        StatsCounters::bump(&self.stats.watched_transactions);

        let watched = self.watch(keys);
        let batch = body(&MemoryTx { store: self })?;

        if let Some(delay) = self.config.commit_delay() {
            std::thread::sleep(delay);
        }

        let _commit_guard = self.commit_lock.lock();

        if let Some(key) = self.changed_key(&watched) {
            StatsCounters::bump(&self.stats.aborts);
            tracing::trace!(key = %key, "watched key changed, transaction aborted");
            return Ok(CommitOutcome::Aborted);
        }

        let writes = batch.len();
        self.apply_locked(batch)?;
        StatsCounters::bump(&self.stats.commits);
        tracing::trace!(writes, version = self.version(), "watched transaction committed");
        Ok(CommitOutcome::Committed)
    }

    fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        self.faults.check_transaction("exec")?;
        let _commit_guard = self.commit_lock.lock();
        let results = self.apply_locked(batch)?;
        StatsCounters::bump(&self.stats.batches);
        Ok(results)
    }
}
