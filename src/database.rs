//! Main entry point for Tally.
//!
//! This module provides the `Tally` struct: a store client plus the
//! coordinator that runs optimistic transactions against it.

use std::sync::Arc;
use std::time::Duration;
use tally_concurrency::{fan_out, Committed, Coordinator, CoordinatorMetrics, FanOutReport, RetryConfig};
use tally_core::{Batch, Key, Result, Value};
use tally_storage::{MemoryStore, MemoryStoreConfig, StoreClient, StoreStats};

/// Optimistic counters over a key-value store.
///
/// The store client is injected (see [`Tally::with_store`]) and owned for the
/// lifetime of the `Tally`; dropping it releases the store. Without an
/// explicit store, an in-process [`MemoryStore`] is used.
///
/// # Example
///
/// ```
/// use tally::prelude::*;
///
/// let db = Tally::ephemeral();
///
/// db.incr("counter3")?;
/// db.incr("counter3")?;
/// assert_eq!(db.get_int("counter3")?, 2);
/// # Ok::<(), tally::Error>(())
/// ```
#[derive(Debug)]
pub struct Tally<S: StoreClient = Arc<MemoryStore>> {
    coordinator: Coordinator<S>,
}

impl Tally {
    /// In-process store, default retry bounds.
    pub fn ephemeral() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Create a builder for an in-process `Tally`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use tally::Tally;
    ///
    /// let db = Tally::builder()
    ///     .max_attempts(10)
    ///     .deadline(Duration::from_millis(200))
    ///     .build()?;
    /// # Ok::<(), tally::Error>(())
    /// ```
    pub fn builder() -> TallyBuilder {
        TallyBuilder::new()
    }

    /// Store-side counters of the in-process store.
    pub fn stats(&self) -> StoreStats {
        self.store().stats()
    }
}

impl<S: StoreClient> Tally<S> {
    /// Run against an existing store client with default retry bounds.
    pub fn with_store(store: S) -> Self {
        Self::with_store_and_config(store, RetryConfig::default())
    }

    /// Run against an existing store client with the given retry bounds.
    pub fn with_store_and_config(store: S, config: RetryConfig) -> Self {
        Self {
            coordinator: Coordinator::with_config(store, config),
        }
    }

    /// The store client.
    pub fn store(&self) -> &S {
        self.coordinator.store()
    }

    /// The coordinator driving optimistic transactions.
    pub fn coordinator(&self) -> &Coordinator<S> {
        &self.coordinator
    }

    /// Retry bounds used by `incr`, `incr_by`, `update` and `race`.
    pub fn config(&self) -> &RetryConfig {
        self.coordinator.config()
    }

    /// Coordinator counters.
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.coordinator.metrics()
    }

    /// Read a key.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<Value>> {
        self.store().get(&key.into())
    }

    /// Read a key as a counter (absent reads as 0).
    pub fn get_int(&self, key: impl Into<Key>) -> Result<i64> {
        Value::counter(self.get(key)?.as_ref())
    }

    /// Overwrite a key without any watch.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let mut batch = Batch::new();
        batch.set(key, value);
        self.store().exec(batch).map(|_| ())
    }

    /// Remove a key without any watch.
    pub fn delete(&self, key: impl Into<Key>) -> Result<()> {
        let mut batch = Batch::new();
        batch.delete(key);
        self.store().exec(batch).map(|_| ())
    }

    /// Increment a counter by one under optimistic concurrency control.
    ///
    /// Returns the committed value.
    pub fn incr(&self, key: impl Into<Key>) -> Result<i64> {
        self.incr_by(key, 1)
    }

    /// Add `delta` to a counter under optimistic concurrency control.
    pub fn incr_by(&self, key: impl Into<Key>, delta: i64) -> Result<i64> {
        self.coordinator
            .increment_by(&key.into(), delta, self.config().max_attempts)
            .map(|committed| committed.value)
    }

    /// Apply a pure update function to a key under optimistic concurrency
    /// control. `f` may run more than once.
    pub fn update<F>(&self, key: impl Into<Key>, f: F) -> Result<Committed<Option<Value>>>
    where
        F: Fn(Option<&Value>) -> Result<Option<Value>>,
    {
        self.coordinator
            .update(&key.into(), self.config().max_attempts, f)
    }

    /// Apply a batch atomically without any watch.
    ///
    /// Returns the value each command left behind.
    pub fn exec(&self, batch: Batch) -> Result<Vec<Option<Value>>> {
        self.store().exec(batch)
    }

    /// Race `workers` concurrent increments of one key.
    pub fn race(&self, key: impl Into<Key>, workers: usize) -> Result<FanOutReport> {
        fan_out(
            &self.coordinator,
            &key.into(),
            workers,
            self.config().max_attempts,
        )
    }
}

/// Builder for an in-process `Tally`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tally::Tally;
///
/// // Widen the contention window to make conflicts visible
/// let db = Tally::builder()
///     .max_attempts(100)
///     .commit_delay(Duration::from_millis(1))
///     .build()?;
/// # Ok::<(), tally::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TallyBuilder {
    retry: RetryConfig,
    store: MemoryStoreConfig,
}

impl TallyBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts allowed per optimistic transaction.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    /// Wall-clock bound across all attempts of one transaction.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.retry = self.retry.with_deadline(deadline);
        self
    }

    /// Replace the retry bounds wholesale.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Pause between a transaction body and its commit attempt.
    ///
    /// Sub-millisecond delays round up to 1ms.
    pub fn commit_delay(mut self, delay: Duration) -> Self {
        self.store = self.store.with_commit_delay(delay);
        self
    }

    /// Replace the store config wholesale.
    pub fn store_config(mut self, store: MemoryStoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Validate the settings and create the `Tally`.
    pub fn build(self) -> Result<Tally> {
        self.retry.validate()?;
        let store = Arc::new(MemoryStore::with_config(self.store));
        Ok(Tally::with_store_and_config(store, self.retry))
    }
}
