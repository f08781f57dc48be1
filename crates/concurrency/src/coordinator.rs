//! Optimistic transaction coordinator
//!
//! Runs the watch → read → compute → commit loop against any
//! [`StoreClient`], retrying only when the store reports that a watched key
//! changed underneath the attempt.
//!
//! ## Attempt
//!
//! ```text
//! 1. run_watched_transaction(keys, body)
//!      store registers the watch
//!      body reads through the TxHandle (read is covered by the watch)
//!      body computes new values from what it read, stages a Batch
//!      store commits the batch iff no watched key changed
//! 2. Committed → return
//!    Aborted   → next attempt with a fresh read, no delay
//!    Err(_)    → return the error as is
//! ```
//!
//! ## Failure Policy
//!
//! - `max_attempts == 0` fails with `InvalidArgument` before any store call
//! - `StoreUnavailable` / `Timeout` are returned immediately and do not
//!   consume the retry budget
//! - `max_attempts` consecutive aborts fail with `RetriesExhausted`
//! - a configured deadline checked before each retry fails with
//!   `DeadlineExceeded`
//!
//! No client-side lock is held at any point. Correctness under concurrent
//! callers rests entirely on the store's watch.

use crate::config::RetryConfig;
use crate::metrics::{CoordinatorMetrics, MetricsCounters};
use std::cell::RefCell;
use std::time::Instant;
use tally_core::{Batch, CommitOutcome, Error, Key, Result, Value};
use tally_storage::{StoreClient, TxBody, TxHandle};

/// A successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// What the committing attempt wrote
    pub value: T,
    /// Attempts used, including the committing one
    pub attempts: u32,
}

/// Optimistic concurrency coordinator over a store client
///
/// The store is injected by the caller and owned by the coordinator for its
/// lifetime; pass an `Arc<S>` or `&S` to share one store between several
/// coordinators.
///
/// # Example
///
/// ```
/// use tally_concurrency::Coordinator;
/// use tally_core::Key;
/// use tally_storage::MemoryStore;
///
/// let coordinator = Coordinator::new(MemoryStore::new());
/// let key = Key::new("counter3");
///
/// let committed = coordinator.increment(&key, 100).unwrap();
/// assert_eq!(committed.value, 1);
/// assert_eq!(committed.attempts, 1);
/// ```
#[derive(Debug)]
pub struct Coordinator<S> {
    store: S,
    config: RetryConfig,
    metrics: MetricsCounters,
}

impl<S: StoreClient> Coordinator<S> {
    /// Coordinator with default retry bounds
    pub fn new(store: S) -> Self {
        Self::with_config(store, RetryConfig::default())
    }

    /// Coordinator with the given default retry bounds
    pub fn with_config(store: S, config: RetryConfig) -> Self {
        Self {
            store,
            config,
            metrics: MetricsCounters::default(),
        }
    }

    /// The injected store client
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back to the caller
    pub fn into_store(self) -> S {
        self.store
    }

    /// Default retry bounds
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Snapshot of coordinator counters
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.metrics.snapshot()
    }

    /// Increment the integer at `key` by one
    ///
    /// An absent key counts as zero. Returns the committed value.
    pub fn increment(&self, key: &Key, max_attempts: u32) -> Result<Committed<i64>> {
        self.increment_by(key, 1, max_attempts)
    }

    /// Add `delta` to the integer at `key`
    pub fn increment_by(&self, key: &Key, delta: i64, max_attempts: u32) -> Result<Committed<i64>> {
        let config = self.config_with(max_attempts);
        self.update_with(key, &config, |current| {
            let next = Value::counter(current)?
                .checked_add(delta)
                .ok_or_else(|| Error::Overflow(key.to_string()))?;
            Ok((Some(Value::Int(next)), next))
        })
    }

    /// Replace the value at `key` with `f(current)`
    ///
    /// `f` must be a pure function of the value it is given; it runs once per
    /// attempt. Returning `None` deletes the key. An error from `f` ends the
    /// invocation without retrying.
    pub fn update<F>(&self, key: &Key, max_attempts: u32, f: F) -> Result<Committed<Option<Value>>>
    where
        F: Fn(Option<&Value>) -> Result<Option<Value>>,
    {
        let config = self.config_with(max_attempts);
        self.update_with(key, &config, |current| {
            let next = f(current)?;
            Ok((next.clone(), next))
        })
    }

    /// Run `body` under a watch on `keys` until it commits
    ///
    /// This is the general form behind [`increment`](Self::increment) and
    /// [`update`](Self::update). Returns the number of attempts used.
    pub fn transact<F>(&self, keys: &[Key], config: &RetryConfig, body: F) -> Result<u32>
    where
        F: Fn(&dyn TxHandle) -> Result<Batch>,
    {
        config.validate()?;
        if keys.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one key must be watched".to_string(),
            ));
        }

        self.metrics.invocation();
        let result = self.run_attempts(keys, config, &body);
        self.metrics.record(&result);
        result
    }

    fn run_attempts(&self, keys: &[Key], config: &RetryConfig, body: &TxBody<'_>) -> Result<u32> {
        let started = Instant::now();
        let deadline = config.deadline();

        for attempt in 1..=config.max_attempts {
            if let Some(deadline) = deadline {
                if attempt > 1 && started.elapsed() >= deadline {
                    return Err(Error::DeadlineExceeded {
                        deadline,
                        attempts: attempt - 1,
                    });
                }
            }

            match self.store.run_watched_transaction(keys, body)? {
                CommitOutcome::Committed => return Ok(attempt),
                CommitOutcome::Aborted => self.metrics.conflict(),
            }
        }

        Err(Error::RetriesExhausted {
            key: keys[0].to_string(),
            attempts: config.max_attempts,
        })
    }

    /// Single-key update where `f` also yields the value to report back
    fn update_with<T, F>(&self, key: &Key, config: &RetryConfig, f: F) -> Result<Committed<T>>
    where
        F: Fn(Option<&Value>) -> Result<(Option<Value>, T)>,
    {
        // Holds whatever the latest body call staged; after a commit that is
        // the committing attempt's output.
        let staged: RefCell<Option<T>> = RefCell::new(None);

        let attempts = self.transact(std::slice::from_ref(key), config, |tx| {
            let current = tx.get(key)?;
            let (next, report) = f(current.as_ref())?;

            let mut batch = Batch::new();
            match next {
                Some(value) => batch.set(key.clone(), value),
                None => batch.delete(key.clone()),
            };
            *staged.borrow_mut() = Some(report);
            Ok(batch)
        })?;

        let value = staged
            .into_inner()
            .ok_or_else(|| Error::Internal("commit reported without a staged value".to_string()))?;
        Ok(Committed { value, attempts })
    }

    fn config_with(&self, max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            ..self.config.clone()
        }
    }
}
