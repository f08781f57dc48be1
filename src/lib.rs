//! # Tally
//!
//! Watch-based optimistic counters over a key-value store.
//!
//! A caller reads a key under a watch, computes the new value locally and
//! commits it only if nobody else changed the key in between. A lost race
//! is retried with a fresh read, up to a bounded number of attempts.
//!
//! ## Quick Start
//!
//! ```
//! use tally::prelude::*;
//!
//! let db = Tally::ephemeral();
//!
//! // Optimistic increment
//! assert_eq!(db.incr("watch_count")?, 1);
//!
//! // Arbitrary pure update
//! db.update("score", |current| {
//!     let n = Value::counter(current)?;
//!     Ok(Some(Value::Int(n + 10)))
//! })?;
//!
//! // 100 workers racing on one key
//! let report = db.race("counter3", 100)?;
//! assert!(report.all_committed());
//! assert_eq!(db.get_int("counter3")?, 100);
//! # Ok::<(), tally::Error>(())
//! ```
//!
//! ## Layers
//!
//! - [`tally_core`] - keys, values, staged batches, errors
//! - [`tally_storage`] - the store client contract and an in-process store
//! - [`tally_concurrency`] - the coordinator and its retry loop

#![warn(missing_docs)]

mod database;

pub mod prelude;

pub use database::{Tally, TallyBuilder};

pub use tally_concurrency::{
    fan_out, Committed, Coordinator, CoordinatorMetrics, FanOutReport, RetryConfig,
};
pub use tally_core::{Batch, Command, CommitOutcome, Error, Key, Result, Value};
pub use tally_storage::{
    FaultInjector, FaultKind, MemoryStore, MemoryStoreConfig, StoreClient, StoreStats, TxBody,
    TxHandle,
};

pub use tally_concurrency;
pub use tally_core;
pub use tally_storage;
