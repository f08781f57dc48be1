//! Storage layer for Tally
//!
//! This crate defines what the coordinator needs from a key-value store and
//! ships an in-process store that provides it:
//! - StoreClient / TxHandle: the watch + conditional commit contract
//! - MemoryStore: DashMap-backed store with versioned slots and a commit lock
//! - FaultInjector: scripted connectivity failures
//! - StoreStats: read / commit / abort counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod faults;
pub mod memory;
pub mod stats;
pub mod traits;

pub use faults::{FaultInjector, FaultKind};
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use stats::StoreStats;
pub use traits::{StoreClient, TxBody, TxHandle};
