//! Convenient imports for Tally.
//!
//! ```
//! use tally::prelude::*;
//!
//! let db = Tally::ephemeral();
//! db.incr("key")?;
//! # Ok::<(), tally::Error>(())
//! ```

// Main entry point
pub use crate::database::{Tally, TallyBuilder};

// Error handling
pub use tally_core::{Error, Result};

// Core types
pub use tally_core::{Batch, Key, Value};

// Coordinator
pub use tally_concurrency::{Committed, RetryConfig};

// Store contract
pub use tally_storage::{MemoryStore, StoreClient};
