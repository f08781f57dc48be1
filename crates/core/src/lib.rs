//! Core types for Tally
//!
//! This crate defines the vocabulary shared by every layer:
//! - Key / Value: what the store holds
//! - Command / Batch: writes staged for an atomic commit
//! - CommitOutcome: committed or aborted by a watch
//! - Error: the single error taxonomy
//! - millis_ceil: duration to millisecond settings without truncating to 0

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod time;
pub mod types;
pub mod value;

pub use command::{Batch, Command, CommitOutcome};
pub use error::{Error, Result};
pub use time::millis_ceil;
pub use types::Key;
pub use value::Value;
