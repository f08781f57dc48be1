//! Error types for Tally
//!
//! One error enum covers every layer. Store clients produce the transient
//! variants, the coordinator produces the contention variants, and caller
//! input problems surface as [`Error::InvalidArgument`] before any store
//! traffic happens.
//!
//! | Variant | Produced by | Retried by the coordinator |
//! |---------|-------------|----------------------------|
//! | InvalidArgument | coordinator, before the first attempt | no |
//! | StoreUnavailable | store client | no |
//! | Timeout | store client | no |
//! | RetriesExhausted | coordinator | n/a (terminal) |
//! | DeadlineExceeded | coordinator | n/a (terminal) |
//! | WrongType | value coercion | no |
//! | Overflow | counter arithmetic | no |
//! | Internal | anywhere | no |

use std::time::Duration;
use thiserror::Error;

/// All Tally errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed caller input; no attempt was made
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A store operation did not complete in time
    #[error("store timeout: {0}")]
    Timeout(String),

    /// Every allowed attempt lost its optimistic lock
    #[error("optimistic transaction on '{key}' aborted {attempts} times in a row")]
    RetriesExhausted {
        /// First watched key
        key: String,
        /// Attempts made, all of them aborted
        attempts: u32,
    },

    /// The wall-clock bound across all attempts ran out
    #[error("deadline of {deadline:?} exceeded after {attempts} attempts")]
    DeadlineExceeded {
        /// Configured bound
        deadline: Duration,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// Stored value has the wrong type for the operation
    #[error("wrong type: expected {expected}, got {actual}")]
    WrongType {
        /// Expected type
        expected: &'static str,
        /// Actual type found
        actual: &'static str,
    },

    /// Counter arithmetic left the i64 range
    #[error("integer overflow on '{0}'")]
    Overflow(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for Tally operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Infrastructure failure that may clear up on its own
    ///
    /// The coordinator never retries these; a caller may.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_) | Error::Timeout(_))
    }

    /// Contention could not be resolved within the configured bounds
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            Error::RetriesExhausted { .. } | Error::DeadlineExceeded { .. }
        )
    }

    /// Caller input was rejected before touching the store
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}
