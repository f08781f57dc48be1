//! Retry bounds for optimistic transactions

use serde::Deserialize;
use std::time::Duration;
use tally_core::{millis_ceil, Error, Result};

/// How long the coordinator keeps retrying a contended transaction
///
/// Only optimistic-lock conflicts are retried. There is no delay between
/// attempts; contention is resolved by attempt count, optionally capped by a
/// wall-clock deadline across all attempts.
///
/// Deserializes from TOML:
///
/// ```toml
/// max_attempts = 100
/// deadline_ms = 250
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts allowed per invocation (must be at least 1)
    pub max_attempts: u32,

    /// Wall-clock bound across all attempts, in milliseconds
    pub deadline_ms: Option<u64>,
}

impl RetryConfig {
    /// Matches the worker count of the classic 100-goroutine counter race
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

    /// Config with the given attempt bound and no deadline
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            deadline_ms: None,
        }
    }

    /// Set the attempt bound
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Bound total wall-clock time across attempts
    ///
    /// Sub-millisecond parts round up, so any non-zero deadline stays non-zero.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(millis_ceil(deadline));
        self
    }

    /// Deadline as a duration, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Reject bounds that would never allow an attempt
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.deadline_ms == Some(0) {
            return Err(Error::InvalidArgument(
                "deadline must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}
