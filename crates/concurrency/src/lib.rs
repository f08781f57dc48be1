//! Concurrency layer for Tally
//!
//! This crate implements watch-based optimistic concurrency control with:
//! - Coordinator: watch → read → compute → commit with bounded retry
//! - RetryConfig: attempt bound and optional wall-clock deadline
//! - CoordinatorMetrics: commit / conflict counters
//! - fan_out: N workers racing on one key, joined before reporting

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod fanout;
pub mod metrics;

pub use config::RetryConfig;
pub use coordinator::{Committed, Coordinator};
pub use fanout::{fan_out, FanOutReport};
pub use metrics::CoordinatorMetrics;
