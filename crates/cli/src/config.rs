//! File and flag configuration.
//!
//! ```toml
//! [retry]
//! max_attempts = 100
//! deadline_ms = 500
//!
//! [store]
//! commit_delay_ms = 2
//! ```
//!
//! Flags override the file; the file overrides built-in defaults.

use std::path::Path;

use anyhow::Context;
use clap::ArgMatches;
use serde::Deserialize;
use tally::{MemoryStoreConfig, RetryConfig, Tally};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub retry: RetryConfig,
    pub store: MemoryStoreConfig,
}

impl CliConfig {
    /// Read a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load the `--config` file if given, then apply flag overrides.
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let mut config = match matches.get_one::<String>("config") {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };

        if let Some(attempts) = matches.get_one::<u32>("attempts") {
            config.retry.max_attempts = *attempts;
        }
        if let Some(deadline_ms) = matches.get_one::<u64>("deadline-ms") {
            config.retry.deadline_ms = Some(*deadline_ms);
        }
        if let Some(delay_ms) = matches.get_one::<u64>("commit-delay-ms") {
            config.store.commit_delay_ms = *delay_ms;
        }
        Ok(config)
    }

    /// Build an in-process Tally from this config.
    pub fn open(&self) -> anyhow::Result<Tally> {
        Tally::builder()
            .retry(self.retry.clone())
            .store_config(self.store.clone())
            .build()
            .context("Invalid retry settings")
    }
}
