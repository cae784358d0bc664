//! Error types for the simulation core.
//!
//! Nothing in here is raised from a per-tick update: pool exhaustion is logged
//! and dropped by the managers, and config errors only surface at start-up.

use std::path::PathBuf;

use thiserror::Error;

/// A pooled allocation could not be satisfied.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("{pool} pool exhausted (capacity {capacity})")]
    Exhausted { pool: &'static str, capacity: usize },
}

/// Tunables could not be loaded or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tunable `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
