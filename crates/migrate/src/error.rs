//! Error taxonomy of a migration run.
//!
//! [`MigrateError`] aborts the whole run. [`ExecutionError`] belongs to a
//! single file and never stops the loop.

use std::path::PathBuf;
use std::time::Duration;

use archon_db::ConnectError;

use crate::config::ConfigError;

/// Fatal errors: the run stops and the process exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to database: {0}")]
    Connection(#[from] ConnectError),

    #[error("Failed to prepare tracking table: {0}")]
    Schema(#[source] StoreError),

    #[error("Failed to look up tracking record: {0}")]
    Lookup(#[source] StoreError),

    #[error("Fresh install aborted: {0}")]
    Reset(#[from] ResetError),
}

/// Failures of the destructive reset step in fresh mode.
#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("Reset script not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Reset script failed: {0}")]
    Database(#[source] StoreError),

    #[error("Failed to drop tracking table: {0}")]
    Tracking(#[source] StoreError),
}

/// Failure of a single migration file.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to look up tracking record: {0}")]
    Lookup(#[source] StoreError),

    #[error("{0}")]
    Database(#[source] StoreError),

    #[error("Migration applied but not recorded: {0}")]
    Record(#[source] StoreError),

    #[error(
        "Tracking key {version}/{name} is already used by {}; rename one of the files",
        first.display()
    )]
    DuplicateKey {
        version: String,
        name: String,
        first: PathBuf,
    },
}

/// Failure of a single tracking-store call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Database did not respond within {0:?}")]
    Timeout(Duration),
}
