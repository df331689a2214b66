//! Per-file skip/execute decision and outcome recording.
//!
//! A file is skipped whenever the tracking table already holds its
//! `(version, name)` pair. A changed checksum only produces a drift
//! warning. Failed files are not recorded, so the next run retries them.

use std::time::Instant;

use archon_core::discovery::MigrationFile;
use archon_core::hashing::sha256_hex;

use crate::error::ExecutionError;
use crate::store::TrackingStore;

/// Result of handling one migration file.
#[derive(Debug)]
pub enum MigrationOutcome {
    /// Already applied. `drifted` is set when the file changed since.
    Skipped { drifted: bool },
    Succeeded { duration_ms: u64 },
    Failed(ExecutionError),
}

/// Apply `file` unless it is already tracked.
pub async fn apply_file<S: TrackingStore>(store: &mut S, file: &MigrationFile) -> MigrationOutcome {
    let sql = match tokio::fs::read_to_string(&file.path).await {
        Ok(sql) => sql,
        Err(source) => {
            let err = ExecutionError::Read {
                path: file.path.clone(),
                source,
            };
            tracing::error!(version = %file.version, migration = %file.name, error = %err, "Failed to read migration");
            return MigrationOutcome::Failed(err);
        }
    };
    let checksum = sha256_hex(sql.as_bytes());

    match store.find(&file.version, &file.name).await {
        Ok(Some(record)) => {
            let drifted = record.has_drifted(&checksum);
            if drifted {
                tracing::warn!(
                    version = %file.version,
                    migration = %file.name,
                    recorded = record.checksum.as_deref().unwrap_or_default(),
                    current = %checksum,
                    "Migration changed since it was applied; not re-running",
                );
            } else {
                tracing::info!(version = %file.version, migration = %file.name, "Skipping, already applied");
            }
            return MigrationOutcome::Skipped { drifted };
        }
        Ok(None) => {}
        Err(e) => {
            let err = ExecutionError::Lookup(e);
            tracing::error!(version = %file.version, migration = %file.name, error = %err, "Tracking lookup failed");
            return MigrationOutcome::Failed(err);
        }
    }

    tracing::info!(version = %file.version, migration = %file.name, "Executing migration");
    let start = Instant::now();

    if let Err(e) = store.execute_script(&sql).await {
        let err = ExecutionError::Database(e);
        tracing::error!(version = %file.version, migration = %file.name, error = %err, "Migration failed");
        return MigrationOutcome::Failed(err);
    }
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Err(e) = store
        .record_applied(&file.version, &file.name, &checksum)
        .await
    {
        let err = ExecutionError::Record(e);
        tracing::error!(version = %file.version, migration = %file.name, error = %err, "Failed to record migration");
        return MigrationOutcome::Failed(err);
    }

    tracing::info!(version = %file.version, migration = %file.name, duration_ms, "Migration applied");
    MigrationOutcome::Succeeded { duration_ms }
}
