//! Run orchestration.
//!
//! A [`Runner`] owns the tracking store for the lifetime of one run and
//! closes it on every exit path, whether the run succeeded, had failing
//! files, or aborted on a setup error.

use std::collections::HashMap;
use std::path::PathBuf;

use archon_core::discovery::{self, MigrationFile};
use archon_core::hashing::file_sha256;

use crate::error::{ExecutionError, MigrateError};
use crate::executor::{apply_file, MigrationOutcome};
use crate::reset::execute_reset;
use crate::store::TrackingStore;

/// What a run should do.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root of the migrations tree.
    pub migrations_dir: PathBuf,
    /// Reset the database and include utility scripts.
    pub fresh: bool,
}

/// Outcome of one file within a run.
#[derive(Debug)]
pub struct FileOutcome {
    pub version: String,
    pub name: String,
    pub outcome: MigrationOutcome,
}

/// Tally of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Skipped files whose content changed since they were applied.
    pub drifted: usize,
    /// Whether the schema-reload notification was sent.
    pub notified: bool,
    /// Per-file outcomes in execution order.
    pub outcomes: Vec<FileOutcome>,
}

impl RunSummary {
    /// A run succeeds when no file failed, however many were skipped.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, file: &MigrationFile, outcome: MigrationOutcome) {
        match &outcome {
            MigrationOutcome::Skipped { drifted } => {
                self.skipped += 1;
                if *drifted {
                    self.drifted += 1;
                }
            }
            MigrationOutcome::Succeeded { .. } => self.succeeded += 1,
            MigrationOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push(FileOutcome {
            version: file.version.clone(),
            name: file.name.clone(),
            outcome,
        });
    }
}

/// Tracking state of a discovered file, as shown by `--status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Applied,
    Pending,
    /// Applied, but the file changed since.
    Drifted,
}

/// One line of the `--status` report.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub file: MigrationFile,
    pub status: FileStatus,
}

/// Drives a migration run over a [`TrackingStore`].
pub struct Runner<S> {
    store: S,
    options: RunOptions,
}

impl<S: TrackingStore> Runner<S> {
    pub fn new(store: S, options: RunOptions) -> Self {
        Self { store, options }
    }

    /// Reset (fresh mode), prepare the tracking table, then apply every
    /// discovered file in order.
    ///
    /// Individual file failures are counted in the summary; only setup
    /// failures return `Err`.
    pub async fn run(mut self) -> Result<RunSummary, MigrateError> {
        let result = self.apply_all().await;
        self.close().await;
        result
    }

    /// Report which discovered files are applied, pending or drifted
    /// without executing anything.
    pub async fn status(mut self) -> Result<Vec<StatusEntry>, MigrateError> {
        let result = self.collect_status().await;
        self.close().await;
        result
    }

    async fn apply_all(&mut self) -> Result<RunSummary, MigrateError> {
        if self.options.fresh {
            execute_reset(&mut self.store, &self.options.migrations_dir).await?;
        }

        self.store
            .ensure_tracking_table()
            .await
            .map_err(MigrateError::Schema)?;
        tracing::info!("Migrations table ready");

        let files = self.discover();
        let mut summary = RunSummary {
            discovered: files.len(),
            ..RunSummary::default()
        };

        if files.is_empty() {
            tracing::info!("No migration files found");
            return Ok(summary);
        }
        tracing::info!(count = files.len(), "Found migration files");

        let mut claimed: HashMap<(&str, &str), &PathBuf> = HashMap::new();
        for file in &files {
            let key = (file.version.as_str(), file.name.as_str());
            let outcome = match claimed.get(&key) {
                Some(first) => {
                    let err = ExecutionError::DuplicateKey {
                        version: file.version.clone(),
                        name: file.name.clone(),
                        first: first.to_path_buf(),
                    };
                    tracing::error!(path = %file.path.display(), error = %err, "Migration not executed");
                    MigrationOutcome::Failed(err)
                }
                None => {
                    claimed.insert(key, &file.path);
                    apply_file(&mut self.store, file).await
                }
            };
            summary.record(file, outcome);
        }

        if summary.succeeded > 0 {
            match self.store.notify_schema_reload().await {
                Ok(()) => {
                    summary.notified = true;
                    tracing::info!("Requested PostgREST schema reload");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to request schema reload");
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            drifted = summary.drifted,
            "Migration summary",
        );
        Ok(summary)
    }

    async fn collect_status(&mut self) -> Result<Vec<StatusEntry>, MigrateError> {
        self.store
            .ensure_tracking_table()
            .await
            .map_err(MigrateError::Schema)?;

        let mut entries = Vec::new();
        for file in self.discover() {
            let record = self
                .store
                .find(&file.version, &file.name)
                .await
                .map_err(MigrateError::Lookup)?;

            let status = match record {
                None => FileStatus::Pending,
                Some(record) => match file_sha256(&file.path) {
                    Ok(checksum) if record.has_drifted(&checksum) => FileStatus::Drifted,
                    Ok(_) => FileStatus::Applied,
                    Err(e) => {
                        tracing::warn!(path = %file.path.display(), error = %e, "Cannot checksum migration");
                        FileStatus::Applied
                    }
                },
            };
            entries.push(StatusEntry { file, status });
        }
        Ok(entries)
    }

    /// Discovery errors are logged and treated as an empty directory.
    fn discover(&self) -> Vec<MigrationFile> {
        discovery::discover(&self.options.migrations_dir, self.options.fresh).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Migration discovery failed");
            Vec::new()
        })
    }

    async fn close(self) {
        match self.store.close().await {
            Ok(()) => tracing::info!("Database connection closed"),
            Err(e) => tracing::warn!(error = %e, "Error while closing database connection"),
        }
    }
}
