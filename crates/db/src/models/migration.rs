//! Rows of the `archon_migrations` tracking table.

use archon_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A migration file that has been applied successfully.
///
/// Unique on `(version, migration_name)`.
#[derive(Debug, Clone, FromRow)]
pub struct MigrationRecord {
    pub id: Uuid,
    pub version: String,
    pub migration_name: String,
    pub applied_at: Timestamp,
    /// SHA-256 of the file when it was applied. `NULL` for rows written by
    /// older tooling that did not record checksums.
    pub checksum: Option<String>,
}

impl MigrationRecord {
    /// Whether the file content has changed since it was applied.
    ///
    /// Rows without a stored checksum never count as drifted.
    pub fn has_drifted(&self, current_checksum: &str) -> bool {
        self.checksum
            .as_deref()
            .is_some_and(|stored| stored != current_checksum)
    }
}
