//! Destructive reset for fresh installs.

use std::path::Path;

use archon_core::discovery::RESET_FILE;

use crate::error::ResetError;
use crate::store::TrackingStore;

/// Run `RESET_DB.sql` from `root`, wiping existing schema, then drop the
/// tracking table so every migration is applied again.
///
/// Must run before the tracking table is created. A missing script fails
/// before anything is sent to the database.
pub async fn execute_reset<S: TrackingStore>(store: &mut S, root: &Path) -> Result<(), ResetError> {
    let path = root.join(RESET_FILE);
    if !path.is_file() {
        return Err(ResetError::Missing(path));
    }

    let sql = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ResetError::Read {
            path: path.clone(),
            source,
        })?;

    tracing::warn!(path = %path.display(), "Fresh install requested, resetting database");
    store
        .execute_script(&sql)
        .await
        .map_err(ResetError::Database)?;

    store
        .drop_tracking_table()
        .await
        .map_err(ResetError::Tracking)?;

    tracing::info!("Database reset complete");
    Ok(())
}
