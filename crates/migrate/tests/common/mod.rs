//! In-memory [`TrackingStore`] and migration tree helpers shared by the
//! runner tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use archon_db::models::migration::MigrationRecord;
use archon_migrate::error::StoreError;
use archon_migrate::store::TrackingStore;

/// Scripts containing this marker fail when executed.
pub const FAIL_MARKER: &str = "-- FAIL";

/// Everything the fake database saw, in order.
#[derive(Debug, Default)]
pub struct StoreState {
    pub table_exists: bool,
    pub records: BTreeMap<(String, String), MigrationRecord>,
    /// `ensure_table`, `drop_table`, `exec:<first line>`,
    /// `record:<version>/<name>`, `notify`, `close`.
    pub events: Vec<String>,
    pub fail_ensure_table: bool,
    pub fail_find: bool,
}

impl StoreState {
    pub fn executed(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix("exec:").map(str::to_string))
            .collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

/// Fake store sharing its state with the test through an `Arc`, since the
/// runner consumes the store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store state lock")
    }
}

fn protocol_error(msg: &str) -> StoreError {
    sqlx::Error::Protocol(msg.to_string()).into()
}

impl TrackingStore for MemoryStore {
    async fn ensure_tracking_table(&mut self) -> Result<(), StoreError> {
        let mut state = self.state();
        state.events.push("ensure_table".into());
        if state.fail_ensure_table {
            return Err(protocol_error("permission denied for schema public"));
        }
        state.table_exists = true;
        Ok(())
    }

    async fn drop_tracking_table(&mut self) -> Result<(), StoreError> {
        let mut state = self.state();
        state.events.push("drop_table".into());
        state.table_exists = false;
        state.records.clear();
        Ok(())
    }

    async fn find(
        &mut self,
        version: &str,
        name: &str,
    ) -> Result<Option<MigrationRecord>, StoreError> {
        let state = self.state();
        if state.fail_find {
            return Err(protocol_error("canceling statement due to statement timeout"));
        }
        if !state.table_exists {
            return Err(protocol_error("relation \"archon_migrations\" does not exist"));
        }
        Ok(state
            .records
            .get(&(version.to_string(), name.to_string()))
            .cloned())
    }

    async fn execute_script(&mut self, sql: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        let first_line = sql.lines().next().unwrap_or_default().to_string();
        state.events.push(format!("exec:{first_line}"));
        if sql.contains(FAIL_MARKER) {
            return Err(protocol_error("syntax error at or near \"FAIL\""));
        }
        Ok(())
    }

    async fn record_applied(
        &mut self,
        version: &str,
        name: &str,
        checksum: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        if !state.table_exists {
            return Err(protocol_error("relation \"archon_migrations\" does not exist"));
        }
        state.events.push(format!("record:{version}/{name}"));
        let key = (version.to_string(), name.to_string());
        let id = state
            .records
            .get(&key)
            .map(|r| r.id)
            .unwrap_or_else(uuid::Uuid::new_v4);
        state.records.insert(
            key,
            MigrationRecord {
                id,
                version: version.to_string(),
                migration_name: name.to_string(),
                applied_at: chrono::Utc::now(),
                checksum: Some(checksum.to_string()),
            },
        );
        Ok(())
    }

    async fn notify_schema_reload(&mut self) -> Result<(), StoreError> {
        self.state().events.push("notify".into());
        Ok(())
    }

    async fn close(self) -> Result<(), StoreError> {
        self.state().events.push("close".into());
        Ok(())
    }
}

/// Write a migration file whose first line identifies it in the event log.
pub fn write_migration(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create migration dir");
    }
    std::fs::write(path, format!("-- {relative}\n{body}\n")).expect("write migration");
}
