//! Integration tests for the migration run orchestration.
//!
//! Runs the real discovery, execution and tracking logic against a
//! temporary migrations tree and an in-memory tracking store.

mod common;

use std::path::Path;

use assert_matches::assert_matches;

use archon_core::hashing::file_sha256;
use archon_migrate::error::{ExecutionError, MigrateError, ResetError};
use archon_migrate::executor::MigrationOutcome;
use archon_migrate::runner::{FileStatus, RunOptions, RunSummary, Runner};

use common::{write_migration, MemoryStore, FAIL_MARKER};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn options(root: &Path, fresh: bool) -> RunOptions {
    RunOptions {
        migrations_dir: root.to_path_buf(),
        fresh,
    }
}

async fn run(store: &MemoryStore, root: &Path, fresh: bool) -> Result<RunSummary, MigrateError> {
    Runner::new(store.clone(), options(root, fresh)).run().await
}

fn executed(store: &MemoryStore) -> Vec<String> {
    store
        .state()
        .executed()
        .into_iter()
        .map(|line| line.trim_start_matches("-- ").to_string())
        .collect()
}

fn scenario_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_migration(dir.path(), "0.1.0/002_add_table.sql", "CREATE TABLE b (id int);");
    write_migration(dir.path(), "complete_setup.sql", "CREATE TABLE a (id int);");
    write_migration(dir.path(), "0.1.0/001_init.sql", "CREATE TABLE c (id int);");
    dir
}

// ---------------------------------------------------------------------------
// Ordering and idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_database_applies_files_in_order() {
    let dir = scenario_tree();
    let store = MemoryStore::new();

    let summary = run(&store, dir.path(), false).await.expect("run");

    assert_eq!(
        executed(&store),
        vec![
            "complete_setup.sql",
            "0.1.0/001_init.sql",
            "0.1.0/002_add_table.sql",
        ]
    );
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.succeeded, 3);
    assert!(summary.is_success());
    assert!(summary.notified);

    let state = store.state();
    assert_eq!(state.records.len(), 3);
    assert!(state
        .records
        .contains_key(&("base".to_string(), "complete_setup.sql".to_string())));
    assert!(state
        .records
        .contains_key(&("0.1.0".to_string(), "002_add_table.sql".to_string())));
    assert_eq!(state.count("notify"), 1);
}

#[tokio::test]
async fn second_run_skips_everything() {
    let dir = scenario_tree();
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("first run");
    store.state().events.clear();

    let summary = run(&store, dir.path(), false).await.expect("second run");

    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.is_success());
    assert!(!summary.notified);
    assert!(executed(&store).is_empty());
    assert_eq!(store.state().count("notify"), 0);
}

#[tokio::test]
async fn changed_file_is_not_rerun_but_reported_as_drift() {
    let dir = scenario_tree();
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("first run");
    store.state().events.clear();

    write_migration(dir.path(), "0.1.0/001_init.sql", "CREATE TABLE c (id bigint);");
    let summary = run(&store, dir.path(), false).await.expect("second run");

    assert!(executed(&store).is_empty());
    assert_eq!(summary.drifted, 1);
    assert_matches!(
        summary.outcomes[1].outcome,
        MigrationOutcome::Skipped { drifted: true }
    );

    let current = file_sha256(&dir.path().join("0.1.0/001_init.sql")).expect("hash");
    let state = store.state();
    let record = &state.records[&("0.1.0".to_string(), "001_init.sql".to_string())];
    assert_ne!(record.checksum.as_deref(), Some(current.as_str()));
}

#[tokio::test]
async fn removed_file_is_simply_not_considered() {
    let dir = scenario_tree();
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("first run");

    std::fs::remove_file(dir.path().join("0.1.0/001_init.sql")).expect("remove");
    let summary = run(&store, dir.path(), false).await.expect("second run");

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.skipped, 2);
    assert!(summary.is_success());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_file_does_not_stop_later_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_migration(dir.path(), "0.1.0/001_ok.sql", "SELECT 1;");
    write_migration(dir.path(), "0.1.0/002_broken.sql", FAIL_MARKER);
    write_migration(dir.path(), "0.1.0/003_ok.sql", "SELECT 3;");
    let store = MemoryStore::new();

    let summary = run(&store, dir.path(), false).await.expect("run");

    assert_eq!(
        executed(&store),
        vec!["0.1.0/001_ok.sql", "0.1.0/002_broken.sql", "0.1.0/003_ok.sql"]
    );
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());
    assert!(summary.notified);

    match &summary.outcomes[1].outcome {
        MigrationOutcome::Failed(err) => {
            assert!(err.to_string().contains("syntax error at or near \"FAIL\""));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let state = store.state();
    assert!(!state
        .records
        .contains_key(&("0.1.0".to_string(), "002_broken.sql".to_string())));
}

#[tokio::test]
async fn failed_file_is_retried_on_next_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_migration(dir.path(), "0.1.0/001_broken.sql", FAIL_MARKER);
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("first run");

    write_migration(dir.path(), "0.1.0/001_broken.sql", "SELECT 1;");
    let summary = run(&store, dir.path(), false).await.expect("second run");

    assert_eq!(summary.succeeded, 1);
    assert!(summary.is_success());
}

#[tokio::test]
async fn files_sharing_a_tracking_key_fail_instead_of_skipping() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_migration(dir.path(), "legacy/add_index.sql", "CREATE INDEX a ON t (a);");
    write_migration(dir.path(), "extras/add_index.sql", "CREATE INDEX b ON t (b);");
    let store = MemoryStore::new();

    let summary = run(&store, dir.path(), false).await.expect("run");

    assert_eq!(executed(&store), vec!["extras/add_index.sql"]);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());

    assert_matches!(
        &summary.outcomes[1].outcome,
        MigrationOutcome::Failed(ExecutionError::DuplicateKey { version, name, first })
            if version == "base"
                && name == "add_index.sql"
                && first.ends_with("extras/add_index.sql")
    );
}

#[tokio::test]
async fn tracking_table_failure_aborts_and_closes() {
    let dir = scenario_tree();
    let store = MemoryStore::new();
    store.state().fail_ensure_table = true;

    let err = run(&store, dir.path(), false).await.unwrap_err();

    assert_matches!(err, MigrateError::Schema(_));
    assert!(executed(&store).is_empty());
    assert_eq!(store.state().events.last().map(String::as_str), Some("close"));
}

// ---------------------------------------------------------------------------
// Empty trees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_directory_succeeds_without_notification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = MemoryStore::new();

    let summary = run(&store, dir.path(), false).await.expect("run");

    assert_eq!(summary.discovered, 0);
    assert!(summary.is_success());
    assert!(!summary.notified);
    assert_eq!(store.state().count("close"), 1);
}

#[tokio::test]
async fn missing_directory_is_treated_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = MemoryStore::new();

    let summary = run(&store, &dir.path().join("nope"), false)
        .await
        .expect("run");

    assert_eq!(summary.discovered, 0);
    assert!(summary.is_success());
}

// ---------------------------------------------------------------------------
// Utility scripts and fresh installs
// ---------------------------------------------------------------------------

fn tree_with_utilities() -> tempfile::TempDir {
    let dir = scenario_tree();
    write_migration(dir.path(), "RESET_DB.sql", "DROP SCHEMA public CASCADE;");
    write_migration(dir.path(), "backup_database.sql", "SELECT 'backup';");
    dir
}

#[tokio::test]
async fn normal_run_never_executes_utility_scripts() {
    let dir = tree_with_utilities();
    let store = MemoryStore::new();

    run(&store, dir.path(), false).await.expect("run");

    let executed = executed(&store);
    assert!(!executed.iter().any(|f| f == "RESET_DB.sql"));
    assert!(!executed.iter().any(|f| f == "backup_database.sql"));
    assert_eq!(executed.len(), 3);
}

#[tokio::test]
async fn fresh_run_resets_first_and_exactly_once() {
    let dir = tree_with_utilities();
    let store = MemoryStore::new();

    let summary = run(&store, dir.path(), true).await.expect("run");

    let state = store.state();
    assert_eq!(state.events[0], "exec:-- RESET_DB.sql");
    assert_eq!(state.events[1], "drop_table");
    assert_eq!(state.events[2], "ensure_table");
    drop(state);

    let executed = executed(&store);
    assert_eq!(executed.iter().filter(|f| *f == "RESET_DB.sql").count(), 1);
    assert!(executed.iter().any(|f| f == "backup_database.sql"));
    assert_eq!(summary.discovered, 4);
    assert!(summary.is_success());
}

#[tokio::test]
async fn fresh_run_after_normal_run_reapplies_everything() {
    let dir = tree_with_utilities();
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("normal run");
    store.state().events.clear();

    let summary = run(&store, dir.path(), true).await.expect("fresh run");

    assert_eq!(
        executed(&store),
        vec![
            "RESET_DB.sql",
            "complete_setup.sql",
            "0.1.0/001_init.sql",
            "0.1.0/002_add_table.sql",
            "backup_database.sql",
        ]
    );
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded, 4);
    assert!(summary.notified);
}

#[tokio::test]
async fn fresh_run_without_reset_script_fails_fast() {
    let dir = scenario_tree();
    let store = MemoryStore::new();

    let err = run(&store, dir.path(), true).await.unwrap_err();

    assert_matches!(err, MigrateError::Reset(ResetError::Missing(_)));
    let state = store.state();
    assert_eq!(state.events, vec!["close".to_string()]);
}

// ---------------------------------------------------------------------------
// Status report
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_applied_pending_and_drifted() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_migration(dir.path(), "0.1.0/001_init.sql", "SELECT 1;");
    write_migration(dir.path(), "0.1.0/002_next.sql", "SELECT 2;");
    let store = MemoryStore::new();
    run(&store, dir.path(), false).await.expect("first run");

    write_migration(dir.path(), "0.1.0/002_next.sql", "SELECT 22;");
    write_migration(dir.path(), "0.1.0/003_new.sql", "SELECT 3;");
    store.state().events.clear();

    let entries = Runner::new(store.clone(), options(dir.path(), false))
        .status()
        .await
        .expect("status");

    let statuses: Vec<(&str, FileStatus)> = entries
        .iter()
        .map(|e| (e.file.name.as_str(), e.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("001_init.sql", FileStatus::Applied),
            ("002_next.sql", FileStatus::Drifted),
            ("003_new.sql", FileStatus::Pending),
        ]
    );
    assert!(executed(&store).is_empty());
}

#[tokio::test]
async fn status_lookup_failure_is_a_lookup_error() {
    let dir = scenario_tree();
    let store = MemoryStore::new();
    store.state().fail_find = true;

    let err = Runner::new(store.clone(), options(dir.path(), false))
        .status()
        .await
        .unwrap_err();

    assert_matches!(err, MigrateError::Lookup(_));
    assert!(err.to_string().starts_with("Failed to look up tracking record"));
    assert_eq!(store.state().events.last().map(String::as_str), Some("close"));
}
