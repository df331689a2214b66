//! Tracking-store seam between the runner and the database.
//!
//! [`TrackingStore`] is what the runner needs from Postgres. The
//! production implementation, [`PgTrackingStore`], owns the run's single
//! connection, delegates to [`MigrationRepo`] and bounds every call with a
//! client-side timeout.

use std::future::Future;
use std::time::Duration;

use archon_db::models::migration::MigrationRecord;
use archon_db::repositories::MigrationRepo;
use sqlx::{Connection, PgConnection};

use crate::error::StoreError;

/// Slack on top of the server-side `statement_timeout` before the client
/// gives up on an unresponsive server.
pub const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Persistence operations used by a migration run.
pub trait TrackingStore: Send {
    /// Create the tracking table and indexes if absent.
    fn ensure_tracking_table(&mut self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Drop the tracking table, forgetting every applied file.
    fn drop_tracking_table(&mut self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Look up the record for a `(version, name)` pair.
    fn find(
        &mut self,
        version: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<MigrationRecord>, StoreError>> + Send;

    /// Execute a whole migration file.
    fn execute_script(&mut self, sql: &str)
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Upsert the record for a successfully applied file.
    fn record_applied(
        &mut self,
        version: &str,
        name: &str,
        checksum: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Signal downstream services that the schema changed.
    fn notify_schema_reload(&mut self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Release the underlying connection.
    fn close(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// [`TrackingStore`] over a live Postgres connection.
pub struct PgTrackingStore {
    conn: PgConnection,
    timeout: Duration,
}

impl PgTrackingStore {
    /// `statement_timeout` is the server-side limit configured on `conn`;
    /// calls are abandoned [`CLIENT_TIMEOUT_MARGIN`] after it.
    pub fn new(conn: PgConnection, statement_timeout: Duration) -> Self {
        Self {
            conn,
            timeout: statement_timeout + CLIENT_TIMEOUT_MARGIN,
        }
    }
}

/// Await `call`, failing with [`StoreError::Timeout`] once `limit` passes.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_elapsed) => Err(StoreError::Timeout(limit)),
    }
}

impl TrackingStore for PgTrackingStore {
    async fn ensure_tracking_table(&mut self) -> Result<(), StoreError> {
        bounded(self.timeout, MigrationRepo::ensure_table(&mut self.conn)).await
    }

    async fn drop_tracking_table(&mut self) -> Result<(), StoreError> {
        bounded(self.timeout, MigrationRepo::drop_table(&mut self.conn)).await
    }

    async fn find(
        &mut self,
        version: &str,
        name: &str,
    ) -> Result<Option<MigrationRecord>, StoreError> {
        bounded(self.timeout, MigrationRepo::find(&mut self.conn, version, name)).await
    }

    async fn execute_script(&mut self, sql: &str) -> Result<(), StoreError> {
        bounded(self.timeout, MigrationRepo::execute_script(&mut self.conn, sql)).await
    }

    async fn record_applied(
        &mut self,
        version: &str,
        name: &str,
        checksum: &str,
    ) -> Result<(), StoreError> {
        bounded(
            self.timeout,
            MigrationRepo::record_applied(&mut self.conn, version, name, checksum),
        )
        .await
        .map(|_| ())
    }

    async fn notify_schema_reload(&mut self) -> Result<(), StoreError> {
        bounded(self.timeout, MigrationRepo::notify_schema_reload(&mut self.conn)).await
    }

    async fn close(self) -> Result<(), StoreError> {
        bounded(self.timeout, self.conn.close()).await
    }
}
