//! Repository for the `archon_migrations` tracking table.
//!
//! Statements are issued one at a time on the caller's connection; none of
//! them open a transaction.

use sqlx::{Executor, PgConnection};

use crate::models::migration::MigrationRecord;

/// Column list for `archon_migrations` queries.
const COLUMNS: &str = "id, version, migration_name, applied_at, checksum";

/// Idempotent DDL for the tracking table and its lookup indexes.
const CREATE_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS archon_migrations (\
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
        version VARCHAR(20) NOT NULL, \
        migration_name VARCHAR(255) NOT NULL, \
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
        checksum VARCHAR(64), \
        UNIQUE (version, migration_name)\
    )",
    "CREATE INDEX IF NOT EXISTS idx_archon_migrations_version \
        ON archon_migrations (version)",
    "CREATE INDEX IF NOT EXISTS idx_archon_migrations_applied_at \
        ON archon_migrations (applied_at DESC)",
];

/// Channel PostgREST listens on for schema cache reloads.
pub const SCHEMA_RELOAD_CHANNEL: &str = "pgrst";

/// Payload asking PostgREST to reload its schema cache.
pub const SCHEMA_RELOAD_PAYLOAD: &str = "reload schema";

/// Provides access to the migration tracking table.
pub struct MigrationRepo;

impl MigrationRepo {
    /// Create the tracking table and indexes if they do not exist yet.
    pub async fn ensure_table(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        for statement in CREATE_STATEMENTS {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Find the record for a `(version, name)` pair.
    pub async fn find(
        conn: &mut PgConnection,
        version: &str,
        migration_name: &str,
    ) -> Result<Option<MigrationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM archon_migrations \
             WHERE version = $1 AND migration_name = $2"
        );
        sqlx::query_as::<_, MigrationRecord>(&query)
            .bind(version)
            .bind(migration_name)
            .fetch_optional(conn)
            .await
    }

    /// List all records in application order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<MigrationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM archon_migrations \
             ORDER BY applied_at, version, migration_name"
        );
        sqlx::query_as::<_, MigrationRecord>(&query)
            .fetch_all(conn)
            .await
    }

    /// Record a successful application, refreshing checksum and timestamp
    /// if the pair was already tracked.
    pub async fn record_applied(
        conn: &mut PgConnection,
        version: &str,
        migration_name: &str,
        checksum: &str,
    ) -> Result<MigrationRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO archon_migrations (version, migration_name, checksum) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (version, migration_name) DO UPDATE SET \
                checksum = EXCLUDED.checksum, \
                applied_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MigrationRecord>(&query)
            .bind(version)
            .bind(migration_name)
            .bind(checksum)
            .fetch_one(conn)
            .await
    }

    /// Run the contents of a migration file as one simple-protocol batch.
    ///
    /// Postgres wraps a multi-statement batch in an implicit transaction, so
    /// a failing file leaves nothing behind, while earlier files stay
    /// committed.
    pub async fn execute_script(conn: &mut PgConnection, sql: &str) -> Result<(), sqlx::Error> {
        conn.execute(sql).await?;
        Ok(())
    }

    /// Drop the tracking table so a fresh install re-applies every file.
    pub async fn drop_table(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DROP TABLE IF EXISTS archon_migrations")
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Ask downstream services to reload their schema cache.
    pub async fn notify_schema_reload(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(SCHEMA_RELOAD_CHANNEL)
            .bind(SCHEMA_RELOAD_PAYLOAD)
            .execute(conn)
            .await?;
        Ok(())
    }
}
