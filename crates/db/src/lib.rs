//! Postgres access for the migration runner.
//!
//! The runner works over a single [`PgConnection`] rather than a pool:
//! files execute one after another and no transaction spans two files.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

pub mod models;
pub mod repositories;

/// Connection settings for the target database.
///
/// Defaults match the local development database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` applied to every statement.
    pub statement_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 54322,
            database: "postgres".into(),
            user: "postgres".into(),
            password: "postgres".into(),
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(300),
        }
    }
}

impl DbConfig {
    /// Build sqlx connect options from this configuration.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .options([(
                "statement_timeout",
                format!("{}ms", self.statement_timeout.as_millis()),
            )])
    }
}

/// Errors from [`connect`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Timed out after {0:?} connecting to the database")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Open a single connection, bounded by `config.connect_timeout`.
///
/// Statements on the returned connection run outside any explicit
/// transaction, so each one commits on its own.
pub async fn connect(config: &DbConfig) -> Result<PgConnection, ConnectError> {
    let options = config.connect_options();
    let conn = tokio::time::timeout(config.connect_timeout, PgConnection::connect_with(&options))
        .await
        .map_err(|_| ConnectError::Timeout(config.connect_timeout))??;

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Connected to database",
    );
    Ok(conn)
}
