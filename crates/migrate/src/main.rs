//! `archon-migrate` -- applies Archon database migrations.
//!
//! Discovers the SQL files under the migrations directory, executes the
//! ones not yet recorded in `archon_migrations`, and asks PostgREST to
//! reload its schema cache when anything was applied.
//!
//! # Environment variables
//!
//! | Variable                    | Default     | Description                     |
//! |-----------------------------|-------------|---------------------------------|
//! | `DB_HOST`                   | `localhost` | Database host                   |
//! | `DB_PORT`                   | `54322`     | Database port                   |
//! | `DB_NAME`                   | `postgres`  | Database name                   |
//! | `DB_USER`                   | `postgres`  | Database user                   |
//! | `DB_PASSWORD`               | `postgres`  | Database password               |
//! | `DB_CONNECT_TIMEOUT_SECS`   | `10`        | Connection timeout              |
//! | `DB_STATEMENT_TIMEOUT_SECS` | `300`       | Per-statement timeout           |
//! | `MIGRATIONS_DIR`            | `migration` | Root of the migrations tree     |
//!
//! Exits 0 when no migration failed and 1 otherwise.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use archon_migrate::cli::Cli;
use archon_migrate::config::db_config_from_env;
use archon_migrate::error::MigrateError;
use archon_migrate::runner::{FileStatus, RunOptions, Runner, StatusEntry};
use archon_migrate::store::PgTrackingStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Scoped to this thread for the duration of the run; nothing is
    // installed process-wide.
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archon_migrate=info,archon_db=info,archon_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer());
    let _log_guard = tracing::subscriber::set_default(subscriber);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Migration run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, MigrateError> {
    let config = db_config_from_env()?;
    let conn = archon_db::connect(&config).await?;

    let runner = Runner::new(
        PgTrackingStore::new(conn, config.statement_timeout),
        RunOptions {
            migrations_dir: cli.dir,
            fresh: cli.fresh,
        },
    );

    if cli.status {
        print_status(&runner.status().await?);
        return Ok(ExitCode::SUCCESS);
    }

    let summary = runner.run().await?;
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_status(entries: &[StatusEntry]) {
    if entries.is_empty() {
        println!("No migration files found");
        return;
    }
    for entry in entries {
        let label = match entry.status {
            FileStatus::Applied => "applied".green(),
            FileStatus::Pending => "pending".yellow(),
            FileStatus::Drifted => "drifted".red(),
        };
        println!("{label:>8}  {}/{}", entry.file.version, entry.file.name);
    }
}
