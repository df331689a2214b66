//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Apply Archon database migrations.
///
/// Database settings come from `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`
/// and `DB_PASSWORD`.
#[derive(Parser, Debug)]
#[command(name = "archon-migrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Wipe the database with RESET_DB.sql, then apply every migration
    #[arg(long, conflicts_with = "status")]
    pub fresh: bool,

    /// Show applied, pending and drifted migrations without executing any
    #[arg(long)]
    pub status: bool,

    /// Directory holding the migration files
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "migration")]
    pub dir: PathBuf,
}
