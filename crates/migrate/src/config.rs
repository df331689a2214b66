use std::time::Duration;

use archon_db::DbConfig;

/// An environment variable holds a value that cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be a valid {expected}, got {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Load database settings from environment variables with defaults.
///
/// | Env Var                     | Default     |
/// |-----------------------------|-------------|
/// | `DB_HOST`                   | `localhost` |
/// | `DB_PORT`                   | `54322`     |
/// | `DB_NAME`                   | `postgres`  |
/// | `DB_USER`                   | `postgres`  |
/// | `DB_PASSWORD`               | `postgres`  |
/// | `DB_CONNECT_TIMEOUT_SECS`   | `10`        |
/// | `DB_STATEMENT_TIMEOUT_SECS` | `300`       |
pub fn db_config_from_env() -> Result<DbConfig, ConfigError> {
    db_config_from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`db_config_from_env`], reading variables through `lookup`.
pub fn db_config_from_lookup<F>(lookup: F) -> Result<DbConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = DbConfig::default();

    let port = match lookup("DB_PORT") {
        Some(value) => parse(&value, "DB_PORT", "u16")?,
        None => defaults.port,
    };
    let connect_timeout = match lookup("DB_CONNECT_TIMEOUT_SECS") {
        Some(value) => Duration::from_secs(parse(&value, "DB_CONNECT_TIMEOUT_SECS", "u64")?),
        None => defaults.connect_timeout,
    };
    let statement_timeout = match lookup("DB_STATEMENT_TIMEOUT_SECS") {
        Some(value) => Duration::from_secs(parse(&value, "DB_STATEMENT_TIMEOUT_SECS", "u64")?),
        None => defaults.statement_timeout,
    };

    Ok(DbConfig {
        host: lookup("DB_HOST").unwrap_or(defaults.host),
        port,
        database: lookup("DB_NAME").unwrap_or(defaults.database),
        user: lookup("DB_USER").unwrap_or(defaults.user),
        password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
        connect_timeout,
        statement_timeout,
    })
}

fn parse<T: std::str::FromStr>(
    value: &str,
    var: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        var,
        expected,
        value: value.to_string(),
    })
}
