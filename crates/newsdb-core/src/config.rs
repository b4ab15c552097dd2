use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_INGEST_CRON: &str = "0 */30 * * * *";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("NEWSDB_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "NEWSDB_BIND_ADDR",
        &or_default("NEWSDB_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("NEWSDB_LOG_LEVEL", "info");
    let feeds_path = PathBuf::from(or_default("NEWSDB_FEEDS_PATH", "./config/feeds.yaml"));

    let db_max_connections: u32 = parse_as(
        "NEWSDB_DB_MAX_CONNECTIONS",
        &or_default("NEWSDB_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "NEWSDB_DB_MIN_CONNECTIONS",
        &or_default("NEWSDB_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "NEWSDB_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("NEWSDB_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let fetch_timeout_secs: u64 = parse_as(
        "NEWSDB_FETCH_TIMEOUT_SECS",
        &or_default("NEWSDB_FETCH_TIMEOUT_SECS", "15"),
    )?;
    let user_agent = or_default("NEWSDB_USER_AGENT", "newsdb/0.1 (feed-ingest)");
    let max_concurrent_feeds: usize = parse_as(
        "NEWSDB_MAX_CONCURRENT_FEEDS",
        &or_default("NEWSDB_MAX_CONCURRENT_FEEDS", "1"),
    )?;
    let max_feed_bytes: usize = parse_as(
        "NEWSDB_MAX_FEED_BYTES",
        &or_default("NEWSDB_MAX_FEED_BYTES", "10485760"),
    )?;
    let fetch_max_retries: u32 = parse_as(
        "NEWSDB_FETCH_MAX_RETRIES",
        &or_default("NEWSDB_FETCH_MAX_RETRIES", "2"),
    )?;
    let fetch_retry_backoff_base_secs: u64 = parse_as(
        "NEWSDB_FETCH_RETRY_BACKOFF_BASE_SECS",
        &or_default("NEWSDB_FETCH_RETRY_BACKOFF_BASE_SECS", "2"),
    )?;

    let ingest_cron = parse_ingest_cron(&or_default("NEWSDB_INGEST_CRON", DEFAULT_INGEST_CRON));

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        feeds_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        user_agent,
        max_concurrent_feeds,
        max_feed_bytes,
        fetch_max_retries,
        fetch_retry_backoff_base_secs,
        ingest_cron,
    })
}

/// Parse a raw env-var value, reporting the variable name on failure.
fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEWSDB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// `off` (any case) or a blank value disables scheduled ingestion.
fn parse_ingest_cron(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
