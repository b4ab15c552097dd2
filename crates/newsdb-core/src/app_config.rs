use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub feeds_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_feeds: usize,
    pub max_feed_bytes: usize,
    pub fetch_max_retries: u32,
    pub fetch_retry_backoff_base_secs: u64,
    /// Cron expression for scheduled ingestion; `None` disables the job.
    pub ingest_cron: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("feeds_path", &self.feeds_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_feeds", &self.max_concurrent_feeds)
            .field("max_feed_bytes", &self.max_feed_bytes)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field(
                "fetch_retry_backoff_base_secs",
                &self.fetch_retry_backoff_base_secs,
            )
            .field("ingest_cron", &self.ingest_cron)
            .finish()
    }
}
