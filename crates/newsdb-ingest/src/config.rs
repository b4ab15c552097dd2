use std::time::Duration;

use reqwest::Client;

use crate::error::IngestError;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_USER_AGENT: &str = "newsdb/0.1 (feed-ingest)";
const DEFAULT_MAX_FEED_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_FETCH_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;
const MAX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Network and concurrency settings for an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Per-request timeout for feed and article page fetches.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Sources fetched ahead concurrently. `0` is treated as `1`.
    pub max_concurrent_feeds: usize,
    /// Upper bound on a feed or article page body.
    pub max_feed_bytes: usize,
    pub fetch_max_retries: u32,
    pub fetch_retry_backoff_base_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent_feeds: 1,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
            fetch_max_retries: DEFAULT_FETCH_MAX_RETRIES,
            fetch_retry_backoff_base_secs: DEFAULT_BACKOFF_BASE_SECS,
        }
    }
}

impl IngestConfig {
    #[must_use]
    pub fn from_app_config(config: &newsdb_core::AppConfig) -> Self {
        Self {
            fetch_timeout_secs: config.fetch_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_concurrent_feeds: config.max_concurrent_feeds,
            max_feed_bytes: config.max_feed_bytes,
            fetch_max_retries: config.fetch_max_retries,
            fetch_retry_backoff_base_secs: config.fetch_retry_backoff_base_secs,
        }
    }

    /// One client shared by the feed fetcher and the image resolver.
    pub(crate) fn build_client(&self) -> Result<Client, IngestError> {
        let timeout = Duration::from_secs(self.fetch_timeout_secs);
        let connect_timeout =
            Duration::from_secs(self.fetch_timeout_secs.min(MAX_CONNECT_TIMEOUT_SECS));
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(self.user_agent.as_str())
            .build()?;
        Ok(client)
    }
}
