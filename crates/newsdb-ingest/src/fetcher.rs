use newsdb_core::FeedSource;
use reqwest::{Client, Response, StatusCode};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::parse::parse_feed;
use crate::retry::retry_with_backoff;
use crate::types::RawEntry;

const FEED_ACCEPT: &str =
    "application/rss+xml, application/rdf+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

/// Retrieves one feed and parses it into raw entries.
///
/// 429 responses and network failures are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    max_feed_bytes: usize,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FeedFetcher {
    #[must_use]
    pub fn new(client: Client, config: &IngestConfig) -> Self {
        Self {
            client,
            max_feed_bytes: config.max_feed_bytes,
            max_retries: config.fetch_max_retries,
            backoff_base_secs: config.fetch_retry_backoff_base_secs,
        }
    }

    /// Fetch and parse `source`. An unreachable or malformed feed is logged
    /// and yields no entries, so one bad source never aborts a run.
    pub async fn fetch(&self, source: &FeedSource) -> Vec<RawEntry> {
        match self.try_fetch(source).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(feed_url = %source.url, error = %e, "feed source unavailable, skipping");
                Vec::new()
            }
        }
    }

    /// Like [`FeedFetcher::fetch`] but returns the failure.
    ///
    /// # Errors
    ///
    /// - [`IngestError::RateLimited`] / [`IngestError::Http`] after retries run out.
    /// - [`IngestError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`IngestError::ResponseTooLarge`] when the body exceeds the byte limit.
    /// - [`IngestError::Xml`] / [`IngestError::Feed`] when the body does not parse.
    pub async fn try_fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>, IngestError> {
        let url = source.url.as_str();
        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_body(url)
        })
        .await?;
        parse_feed(&body)
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, FEED_ACCEPT)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(IngestError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        read_body_limited(response, url, self.max_feed_bytes).await
    }
}

/// Read a response body, failing as soon as it grows past `limit` bytes.
pub(crate) async fn read_body_limited(
    mut response: Response,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, IngestError> {
    let too_large = || IngestError::ResponseTooLarge {
        url: url.to_owned(),
        limit,
    };

    let declared_limit = u64::try_from(limit).unwrap_or(u64::MAX);
    if response
        .content_length()
        .is_some_and(|len| len > declared_limit)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
