//! Shared fixtures for newsdb-ingest integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Mutex;

use newsdb_core::NewsCandidate;
use newsdb_db::{DbError, InsertOutcome};
use newsdb_ingest::{EventSink, IngestConfig, IngestEvent, NewsStore};

/// In-memory store keyed by `link` with insert-or-ignore semantics.
///
/// Links longer than `max_link_len` are rejected, mimicking the column limit.
pub struct MemoryStore {
    rows: Mutex<Vec<NewsCandidate>>,
    max_link_len: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_max_link_len(2048)
    }
}

impl MemoryStore {
    pub fn with_max_link_len(max_link_len: usize) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            max_link_len,
        }
    }

    pub fn rows(&self) -> Vec<NewsCandidate> {
        self.rows.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, link: &str) -> Option<NewsCandidate> {
        self.rows().into_iter().find(|r| r.link == link)
    }

    fn insert(&self, item: &NewsCandidate) -> Result<InsertOutcome, DbError> {
        if item.link.len() > self.max_link_len {
            return Err(DbError::Sqlx(sqlx::Error::Protocol(format!(
                "value too long for link ({} chars)",
                item.link.len()
            ))));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.link == item.link) {
            return Ok(InsertOutcome::Duplicate);
        }
        rows.push(item.clone());
        Ok(InsertOutcome::Inserted(i64::try_from(rows.len()).unwrap()))
    }
}

impl NewsStore for MemoryStore {
    fn insert_news(
        &self,
        item: &NewsCandidate,
    ) -> impl Future<Output = Result<InsertOutcome, DbError>> + Send {
        let result = self.insert(item);
        async move { result }
    }
}

/// Store whose first `failures` inserts fail with `error()`; later inserts
/// go to an inner [`MemoryStore`].
pub struct FlakyStore {
    inner: MemoryStore,
    failures: Mutex<usize>,
    error: fn() -> sqlx::Error,
}

impl FlakyStore {
    /// Drops the connection on the first `failures` inserts.
    pub fn connection_resets(failures: usize) -> Self {
        Self {
            inner: MemoryStore::default(),
            failures: Mutex::new(failures),
            error: || {
                sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ))
            },
        }
    }

    /// Every insert reports a closed pool.
    pub fn closed() -> Self {
        Self {
            inner: MemoryStore::default(),
            failures: Mutex::new(usize::MAX),
            error: || sqlx::Error::PoolClosed,
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn insert(&self, item: &NewsCandidate) -> Result<InsertOutcome, DbError> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(DbError::Sqlx((self.error)()));
            }
        }
        self.inner.insert(item)
    }
}

impl NewsStore for FlakyStore {
    fn insert_news(
        &self,
        item: &NewsCandidate,
    ) -> impl Future<Output = Result<InsertOutcome, DbError>> + Send {
        let result = self.insert(item);
        async move { result }
    }
}

/// Sink that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<IngestEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<IngestEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: IngestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Short timeouts, no retries, no backoff.
pub fn test_config() -> IngestConfig {
    IngestConfig {
        fetch_timeout_secs: 5,
        user_agent: "newsdb-test/0.1".to_string(),
        fetch_max_retries: 0,
        fetch_retry_backoff_base_secs: 0,
        ..IngestConfig::default()
    }
}

/// An RSS 2.0 item. `image` becomes a `media:content` element.
pub struct Item<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: Option<&'a str>,
    pub pub_date: Option<&'a str>,
    pub image: Option<&'a str>,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, link: &'a str) -> Self {
        Self {
            title,
            link,
            description: None,
            pub_date: None,
            image: None,
        }
    }
}

pub fn rss(items: &[Item<'_>]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
<channel><title>Test feed</title><link>https://example.com/</link>
"#,
    );
    for item in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{}</title>", item.title));
        body.push_str(&format!("<link>{}</link>", item.link));
        if let Some(description) = item.description {
            body.push_str(&format!("<description>{description}</description>"));
        }
        if let Some(pub_date) = item.pub_date {
            body.push_str(&format!("<pubDate>{pub_date}</pubDate>"));
        }
        if let Some(image) = item.image {
            body.push_str(&format!(r#"<media:content url="{image}" medium="image"/>"#));
        }
        body.push_str("</item>\n");
    }
    body.push_str("</channel></rss>");
    body
}

pub fn page_with_og_image(image: &str) -> String {
    format!(
        r#"<!doctype html><html><head>
<meta charset="utf-8">
<meta property="og:image" content="{image}">
<title>Article</title></head><body>Article</body></html>"#
    )
}
