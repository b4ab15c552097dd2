//! Integration tests for `FeedFetcher` against a local `wiremock` server.

mod common;

use newsdb_core::FeedSource;
use newsdb_ingest::{FeedFetcher, IngestConfig, IngestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{rss, test_config, Item};

fn fetcher(config: &IngestConfig) -> FeedFetcher {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .expect("client");
    FeedFetcher::new(client, config)
}

fn source(server: &MockServer, feed_path: &str) -> FeedSource {
    FeedSource::new(format!("{}{feed_path}", server.uri()), None)
}

#[tokio::test]
async fn fetch_returns_entries_for_valid_feed() {
    let server = MockServer::start().await;
    let body = rss(&[
        Item::new("One", "https://example.com/1"),
        Item::new("Two", "https://example.com/2"),
    ]);
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let entries = fetcher(&test_config())
        .fetch(&source(&server, "/feed.xml"))
        .await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title.as_deref(), Some("One"));
    assert_eq!(entries[1].link.as_deref(), Some("https://example.com/2"));
}

#[tokio::test]
async fn fetch_returns_empty_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(500))
        // one request from `fetch`, one from `try_fetch`
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher(&test_config());
    let src = source(&server, "/feed.xml");
    assert!(fetcher.fetch(&src).await.is_empty());

    let err = fetcher.try_fetch(&src).await.unwrap_err();
    assert!(
        matches!(err, IngestError::UnexpectedStatus { status: 500, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn fetch_returns_empty_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<rss><channel><item><title>x</link></item></channel></rss>"),
        )
        .mount(&server)
        .await;

    let entries = fetcher(&test_config())
        .fetch(&source(&server, "/feed.xml"))
        .await;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn fetch_returns_empty_when_host_is_unreachable() {
    let unreachable = FeedSource::new("http://127.0.0.1:9/feed.xml", None);
    let entries = fetcher(&test_config()).fetch(&unreachable).await;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn fetch_rejects_body_over_limit() {
    let server = MockServer::start().await;
    let body = rss(&[Item::new("Big", "https://example.com/big")]);
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let config = IngestConfig {
        max_feed_bytes: 32,
        ..test_config()
    };
    let fetcher = fetcher(&config);
    let src = source(&server, "/feed.xml");

    let err = fetcher.try_fetch(&src).await.unwrap_err();
    assert!(
        matches!(err, IngestError::ResponseTooLarge { limit: 32, .. }),
        "got {err:?}"
    );
    assert!(fetcher.fetch(&src).await.is_empty());
}

#[tokio::test]
async fn fetch_retries_after_429_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(&[Item::new("After retry", "https://example.com/r")])),
        )
        .mount(&server)
        .await;

    let config = IngestConfig {
        fetch_max_retries: 1,
        ..test_config()
    };
    let entries = fetcher(&config).fetch(&source(&server, "/feed.xml")).await;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title.as_deref(), Some("After retry"));
}

#[tokio::test]
async fn fetch_gives_up_after_exhausting_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let config = IngestConfig {
        fetch_max_retries: 1,
        ..test_config()
    };
    let err = fetcher(&config)
        .try_fetch(&source(&server, "/feed.xml"))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::RateLimited { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_parses_atom_feeds() {
    let server = MockServer::start().await;
    let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:example:feed</id>
  <updated>2025-06-10T12:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:example:1</id>
    <link href="https://example.com/atom-1"/>
    <updated>2025-06-10T12:00:00Z</updated>
  </entry>
</feed>"#;
    Mock::given(method("GET"))
        .and(path("/atom.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom))
        .mount(&server)
        .await;

    let entries = fetcher(&test_config())
        .fetch(&source(&server, "/atom.xml"))
        .await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].link.as_deref(), Some("https://example.com/atom-1"));
}
