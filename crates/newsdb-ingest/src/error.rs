use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} exceeds {limit} bytes")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("feed parse error: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("database error: {0}")]
    Db(#[from] newsdb_db::DbError),
}
