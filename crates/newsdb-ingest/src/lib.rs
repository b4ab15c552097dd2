pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod fetcher;
pub mod image;
pub mod parse;
mod retry;
pub mod runner;
pub mod sanitize;
pub mod store;
pub mod timestamp;
pub mod types;

pub use config::IngestConfig;
pub use error::IngestError;
pub use events::{EventSink, IngestEvent, NoopSink, TracingSink};
pub use extract::extract;
pub use fetcher::FeedFetcher;
pub use image::{
    extract_og_image, feed_image, ImageResolver, ImageStrategy, IMAGE_STRATEGIES, OG_IMAGE_LOOKUPS,
};
pub use parse::parse_feed;
pub use runner::{IngestionRunner, PreparedBatch};
pub use sanitize::sanitize;
pub use store::NewsStore;
pub use timestamp::{normalize, parse_published};
pub use types::{Enclosure, ExtractedFields, ImageSources, IngestReport, RawEntry};
