use chrono::{DateTime, Utc};
use newsdb_core::NewsCandidate;

/// An entry exactly as the feed exposed it. Every field is optional because
/// real feeds omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Publication date string as written in the feed (`pubDate`, `dc:date`).
    pub published: Option<String>,
    /// URLs of `media:content` elements, in document order.
    pub media_content: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub href: String,
    pub content_type: Option<String>,
}

/// Output of field extraction: everything except the resolved image and the
/// normalized timestamp, which later stages fill in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Image URLs the feed itself offers for this entry.
    pub images: ImageSources,
    pub published: String,
}

/// Feed-native image material of one entry, consumed by the
/// [`crate::ImageResolver`] strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSources {
    pub media_content: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

impl ExtractedFields {
    /// Image available without a network call (media, then image
    /// enclosure), if any.
    #[must_use]
    pub fn feed_image(&self) -> Option<String> {
        crate::image::feed_image(&self.images)
    }

    /// Finish the candidate. An empty description becomes `None`.
    #[must_use]
    pub fn into_candidate(
        self,
        image: Option<String>,
        published_at: DateTime<Utc>,
        category: Option<String>,
    ) -> NewsCandidate {
        NewsCandidate {
            title: self.title,
            description: Some(self.description).filter(|d| !d.is_empty()),
            link: self.link,
            image: image.filter(|i| !i.is_empty()),
            published_at,
            category: category.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Per-run tallies returned by [`crate::IngestionRunner::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Sources processed, including those that yielded nothing.
    pub sources: usize,
    /// Raw entries parsed across all sources.
    pub entries: usize,
    /// Candidates handed to the store.
    pub attempted: usize,
    pub inserted: usize,
    /// Candidates whose link was already stored.
    pub duplicates: usize,
    /// Candidates the store rejected with an error.
    pub failed: usize,
    /// Candidates dropped before the store because their link was empty.
    pub skipped: usize,
}
