use crate::types::{ExtractedFields, ImageSources, RawEntry};

/// Map a raw entry onto candidate fields. Missing values default to the empty
/// string; extraction itself never fails.
///
/// Image material is carried forward untouched; [`crate::ImageResolver`]
/// picks from it, falling back to the page scrape.
#[must_use]
pub fn extract(entry: RawEntry) -> ExtractedFields {
    ExtractedFields {
        title: trimmed_or_empty(entry.title),
        description: trimmed_or_empty(entry.summary),
        link: trimmed_or_empty(entry.link),
        images: ImageSources {
            media_content: entry.media_content,
            enclosures: entry.enclosures,
        },
        published: trimmed_or_empty(entry.published),
    }
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
