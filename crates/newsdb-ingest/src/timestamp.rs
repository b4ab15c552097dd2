//! Publication date normalization.

use chrono::{DateTime, Utc};

/// RFC 822 style date as written by most RSS 2.0 feeds,
/// e.g. `Tue, 10 Jun 2025 14:30:00 +0200`.
const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Parse a feed date into a UTC instant, or `None` if no supported format
/// matches.
///
/// Tries the strict RSS format first, then the looser RFC 2822 grammar
/// (single-digit days, `GMT`/`EST` zone names), then RFC 3339 for
/// `dc:date` and Atom values.
#[must_use]
pub fn parse_published(published: &str) -> Option<DateTime<Utc>> {
    let trimmed = published.trim();
    if trimmed.is_empty() {
        return None;
    }

    DateTime::parse_from_str(trimmed, RSS_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc2822(trimmed))
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize a feed date, falling back to the current time when the value is
/// empty or unparseable. Never fails.
#[must_use]
pub fn normalize(published: &str) -> DateTime<Utc> {
    parse_published(published).unwrap_or_else(|| {
        if !published.trim().is_empty() {
            tracing::debug!(published, "unparseable publication date; using current time");
        }
        Utc::now()
    })
}
