use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One configured feed: where to fetch it and which category its items get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl FeedSource {
    #[must_use]
    pub fn new(url: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            url: url.into(),
            category: normalize_category(category),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedsFile {
    pub feeds: Vec<FeedSource>,
}

/// Load and validate the feed list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_feeds(path: &Path) -> Result<FeedsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_feeds(&content)
}

/// Parse and validate a feed list from YAML text.
///
/// URLs are trimmed and blank categories become `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_feeds(content: &str) -> Result<FeedsFile, ConfigError> {
    let mut feeds_file: FeedsFile = serde_yaml::from_str(content)?;

    for feed in &mut feeds_file.feeds {
        feed.url = feed.url.trim().to_string();
        feed.category = normalize_category(feed.category.as_deref());
    }

    validate_feeds(&feeds_file)?;
    Ok(feeds_file)
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned)
}

fn validate_feeds(feeds_file: &FeedsFile) -> Result<(), ConfigError> {
    let mut seen_urls = HashSet::new();

    for feed in &feeds_file.feeds {
        if feed.url.is_empty() {
            return Err(ConfigError::Validation(
                "feed url must be non-empty".to_string(),
            ));
        }

        let lower = feed.url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "feed url '{}' must use http or https",
                feed.url
            )));
        }

        if !seen_urls.insert(lower) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed url: '{}'",
                feed.url
            )));
        }
    }

    Ok(())
}
