//! Preview image resolution.
//!
//! Strategies run cheapest first and stop at the first hit: `media:content`,
//! then an image enclosure, then an `og:image` tag scraped from the article
//! page.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::IngestError;
use crate::fetcher::read_body_limited;
use crate::types::{ExtractedFields, ImageSources};

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attr regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    /// First `media:content` URL of the entry.
    MediaContent,
    /// First enclosure whose MIME type is `image/*`.
    ImageEnclosure,
    /// `og:image` meta tag on the linked page.
    PageMetaTag,
}

pub const IMAGE_STRATEGIES: [ImageStrategy; 3] = [
    ImageStrategy::MediaContent,
    ImageStrategy::ImageEnclosure,
    ImageStrategy::PageMetaTag,
];

/// `(attribute, value)` pairs identifying the page image, in lookup order.
pub const OG_IMAGE_LOOKUPS: [(&str, &str); 2] = [("property", "og:image"), ("name", "og:image")];

impl ImageStrategy {
    /// Image available from the feed itself. Always `None` for
    /// [`ImageStrategy::PageMetaTag`], which needs a network call.
    #[must_use]
    pub fn feed_value(self, sources: &ImageSources) -> Option<String> {
        match self {
            Self::MediaContent => sources.media_content.first().cloned(),
            Self::ImageEnclosure => sources
                .enclosures
                .iter()
                .find(|e| is_image_type(e.content_type.as_deref()))
                .map(|e| e.href.clone()),
            Self::PageMetaTag => None,
        }
    }
}

/// The feed-native image of an entry, if any.
#[must_use]
pub fn feed_image(sources: &ImageSources) -> Option<String> {
    IMAGE_STRATEGIES
        .iter()
        .find_map(|strategy| {
            strategy
                .feed_value(sources)
                .filter(|url| !url.trim().is_empty())
        })
}

fn is_image_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|t| t.trim().to_ascii_lowercase().starts_with("image"))
}

/// Runs the image fallback chain. Holds the client used by the page tier.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    max_page_bytes: usize,
}

impl ImageResolver {
    #[must_use]
    pub fn new(client: reqwest::Client, max_page_bytes: usize) -> Self {
        Self {
            client,
            max_page_bytes,
        }
    }

    /// Walk [`IMAGE_STRATEGIES`] in order and return the first image found.
    /// Only [`ImageStrategy::PageMetaTag`] touches the network, so an entry
    /// with a feed image never triggers a page fetch.
    pub async fn resolve(&self, fields: &ExtractedFields) -> Option<String> {
        for strategy in IMAGE_STRATEGIES {
            let found = match strategy {
                ImageStrategy::MediaContent | ImageStrategy::ImageEnclosure => {
                    strategy.feed_value(&fields.images)
                }
                ImageStrategy::PageMetaTag => self.page_image(&fields.link).await,
            };
            if let Some(image) = found.filter(|i| !i.trim().is_empty()) {
                tracing::trace!(link = %fields.link, ?strategy, "image resolved");
                return Some(image);
            }
        }
        None
    }

    /// One best-effort fetch of `link` looking for an `og:image` tag.
    /// Failures are logged and yield `None`.
    async fn page_image(&self, link: &str) -> Option<String> {
        if link.trim().is_empty() {
            return None;
        }

        match self.fetch_page_image(link).await {
            Ok(Some(image)) => Some(image),
            Ok(None) => {
                tracing::debug!(link, "no og:image meta tag on page");
                None
            }
            Err(e) => {
                tracing::warn!(link, error = %e, "image resolution failed");
                None
            }
        }
    }

    async fn fetch_page_image(&self, link: &str) -> Result<Option<String>, IngestError> {
        let response = self
            .client
            .get(link)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: link.to_string(),
            });
        }

        let body = read_body_limited(response, link, self.max_page_bytes).await?;
        Ok(extract_og_image(link, &String::from_utf8_lossy(&body)))
    }
}

/// Find the page image in `html`, trying each of [`OG_IMAGE_LOOKUPS`] in
/// order over the whole document. Relative URLs are resolved against
/// `page_url`.
#[must_use]
pub fn extract_og_image(page_url: &str, html: &str) -> Option<String> {
    OG_IMAGE_LOOKUPS
        .iter()
        .find_map(|(attr, value)| find_meta_content(html, attr, value))
        .map(|raw| absolutize_url(page_url, &raw))
}

fn find_meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if !key.eq_ignore_ascii_case(key_value) {
            return None;
        }
        extract_attr(tag, "content").filter(|content| !content.is_empty())
    })
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    ATTR_RE.captures_iter(tag).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(attr) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim().to_string())
    })
}

fn absolutize_url(base_url: &str, candidate: &str) -> String {
    let candidate = candidate.replace("&amp;", "&");
    if reqwest::Url::parse(&candidate).is_ok() {
        return candidate;
    }
    reqwest::Url::parse(base_url)
        .and_then(|base| base.join(&candidate))
        .map_or(candidate, |url| url.to_string())
}
