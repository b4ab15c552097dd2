//! Feed body parsing into [`RawEntry`] values.
//!
//! RSS 2.0 and RSS 1.0 documents are walked directly with `quick-xml` so the
//! publication date keeps its raw string form. Anything else (Atom,
//! JSON Feed) goes through `feed-rs`.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::IngestError;
use crate::types::{Enclosure, RawEntry};

/// Parse a feed document into raw entries.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] for malformed RSS and [`IngestError::Feed`]
/// when `feed-rs` cannot recognise the document.
pub fn parse_feed(body: &[u8]) -> Result<Vec<RawEntry>, IngestError> {
    let xml = String::from_utf8_lossy(body);
    match root_element(&xml)?.as_deref() {
        Some("rss" | "rdf:RDF") => parse_rss_items(&xml),
        _ => parse_with_feed_rs(body),
    }
}

fn root_element(xml: &str) -> Result<Option<String>, IngestError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => return Ok(Some(qualified_name(&e))),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Published,
}

impl Field {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "link" => Some(Self::Link),
            "description" => Some(Self::Summary),
            "pubDate" | "dc:date" => Some(Self::Published),
            _ => None,
        }
    }

    /// First value wins, so `pubDate` takes precedence over a later `dc:date`.
    fn assign(self, entry: &mut RawEntry, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let slot = match self {
            Self::Title => &mut entry.title,
            Self::Link => &mut entry.link,
            Self::Summary => &mut entry.summary,
            Self::Published => &mut entry.published,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
}

fn parse_rss_items(xml: &str) -> Result<Vec<RawEntry>, IngestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    // Open field and the tag that opened it, so nested markup inside a
    // description does not close it early.
    let mut open: Option<(Field, String)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = qualified_name(&e);
                if name == "item" {
                    current = Some(RawEntry::default());
                    open = None;
                    text.clear();
                    continue;
                }
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                collect_media(entry, &name, &e);
                if open.is_none() {
                    if let Some(field) = Field::from_tag(&name) {
                        open = Some((field, name));
                        text.clear();
                    }
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    collect_media(entry, &qualified_name(&e), &e);
                }
            }
            Event::Text(e) => {
                if open.is_some() {
                    let chunk = e.unescape().map_or_else(
                        |_| String::from_utf8_lossy(&e).into_owned(),
                        Cow::into_owned,
                    );
                    push_chunk(&mut text, &chunk);
                }
            }
            Event::CData(e) => {
                if open.is_some() {
                    push_chunk(&mut text, &String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    open = None;
                    continue;
                }
                if matches!(&open, Some((_, tag)) if *tag == name) {
                    if let (Some((field, _)), Some(entry)) = (open.take(), current.as_mut()) {
                        field.assign(entry, &text);
                    }
                    text.clear();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn push_chunk(text: &mut String, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(chunk);
}

fn collect_media(entry: &mut RawEntry, name: &str, e: &BytesStart<'_>) {
    match name {
        "media:content" => {
            if let Some(url) = attr(e, "url") {
                entry.media_content.push(url);
            }
        }
        "enclosure" => {
            if let Some(href) = attr(e, "url") {
                entry.enclosures.push(Enclosure {
                    href,
                    content_type: attr(e, "type"),
                });
            }
        }
        _ => {}
    }
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}

fn parse_with_feed_rs(body: &[u8]) -> Result<Vec<RawEntry>, IngestError> {
    let feed = feed_rs::parser::parse(body)?;
    Ok(feed.entries.into_iter().map(raw_entry_from_model).collect())
}

fn raw_entry_from_model(entry: feed_rs::model::Entry) -> RawEntry {
    let (enclosure_links, page_links): (Vec<_>, Vec<_>) = entry
        .links
        .into_iter()
        .partition(|l| l.rel.as_deref() == Some("enclosure"));

    let link = page_links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| page_links.first())
        .map(|l| l.href.clone());

    let enclosures = enclosure_links
        .into_iter()
        .map(|l| Enclosure {
            href: l.href,
            content_type: l.media_type,
        })
        .collect();

    let media_content = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|c| c.url.as_ref().map(ToString::to_string))
        .collect();

    RawEntry {
        title: entry.title.map(|t| t.content),
        summary: entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body)),
        link,
        published: entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc2822()),
        media_content,
        enclosures,
    }
}
