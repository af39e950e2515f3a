//! OPML subscription lists as a registry seed.
//!
//! Any `<outline>` carrying an `xmlUrl` becomes a feed, wherever it sits in
//! the folder tree. The name comes from `title`, then `text`, then the URL.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use thiserror::Error;

use crate::registry::FeedSeed;
use crate::util::validate_url;

/// Outlines nested deeper than this are refused.
const MAX_OPML_DEPTH: usize = 50;

#[derive(Debug, Error)]
pub enum OpmlError {
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
    #[error("XML parse error: {0}")]
    XmlParse(String),
    #[error("Failed to read OPML file: {0}")]
    Io(#[from] std::io::Error),
}

/// Read an OPML file and return its feeds in document order.
///
/// Feeds whose `xmlUrl` fails [`validate_url`] are skipped with a warning.
pub async fn parse(path: &Path) -> Result<Vec<FeedSeed>, OpmlError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_opml_content(&content)
}

pub fn parse_opml_content(content: &str) -> Result<Vec<FeedSeed>, OpmlError> {
    // quick-xml 0.37 never expands DOCTYPE entity declarations; unknown
    // entities surface as attribute decode errors instead.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut feeds = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                depth += 1;
                if depth > MAX_OPML_DEPTH {
                    return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH));
                }
                if let Some(feed) = outline_to_seed(&e, &reader)? {
                    feeds.push(feed);
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"outline" => {
                if let Some(feed) = outline_to_seed(&e, &reader)? {
                    feeds.push(feed);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"outline" => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpmlError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(feeds = feeds.len(), "Parsed OPML subscription list");
    Ok(feeds)
}

fn outline_to_seed(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<Option<FeedSeed>, OpmlError> {
    let decoder = reader.decoder();
    let mut xml_url = None;
    let mut title = None;
    let mut text = None;

    for attr in e.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed OPML attribute");
                continue;
            }
        };
        let value = || {
            attr.decode_and_unescape_value(decoder)
                .map(|v| v.trim().to_string())
                .map_err(|err| OpmlError::XmlParse(err.to_string()))
        };
        match attr.key.as_ref() {
            b"xmlUrl" => xml_url = Some(value()?),
            b"title" => title = Some(value()?),
            b"text" => text = Some(value()?),
            _ => {}
        }
    }

    let Some(url) = xml_url.filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    if let Err(err) = validate_url(&url) {
        tracing::warn!(url = %url, error = %err, "Skipping invalid feed URL");
        return Ok(None);
    }

    let name = title
        .filter(|t| !t.is_empty())
        .or(text.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| url.clone());

    Ok(Some(FeedSeed::new(name, url)))
}
