use anyhow::Result;
use feed_rs::parser;
use sha2::{Digest, Sha256};

/// One item as returned by the feed-fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEntry {
    pub title: String,
    /// Always non-empty: the item's link, else its id, else a content hash.
    pub link: String,
    /// Raw body (usually HTML); empty when the item carries none.
    pub content: String,
    pub published: Option<i64>,
}

/// Parse an RSS or Atom document into entries, preserving document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FetchedEntry>> {
    let feed = parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| t.content)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let published = entry.published.or(entry.updated).map(|dt| dt.timestamp());
            let content = entry
                .content
                .and_then(|c| c.body)
                .or_else(|| entry.summary.map(|s| s.content))
                .unwrap_or_default();

            let href = entry
                .links
                .first()
                .map(|l| l.href.trim())
                .filter(|h| !h.is_empty());
            let id = Some(entry.id.trim()).filter(|id| !id.is_empty());
            let link = match href.or(id) {
                Some(key) => key.to_string(),
                None => synthesize_link(&title, published),
            };

            FetchedEntry {
                title,
                link,
                content,
                published,
            }
        })
        .collect();

    Ok(entries)
}

/// Stable key for items that carry neither a link nor an id.
fn synthesize_link(title: &str, published: Option<i64>) -> String {
    let input = format!(
        "{}|{}",
        title,
        published.map(|p| p.to_string()).unwrap_or_default()
    );
    format!("urn:sha256:{:x}", Sha256::digest(input.as_bytes()))
}
