//! View models for the entry list and the menu.
//!
//! Rendering is split in two: the functions here turn registry data into
//! plain structs, and the `ui` widgets draw those structs. Everything a
//! reader sees on screen is decided here, so tests check these values
//! rather than terminal buffers.

use chrono::{DateTime, Utc};

use crate::registry::{Entry, EntryStatus, FeedDescriptor};
use crate::util::{html_to_text, strip_control_chars, truncate_to_width};

/// Longest preview kept per entry, in terminal columns.
const PREVIEW_WIDTH: usize = 280;

/// One rendered entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub title: String,
    /// Activation target; matched exactly against registry links.
    pub link: String,
    /// Plain-text excerpt of the entry body.
    pub preview: String,
    pub published: Option<i64>,
    pub status: EntryStatus,
}

impl EntryItem {
    pub fn is_read(&self) -> bool {
        self.status == EntryStatus::Read
    }
}

/// The rendered entry list for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    /// Header text: the feed's name.
    pub title: String,
    pub entries: Vec<EntryItem>,
}

impl FeedView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One row of the feed list in the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRow {
    /// Registry position; selecting the row jumps here.
    pub index: usize,
    pub name: String,
    pub favorite: bool,
    /// `None` until the feed has loaded once.
    pub unread: Option<usize>,
}

/// Render a feed's entries, in feed order.
pub fn render_entries(name: &str, entries: &[Entry]) -> FeedView {
    FeedView {
        title: strip_control_chars(name).into_owned(),
        entries: entries.iter().map(render_entry).collect(),
    }
}

fn render_entry(entry: &Entry) -> EntryItem {
    let text = html_to_text(&entry.content);
    EntryItem {
        title: strip_control_chars(&entry.title).into_owned(),
        link: entry.link.clone(),
        preview: truncate_to_width(&text, PREVIEW_WIDTH).into_owned(),
        published: entry.published,
        status: entry.status,
    }
}

pub fn render_feed_row(index: usize, feed: &FeedDescriptor) -> FeedRow {
    FeedRow {
        index,
        name: strip_control_chars(&feed.name).into_owned(),
        favorite: feed.is_favorite(),
        unread: feed.unread_count(),
    }
}

/// Format a timestamp relative to now ("5m", "3h", "2d", or "Nov 14").
pub fn format_relative_time(timestamp: Option<i64>) -> String {
    format_relative_time_at(timestamp, Utc::now().timestamp())
}

fn format_relative_time_at(timestamp: Option<i64>, now: i64) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let diff = now - ts;

    // Future dates (malformed feeds)
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}
