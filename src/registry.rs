//! The feed registry: a fixed, ordered list of feed descriptors.
//!
//! A feed's identity is its position in the registry. The list is seeded
//! once at startup and never grows or shrinks afterwards; only a feed's
//! `favorite` flag and its lazily populated `entries` change.

use serde::Deserialize;
use thiserror::Error;

use crate::feed::FetchedEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No feeds configured")]
    Empty,
    #[error("Feed #{0} has an empty name")]
    EmptyName(usize),
    #[error("Feed #{0} has an empty URL")]
    EmptyUrl(usize),
}

/// Whether a feed is on the favorites shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteStatus {
    #[default]
    None,
    Favorite,
}

/// Read state of a single entry. Only ever moves from `Unread` to `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Unread,
    Read,
}

/// A name/URL pair used to seed the registry (config file, OPML, defaults).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSeed {
    pub name: String,
    pub url: String,
}

impl FeedSeed {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One item of a loaded feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    /// Key used to match link activations back to this entry.
    pub link: String,
    pub content: String,
    pub published: Option<i64>,
    pub status: EntryStatus,
}

impl From<FetchedEntry> for Entry {
    fn from(fetched: FetchedEntry) -> Self {
        Self {
            title: fetched.title,
            link: fetched.link,
            content: fetched.content,
            published: fetched.published,
            status: EntryStatus::Unread,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
    pub favorite: FavoriteStatus,
    /// `None` until the first successful load.
    pub entries: Option<Vec<Entry>>,
}

impl FeedDescriptor {
    pub fn is_favorite(&self) -> bool {
        self.favorite == FavoriteStatus::Favorite
    }

    /// Number of unread entries, or `None` if the feed has never loaded.
    pub fn unread_count(&self) -> Option<usize> {
        self.entries.as_ref().map(|entries| {
            entries
                .iter()
                .filter(|e| e.status == EntryStatus::Unread)
                .count()
        })
    }
}

/// The feeds shipped with the reader when nothing else is configured.
pub fn default_feeds() -> Vec<FeedSeed> {
    vec![
        FeedSeed::new(
            "Udacity Blog",
            "http://blog.udacity.com/feeds/posts/default?alt=rss",
        ),
        FeedSeed::new("CSS Tricks", "http://css-tricks.com/feed"),
        FeedSeed::new("HTML5 Rocks", "http://feeds.feedburner.com/html5rocks"),
        FeedSeed::new(
            "Linear Digressions",
            "http://feeds.feedburner.com/udacity-linear-digressions",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Vec<FeedDescriptor>,
}

impl FeedRegistry {
    /// Build the registry from its seeds.
    ///
    /// Every feed must have a non-empty name and URL (surrounding whitespace
    /// does not count), and at least one feed must be present.
    pub fn new(seeds: Vec<FeedSeed>) -> Result<Self, RegistryError> {
        if seeds.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut feeds = Vec::with_capacity(seeds.len());
        for (idx, seed) in seeds.into_iter().enumerate() {
            if seed.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(idx));
            }
            if seed.url.trim().is_empty() {
                return Err(RegistryError::EmptyUrl(idx));
            }
            feeds.push(FeedDescriptor {
                name: seed.name,
                url: seed.url,
                favorite: FavoriteStatus::None,
                entries: None,
            });
        }

        Ok(Self { feeds })
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Always false for a constructed registry; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FeedDescriptor> {
        self.feeds.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedDescriptor> {
        self.feeds.iter()
    }

    /// Store a feed's entries unless it already has some.
    ///
    /// Returns `true` if the entries were stored. Later loads of the same
    /// feed keep the first set so read state survives reloads.
    pub fn populate_entries(&mut self, index: usize, fetched: Vec<FetchedEntry>) -> bool {
        let Some(feed) = self.feeds.get_mut(index) else {
            return false;
        };
        if feed.entries.is_some() {
            return false;
        }
        feed.entries = Some(fetched.into_iter().map(Entry::from).collect());
        true
    }

    /// Set a feed's favorite flag. Returns the previous status.
    pub fn set_favorite(&mut self, index: usize, status: FavoriteStatus) -> Option<FavoriteStatus> {
        let feed = self.feeds.get_mut(index)?;
        Some(std::mem::replace(&mut feed.favorite, status))
    }

    /// Mark the first loaded entry whose link equals `link` as read.
    ///
    /// Searches every loaded feed in registry order, not only the current
    /// one. Returns the `(feed, entry)` position that matched, or `None`
    /// when no loaded entry carries that link.
    pub fn mark_read(&mut self, link: &str) -> Option<(usize, usize)> {
        for (feed_idx, feed) in self.feeds.iter_mut().enumerate() {
            let Some(entries) = feed.entries.as_mut() else {
                continue;
            };
            if let Some(entry_idx) = entries.iter().position(|e| e.link == link) {
                entries[entry_idx].status = EntryStatus::Read;
                return Some((feed_idx, entry_idx));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(title: &str, link: &str) -> FetchedEntry {
        FetchedEntry {
            title: title.to_string(),
            link: link.to_string(),
            content: format!("<p>{}</p>", title),
            published: None,
        }
    }

    fn registry() -> FeedRegistry {
        FeedRegistry::new(vec![
            FeedSeed::new("A", "https://a.example/feed"),
            FeedSeed::new("B", "https://b.example/feed"),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_feeds_are_valid() {
        let feeds = default_feeds();
        assert!(!feeds.is_empty());
        assert!(feeds.iter().all(|f| !f.name.is_empty()));
        assert!(feeds.iter().all(|f| !f.url.is_empty()));
        assert_eq!(FeedRegistry::new(feeds).unwrap().len(), 4);
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(FeedRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn test_blank_name_or_url_rejected() {
        let err = FeedRegistry::new(vec![
            FeedSeed::new("ok", "https://a.example"),
            FeedSeed::new("  ", "https://b.example"),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::EmptyName(1));

        let err = FeedRegistry::new(vec![FeedSeed::new("ok", "")]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyUrl(0));
    }

    #[test]
    fn test_new_feeds_start_unloaded_and_unfavorited() {
        let reg = registry();
        for feed in reg.iter() {
            assert!(feed.entries.is_none());
            assert_eq!(feed.favorite, FavoriteStatus::None);
            assert_eq!(feed.unread_count(), None);
        }
    }

    #[test]
    fn test_populate_first_load_wins() {
        let mut reg = registry();
        assert!(reg.populate_entries(0, vec![fetched("one", "https://a.example/1")]));
        reg.mark_read("https://a.example/1");

        // A second load with different data must not reset the cached entries.
        assert!(!reg.populate_entries(0, vec![fetched("other", "https://a.example/9")]));
        let entries = reg.get(0).unwrap().entries.as_ref().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "one");
        assert_eq!(entries[0].status, EntryStatus::Read);
    }

    #[test]
    fn test_populated_entries_default_unread() {
        let mut reg = registry();
        reg.populate_entries(
            1,
            vec![fetched("x", "https://b.example/x"), fetched("y", "https://b.example/y")],
        );
        let feed = reg.get(1).unwrap();
        assert!(feed
            .entries
            .as_ref()
            .unwrap()
            .iter()
            .all(|e| e.status == EntryStatus::Unread));
        assert_eq!(feed.unread_count(), Some(2));
    }

    #[test]
    fn test_populate_out_of_range() {
        let mut reg = registry();
        assert!(!reg.populate_entries(7, vec![]));
    }

    #[test]
    fn test_mark_read_searches_all_loaded_feeds() {
        let mut reg = registry();
        reg.populate_entries(0, vec![fetched("a", "https://a.example/1")]);
        reg.populate_entries(1, vec![fetched("b", "https://b.example/2")]);

        assert_eq!(reg.mark_read("https://b.example/2"), Some((1, 0)));
        assert_eq!(reg.get(1).unwrap().unread_count(), Some(0));
        assert_eq!(reg.get(0).unwrap().unread_count(), Some(1));
    }

    #[test]
    fn test_mark_read_first_match_only() {
        let mut reg = registry();
        let shared = "https://shared.example/post";
        reg.populate_entries(0, vec![fetched("a", shared)]);
        reg.populate_entries(1, vec![fetched("b", shared)]);

        assert_eq!(reg.mark_read(shared), Some((0, 0)));
        assert_eq!(reg.get(1).unwrap().unread_count(), Some(1));
    }

    #[test]
    fn test_mark_read_unknown_link_is_noop() {
        let mut reg = registry();
        reg.populate_entries(0, vec![fetched("a", "https://a.example/1")]);
        assert_eq!(reg.mark_read("https://nowhere.example"), None);
        assert_eq!(reg.get(0).unwrap().unread_count(), Some(1));
    }

    #[test]
    fn test_mark_read_is_exact_match() {
        let mut reg = registry();
        reg.populate_entries(0, vec![fetched("a", "https://a.example/1")]);
        assert_eq!(reg.mark_read("https://a.example/1/"), None);
    }

    #[test]
    fn test_set_favorite_returns_previous() {
        let mut reg = registry();
        assert_eq!(
            reg.set_favorite(0, FavoriteStatus::Favorite),
            Some(FavoriteStatus::None)
        );
        assert!(reg.get(0).unwrap().is_favorite());
        assert_eq!(
            reg.set_favorite(0, FavoriteStatus::None),
            Some(FavoriteStatus::Favorite)
        );
        assert_eq!(reg.set_favorite(9, FavoriteStatus::Favorite), None);
    }
}
