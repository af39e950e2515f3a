//! Feed retrieval and subscription import.
//!
//! - [`parser`] - RSS/Atom parsing with `feed-rs`
//! - [`source`] - the [`FeedSource`] seam and its HTTP implementation
//! - [`opml`] - OPML subscription lists used to seed the registry

pub mod opml;
mod parser;
mod source;

pub use opml::OpmlError;
pub use parser::{parse_feed, FetchedEntry};
pub use source::{FeedSource, FetchError, HttpFeedSource};
