//! The feed-fetch collaborator.
//!
//! [`FeedSource`] is the seam between the reader and wherever feeds come
//! from. Given a URL it resolves, once, to either the feed's entries or an
//! error. The reader treats every error the same way, so [`FetchError`]
//! exists for logging rather than for branching.

use futures::future::BoxFuture;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use super::parser::{parse_feed, FetchedEntry};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Something that can turn a feed URL into entries.
///
/// The returned future is `'static` so the UI loop can hand it to
/// `tokio::spawn` without holding a borrow of the source.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<FetchedEntry>, FetchError>>;
}

/// Fetches feeds over HTTP and parses them with `feed-rs`.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    /// Build a source with its own HTTP client.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(2)
            .user_agent(concat!("feedcycle/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<FetchedEntry>, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();
        Box::pin(async move { fetch_one(&client, &url).await })
    }
}

async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<Vec<FetchedEntry>, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
    let entries = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    tracing::debug!(url = %url, entries = entries.len(), "Fetched feed");
    Ok(entries)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
