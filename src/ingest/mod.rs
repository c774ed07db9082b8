/// Data ingestion from the Corona Data Scraper feed.
///
/// Submodules:
/// - `coronadatascraper` — reshapes the flat feed into the nation/state/county breakdown.
/// - `fixtures` (test only) — representative feed payloads.
///
/// The `FeedSource` trait is the seam between fetching and reshaping: the
/// service uses `HttpFeedSource`, tests hand in canned payloads.

pub mod coronadatascraper;

#[cfg(test)]
pub mod fixtures;

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Published location of the Corona Data Scraper dataset.
pub const CORONA_DATA_SCRAPER_URL: &str = "https://coronadatascraper.com/data.json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching the feed. None of these reach the
/// HTTP layer; the ingestion routine turns them into a placeholder.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Non-2xx HTTP response from the feed host.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The body was not a JSON array.
    #[error("Parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Feed source seam
// ---------------------------------------------------------------------------

/// Something that can produce the raw feed as a list of JSON records.
///
/// Records are returned undecoded so one malformed entry cannot fail the
/// whole feed; decoding happens per record in `coronadatascraper`.
pub trait FeedSource: Send + Sync {
    /// Where the feed comes from, for log context.
    fn location(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = Result<Vec<serde_json::Value>, FeedError>> + Send;
}

/// Parse a feed body into its top-level records.
pub fn parse_feed(body: &str) -> Result<Vec<serde_json::Value>, FeedError> {
    serde_json::from_str::<Vec<serde_json::Value>>(body).map_err(|e| FeedError::Parse(e.to_string()))
}

/// Fetches the feed over HTTP on every call; nothing is cached.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// Build a source for `url`. `timeout` bounds the whole request,
    /// including reading the body.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FeedError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpFeedSource {
            client: builder.build()?,
            url: url.into(),
        })
    }
}

impl FeedSource for HttpFeedSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<serde_json::Value>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Http(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_feed(&body)
    }
}
