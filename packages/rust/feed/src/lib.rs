//! RSS feed ingestion source.
//!
//! LegalWatch reads legal-news headlines from a single RSS 2.0 feed
//! (ConsultantPlus "hot documents" by default). This crate fetches the feed
//! and turns its `channel/item` elements into [`SourceItem`]s ready for the
//! store.

mod parser;

use std::time::Duration;

use legalwatch_shared::{LegalWatchError, Result, SourceItem};
use reqwest::Client;
use tracing::{info, instrument};

pub use parser::parse_rss;

/// Maximum number of redirects to follow when fetching the feed.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for fetching the feed.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum response size we consider valid (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("LegalWatch/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Feed options
// ---------------------------------------------------------------------------

/// Configuration for fetching a feed.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Timeout for the HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Download the feed at `url` and parse its items.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_feed(url: &str, opts: &FeedOptions) -> Result<Vec<SourceItem>> {
    let client = build_client(opts)?;
    let body = fetch_body(&client, url).await?;
    let items = parse_rss(&body)?;

    info!(items = items.len(), "feed parsed");
    Ok(items)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_client(opts: &FeedOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| LegalWatchError::Network(format!("failed to build HTTP client: {e}")))
}

async fn fetch_body(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LegalWatchError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LegalWatchError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_RESPONSE_SIZE {
            return Err(LegalWatchError::validation(format!(
                "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
            )));
        }
    }

    read_capped(response, url, MAX_RESPONSE_SIZE).await
}

/// Read the body chunk by chunk, failing once it grows past `limit` bytes.
/// Chunked responses carry no `Content-Length`, so the cap is checked here too.
async fn read_capped(mut response: reqwest::Response, url: &str, limit: u64) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| LegalWatchError::Network(format!("{url}: failed to read body: {e}")))?
    {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(LegalWatchError::validation(format!(
                "{url}: response too large (over {limit} bytes)"
            )));
        }
        body.extend_from_slice(&chunk);
    }

    String::from_utf8(body)
        .map_err(|e| LegalWatchError::parse(format!("{url}: body is not valid UTF-8: {e}")))
}
