//! Feed ingestion: fetch the RSS feed and store new items.

use legalwatch_feed::{FeedOptions, fetch_feed};
use legalwatch_shared::Result;
use legalwatch_storage::Storage;
use tracing::{info, instrument};

use crate::pipeline::ProgressReporter;

/// Counts from one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Items present in the feed.
    pub fetched: usize,
    /// Items that were new to the store.
    pub inserted: usize,
}

/// Fetch `feed_url` and insert every item the store has not seen yet.
#[instrument(skip_all, fields(feed = %feed_url))]
pub async fn ingest_feed(
    storage: &Storage,
    feed_url: &str,
    opts: &FeedOptions,
    progress: &dyn ProgressReporter,
) -> Result<IngestSummary> {
    progress.phase("Fetching feed");
    let items = fetch_feed(feed_url, opts).await?;

    progress.phase("Storing items");
    let mut summary = IngestSummary {
        fetched: items.len(),
        inserted: 0,
    };

    for item in &items {
        let inserted = storage.insert_item(item).await?;
        if inserted {
            summary.inserted += 1;
            info!(title = %item.title, "item added");
        }
        progress.item_stored(&item.title, inserted);
    }

    info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        "feed ingested"
    );
    Ok(summary)
}
