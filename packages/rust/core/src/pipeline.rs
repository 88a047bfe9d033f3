//! The analysis run: store → entity extraction → report → sink.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use legalwatch_ner::{NerEngine, analyze_item};
use legalwatch_report::Synthesizer;
use legalwatch_shared::{AnalyzedItem, LegalWatchError, Report, Result};
use legalwatch_storage::Storage;

use crate::sink::ReportSink;

/// Outcome of one successful [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Items whose entities were extracted.
    pub analyzed: usize,
    /// Items skipped because extraction failed.
    pub skipped: usize,
    /// Where the report was written.
    pub report_path: PathBuf,
    /// When the report was synthesized.
    pub generated_at: DateTime<Utc>,
    /// The report itself.
    pub report: Report,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when an item has been analyzed.
    fn item_analyzed(&self, title: &str, current: usize, total: usize);
    /// Called when an item is skipped after a recoverable failure.
    fn item_skipped(&self, title: &str, error: &LegalWatchError);
    /// Called when a feed item has been offered to the store.
    fn item_stored(&self, title: &str, inserted: bool);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_analyzed(&self, _title: &str, _current: usize, _total: usize) {}
    fn item_skipped(&self, _title: &str, _error: &LegalWatchError) {}
    fn item_stored(&self, _title: &str, _inserted: bool) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Owns one store connection and shares the long-lived engine and
/// synthesizer, which are built once at startup.
pub struct Pipeline {
    storage: Storage,
    engine: Arc<dyn NerEngine>,
    synthesizer: Arc<Synthesizer>,
    sink: ReportSink,
}

impl Pipeline {
    pub fn new(
        storage: Storage,
        engine: Arc<dyn NerEngine>,
        synthesizer: Arc<Synthesizer>,
        sink: ReportSink,
    ) -> Self {
        Self {
            storage,
            engine,
            synthesizer,
            sink,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Analyze every stored item and replace the report.
    ///
    /// 1. Load all items in one batch
    /// 2. Extract entities per item, skipping items the engine fails on
    /// 3. Synthesize one report over the analyzed items
    /// 4. Write it to the sink
    ///
    /// Nothing is written when synthesis fails, so the previous report
    /// survives a run where every provider is down.
    #[instrument(skip_all, fields(db = %self.storage.path().display(), engine = self.engine.name()))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunSummary> {
        let start = Instant::now();

        progress.phase("Loading items");
        let items = self.storage.list_items().await?;
        let total = items.len();
        info!(items = total, "starting analysis run");

        // --- Entity extraction ---
        progress.phase("Extracting entities");
        let mut analyzed: Vec<AnalyzedItem> = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for (i, item) in items.into_iter().enumerate() {
            let analysis = match analyze_item(self.engine.as_ref(), &item).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!(url = %item.url, error = %e, "entity extraction failed, skipping item");
                    progress.item_skipped(&item.title, &e);
                    skipped += 1;
                    continue;
                }
            };

            if let Err(e) = self.storage.save_analysis(&item.url, &analysis).await {
                warn!(url = %item.url, error = %e, "failed to store analysis");
            }

            info!(
                current = i + 1,
                total,
                entities = analysis.raw_entities.len(),
                title = %item.title,
                "item analyzed"
            );
            progress.item_analyzed(&item.title, i + 1, total);
            analyzed.push(AnalyzedItem { item, analysis });
        }

        // --- Synthesis ---
        progress.phase("Synthesizing report");
        let report = self.synthesizer.synthesize(&analyzed).await?;

        // --- Persist ---
        progress.phase("Writing report");
        self.sink.write(&report.text)?;

        let summary = RunSummary {
            analyzed: analyzed.len(),
            skipped,
            report_path: self.sink.path().to_path_buf(),
            generated_at: report.generated_at,
            report,
        };

        info!(
            analyzed = summary.analyzed,
            skipped = summary.skipped,
            provider = %summary.report.provider,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis run complete"
        );
        progress.done(&summary);
        Ok(summary)
    }
}
