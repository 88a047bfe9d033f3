//! Shared application state for request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use legalwatch_ner::{DeepPavlovEngine, NerEngine};
use legalwatch_report::Synthesizer;
use legalwatch_shared::{AppConfig, Result};
use tokio::sync::Mutex;

/// Long-lived collaborators plus the paths handlers open per request.
///
/// The store is opened per request so a database created after startup is
/// picked up. Analysis runs hold `run_lock`, which keeps the NER engine to
/// one inference at a time.
pub struct AppState {
    pub db_path: PathBuf,
    pub report_path: PathBuf,
    pub engine: Arc<dyn NerEngine>,
    pub synthesizer: Arc<Synthesizer>,
    pub run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        db_path: impl Into<PathBuf>,
        report_path: impl Into<PathBuf>,
        engine: Arc<dyn NerEngine>,
        synthesizer: Arc<Synthesizer>,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            report_path: report_path.into(),
            engine,
            synthesizer,
            run_lock: Mutex::new(()),
        }
    }

    /// Build the engine and provider chain described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let engine = DeepPavlovEngine::new(&config.ner)?;
        let synthesizer = Synthesizer::from_config(config)?;
        Ok(Self::new(
            &config.defaults.db_path,
            &config.defaults.report_path,
            Arc::new(engine),
            Arc::new(synthesizer),
        ))
    }
}
