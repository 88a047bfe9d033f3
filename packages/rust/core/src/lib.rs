//! Core orchestration for LegalWatch.
//!
//! This crate ties the feed, the store, entity extraction and report
//! synthesis into end-to-end workflows:
//! - [`ingest::ingest_feed`]: feed → store
//! - [`pipeline::Pipeline::run`]: store → NER → report → [`sink::ReportSink`]

pub mod ingest;
pub mod pipeline;
pub mod sink;

pub use ingest::{IngestSummary, ingest_feed};
pub use pipeline::{Pipeline, ProgressReporter, RunSummary, SilentProgress};
pub use sink::ReportSink;
