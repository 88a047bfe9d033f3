//! Shared types, error model, and configuration for LegalWatch.
//!
//! This crate is the foundation depended on by all other LegalWatch crates.
//! It provides:
//! - [`LegalWatchError`]: the unified error type
//! - Domain types ([`SourceItem`], [`LawChange`], [`EntitySpan`], [`ChangeAnalysis`], [`Report`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompletionConfig, DefaultsConfig, GigaChatConfig, KNOWN_PROVIDERS, NerConfig,
    OllamaConfig, ServerConfig, YandexConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, read_secret,
};
pub use error::{LegalWatchError, ProviderAttempt, Result};
pub use types::{AnalyzedItem, ChangeAnalysis, EntitySpan, LawChange, Report, SourceItem};
