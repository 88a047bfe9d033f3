//! Report synthesis for LegalWatch.
//!
//! Turns a batch of analyzed items into one prompt ([`prompt`]) and asks a
//! chain of completion providers ([`providers`]) for a report, falling back
//! down the chain until one succeeds ([`synthesizer`]).

pub mod prompt;
pub mod providers;
pub mod synthesizer;

pub use prompt::build_prompt;
pub use providers::{
    CompletionProvider, CompletionRequest, GigaChatProvider, OllamaProvider, ProviderError,
    YandexGptProvider, build_provider,
};
pub use synthesizer::{Completion, FallbackChain, Synthesizer};
