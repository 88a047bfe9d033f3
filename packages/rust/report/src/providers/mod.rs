//! Completion providers.
//!
//! Each provider is "a function from prompt to text that may fail". The
//! [`CompletionProvider`] trait hides the vendor HTTP API; every call returns
//! a typed [`ProviderError`] on failure so the fallback policy can inspect it.
//!
//! ```text
//! Synthesizer ──► FallbackChain ──► CompletionProvider::complete()
//!                                          │
//!                    ┌─────────────────────┼─────────────────────┐
//!             YandexGptProvider     GigaChatProvider      OllamaProvider
//!        /foundationModels/v1/...  /api/v1/chat/...      /api/generate
//! ```

pub mod gigachat;
pub mod ollama;
pub mod yandex;

pub use gigachat::GigaChatProvider;
pub use ollama::OllamaProvider;
pub use yandex::YandexGptProvider;

use std::time::Duration;

use async_trait::async_trait;
use legalwatch_shared::{AppConfig, LegalWatchError, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// A provider-agnostic completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Completion length budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Why a single provider call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The env var holding the provider's credential is unset or empty.
    #[error("credential env var {var} is not set")]
    MissingCredentials { var: String },

    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body lacked the expected completion text.
    #[error("malformed response: {0}")]
    MalformedBody(String),
}

/// Abstraction over text-completion services.
///
/// Object-safe; the fallback chain holds `Box<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a completion for `request`.
    async fn complete(&self, request: &CompletionRequest)
    -> std::result::Result<String, ProviderError>;

    /// Stable name used in config and logs.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Shared HTTP helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with the completion timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LegalWatchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and decode a JSON body, mapping every failure
/// onto [`ProviderError`].
pub(crate) async fn send_json(request: RequestBuilder) -> std::result::Result<Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::MalformedBody(e.to_string()))
}

/// Pull non-blank completion text out of `body` at a JSON pointer.
pub(crate) fn extract_text(body: &Value, pointer: &str) -> std::result::Result<String, ProviderError> {
    match body.pointer(pointer).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(ProviderError::MalformedBody(format!("empty text at {pointer}"))),
        None => Err(ProviderError::MalformedBody(format!("missing {pointer}"))),
    }
}

/// Construct the provider registered under `name`.
pub fn build_provider(name: &str, config: &AppConfig) -> Result<Box<dyn CompletionProvider>> {
    let timeout = config.completion.timeout_secs;
    match name {
        "yandex" => Ok(Box::new(YandexGptProvider::new(&config.yandex, timeout)?)),
        "gigachat" => Ok(Box::new(GigaChatProvider::new(&config.gigachat, timeout)?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(&config.ollama, timeout)?)),
        other => Err(LegalWatchError::config(format!(
            "unknown completion provider '{other}'"
        ))),
    }
}
