//! Report synthesis with an ordered provider fallback chain.

use chrono::Utc;
use legalwatch_shared::{
    AnalyzedItem, AppConfig, CompletionConfig, LegalWatchError, ProviderAttempt, Report, Result,
};
use tracing::{debug, info, instrument, warn};

use crate::prompt::build_prompt;
use crate::providers::{CompletionProvider, CompletionRequest, build_provider};

/// A successful completion and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub provider: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

/// Providers tried in priority order; the first success wins.
pub struct FallbackChain {
    providers: Vec<Box<dyn CompletionProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    /// Build the chain named by `[completion].providers`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = config
            .completion
            .providers
            .iter()
            .map(|name| build_provider(name, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    /// Provider names in the order they will be tried.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Submit `request` to each provider until one succeeds.
    ///
    /// Individual failures are logged and collected; only when every
    /// provider has failed does this return [`LegalWatchError::ReportUnavailable`].
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name();
            debug!(provider = name, "requesting completion");
            match provider.complete(request).await {
                Ok(text) => {
                    info!(provider = name, chars = text.chars().count(), "completion received");
                    return Ok(Completion {
                        provider: name.to_string(),
                        text,
                    });
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "provider failed, trying next");
                    attempts.push(ProviderAttempt {
                        provider: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(LegalWatchError::ReportUnavailable { attempts })
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Turns a batch of analyzed items into one natural-language report.
pub struct Synthesizer {
    chain: FallbackChain,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl Synthesizer {
    pub fn new(chain: FallbackChain, settings: &CompletionConfig) -> Self {
        Self {
            chain,
            system_prompt: settings.system_prompt.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    /// Build the chain and settings from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(FallbackChain::from_config(config)?, &config.completion))
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Synthesize a report over `items`.
    ///
    /// An empty batch fails with [`LegalWatchError::NothingToReport`] before
    /// any provider is contacted.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn synthesize(&self, items: &[AnalyzedItem]) -> Result<Report> {
        if items.is_empty() {
            return Err(LegalWatchError::NothingToReport);
        }

        let request = CompletionRequest {
            system: self.system_prompt.clone(),
            prompt: build_prompt(items),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let completion = self.chain.complete(&request).await?;
        Ok(Report {
            text: completion.text,
            provider: completion.provider,
            generated_at: Utc::now(),
        })
    }
}
