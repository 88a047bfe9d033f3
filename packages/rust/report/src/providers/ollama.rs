//! Local Ollama server, `/api/generate` endpoint.

use async_trait::async_trait;
use legalwatch_shared::{OllamaConfig, Result};
use reqwest::Client;
use serde_json::{Value, json};

use super::{CompletionProvider, CompletionRequest, ProviderError, build_client, extract_text, send_json};

/// Provider for a self-hosted Ollama model; needs no credentials.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "prompt": request.prompt,
            "system": request.system,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = send_json(self.client.post(url).json(&self.build_body(request))).await?;
        extract_text(&body, "/response")
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
