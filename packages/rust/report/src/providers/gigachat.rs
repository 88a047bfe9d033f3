//! GigaChat chat-completions API.

use async_trait::async_trait;
use legalwatch_shared::{GigaChatConfig, Result, read_secret};
use reqwest::Client;
use serde_json::{Value, json};

use super::{CompletionProvider, CompletionRequest, ProviderError, build_client, extract_text, send_json};

const TEXT_POINTER: &str = "/choices/0/message/content";

/// Provider for Sber's GigaChat, authenticated with a bearer access token.
#[derive(Debug, Clone)]
pub struct GigaChatProvider {
    client: Client,
    url: String,
    model: String,
    token_env: String,
}

impl GigaChatProvider {
    pub fn new(config: &GigaChatConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            url: config.url.clone(),
            model: config.model.clone(),
            token_env: config.token_env.clone(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt},
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        })
    }
}

#[async_trait]
impl CompletionProvider for GigaChatProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, ProviderError> {
        let token = read_secret(&self.token_env).ok_or_else(|| ProviderError::MissingCredentials {
            var: self.token_env.clone(),
        })?;

        let body = send_json(
            self.client
                .post(&self.url)
                .bearer_auth(token)
                .json(&self.build_body(request)),
        )
        .await?;

        extract_text(&body, TEXT_POINTER)
    }

    fn name(&self) -> &'static str {
        "gigachat"
    }
}
