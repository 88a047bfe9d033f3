//! YandexGPT foundation-models completion API.

use async_trait::async_trait;
use legalwatch_shared::{Result, YandexConfig, read_secret};
use reqwest::Client;
use serde_json::{Value, json};

use super::{CompletionProvider, CompletionRequest, ProviderError, build_client, extract_text, send_json};

const TEXT_POINTER: &str = "/result/alternatives/0/message/text";

/// Provider for `llm.api.cloud.yandex.net`, authenticated with an `Api-Key`.
#[derive(Debug, Clone)]
pub struct YandexGptProvider {
    client: Client,
    url: String,
    model_uri: String,
    api_key_env: String,
}

impl YandexGptProvider {
    pub fn new(config: &YandexConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            url: config.url.clone(),
            model_uri: config.model_uri.clone(),
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "modelUri": self.model_uri,
            "completionOptions": {
                "stream": false,
                "maxTokens": request.max_tokens,
                "temperature": request.temperature,
            },
            "messages": [
                {"role": "system", "text": request.system},
                {"role": "user", "text": request.prompt},
            ],
        })
    }
}

#[async_trait]
impl CompletionProvider for YandexGptProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, ProviderError> {
        let key = read_secret(&self.api_key_env).ok_or_else(|| ProviderError::MissingCredentials {
            var: self.api_key_env.clone(),
        })?;

        let body = send_json(
            self.client
                .post(&self.url)
                .header("Authorization", format!("Api-Key {key}"))
                .json(&self.build_body(request)),
        )
        .await?;

        extract_text(&body, TEXT_POINTER)
    }

    fn name(&self) -> &'static str {
        "yandex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "Ты - российский юрист.".into(),
            prompt: "Данные: ...".into(),
            max_tokens: 500,
            temperature: 0.2,
        }
    }

    fn provider(server: &MockServer, key_env: &str) -> YandexGptProvider {
        YandexGptProvider::new(
            &YandexConfig {
                url: format!("{}/foundationModels/v1/completion", server.uri()),
                model_uri: "gpt://folder/yandexgpt/latest".into(),
                api_key_env: key_env.into(),
            },
            5,
        )
        .unwrap()
    }

    #[test]
    fn body_carries_budget_and_messages() {
        let p = YandexGptProvider::new(&YandexConfig::default(), 5).unwrap();
        let body = p.build_body(&request());
        assert_eq!(body["completionOptions"]["maxTokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["text"], "Данные: ...");
        assert_eq!(body["modelUri"], "gpt://foundationModels/yandexgpt/latest");
    }

    #[tokio::test]
    async fn returns_first_alternative() {
        let server = MockServer::start().await;
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("LW_TEST_YANDEX_KEY_OK", "secret") };

        Mock::given(method("POST"))
            .and(path("/foundationModels/v1/completion"))
            .and(header("Authorization", "Api-Key secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"alternatives": [{"message": {"role": "assistant", "text": "Отчёт готов"}}]}
            })))
            .mount(&server)
            .await;

        let text = provider(&server, "LW_TEST_YANDEX_KEY_OK")
            .complete(&request())
            .await
            .expect("complete");
        assert_eq!(text, "Отчёт готов");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        let err = provider(&server, "LW_TEST_YANDEX_KEY_UNSET_12345")
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        unsafe { std::env::set_var("LW_TEST_YANDEX_KEY_403", "secret") };

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = provider(&server, "LW_TEST_YANDEX_KEY_403")
            .complete(&request())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::Status {
                status: 403,
                body: "forbidden".into()
            }
        );
    }
}
