//! NER engine boundary.
//!
//! The model itself runs out of process. [`DeepPavlovEngine`] talks to a
//! DeepPavlov `riseapi` server hosting a Russian NER model: it posts
//! `{"x": [text]}` and receives `[[tokens, tags]]` back.

use std::time::Duration;

use async_trait::async_trait;
use legalwatch_shared::{LegalWatchError, NerConfig, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

/// Tokens and their BIO tags, guaranteed to have equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedText {
    pub tokens: Vec<String>,
    pub tags: Vec<String>,
}

impl TaggedText {
    /// Pair tokens with tags, rejecting sequences of different length.
    pub fn new(tokens: Vec<String>, tags: Vec<String>) -> Result<Self> {
        if tokens.len() != tags.len() {
            return Err(LegalWatchError::Ner(format!(
                "engine returned {} tokens but {} tags",
                tokens.len(),
                tags.len()
            )));
        }
        Ok(Self { tokens, tags })
    }
}

/// A pretrained tagger: text in, BIO-tagged tokens out.
///
/// Implementations are created once at startup and shared by reference.
/// Callers run one inference at a time.
#[async_trait]
pub trait NerEngine: Send + Sync {
    /// Tokenize and tag `text`.
    async fn tag(&self, text: &str) -> Result<TaggedText>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// DeepPavlov riseapi client
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RiseRequest<'a> {
    x: [&'a str; 1],
}

/// HTTP client for a DeepPavlov model server.
#[derive(Debug, Clone)]
pub struct DeepPavlovEngine {
    client: Client,
    url: String,
}

impl DeepPavlovEngine {
    /// Build an engine for the model endpoint in `config`.
    pub fn new(config: &NerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LegalWatchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl NerEngine for DeepPavlovEngine {
    #[instrument(skip_all, fields(url = %self.url, chars = text.chars().count()))]
    async fn tag(&self, text: &str) -> Result<TaggedText> {
        let response = self
            .client
            .post(&self.url)
            .json(&RiseRequest { x: [text] })
            .send()
            .await
            .map_err(|e| LegalWatchError::Ner(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LegalWatchError::Ner(format!(
                "{}: HTTP {status}: {}",
                self.url,
                body.chars().take(200).collect::<String>()
            )));
        }

        let mut batch: Vec<(Vec<String>, Vec<String>)> = response
            .json()
            .await
            .map_err(|e| LegalWatchError::Ner(format!("invalid model response: {e}")))?;

        if batch.len() != 1 {
            return Err(LegalWatchError::Ner(format!(
                "expected one result for one input, got {}",
                batch.len()
            )));
        }

        let (tokens, tags) = batch.remove(0);
        debug!(tokens = tokens.len(), "text tagged");
        TaggedText::new(tokens, tags)
    }

    fn name(&self) -> &'static str {
        "deeppavlov"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_for(server: &MockServer) -> DeepPavlovEngine {
        DeepPavlovEngine::new(&NerConfig {
            url: format!("{}/model", server.uri()),
            timeout_secs: 5,
        })
        .expect("build engine")
    }

    #[test]
    fn tagged_text_rejects_length_mismatch() {
        let err = TaggedText::new(vec!["a".into(), "b".into()], vec!["O".into()]).unwrap_err();
        assert!(err.to_string().contains("2 tokens but 1 tags"));
    }

    #[tokio::test]
    async fn tags_text_via_riseapi() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/model"))
            .and(body_json(serde_json::json!({"x": ["Минфин 12 мая"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                [["Минфин", "12", "мая"], ["B-ORG", "B-DATE", "I-DATE"]]
            ])))
            .mount(&server)
            .await;

        let tagged = engine_for(&server).tag("Минфин 12 мая").await.expect("tag");
        assert_eq!(tagged.tokens, vec!["Минфин", "12", "мая"]);
        assert_eq!(tagged.tags, vec!["B-ORG", "B-DATE", "I-DATE"]);
    }

    #[tokio::test]
    async fn server_error_is_ner_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let err = engine_for(&server).tag("text").await.unwrap_err();
        assert!(matches!(err, LegalWatchError::Ner(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn mismatched_lengths_from_server_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[["a", "b"], ["O"]]])),
            )
            .mount(&server)
            .await;

        assert!(engine_for(&server).tag("a b").await.is_err());
    }

    #[tokio::test]
    async fn malformed_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": 1})))
            .mount(&server)
            .await;

        let err = engine_for(&server).tag("text").await.unwrap_err();
        assert!(err.to_string().contains("invalid model response"));
    }
}
