//! HTTP API for LegalWatch.
//!
//! A small axum service for the web dashboard:
//! - `GET /` liveness message
//! - `GET /api/changes` stored items, newest first
//! - `POST /api/generate-report` runs the analysis pipeline and returns the report
//!
//! CORS is limited to the configured dashboard origins.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use legalwatch_shared::{LegalWatchError, Result, ServerConfig};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

/// Build the API router over `state`.
pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Result<Router> {
    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/api/changes", get(handlers::list_changes))
        .route("/api/generate-report", post(handlers::generate_report))
        .with_state(state)
        .layer(cors_layer(allowed_origins)?))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| LegalWatchError::config(format!("invalid CORS origin '{o}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let app = router(state, &config.allowed_origins)?;

    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| LegalWatchError::Network(format!("failed to bind {}: {e}", config.bind)))?;

    info!(addr = %config.bind, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LegalWatchError::Network(format!("server error: {e}")))?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use legalwatch_ner::{NerEngine, TaggedText};
    use legalwatch_report::{
        CompletionProvider, CompletionRequest, FallbackChain, ProviderError, Synthesizer,
    };
    use legalwatch_shared::{CompletionConfig, SourceItem};
    use legalwatch_storage::Storage;
    use std::path::PathBuf;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct NoEntities;

    #[async_trait]
    impl NerEngine for NoEntities {
        async fn tag(&self, text: &str) -> Result<TaggedText> {
            let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
            let tags = vec!["O".to_string(); tokens.len()];
            TaggedText::new(tokens, tags)
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    struct Canned(std::result::Result<String, ProviderError>);

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> std::result::Result<String, ProviderError> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lw_api_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn app(dir: &std::path::Path, outcome: std::result::Result<String, ProviderError>) -> Router {
        let synthesizer = Synthesizer::new(
            FallbackChain::new(vec![Box::new(Canned(outcome))]),
            &CompletionConfig::default(),
        );
        let state = AppState::new(
            dir.join("laws.db"),
            dir.join("law_report.txt"),
            Arc::new(NoEntities),
            Arc::new(synthesizer),
        );
        router(Arc::new(state), &["http://localhost:5173".to_string()]).unwrap()
    }

    async fn seed(dir: &std::path::Path, items: &[(&str, &str)]) {
        let storage = Storage::open(&dir.join("laws.db")).await.unwrap();
        for (i, (title, date)) in items.iter().enumerate() {
            let published_at = chrono::DateTime::parse_from_rfc2822(date)
                .ok()
                .map(|d| d.with_timezone(&chrono::Utc));
            storage
                .insert_item(&SourceItem {
                    title: title.to_string(),
                    url: format!("https://www.consultant.ru/law/hotdocs/{i}.html"),
                    date: date.to_string(),
                    description: String::new(),
                    published_at,
                })
                .await
                .unwrap();
        }
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let dir = temp_dir();
        let response = app(&dir, Ok(String::new()))
            .oneshot(request("GET", "/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert!(json["message"].as_str().unwrap().contains("LegalWatch"));
    }

    #[tokio::test]
    async fn changes_404_without_database() {
        let dir = temp_dir();
        let response = app(&dir, Ok(String::new()))
            .oneshot(request("GET", "/api/changes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!dir.join("laws.db").exists());
    }

    #[tokio::test]
    async fn changes_newest_first() {
        let dir = temp_dir();
        seed(
            &dir,
            &[
                ("Старый", "Mon, 11 May 2026 10:00:00 +0300"),
                ("Новый", "Wed, 13 May 2026 10:00:00 +0300"),
            ],
        )
        .await;

        let response = app(&dir, Ok(String::new()))
            .oneshot(request("GET", "/api/changes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "Новый");
        assert!(rows[0]["id"].is_i64());
        assert!(rows[0].get("published_at").is_none());
    }

    #[tokio::test]
    async fn generate_report_returns_text_and_timestamp() {
        let dir = temp_dir();
        seed(&dir, &[("Приказ", "Mon, 11 May 2026 10:00:00 +0300")]).await;

        let response = app(&dir, Ok("Отчёт готов".into()))
            .oneshot(request("POST", "/api/generate-report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["report_text"], "Отчёт готов");
        let stamp = json["generated_at"].as_str().unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(stamp, "%d.%m.%Y %H:%M").is_ok(),
            "unexpected timestamp {stamp}"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("law_report.txt")).unwrap(),
            "Отчёт готов"
        );
    }

    #[tokio::test]
    async fn generate_report_empty_store_is_400() {
        let dir = temp_dir();
        seed(&dir, &[]).await;

        let response = app(&dir, Ok("unused".into()))
            .oneshot(request("POST", "/api/generate-report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOTHING_TO_REPORT");
    }

    #[tokio::test]
    async fn generate_report_all_providers_down_is_502() {
        let dir = temp_dir();
        seed(&dir, &[("Приказ", "Mon, 11 May 2026 10:00:00 +0300")]).await;

        let response = app(&dir, Err(ProviderError::Transport("down".into())))
            .oneshot(request("POST", "/api/generate-report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn generate_report_without_database_is_503() {
        let dir = temp_dir();
        let response = app(&dir, Ok("unused".into()))
            .oneshot(request("POST", "/api/generate-report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_only() {
        let dir = temp_dir();
        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/api/changes")
                .header("origin", origin)
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app(&dir, Ok(String::new()))
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );

        let denied = app(&dir, Ok(String::new()))
            .oneshot(preflight("http://evil.example"))
            .await
            .unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn invalid_origin_is_config_error() {
        let dir = temp_dir();
        let state = AppState::new(
            dir.join("laws.db"),
            dir.join("law_report.txt"),
            Arc::new(NoEntities),
            Arc::new(Synthesizer::new(
                FallbackChain::new(Vec::new()),
                &CompletionConfig::default(),
            )),
        );
        let err = router(Arc::new(state), &["bad\norigin".to_string()]).unwrap_err();
        assert!(matches!(err, LegalWatchError::Config { .. }));
    }
}
