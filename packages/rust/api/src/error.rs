//! API error types with structured JSON responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use legalwatch_shared::LegalWatchError;
use serde::Serialize;

/// Error response body: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Nothing to report")]
    NothingToReport,
    #[error("Report unavailable: {0}")]
    ReportUnavailable(String),
    #[error("Store unreachable: {0}")]
    StoreUnreachable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::NothingToReport => (
                StatusCode::BAD_REQUEST,
                "NOTHING_TO_REPORT",
                "Нет данных для анализа".to_string(),
            ),
            ApiError::ReportUnavailable(detail) => {
                tracing::warn!(detail, "report synthesis failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "REPORT_UNAVAILABLE",
                    "All completion providers failed".to_string(),
                )
            }
            ApiError::StoreUnreachable(detail) => {
                tracing::error!(detail, "store unreachable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNREACHABLE",
                    "The item store is unavailable".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LegalWatchError> for ApiError {
    fn from(err: LegalWatchError) -> Self {
        match err {
            LegalWatchError::NothingToReport => ApiError::NothingToReport,
            e @ LegalWatchError::ReportUnavailable { .. } => ApiError::ReportUnavailable(e.to_string()),
            LegalWatchError::StoreUnreachable(detail) => ApiError::StoreUnreachable(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
