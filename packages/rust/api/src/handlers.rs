//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Local;
use legalwatch_core::{Pipeline, ReportSink, SilentProgress};
use legalwatch_shared::LawChange;
use legalwatch_storage::Storage;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Display format for `generated_at`, in server local time.
const GENERATED_AT_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GeneratedReport {
    pub report_text: String,
    pub generated_at: String,
}

/// `GET /`
pub async fn root() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "Бэкенд LegalWatch запущен",
    })
}

/// `GET /api/changes`: stored items, newest first.
pub async fn list_changes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LawChange>>, ApiError> {
    if !state.db_path.is_file() {
        return Err(ApiError::NotFound(format!(
            "База данных {} не найдена. Запустите: legalwatch fetch",
            state.db_path.display()
        )));
    }

    let storage = Storage::open_existing(&state.db_path).await?;
    let changes = storage.list_items_recent().await?;
    Ok(Json(changes))
}

/// `POST /api/generate-report`: run the analysis pipeline once.
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GeneratedReport>, ApiError> {
    let _guard = state.run_lock.lock().await;

    let storage = Storage::open_existing(&state.db_path).await?;
    let pipeline = Pipeline::new(
        storage,
        Arc::clone(&state.engine),
        Arc::clone(&state.synthesizer),
        ReportSink::new(&state.report_path),
    );

    let summary = pipeline.run(&SilentProgress).await?;
    info!(
        analyzed = summary.analyzed,
        skipped = summary.skipped,
        "report generated on request"
    );

    Ok(Json(GeneratedReport {
        report_text: summary.report.text,
        generated_at: summary
            .generated_at
            .with_timezone(&Local)
            .format(GENERATED_AT_FORMAT)
            .to_string(),
    }))
}
