//! Unauthenticated admin views over every stored record.

use crate::error::ApiError;
use crate::server::{blocking, AppState};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backyard_core::export::{export_file_name, to_csv_bytes};
use backyard_core::{ServiceError, SubmissionRecord};
use serde::Serialize;
use std::sync::Arc;

pub const MSG_EXPORT_FAILED: &str = "Failed to generate CSV file";

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub success: bool,
    pub count: usize,
    pub submissions: Vec<SubmissionRecord>,
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubmissionsResponse>, ApiError> {
    let store = state.store();
    let submissions = blocking(move || store.list_all().map_err(ServiceError::from)).await?;

    Ok(Json(SubmissionsResponse {
        success: true,
        count: submissions.len(),
        submissions,
    }))
}

pub async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let store = state.store();
    let csv = tokio::task::spawn_blocking(move || to_csv_bytes(&store.list_all()?))
        .await
        .map_err(anyhow::Error::from)
        .and_then(|res| res)
        .map_err(|e| ApiError::internal(MSG_EXPORT_FAILED, &e))?;

    let file_name = export_file_name(&chrono::Local::now());
    tracing::info!(file = %file_name, bytes = csv.len(), "csv export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    )
        .into_response())
}
