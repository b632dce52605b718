use crate::error::ApiError;
use crate::server::{blocking, AppState};
use axum::extract::{Path, State};
use axum::Json;
use backyard_core::{PropertyReport, ServiceError};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: PropertyReport,
}

pub async fn property_analysis(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    // ids that are not integers can never match a record
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::from(ServiceError::NotFound { id: -1 }))?;

    let reports = state.reports.clone();
    let analysis = blocking(move || reports.get_or_generate(id)).await?;

    Ok(Json(AnalysisResponse {
        success: true,
        analysis,
    }))
}
