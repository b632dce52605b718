use crate::error::ApiError;
use crate::server::{blocking, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use backyard_core::workflow::{self, SubmissionInput};
use backyard_core::SubmissionRecord;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: SubmissionRecord,
    pub redirect: String,
}

/// 201 for a new lead, 200 when the email was already registered.
pub async fn submit_property(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmissionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Json(input) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected submission body");
        ApiError::bad_request(format!("Invalid request body: {}", e.body_text()))
    })?;

    let store = state.store();
    let submission = blocking(move || workflow::submit(store.as_ref(), &input)).await?;

    let status = if submission.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(SubmitResponse {
            success: true,
            message: submission.message(),
            user: submission.record,
            redirect: submission.redirect,
        }),
    ))
}
