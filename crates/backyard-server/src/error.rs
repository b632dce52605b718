use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backyard_core::ServiceError;

pub const MSG_UNEXPECTED: &str = "An unexpected error occurred";

/// JSON error body `{"error": "..."}` with a status code.
///
/// Storage failures never leak their detail to the client; the full chain is
/// logged at the point of conversion.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 with a fixed public message; `err` goes to the log only.
    pub fn internal(public: &str, err: &anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, public)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation { .. } => Self::bad_request(err.to_string()),
            ServiceError::NotFound { id } => {
                tracing::debug!(id, "record not found");
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ServiceError::Storage(e) => Self::internal(MSG_UNEXPECTED, &e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let e = ApiError::from(ServiceError::Validation { field: "email" });
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "Missing required field: email");

        let e = ApiError::from(ServiceError::NotFound { id: 3 });
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "User not found");

        let e = ApiError::from(ServiceError::storage(anyhow::anyhow!("disk on fire")));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, MSG_UNEXPECTED);
    }
}
