use thiserror::Error;

/// Failures surfaced by the submission and report workflows.
///
/// The HTTP layer maps these onto status codes: `Validation` is 400,
/// `NotFound` is 404 and `Storage` is a generic 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("User not found")]
    NotFound { id: i64 },

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        ServiceError::Storage(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);
