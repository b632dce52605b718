use crate::errors::ServiceError;
use crate::model::{NewRecord, SubmissionRecord};
use crate::storage::RecordStore;
use serde::Deserialize;

pub const MSG_CREATED: &str = "Property analysis request submitted successfully";
pub const MSG_EXISTING: &str = "Email already registered for property analysis";

/// Raw form payload. Every field is optional here so that a missing field
/// becomes a `Validation` error naming it instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl SubmissionInput {
    pub fn new(first_name: &str, last_name: &str, address: &str, email: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            address: Some(address.to_string()),
            email: Some(email.to_string()),
        }
    }

    /// Check fields in form order and report the first missing or blank one.
    pub fn validate(&self) -> Result<NewRecord, ServiceError> {
        fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ServiceError> {
            match value.as_deref() {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ServiceError::Validation { field }),
            }
        }

        let first_name = required(&self.first_name, "firstName")?;
        let last_name = required(&self.last_name, "lastName")?;
        let address = required(&self.address, "address")?;
        let email = required(&self.email, "email")?;
        Ok(NewRecord::new(first_name, last_name, address, email))
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub record: SubmissionRecord,
    pub is_new: bool,
    pub redirect: String,
}

impl Submission {
    pub fn message(&self) -> &'static str {
        if self.is_new {
            MSG_CREATED
        } else {
            MSG_EXISTING
        }
    }
}

pub fn redirect_for(id: i64) -> String {
    format!("/property-analysis?id={}", id)
}

/// Validate, then upsert by email. Re-submitting a known email (any case)
/// returns the original record with `is_new == false`.
pub fn submit(store: &dyn RecordStore, input: &SubmissionInput) -> Result<Submission, ServiceError> {
    let new = input.validate()?;
    let (record, is_new) = store.create_or_get(&new)?;

    if is_new {
        tracing::info!(id = record.id, "submission recorded");
    } else {
        tracing::info!(id = record.id, "submission for already registered email");
    }

    Ok(Submission {
        redirect: redirect_for(record.id),
        record,
        is_new,
    })
}
