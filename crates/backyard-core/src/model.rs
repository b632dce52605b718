use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A persisted lead: one row per normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub analysis_completed: bool,
    /// Serialized [`PropertyReport`], present once the report was generated.
    #[serde(default)]
    pub analysis_report: Option<String>,
}

impl SubmissionRecord {
    /// A report is only reused when the record is flagged complete and the
    /// stored payload is non-empty.
    pub fn has_cached_report(&self) -> bool {
        self.analysis_completed
            && self
                .analysis_report
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty())
    }

    pub fn email_matches(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }

    /// Merge only the fields named by `patch`.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &patch.address {
            self.address = v.clone();
        }
        if let Some(v) = patch.analysis_completed {
            self.analysis_completed = v;
        }
        if let Some(v) = &patch.analysis_report {
            self.analysis_report = if v.is_empty() { None } else { Some(v.clone()) };
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email: String,
}

impl NewRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            email: email.into(),
        }
    }

    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> SubmissionRecord {
        SubmissionRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            email: self.email,
            created_at,
            analysis_completed: false,
            analysis_report: None,
        }
    }
}

/// Partial update. Email is not patchable; uniqueness is only checked at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub analysis_completed: Option<bool>,
    /// An empty string clears the stored report.
    pub analysis_report: Option<String>,
}

impl RecordPatch {
    pub fn completed_report(report_json: String) -> Self {
        Self {
            analysis_completed: Some(true),
            analysis_report: Some(report_json),
            ..Self::default()
        }
    }
}

// --- Report payload ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReport {
    pub property_details: PropertyDetails,
    pub notes: Vec<String>,
    pub construction_estimate: ConstructionEstimate,
    pub next_steps: Vec<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagery: Option<PropertyImagery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    pub address: String,
    pub lot_size_sq_ft: u32,
    pub zoning: Zoning,
    pub allows_adu: bool,
    pub max_adu_size_sq_ft: MaxAduSize,
    pub setbacks: Setbacks,
}

/// Setbacks in feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setbacks {
    pub front: u32,
    pub back: u32,
    pub sides: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionEstimate {
    pub low_estimate_usd: u32,
    pub high_estimate_usd: u32,
    pub estimate_disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImagery {
    pub satellite_image_url: String,
    pub maps_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zoning {
    #[serde(rename = "Residential R-1")]
    ResidentialR1,
    #[serde(rename = "Residential R-2")]
    ResidentialR2,
    #[serde(rename = "Mixed-Use")]
    MixedUse,
    #[serde(rename = "Urban Residential")]
    UrbanResidential,
}

impl Zoning {
    pub const ALL: [Zoning; 4] = [
        Zoning::ResidentialR1,
        Zoning::ResidentialR2,
        Zoning::MixedUse,
        Zoning::UrbanResidential,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Zoning::ResidentialR1 => "Residential R-1",
            Zoning::ResidentialR2 => "Residential R-2",
            Zoning::MixedUse => "Mixed-Use",
            Zoning::UrbanResidential => "Urban Residential",
        }
    }
}

pub const NOT_APPLICABLE: &str = "Not applicable";

/// Maximum ADU footprint; serialized as a number, or as the
/// `"Not applicable"` sentinel when the lot does not allow an ADU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAduSize {
    SqFt(u32),
    NotApplicable,
}

impl MaxAduSize {
    pub fn sq_ft(&self) -> Option<u32> {
        match self {
            MaxAduSize::SqFt(n) => Some(*n),
            MaxAduSize::NotApplicable => None,
        }
    }
}

impl Serialize for MaxAduSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxAduSize::SqFt(n) => serializer.serialize_u32(*n),
            MaxAduSize::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for MaxAduSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(MaxAduSize::SqFt(n)),
            Raw::Text(s) if s == NOT_APPLICABLE => Ok(MaxAduSize::NotApplicable),
            Raw::Text(other) => Err(serde::de::Error::custom(format!(
                "unexpected max ADU size: {other}"
            ))),
        }
    }
}
