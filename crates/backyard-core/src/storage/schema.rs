use crate::model::SubmissionRecord;
use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Column order shared by the flat-file store and CSV exports.
pub const USER_FIELDS: [&str; 8] = [
    "id",
    "first_name",
    "last_name",
    "address",
    "email",
    "created_at",
    "analysis_completed",
    "analysis_report",
];

pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  first_name TEXT NOT NULL,
  last_name TEXT NOT NULL,
  address TEXT NOT NULL,
  email TEXT NOT NULL,
  email_norm TEXT NOT NULL,
  created_at TEXT NOT NULL,
  analysis_completed INTEGER NOT NULL DEFAULT 0,
  analysis_report TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_norm ON users(email_norm);
"#;

/// One row in [`USER_FIELDS`] order. An absent report is an empty cell.
pub fn record_fields(rec: &SubmissionRecord) -> [String; 8] {
    [
        rec.id.to_string(),
        rec.first_name.clone(),
        rec.last_name.clone(),
        rec.address.clone(),
        rec.email.clone(),
        format_timestamp(&rec.created_at),
        format_bool(rec.analysis_completed).to_string(),
        rec.analysis_report.clone().unwrap_or_default(),
    ]
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("invalid timestamp '{}'", raw))?;
    Ok(Utc.from_utc_datetime(&naive))
}

pub fn format_bool(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

pub fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => anyhow::bail!("invalid boolean '{}'", other),
    }
}
