use crate::model::SubmissionRecord;
use crate::storage::schema::{record_fields, USER_FIELDS};
use crate::storage::RecordStore;
use anyhow::Context;
use chrono::{DateTime, Local, TimeZone};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Tabular dump of every record, header first, in the persisted column order.
pub fn write_csv<W: Write>(records: &[SubmissionRecord], out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(USER_FIELDS)?;
    for rec in records {
        writer.write_record(&record_fields(rec))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(records: &[SubmissionRecord]) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(buf)
}

/// `user_data_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("user_data_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write a timestamped export of the whole store into `dir`.
pub fn export_to_dir(store: &dyn RecordStore, dir: &Path) -> anyhow::Result<PathBuf> {
    let records = store.list_all()?;
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(export_file_name(&Local::now()));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(&records, std::io::BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = records.len(), "exported users");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewRecord, RecordPatch};
    use crate::storage::MemoryStore;
    use chrono::Utc;

    #[test]
    fn file_name_format() {
        let at = Utc.with_ymd_and_hms(2025, 4, 9, 7, 5, 3).unwrap();
        assert_eq!(export_file_name(&at), "user_data_20250409_070503.csv");
    }

    #[test]
    fn csv_has_header_and_quoted_report() {
        let store = MemoryStore::new();
        let rec = store
            .create(&NewRecord::new("Ann", "Lee", "1 Oak St, Boston", "ann@example.com"))
            .unwrap();
        store
            .update(rec.id, &RecordPatch::completed_report(r#"{"a":"b,c"}"#.into()))
            .unwrap();

        let bytes = to_csv_bytes(&store.list_all().unwrap()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,first_name,last_name,address,email,created_at,analysis_completed,analysis_report"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,Ann,Lee,\"1 Oak St, Boston\",ann@example.com,"));
        assert!(row.ends_with(",true,\"{\"\"a\"\":\"\"b,c\"\"}\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn export_to_dir_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store
            .create(&NewRecord::new("A", "B", "1 St", "a@b.io"))
            .unwrap();

        let path = export_to_dir(&store, &dir.path().join("exports")).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("user_data_") && name.ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
