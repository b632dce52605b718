use crate::model::{normalize_email, NewRecord, RecordPatch, SubmissionRecord};
use crate::storage::schema::{parse_bool, parse_timestamp, record_fields, USER_FIELDS};
use crate::storage::RecordStore;
use anyhow::Context;
use chrono::Utc;
use csv::{ByteRecord, StringRecord};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// CSV-backed store. Every mutation rewrites the whole file: read all rows,
/// change them in memory, write a temp file next to the target and rename it
/// into place. Readers therefore always see a complete file and skip the lock.
pub struct FlatFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// A row as read from disk. Rows that fail to decode or parse are carried
/// through rewrites byte for byte so a bad cell never costs data. Their id
/// stays reserved and their email stays taken.
enum Entry {
    Record(SubmissionRecord),
    Malformed {
        id: Option<i64>,
        email: Option<String>,
        raw: ByteRecord,
    },
}

struct Columns {
    idx: [usize; 8],
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> anyhow::Result<Self> {
        let mut idx = [0usize; 8];
        for (slot, field) in idx.iter_mut().zip(USER_FIELDS) {
            let pos = headers.iter().position(|h| h.trim() == field).or_else(|| {
                // files written by the first version of the service
                (field == "analysis_report")
                    .then(|| headers.iter().position(|h| h.trim() == "analysis_data"))
                    .flatten()
            });
            *slot = pos.with_context(|| format!("users file is missing column '{}'", field))?;
        }
        Ok(Self { idx })
    }

    fn get<'r>(&self, row: &'r StringRecord, col: usize) -> &'r str {
        row.get(self.idx[col]).unwrap_or("")
    }

    /// A single cell of an undecodable row, if that cell alone is valid UTF-8.
    fn raw_text<'r>(&self, row: &'r ByteRecord, col: usize) -> Option<&'r str> {
        row.get(self.idx[col])
            .and_then(|cell| std::str::from_utf8(cell).ok())
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
    }

    fn parse(&self, row: &StringRecord) -> anyhow::Result<SubmissionRecord> {
        let id = self.get(row, 0);
        let id: i64 = id
            .trim()
            .parse()
            .with_context(|| format!("invalid id '{}'", id))?;
        let report = self.get(row, 7);

        Ok(SubmissionRecord {
            id,
            first_name: self.get(row, 1).to_string(),
            last_name: self.get(row, 2).to_string(),
            address: self.get(row, 3).to_string(),
            email: self.get(row, 4).to_string(),
            created_at: parse_timestamp(self.get(row, 5))?,
            analysis_completed: parse_bool(self.get(row, 6))?,
            analysis_report: (!report.is_empty()).then(|| report.to_string()),
        })
    }

    fn decode(&self, raw: ByteRecord) -> anyhow::Result<SubmissionRecord> {
        let row = StringRecord::from_byte_record(raw)
            .map_err(|e| anyhow::anyhow!("row is not UTF-8: {}", e.utf8_error()))?;
        self.parse(&row)
    }

    fn malformed(&self, raw: ByteRecord) -> Entry {
        Entry::Malformed {
            id: self.raw_text(&raw, 0).and_then(|id| id.parse().ok()),
            email: self.raw_text(&raw, 4).map(normalize_email),
            raw,
        }
    }
}

impl FlatFileStore {
    /// Open (and create, with a header row, if missing) the users file.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let store = Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        };
        if !path.exists() {
            store.write_all(&[])?;
        }
        Ok(store)
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("users file lock poisoned"))
    }

    /// Every row on disk. An I/O failure mid-file fails the whole read so a
    /// following rewrite can never truncate the file.
    fn read_all(&self) -> anyhow::Result<Vec<Entry>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open {}", self.path.display()))
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let headers = reader
            .byte_headers()
            .with_context(|| format!("failed to read header of {}", self.path.display()))?
            .clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let headers = StringRecord::from_byte_record(headers).map_err(|e| {
            anyhow::anyhow!(
                "header of {} is not UTF-8: {}",
                self.path.display(),
                e.utf8_error()
            )
        })?;
        let columns = Columns::from_headers(&headers)?;

        let mut entries = Vec::new();
        for (line, row) in reader.byte_records().enumerate() {
            let row = row.with_context(|| {
                format!("failed to read line {} of {}", line + 2, self.path.display())
            })?;
            match columns.decode(row.clone()) {
                Ok(rec) => entries.push(Entry::Record(rec)),
                Err(e) => {
                    tracing::warn!(
                        file = %self.path.display(),
                        line = line + 2,
                        error = %e,
                        "skipping malformed users row"
                    );
                    entries.push(columns.malformed(row));
                }
            }
        }
        Ok(entries)
    }

    fn records(&self) -> anyhow::Result<Vec<SubmissionRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter_map(|e| match e {
                Entry::Record(rec) => Some(rec),
                Entry::Malformed { .. } => None,
            })
            .collect())
    }

    fn write_all(&self, entries: &[Entry]) -> anyhow::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(tmp.as_file_mut());
            writer.write_record(USER_FIELDS)?;
            for entry in entries {
                match entry {
                    Entry::Record(rec) => writer.write_record(&record_fields(rec))?,
                    Entry::Malformed { raw, .. } => writer.write_byte_record(raw)?,
                }
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn next_id(entries: &[Entry]) -> i64 {
        entries
            .iter()
            .filter_map(|e| match e {
                Entry::Record(rec) => Some(rec.id),
                Entry::Malformed { id, .. } => *id,
            })
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl RecordStore for FlatFileStore {
    fn create_or_get(&self, new: &NewRecord) -> anyhow::Result<(SubmissionRecord, bool)> {
        let _guard = self.lock()?;
        let mut entries = self.read_all()?;

        let email = normalize_email(&new.email);
        for entry in &entries {
            match entry {
                Entry::Record(rec) if rec.email_matches(&email) => return Ok((rec.clone(), false)),
                Entry::Malformed {
                    id,
                    email: Some(taken),
                    ..
                } if *taken == email => {
                    anyhow::bail!(
                        "email is held by unreadable users row {}; repair {} first",
                        id.map_or_else(|| "?".to_string(), |id| id.to_string()),
                        self.path.display()
                    );
                }
                _ => {}
            }
        }

        let rec = new.clone().into_record(Self::next_id(&entries), Utc::now());
        entries.push(Entry::Record(rec.clone()));
        self.write_all(&entries)?;
        Ok((rec, true))
    }

    fn get_by_id(&self, id: i64) -> anyhow::Result<Option<SubmissionRecord>> {
        Ok(self.records()?.into_iter().find(|r| r.id == id))
    }

    fn get_by_email(&self, email: &str) -> anyhow::Result<Option<SubmissionRecord>> {
        Ok(self.records()?.into_iter().find(|r| r.email_matches(email)))
    }

    fn list_all(&self) -> anyhow::Result<Vec<SubmissionRecord>> {
        self.records()
    }

    fn update(&self, id: i64, patch: &RecordPatch) -> anyhow::Result<Option<SubmissionRecord>> {
        let _guard = self.lock()?;
        let mut entries = self.read_all()?;

        let Some(rec) = entries.iter_mut().find_map(|e| match e {
            Entry::Record(rec) if rec.id == id => Some(rec),
            _ => None,
        }) else {
            return Ok(None);
        };
        rec.apply(patch);
        let updated = rec.clone();

        self.write_all(&entries)?;
        Ok(Some(updated))
    }

    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        let mut entries = self.read_all()?;

        let Some(pos) = entries
            .iter()
            .position(|e| matches!(e, Entry::Record(rec) if rec.id == id))
        else {
            return Ok(false);
        };
        entries.remove(pos);

        self.write_all(&entries)?;
        Ok(true)
    }

    fn kind(&self) -> &'static str {
        "csv"
    }
}
