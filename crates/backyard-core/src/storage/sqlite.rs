use crate::model::{normalize_email, NewRecord, RecordPatch, SubmissionRecord};
use crate::storage::schema::{format_timestamp, parse_timestamp, DDL};
use crate::storage::RecordStore;
use anyhow::Context;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_USERS: &str = "SELECT id, first_name, last_name, address, email, created_at,
        analysis_completed, analysis_report
     FROM users";

/// Embedded relational store. One connection behind one mutex; ids come from
/// SQLite's AUTOINCREMENT. Emails are matched on `email_norm`, filled from
/// [`normalize_email`], because `COLLATE NOCASE` only folds ASCII.
#[derive(Clone)]
pub struct SqliteStore {
    pub conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(DDL).context("failed to apply users schema")?;
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("sqlite connection lock poisoned"))
    }

    fn find_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<SubmissionRecord>> {
        let row = conn
            .query_row(
                &format!("{SELECT_USERS} WHERE id = ?1"),
                params![id],
                UserRow::read,
            )
            .optional()?;
        row.map(UserRow::into_record).transpose()
    }

    fn find_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<SubmissionRecord>> {
        let row = conn
            .query_row(
                &format!("{SELECT_USERS} WHERE email_norm = ?1 ORDER BY id LIMIT 1"),
                params![normalize_email(email)],
                UserRow::read,
            )
            .optional()?;
        row.map(UserRow::into_record).transpose()
    }
}

impl RecordStore for SqliteStore {
    fn create_or_get(&self, new: &NewRecord) -> anyhow::Result<(SubmissionRecord, bool)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(existing) = Self::find_by_email(&tx, &new.email)? {
            tx.commit()?;
            return Ok((existing, false));
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO users(first_name, last_name, address, email, email_norm, created_at, analysis_completed, analysis_report)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL)",
            params![
                new.first_name,
                new.last_name,
                new.address,
                new.email,
                normalize_email(&new.email),
                format_timestamp(&created_at)
            ],
        )
        .context("insert user")?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok((new.clone().into_record(id, created_at), true))
    }

    fn get_by_id(&self, id: i64) -> anyhow::Result<Option<SubmissionRecord>> {
        let conn = self.lock()?;
        Self::find_by_id(&conn, id)
    }

    fn get_by_email(&self, email: &str) -> anyhow::Result<Option<SubmissionRecord>> {
        let conn = self.lock()?;
        Self::find_by_email(&conn, email)
    }

    fn list_all(&self) -> anyhow::Result<Vec<SubmissionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_USERS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], UserRow::read)?;

        let mut out = Vec::new();
        for row in rows {
            let row = row?;
            let id = row.id;
            match row.into_record() {
                Ok(rec) => out.push(rec),
                Err(e) => tracing::warn!(id, error = %e, "skipping malformed user row"),
            }
        }
        Ok(out)
    }

    fn update(&self, id: i64, patch: &RecordPatch) -> anyhow::Result<Option<SubmissionRecord>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(mut rec) = Self::find_by_id(&tx, id)? else {
            return Ok(None);
        };
        rec.apply(patch);

        tx.execute(
            "UPDATE users SET first_name=?1, last_name=?2, address=?3,
                analysis_completed=?4, analysis_report=?5
             WHERE id=?6",
            params![
                rec.first_name,
                rec.last_name,
                rec.address,
                rec.analysis_completed,
                rec.analysis_report,
                id
            ],
        )
        .context("update user")?;
        tx.commit()?;

        Ok(Some(rec))
    }

    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let n = conn
            .execute("DELETE FROM users WHERE id=?1", params![id])
            .context("delete user")?;
        Ok(n > 0)
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}

struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    address: String,
    email: String,
    created_at: String,
    analysis_completed: bool,
    analysis_report: Option<String>,
}

impl UserRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            address: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
            analysis_completed: row.get(6)?,
            analysis_report: row.get(7)?,
        })
    }

    fn into_record(self) -> anyhow::Result<SubmissionRecord> {
        let created_at = parse_timestamp(&self.created_at)
            .with_context(|| format!("user {} has an invalid created_at", self.id))?;
        Ok(SubmissionRecord {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            email: self.email,
            created_at,
            analysis_completed: self.analysis_completed,
            analysis_report: self.analysis_report.filter(|r| !r.is_empty()),
        })
    }
}
