use crate::config::{StorageBackend, StorageConfig};
use crate::model::{NewRecord, RecordPatch, SubmissionRecord};
use anyhow::Context;
use std::sync::Arc;

pub mod flat_file;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence for submission records.
///
/// Every backend serializes its mutations behind one store-wide lock, and
/// `create_or_get` performs the case-insensitive email lookup under that same
/// lock, so at most one record exists per normalized email.
pub trait RecordStore: Send + Sync {
    /// Insert `new` unless a record with the same email (ignoring case)
    /// exists. Returns the stored record and whether it was created.
    fn create_or_get(&self, new: &NewRecord) -> anyhow::Result<(SubmissionRecord, bool)>;

    /// Idempotent create: a duplicate email yields the existing record unchanged.
    fn create(&self, new: &NewRecord) -> anyhow::Result<SubmissionRecord> {
        Ok(self.create_or_get(new)?.0)
    }

    fn get_by_id(&self, id: i64) -> anyhow::Result<Option<SubmissionRecord>>;

    fn get_by_email(&self, email: &str) -> anyhow::Result<Option<SubmissionRecord>>;

    /// All records in insertion order.
    fn list_all(&self) -> anyhow::Result<Vec<SubmissionRecord>>;

    /// Merge `patch` into record `id`. `Ok(None)` when the id is unknown.
    fn update(&self, id: i64, patch: &RecordPatch) -> anyhow::Result<Option<SubmissionRecord>>;

    fn delete(&self, id: i64) -> anyhow::Result<bool>;

    fn kind(&self) -> &'static str;
}

/// Build the configured backend. Called once per process; the result is shared.
pub fn open_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match cfg.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::FlatFile => {
            let path = cfg
                .resolved_path()
                .context("flat-file storage requires a path")?;
            Arc::new(FlatFileStore::open(&path)?)
        }
        StorageBackend::Sqlite => {
            let path = cfg.resolved_path().context("sqlite storage requires a path")?;
            let store = if path.as_os_str() == ":memory:" {
                SqliteStore::memory()?
            } else {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                SqliteStore::open(&path)?
            };
            store.init_schema()?;
            Arc::new(store)
        }
    };

    tracing::info!(
        backend = store.kind(),
        path = ?cfg.resolved_path(),
        "record store opened"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_memory_store() {
        let store = open_store(&StorageConfig::memory()).unwrap();
        assert_eq!(store.kind(), "memory");
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn open_sqlite_in_memory() {
        let cfg = StorageConfig::new(StorageBackend::Sqlite, Some(":memory:".into()));
        let store = open_store(&cfg).unwrap();
        assert_eq!(store.kind(), "sqlite");
        let rec = store
            .create(&NewRecord::new("A", "B", "1 Road", "a@b.c"))
            .unwrap();
        assert_eq!(rec.id, 1);
    }

    #[test]
    fn open_flat_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/users.csv");
        let cfg = StorageConfig::new(StorageBackend::FlatFile, Some(path.clone()));
        let store = open_store(&cfg).unwrap();
        assert_eq!(store.kind(), "csv");
        assert!(path.exists());
    }
}
