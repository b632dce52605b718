use backyard_core::config::{StorageBackend, StorageConfig};
use backyard_core::model::{NewRecord, RecordPatch};
use backyard_core::storage::{open_store, RecordStore};
use std::sync::Arc;
use tempfile::TempDir;

fn backends(dir: &TempDir) -> Vec<Arc<dyn RecordStore>> {
    vec![
        open_store(&StorageConfig::memory()).unwrap(),
        open_store(&StorageConfig::new(
            StorageBackend::Sqlite,
            Some(dir.path().join("leads.db")),
        ))
        .unwrap(),
        open_store(&StorageConfig::new(
            StorageBackend::FlatFile,
            Some(dir.path().join("users.csv")),
        ))
        .unwrap(),
    ]
}

fn lead(n: usize) -> NewRecord {
    NewRecord::new(
        format!("First{n}"),
        format!("Last{n}"),
        format!("{n} Main St"),
        format!("lead{n}@example.com"),
    )
}

#[test]
fn distinct_emails_grow_the_store_by_one() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        for n in 0..5 {
            let before = store.list_all()?.len();
            store.create(&lead(n))?;
            assert_eq!(store.list_all()?.len(), before + 1, "backend {}", store.kind());
        }

        let emails: Vec<_> = store.list_all()?.into_iter().map(|r| r.email).collect();
        let expected: Vec<_> = (0..5).map(|n| format!("lead{n}@example.com")).collect();
        assert_eq!(emails, expected, "insertion order, backend {}", store.kind());
    }
    Ok(())
}

#[test]
fn duplicate_email_any_case_returns_existing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        let first = store.create(&NewRecord::new("Test", "User", "123 Main St", "test@example.com"))?;

        let (again, created) = store.create_or_get(&NewRecord::new(
            "Someone",
            "Else",
            "77 Other Rd",
            "Test@EXAMPLE.com",
        ))?;

        assert!(!created, "backend {}", store.kind());
        assert_eq!(again, first, "backend {}", store.kind());
        assert_eq!(store.list_all()?.len(), 1);
        assert_eq!(store.get_by_email("TEST@example.COM")?, Some(first));

        let accented = store.create(&NewRecord::new("Émile", "Zola", "5 Rue", "ÉMILE@example.com"))?;
        let (again, created) =
            store.create_or_get(&NewRecord::new("E", "Z", "6 Rue", "émile@example.com"))?;
        assert!(!created, "non-ascii case, backend {}", store.kind());
        assert_eq!(again, accented, "backend {}", store.kind());
        assert_eq!(store.list_all()?.len(), 2);
    }
    Ok(())
}

#[test]
fn new_records_start_without_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        let rec = store.create(&lead(1))?;
        assert_eq!(rec.id, 1, "fresh store starts at 1, backend {}", store.kind());
        assert!(!rec.analysis_completed);
        assert!(rec.analysis_report.is_none());
        assert_eq!(store.get_by_id(rec.id)?, Some(rec));
    }
    Ok(())
}

#[test]
fn update_merges_and_persists() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        let rec = store.create(&lead(1))?;

        let patch = RecordPatch {
            address: Some("500 New Address".into()),
            ..RecordPatch::completed_report(r#"{"ok":true}"#.into())
        };
        let updated = store.update(rec.id, &patch)?.expect("known id");

        assert_eq!(updated.address, "500 New Address");
        assert_eq!(updated.first_name, rec.first_name);
        assert_eq!(updated.created_at, rec.created_at);
        assert!(updated.analysis_completed);
        assert_eq!(store.get_by_id(rec.id)?, Some(updated));

        assert!(store.update(404, &patch)?.is_none(), "backend {}", store.kind());
    }
    Ok(())
}

#[test]
fn delete_reports_presence() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        let a = store.create(&lead(1))?;
        let b = store.create(&lead(2))?;

        assert!(store.delete(a.id)?);
        assert!(!store.delete(a.id)?);
        assert_eq!(store.get_by_id(a.id)?, None);
        assert_eq!(store.list_all()?, vec![b]);
    }
    Ok(())
}

#[test]
fn file_backed_stores_survive_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let configs = [
        StorageConfig::new(StorageBackend::Sqlite, Some(dir.path().join("leads.db"))),
        StorageConfig::new(StorageBackend::FlatFile, Some(dir.path().join("users.csv"))),
    ];

    for cfg in &configs {
        let rec = open_store(cfg)?.create(&lead(9))?;
        let reopened = open_store(cfg)?;
        assert_eq!(reopened.get_by_id(rec.id)?, Some(rec));
    }
    Ok(())
}

#[test]
fn concurrent_duplicate_submissions_create_one_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for store in backends(&dir) {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let email = if i % 2 == 0 { "race@example.com" } else { "RACE@example.com" };
                    store.create_or_get(&NewRecord::new("R", "C", "1 St", email))
                })
            })
            .collect();

        let mut created = 0;
        let mut ids = Vec::new();
        for h in handles {
            let (rec, is_new) = h.join().expect("thread")?;
            created += usize::from(is_new);
            ids.push(rec.id);
        }

        assert_eq!(created, 1, "backend {}", store.kind());
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.list_all()?.len(), 1);
    }
    Ok(())
}
