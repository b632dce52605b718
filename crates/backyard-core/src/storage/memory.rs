use crate::model::{NewRecord, RecordPatch, SubmissionRecord};
use crate::storage::RecordStore;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    rows: Vec<SubmissionRecord>,
    last_id: i64,
}

/// In-process store for tests and throwaway demos. Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn create_or_get(&self, new: &NewRecord) -> anyhow::Result<(SubmissionRecord, bool)> {
        let mut state = self.lock()?;
        if let Some(rec) = state.rows.iter().find(|r| r.email_matches(&new.email)) {
            return Ok((rec.clone(), false));
        }

        state.last_id += 1;
        let rec = new.clone().into_record(state.last_id, Utc::now());
        state.rows.push(rec.clone());
        Ok((rec, true))
    }

    fn get_by_id(&self, id: i64) -> anyhow::Result<Option<SubmissionRecord>> {
        Ok(self.lock()?.rows.iter().find(|r| r.id == id).cloned())
    }

    fn get_by_email(&self, email: &str) -> anyhow::Result<Option<SubmissionRecord>> {
        Ok(self
            .lock()?
            .rows
            .iter()
            .find(|r| r.email_matches(email))
            .cloned())
    }

    fn list_all(&self) -> anyhow::Result<Vec<SubmissionRecord>> {
        Ok(self.lock()?.rows.clone())
    }

    fn update(&self, id: i64, patch: &RecordPatch) -> anyhow::Result<Option<SubmissionRecord>> {
        let mut state = self.lock()?;
        Ok(state.rows.iter_mut().find(|r| r.id == id).map(|r| {
            r.apply(patch);
            r.clone()
        }))
    }

    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        let before = state.rows.len();
        state.rows.retain(|r| r.id != id);
        Ok(state.rows.len() != before)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
