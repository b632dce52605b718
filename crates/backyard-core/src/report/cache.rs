use crate::errors::ServiceError;
use crate::model::{PropertyReport, RecordPatch, SubmissionRecord};
use crate::report::generator::ReportGenerator;
use crate::report::imagery::{ImageryProvider, NoImagery};
use crate::storage::RecordStore;
use anyhow::Context;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lazily generates a record's report and persists it on first request.
///
/// A stored report is returned as-is forever: there is no expiry and the
/// public workflow has no invalidation path. Generation runs under a
/// service-wide lock and re-checks the record, so concurrent first requests
/// for one record persist exactly one report.
///
/// Imagery links carry the maps API key, so they are attached to the returned
/// report only and never written to the record.
pub struct ReportService {
    store: Arc<dyn RecordStore>,
    generator: Arc<dyn ReportGenerator>,
    imagery: Arc<dyn ImageryProvider>,
    generation: Mutex<()>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>, generator: Arc<dyn ReportGenerator>) -> Self {
        Self {
            store,
            generator,
            imagery: Arc::new(NoImagery),
            generation: Mutex::new(()),
        }
    }

    pub fn with_imagery(mut self, imagery: Arc<dyn ImageryProvider>) -> Self {
        self.imagery = imagery;
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn get_or_generate(&self, id: i64) -> Result<PropertyReport, ServiceError> {
        let record = self.load(id)?;
        if let Some(report) = cached_report(&record)? {
            tracing::debug!(id, "report cache hit");
            return Ok(self.decorate(report, &record));
        }

        let _guard = self.lock()?;
        // another request may have filled it while we waited
        let record = self.load(id)?;
        if let Some(report) = cached_report(&record)? {
            tracing::debug!(id, "report cache hit after wait");
            return Ok(self.decorate(report, &record));
        }

        tracing::info!(id, "report cache miss, generating");
        self.generate_and_store(&record)
    }

    /// Replace the stored report unconditionally. Admin tooling only.
    pub fn regenerate(&self, id: i64) -> Result<PropertyReport, ServiceError> {
        let _guard = self.lock()?;
        let record = self.load(id)?;
        tracing::info!(id, "forced report regeneration");
        self.generate_and_store(&record)
    }

    fn load(&self, id: i64) -> Result<SubmissionRecord, ServiceError> {
        self.store
            .get_by_id(id)?
            .ok_or(ServiceError::NotFound { id })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.generation
            .lock()
            .map_err(|_| ServiceError::storage(anyhow::anyhow!("report generation lock poisoned")))
    }

    fn decorate(&self, mut report: PropertyReport, record: &SubmissionRecord) -> PropertyReport {
        report.imagery = self.imagery.imagery_for(&record.address);
        report
    }

    fn generate_and_store(&self, record: &SubmissionRecord) -> Result<PropertyReport, ServiceError> {
        let mut report = self.generator.generate(record);
        report.imagery = None;
        let json = serde_json::to_string(&report).context("failed to serialize report")?;

        // the record can vanish between load and update via a low-level delete
        self.store
            .update(record.id, &RecordPatch::completed_report(json))?
            .ok_or(ServiceError::NotFound { id: record.id })?;
        Ok(self.decorate(report, record))
    }
}

fn cached_report(record: &SubmissionRecord) -> Result<Option<PropertyReport>, ServiceError> {
    if !record.has_cached_report() {
        return Ok(None);
    }
    let raw = record.analysis_report.as_deref().unwrap_or_default();
    let report = serde_json::from_str(raw)
        .with_context(|| format!("stored report for user {} is unreadable", record.id))?;
    Ok(Some(report))
}
