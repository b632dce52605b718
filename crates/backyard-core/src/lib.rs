pub mod config;
pub mod errors;
pub mod export;
pub mod model;
pub mod report;
pub mod storage;
pub mod workflow;

pub use errors::ServiceError;
pub use model::{NewRecord, PropertyReport, RecordPatch, SubmissionRecord};
pub use report::cache::ReportService;
pub use storage::{open_store, RecordStore};
