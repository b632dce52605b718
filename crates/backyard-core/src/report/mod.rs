//! Property analysis reports: generation, optional imagery, and the
//! per-record cache that makes a report permanent once created.

pub mod cache;
pub mod generator;
pub mod imagery;

pub use cache::ReportService;
pub use generator::{generate_report, RandomReportGenerator, ReportGenerator};
pub use imagery::{ImageryProvider, NoImagery, StaticMapsImagery};
