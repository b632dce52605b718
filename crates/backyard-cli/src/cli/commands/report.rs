use super::exit_codes;
use crate::cli::args::{ReportArgs, StorageArgs};
use backyard_core::report::imagery::provider_for;
use backyard_core::report::RandomReportGenerator;
use backyard_core::{ReportService, ServiceError};
use std::sync::Arc;

/// Print a record's report, generating and storing it on first use.
/// `--regenerate` replaces whatever is stored.
pub fn cmd_report(storage: &StorageArgs, args: ReportArgs) -> anyhow::Result<i32> {
    let cfg = storage.service_config()?;
    let store = storage.open()?;
    let reports = ReportService::new(store, Arc::new(RandomReportGenerator::from_config(&cfg)))
        .with_imagery(provider_for(cfg.maps_api_key.as_deref()));

    let result = if args.regenerate {
        reports.regenerate(args.id)
    } else {
        reports.get_or_generate(args.id)
    };

    match result {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(exit_codes::OK)
        }
        Err(ServiceError::NotFound { id }) => {
            eprintln!("user {} not found", id);
            Ok(exit_codes::NOT_FOUND)
        }
        Err(e) => Err(e.into()),
    }
}
