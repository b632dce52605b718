use super::exit_codes;
use crate::cli::args::{IdArgs, ListArgs, StorageArgs};
use backyard_core::SubmissionRecord;
use chrono::SecondsFormat;

pub fn cmd_list(storage: &StorageArgs, args: ListArgs) -> anyhow::Result<i32> {
    let records = storage.open()?.list_all()?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for rec in &records {
            println!("{}", summary_line(rec));
        }
        eprintln!("{} records", records.len());
    }
    Ok(exit_codes::OK)
}

pub fn cmd_show(storage: &StorageArgs, args: IdArgs) -> anyhow::Result<i32> {
    match storage.open()?.get_by_id(args.id)? {
        Some(rec) => {
            println!("{}", serde_json::to_string_pretty(&rec)?);
            Ok(exit_codes::OK)
        }
        None => {
            eprintln!("user {} not found", args.id);
            Ok(exit_codes::NOT_FOUND)
        }
    }
}

pub fn cmd_delete(storage: &StorageArgs, args: IdArgs) -> anyhow::Result<i32> {
    if storage.open()?.delete(args.id)? {
        eprintln!("deleted user {}", args.id);
        Ok(exit_codes::OK)
    } else {
        eprintln!("user {} not found", args.id);
        Ok(exit_codes::NOT_FOUND)
    }
}

fn summary_line(rec: &SubmissionRecord) -> String {
    format!(
        "{:>5}  {:<32} {} {}  [{}]  {}  {}",
        rec.id,
        rec.email,
        rec.first_name,
        rec.last_name,
        rec.address,
        if rec.has_cached_report() {
            "analyzed"
        } else {
            "pending"
        },
        rec.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
