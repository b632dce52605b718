use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "backyard",
    version,
    about = "Admin tooling for Backyard lead storage and property reports"
)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Clone, Debug)]
pub struct StorageArgs {
    /// storage backend: csv|sqlite|memory
    #[arg(long, global = true, env = "BACKYARD_STORAGE", default_value = "csv")]
    pub storage: String,

    /// data file; defaults to data/users.csv or data/backyard.db
    #[arg(long, global = true, env = "BACKYARD_DATA_PATH")]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data file or schema if missing
    Init,
    List(ListArgs),
    Show(IdArgs),
    Report(ReportArgs),
    Export(ExportArgs),
    Delete(IdArgs),
    Version,
}

#[derive(Parser, Clone, Debug)]
pub struct ListArgs {
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

#[derive(Parser, Clone, Debug)]
pub struct IdArgs {
    #[arg(long)]
    pub id: i64,
}

#[derive(Parser, Clone, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    pub id: i64,

    /// discard the stored report and generate a new one
    #[arg(long)]
    pub regenerate: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ExportArgs {
    #[arg(long, default_value = "exports")]
    pub out_dir: PathBuf,
}
