use super::args::*;
use backyard_core::config::{ServiceConfig, StorageBackend, StorageConfig};
use backyard_core::{open_store, RecordStore};
use std::sync::Arc;

pub mod export;
pub mod records;
pub mod report;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NOT_FOUND: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init => cmd_init(&cli.storage),
        Command::List(args) => records::cmd_list(&cli.storage, args),
        Command::Show(args) => records::cmd_show(&cli.storage, args),
        Command::Delete(args) => records::cmd_delete(&cli.storage, args),
        Command::Report(args) => report::cmd_report(&cli.storage, args),
        Command::Export(args) => export::cmd_export(&cli.storage, args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

impl StorageArgs {
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        let backend: StorageBackend = self.storage.parse()?;
        Ok(StorageConfig::new(backend, self.data.clone()))
    }

    /// Environment service config with the storage selection from the command line.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut cfg = ServiceConfig::default();
        cfg.apply_env()?;
        cfg.storage = self.storage_config()?;
        Ok(cfg)
    }

    pub fn open(&self) -> anyhow::Result<Arc<dyn RecordStore>> {
        let cfg = self.storage_config()?;
        open_store(&cfg)
    }
}

fn cmd_init(storage: &StorageArgs) -> anyhow::Result<i32> {
    let cfg = storage.storage_config()?;
    let store = open_store(&cfg)?;
    let count = store.list_all()?.len();

    match cfg.resolved_path() {
        Some(path) => eprintln!(
            "initialized {} storage at {} ({} records)",
            store.kind(),
            path.display(),
            count
        ),
        None => eprintln!("initialized {} storage (not persisted)", store.kind()),
    }
    Ok(exit_codes::OK)
}
