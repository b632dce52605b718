use super::exit_codes;
use crate::cli::args::{ExportArgs, StorageArgs};
use backyard_core::export::export_to_dir;

pub fn cmd_export(storage: &StorageArgs, args: ExportArgs) -> anyhow::Result<i32> {
    let store = storage.open()?;
    let path = export_to_dir(store.as_ref(), &args.out_dir)?;
    eprintln!("wrote file: {}", path.display());
    println!("{}", path.display());
    Ok(exit_codes::OK)
}
