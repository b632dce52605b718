use anyhow::Result;
use backyard_core::config::{load_config, ServiceConfig};
use backyard_server::server;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML config; BACKYARD_* variables override it.
    #[arg(long, env = "BACKYARD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides config and BACKYARD_BIND.
    #[arg(long)]
    bind: Option<String>,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    cfg.apply_env()?;
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }

    init_logging(&cfg.log_level);

    tracing::info!(
        event = "server_start",
        config_file = ?args.config,
        bind = %cfg.bind,
        storage = cfg.storage.backend.as_str(),
        data_path = ?cfg.storage.resolved_path(),
        imagery = cfg.maps_api_key.is_some(),
    );

    server::run(cfg).await
}
