//! Tally main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tally_api::start_server;
use tally_config::Config;
use tally_core::{reload_shared, Ledger, LoadOutcome, SourceRef};
use tally_source::{FileRecordSource, HttpRecordSource};
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version = "0.1.0")]
#[command(about = "Expense ledger viewer: filters, sorting, paging and charts over a JSON backend", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Backend base URL, overrides the configuration file
    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (mut config, missing_config) = if args.config.exists() {
        let config = Config::load(args.config.clone())
            .inspect_err(|e| eprintln!("{}", e.to_details()))
            .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
        (config, false)
    } else {
        (Config::default(), true)
    };
    if let Some(url) = &args.backend_url {
        config = config.with_backend_url(url.clone());
    }

    let level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if missing_config {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    config
        .validate()
        .inspect_err(|e| log::error!("{}", e.to_details()))
        .context("Invalid configuration")?;

    let source: SourceRef = match &config.backend.fixture {
        Some(path) => Arc::new(FileRecordSource::new(path.clone())),
        None => Arc::new(
            HttpRecordSource::from_config(&config.backend).context("Failed to build HTTP client")?,
        ),
    };
    log::info!("Records from {}", source.describe());

    let rt = Runtime::new()?;
    rt.block_on(async {
        let ledger = Ledger::new(config.clone(), source).context("Failed to create ledger")?;
        let ledger = Arc::new(RwLock::new(ledger));

        match reload_shared(&ledger, &[]).await {
            LoadOutcome::Replaced { count } => log::info!("Loaded {} records", count),
            LoadOutcome::Failed { message } => {
                log::error!("Initial load failed: {}. Serving empty view until reload", message)
            }
            LoadOutcome::Superseded => {}
        }

        start_server(config, ledger).await.context("Server error")
    })
}
