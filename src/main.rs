// src/main.rs
use anyhow::Context;
use clap::Parser;
use dexscreener_mcp::{
    config::load_config_with,
    server::{Server, SERVER_NAME},
    utils::setup_logging,
    Dispatcher,
};
use log::{error, info, warn};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "dexscreener-mcp", version, about = "DexScreener market data over JSON-RPC on stdio")]
struct Args {
    /// Upstream base URL (overrides DEXSCREENER_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Log level: error, warn, info, debug or trace (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config_with(|config| {
        if let Some(base_url) = args.base_url {
            config.base_url = base_url;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }
    })
    .context("invalid configuration")?;

    setup_logging(&config.log_level).context("failed to initialize logging")?;
    config.log_settings();

    let dispatcher = Dispatcher::from_config(&config).context("failed to build dispatcher")?;
    let server = Arc::new(Server::new(dispatcher));
    info!("{} running on stdio", SERVER_NAME);

    tokio::select! {
        result = server.clone().run(tokio::io::stdin(), tokio::io::stdout()) => {
            if let Err(e) = result {
                error!("stdio loop failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
        }
    }

    for usage in server.dispatcher().pool_usage() {
        info!("Quota {}", usage);
    }
    Ok(())
}
