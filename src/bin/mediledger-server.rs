#![forbid(unsafe_code)]
//! MediLedger REST server.

use clap::Parser;
use std::path::PathBuf;
use mediledger::api::{run_api_server, ApiState};
use mediledger::blockchain::Ledger;
use mediledger::cli::init_tracing;
use mediledger::config::{load_config, DEFAULT_CONFIG_PATH};
use mediledger::node::LedgerNode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mediledger-server", about = "Serve the ledger over HTTP")]
struct Args {
    /// Path to config.toml
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(bind) = args.bind {
        config.api.bind = bind;
    }
    init_tracing(&config.logging.level);

    info!(
        difficulty = config.ledger.difficulty,
        genesis_proof = config.ledger.genesis_proof,
        "starting MediLedger node"
    );
    let node = LedgerNode::new(Ledger::from_config(&config.ledger)?);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run_api_server(ApiState::new(node), &config.api, shutdown).await?;
    info!("server stopped");
    Ok(())
}
