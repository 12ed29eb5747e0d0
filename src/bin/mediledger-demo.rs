#![forbid(unsafe_code)]
//! Records two hand-offs of one product, mines a block and prints the audit trail.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use mediledger::blockchain::Ledger;
use mediledger::cli::{chain_table, history_table, init_tracing};
use mediledger::config::{load_config, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "mediledger-demo", about = "Run a sample product hand-off through the ledger")]
struct Args {
    /// Path to config.toml
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured difficulty (leading hex zeros)
    #[arg(short, long)]
    difficulty: Option<usize>,

    /// Product to track
    #[arg(long, default_value = "Product-1")]
    product: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(difficulty) = args.difficulty {
        config.ledger.difficulty = difficulty;
    }
    init_tracing(&config.logging.level);

    let mut ledger = Ledger::from_config(&config.ledger)?;

    let next = ledger.queue_transaction("Manufacturer", "Distributor", &args.product, "Received")?;
    ledger.queue_transaction("Distributor", "Pharmacy", &args.product, "Ready for Transport")?;
    println!(
        "{}",
        format!("📦 Queued {} hand-offs for block #{}", ledger.pending().len(), next).bright_cyan()
    );

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!(
        "║              ⛏️  MINING BLOCK {:<32}║",
        next
    );
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let last_proof = ledger.last_block()?.proof;
    let start_time = Instant::now();
    let proof = ledger.solve_proof_of_work(last_proof)?;
    let elapsed = start_time.elapsed();
    let block = ledger.seal_block(proof, None)?;

    println!(
        "{}",
        format!(
            "✅ Sealed block #{} with proof {} in {:.3} seconds",
            block.index,
            block.proof,
            elapsed.as_secs_f64()
        )
        .bright_green()
        .bold()
    );
    println!();
    println!("{}", "📜 CHAIN".bright_cyan().bold());
    println!("{}", chain_table(ledger.blocks()));
    println!();
    println!("{}", format!("🔎 TRACKING {}", args.product).bright_cyan().bold());
    println!("{}", history_table(&ledger.history(&args.product)));
    println!();

    if ledger.validate_chain() {
        println!("{}", "🔒 Chain verified: every link and proof checks out".bright_green());
    } else {
        println!("{}", "❌ Chain verification failed".red().bold());
    }

    Ok(())
}
