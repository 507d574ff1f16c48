//! L2 cache simulator - runs session workloads through the decorator chain

mod config;
mod workload;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::config::ChainConfig;
use crate::workload::{Chain, Workload};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chain config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of sessions
    #[arg(short, long, default_value_t = 1000)]
    sessions: u64,

    /// Distinct keys read by the sessions
    #[arg(short, long, default_value_t = 500)]
    keys: u64,

    /// Lookups per session
    #[arg(short, long, default_value_t = 20)]
    reads: u64,

    /// Roll back every n-th session (0 = always commit)
    #[arg(long, default_value_t = 10)]
    rollback_every: u64,

    /// Apply full memory pressure every n sessions (0 = never)
    #[arg(long, default_value_t = 100)]
    pressure_every: u64,

    /// Override the pin queue bound from the config
    #[arg(long)]
    pin_capacity: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ChainConfig::load(path)?,
        None => ChainConfig::default(),
    };
    if let Some(pin_capacity) = args.pin_capacity {
        config.soft.pin_capacity = pin_capacity;
    }

    info!("Starting l2sim v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache id: {}", config.id);
    info!("Pin capacity: {}", config.soft.pin_capacity);
    info!("Soft capacity: {}", config.soft.soft_capacity);

    let chain = Chain::build(&config)?;
    let report = chain.run(&Workload {
        sessions: args.sessions,
        keys: args.keys,
        reads: args.reads,
        rollback_every: args.rollback_every,
        pressure_every: args.pressure_every,
    })?;

    println!("\nSESSIONS:");
    println!("   Committed:    {}", report.commits);
    println!("   Rolled back:  {}", report.rollbacks);
    println!("   Loads:        {}", report.loads);
    println!("\nCACHE:");
    println!("   Entries:      {}", report.size);
    println!("   Pinned:       {}", report.pinned);
    println!("   Reclaimed:    {}", report.reclaimed);
    match report.hit_ratio {
        Some(ratio) => println!("   Hit ratio:    {:.2}%", ratio * 100.0),
        None => println!("   Hit ratio:    (logging disabled)"),
    }

    Ok(())
}
