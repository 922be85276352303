//! Postnet node binary.
//!
//! Runs either the membership tracker or a miner, until interrupted.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// A proof-of-work gossip blockchain node.
#[derive(Parser, Debug)]
#[command(name = "postnet-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    role: Role,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Run the membership tracker.
    Tracker {
        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Run a miner.
    Miner {
        /// Port to serve on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Port of the tracker to register with
        #[arg(short, long, default_value = "8080")]
        tracker_port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting postnet-node v{}", env!("CARGO_PKG_VERSION"));

    match args.role {
        Role::Tracker { port } => {
            let tracker = postnet_tracker::Tracker::start(port).await?;
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            tracker.shutdown().await;
        }
        Role::Miner { port, tracker_port } => {
            let miner = postnet_miner::Miner::start(port, tracker_port).await?;
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            miner.shutdown().await;
        }
    }

    info!("postnet-node stopped");
    Ok(())
}
