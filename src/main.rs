//! encounterd - tabletop encounter session daemon

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use encounterd::{Config, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tabletop encounter session daemon
#[derive(Parser, Debug)]
#[command(name = "encounterd", version, about = "Run the encounter session daemon")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config file and environment)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory for keyed session snapshots (overrides config file and environment)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encounterd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load config, CLI flags winning over file and environment
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    // Create and run server
    let server = Server::new(config);
    server.run().await?;

    Ok(())
}
