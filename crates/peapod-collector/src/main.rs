//! Peapod collector: archives container log streams for platform apps

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use peapod_collector::{Collector, CollectorConfig, Switchboard};
use peapod_core::InMemoryAppRegistry;
use peapod_storage::ArchiveConfig;

#[derive(Parser)]
#[command(
    name = "peapod-collector",
    about = "Archives container log streams for platform applications",
    version
)]
struct Cli {
    /// Address the switchboard listens on
    #[arg(long, default_value = "0.0.0.0:9345")]
    bind: SocketAddr,

    /// Retained lines per application
    #[arg(long, default_value = "1000")]
    capacity: usize,

    /// Maximum bytes in a single log line
    #[arg(long, default_value = "65536")]
    max_line_bytes: usize,

    /// Register a pea at startup, as <pea>@<app>; repeatable
    ///
    /// Stands in for the platform registry on single-node setups.
    #[arg(long = "pea", value_name = "PEA@APP")]
    peas: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let registry = Arc::new(InMemoryAppRegistry::new());
    for entry in &cli.peas {
        let (pea, app) = entry
            .split_once('@')
            .with_context(|| format!("--pea {} must look like <pea>@<app>", entry))?;
        registry.register(pea, app);
    }
    tracing::info!(peas = registry.len(), "registry seeded");

    let config = CollectorConfig::default().with_bind(cli.bind).with_archive(
        ArchiveConfig::new()
            .with_capacity(cli.capacity)
            .with_max_line_bytes(cli.max_line_bytes),
    );

    let collector = Arc::new(Collector::new(registry, config.archive.clone()));
    let switchboard = Switchboard::bind(collector, config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tokio::select! {
        result = switchboard.serve() => {
            result.context("switchboard accept loop failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
