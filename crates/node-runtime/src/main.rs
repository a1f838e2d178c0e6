//! # Node Runtime
//!
//! Entry point for the transaction-ingestion node.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration from `NT_*` environment variables
//! 3. Wire repository, keyring and orchestrator
//! 4. Run a processing pass every `NT_PASS_INTERVAL_SECS` until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    info!(
        node = %config.node_address,
        interval_secs = config.pass_interval_secs,
        max_chunk_size = config.orchestrator.codec.max_chunk_size,
        "Starting node runtime"
    );

    let runtime = Arc::new(NodeRuntime::new(config)?);
    let worker = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move { runtime.run().await })
    };

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown();
    worker.await.context("Pass loop panicked")?;
    info!("Shutdown complete");
    Ok(())
}
