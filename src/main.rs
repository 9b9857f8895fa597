mod config;
mod server;
mod session;

use clap::Parser;
use config::SimulatorConfig;
use server::SimulatorServer;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = SimulatorConfig::parse();

    info!(
        "Drone simulator starting on {} with ID {}",
        config.bind_addr(),
        config.drone_id
    );
    if let Some(seed) = config.seed {
        info!("  Noise seed: {}", seed);
    }

    let server = SimulatorServer::bind(config).await?;
    info!("WebSocket server listening on: {}", server.local_addr()?);

    server.run_until(shutdown_signal()).await;

    info!("Shutting down drone simulator...");
    Ok(())
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
