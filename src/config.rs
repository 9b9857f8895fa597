//! Process configuration
//!
//! Port and drone identifier are positional and optional:
//! `drone-simulator [PORT] [DRONE_ID] [--seed N]`.

use clap::Parser;
use dronesim_shared::sim;

/// Simulated drone GPS telemetry over WebSocket
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "drone-simulator", version, about)]
pub struct SimulatorConfig {
    /// TCP port to listen on (all interfaces)
    #[arg(default_value_t = sim::DEFAULT_PORT)]
    pub port: u16,

    /// Drone identifier reported in every frame
    #[arg(default_value = sim::DEFAULT_DRONE_ID)]
    pub drone_id: String,

    /// Seed for reproducible position noise; connection N uses seed + N
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    /// Address the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            port: sim::DEFAULT_PORT,
            drone_id: sim::DEFAULT_DRONE_ID.into(),
            seed: None,
        }
    }
}
