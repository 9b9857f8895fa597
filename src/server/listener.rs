//! TCP listener and accept loop

use crate::config::SimulatorConfig;
use crate::session::DroneSession;
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Accepts clients and runs one independent session task per connection
pub struct SimulatorServer {
    listener: TcpListener,
    config: SimulatorConfig,
    next_session: u64,
}

impl SimulatorServer {
    /// Bind the configured port on all interfaces
    pub async fn bind(config: SimulatorConfig) -> Result<Self> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        Ok(Self::from_listener(listener, config))
    }

    /// Serve on an already bound listener
    pub fn from_listener(listener: TcpListener, config: SimulatorConfig) -> Self {
        Self {
            listener,
            config,
            next_session: 0,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Incoming connection from: {}", addr);
                        let index = self.next_session;
                        self.next_session += 1;
                        let session = DroneSession::new(
                            addr,
                            self.config.drone_id.clone(),
                            session_rng(self.config.seed, index),
                        );
                        tokio::spawn(async move {
                            if let Err(e) = session.run(stream).await {
                                error!("Error during WebSocket handling: {:#}", e);
                            }
                        });
                    }
                    Err(e) => {
                        // Per-connection failures (e.g. reset before accept) are not fatal
                        warn!("Accept failed: {}", e);
                    }
                },
            }
        }
    }
}

/// Noise generator for the `index`th session
fn session_rng(seed: Option<u64>, index: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(index)),
        None => ChaCha8Rng::from_entropy(),
    }
}
