//! Individual client session handling

use super::drain::drain;
use super::publisher::Publisher;
use anyhow::{Context, Result};
use dronesim_shared::{codec, sim, OutboundFrame, TrajectoryModel};
use futures::{SinkExt, StreamExt};
use rand_chacha::ChaCha8Rng;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

/// Upper bound on flushing the Close frame once a session is over
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Which half of the session finished first
#[derive(Debug)]
pub enum SessionEnd {
    /// A telemetry send failed
    Publisher(anyhow::Error),
    /// The peer closed the connection cleanly
    PeerClosed,
    /// Receiving failed
    Drain(anyhow::Error),
}

/// Counters reported when a session ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_sent: u64,
    pub messages_received: u64,
}

/// One connected client and its simulated drone
pub struct DroneSession {
    addr: SocketAddr,
    drone_id: String,
    rng: ChaCha8Rng,
}

impl DroneSession {
    pub fn new(addr: SocketAddr, drone_id: impl Into<String>, rng: ChaCha8Rng) -> Self {
        Self {
            addr,
            drone_id: drone_id.into(),
            rng,
        }
    }

    /// Upgrade the stream to WebSocket and serve telemetry until either side stops
    pub async fn run<S>(self, stream: S) -> Result<SessionStats>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let addr = self.addr;
        let ws = accept_async_with_config(stream, Some(transport_config()))
            .await
            .with_context(|| format!("WebSocket handshake with {} failed", addr))?;
        info!("WebSocket connection established with: {}", addr);

        let (mut sink, mut inbound) = ws.split();

        let model = TrajectoryModel::new(
            sim::BASE_LATITUDE,
            sim::BASE_LONGITUDE,
            sim::BASE_ALTITUDE,
            self.rng,
        );

        let welcome = codec::encode(&OutboundFrame::welcome(&self.drone_id))?;
        sink.send(Message::text(welcome))
            .await
            .context("Error sending welcome message")?;

        let publisher = Publisher::new(self.drone_id, model, sim::TICK_INTERVAL);
        let mut stats = SessionStats::default();
        let SessionStats {
            frames_sent,
            messages_received,
        } = &mut stats;

        // Whichever future finishes first wins; the other is dropped here,
        // which cancels it and releases the model
        let end = tokio::select! {
            result = publisher.run(&mut sink, frames_sent) => match result {
                Ok(never) => match never {},
                Err(e) => SessionEnd::Publisher(e),
            },
            result = drain(&mut inbound, sim::INBOUND_DELAY, messages_received) => match result {
                Ok(()) => SessionEnd::PeerClosed,
                Err(e) => SessionEnd::Drain(e),
            },
        };

        // Sends our Close frame, or the reply tungstenite queued for the peer's
        if let Err(e) = timeout(CLOSE_TIMEOUT, sink.close())
            .await
            .map_err(anyhow::Error::from)
            .and_then(|closed| closed.map_err(anyhow::Error::from))
        {
            debug!("Closing handshake with {} not completed: {}", addr, e);
        }

        log_end(addr, &end, &stats);
        Ok(stats)
    }
}

/// Oversized inbound messages fail the read and end the session
fn transport_config() -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.max_message_size = Some(codec::MAX_INBOUND_SIZE);
    config.max_frame_size = Some(codec::MAX_INBOUND_SIZE);
    config
}

fn log_end(addr: SocketAddr, end: &SessionEnd, stats: &SessionStats) {
    match end {
        SessionEnd::PeerClosed => info!(
            "Client {} disconnected ({} frames sent, {} messages received)",
            addr, stats.frames_sent, stats.messages_received
        ),
        SessionEnd::Publisher(e) | SessionEnd::Drain(e) if is_disconnect(e) => info!(
            "Client {} disconnected: {} ({} frames sent, {} messages received)",
            addr, e, stats.frames_sent, stats.messages_received
        ),
        SessionEnd::Publisher(e) => warn!("Error in physics loop for {}: {}", addr, e),
        SessionEnd::Drain(e) => warn!("Error handling messages from {}: {}", addr, e),
    }
}

/// True for errors that just mean the peer went away
fn is_disconnect(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<WsError>(),
        Some(
            WsError::ConnectionClosed
                | WsError::AlreadyClosed
                | WsError::Io(_)
                | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
        )
    )
}
