//! Per-connection session handling
//!
//! This module handles:
//! - WebSocket handshake and the connection-established frame
//! - The telemetry publisher, sole owner of the trajectory model
//! - The inbound drain, which parses and logs client messages
//! - Joint shutdown of both when either one stops

mod connection;
mod drain;
mod publisher;

pub use connection::DroneSession;
