//! WebSocket telemetry server
//!
//! Binds the listen port and hands every accepted connection to its own
//! session task. Sessions share nothing, so one failing never touches the
//! listener or its siblings.

mod listener;

pub use listener::SimulatorServer;
