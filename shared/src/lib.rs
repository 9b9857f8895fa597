//! Drone Simulator Shared Types
//!
//! This crate provides the trajectory model, the wire protocol types and the
//! JSON codec used by the drone GPS simulator and its clients.

pub mod codec;
pub mod protocol;
pub mod trajectory;

use chrono::{DateTime, SecondsFormat, Utc};

// Re-export commonly used types at crate root
pub use protocol::{Axes, GpsUpdate, InboundKind, InboundMessage, OutboundFrame};
pub use trajectory::{TrajectoryModel, TrajectoryParams};

/// Format a UTC instant as an RFC 3339 string with an explicit `+00:00` offset
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Fixed simulation parameters
pub mod sim {
    use std::time::Duration;

    /// Latitude of the flight circle center (degrees)
    pub const BASE_LATITUDE: f64 = 53.218282;

    /// Longitude of the flight circle center (degrees)
    pub const BASE_LONGITUDE: f64 = 63.658686;

    /// Constant flight altitude (meters)
    pub const BASE_ALTITUDE: f64 = 120.0;

    /// Phase advance rate, roughly 42 seconds per lap
    pub const ANGULAR_SPEED: f64 = 0.15;

    /// Circle radius as a raw degree offset (~80m)
    pub const RADIUS_DEG: f64 = 0.0008;

    /// Fraction of the previous value retained by each smoothing step
    pub const SMOOTH_FACTOR: f64 = 0.95;

    /// Peak-to-peak amplitude of the position jitter (degrees)
    pub const NOISE_AMPLITUDE: f64 = 0.000001;

    /// Interval between telemetry frames (nominal 100 Hz)
    pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

    /// Simulated processing latency applied to every inbound frame
    pub const INBOUND_DELAY: Duration = Duration::from_millis(100);

    /// Default listen port
    pub const DEFAULT_PORT: u16 = 9002;

    /// Default simulated drone identifier
    pub const DEFAULT_DRONE_ID: &str = "drone-sim-1";

    /// Text of the connection-established frame
    pub const WELCOME_MESSAGE: &str = "Connected to drone simulator";
}
