//! Wire protocol types
//!
//! Outbound frames are tagged with a `type` field (`info` or `gps`). Inbound
//! frames are free-form JSON; only their `type` field is inspected.

use crate::trajectory::TrajectoryModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A three-axis quantity in (lat, lng, alt) order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

impl Axes {
    pub fn new(lat: f64, lng: f64, alt: f64) -> Self {
        Self { lat, lng, alt }
    }
}

/// Telemetry snapshot sent once per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsUpdate {
    pub drone_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub velocity: Axes,
    pub acceleration: Axes,
    pub target: Axes,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

impl GpsUpdate {
    /// Capture the current state of a trajectory model
    pub fn snapshot<R>(
        drone_id: impl Into<String>,
        model: &TrajectoryModel<R>,
        timestamp: String,
    ) -> Self {
        Self {
            drone_id: drone_id.into(),
            latitude: model.latitude(),
            longitude: model.longitude(),
            altitude: model.altitude(),
            velocity: model.velocity(),
            acceleration: model.acceleration(),
            target: model.target(),
            timestamp,
        }
    }
}

/// Frames sent from the simulator to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Connection-established notice
    Info { message: String, drone_id: String },
    /// Periodic telemetry
    Gps(GpsUpdate),
}

impl OutboundFrame {
    /// Create the connection-established frame
    pub fn welcome(drone_id: impl Into<String>) -> Self {
        OutboundFrame::Info {
            message: crate::sim::WELCOME_MESSAGE.into(),
            drone_id: drone_id.into(),
        }
    }
}

/// Known inbound message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// Client session initialisation request
    Init,
    /// Client acknowledged a telemetry frame
    GpsAck,
    /// Any other `type` value
    Other(String),
    /// Valid JSON without a string `type` field
    Untyped,
}

/// A parsed inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub kind: InboundKind,
    pub body: Value,
}

impl InboundMessage {
    /// Classify a parsed JSON value by its `type` field
    pub fn from_value(body: Value) -> Self {
        let kind = match body.get("type").and_then(Value::as_str) {
            Some("init") => InboundKind::Init,
            Some("gps_ack") => InboundKind::GpsAck,
            Some(other) => InboundKind::Other(other.to_string()),
            None => InboundKind::Untyped,
        };
        Self { kind, body }
    }
}
