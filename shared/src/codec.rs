//! JSON codec for WebSocket text frames
//!
//! Every frame is a single JSON object carried in one WebSocket text message.
//! Outbound frames always encode; inbound payloads may be arbitrary text and
//! are rejected with a [`CodecError`] when they are not JSON.

use thiserror::Error;

use crate::protocol::{InboundMessage, OutboundFrame};

/// Maximum inbound payload size (1 MB) accepted for parsing
pub const MAX_INBOUND_SIZE: usize = 1024 * 1024;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Message too large: {0} bytes (max: {MAX_INBOUND_SIZE})")]
    MessageTooLarge(usize),

    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode an outbound frame as JSON text
pub fn encode(frame: &OutboundFrame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode an outbound frame (client side)
pub fn decode_frame(text: &str) -> Result<OutboundFrame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse an inbound text payload
pub fn decode_inbound(text: &str) -> Result<InboundMessage, CodecError> {
    if text.len() > MAX_INBOUND_SIZE {
        return Err(CodecError::MessageTooLarge(text.len()));
    }

    let body = serde_json::from_str(text)?;
    Ok(InboundMessage::from_value(body))
}

/// Parse an inbound binary payload, which must hold UTF-8 JSON
pub fn decode_inbound_bytes(data: &[u8]) -> Result<InboundMessage, CodecError> {
    if data.len() > MAX_INBOUND_SIZE {
        return Err(CodecError::MessageTooLarge(data.len()));
    }

    decode_inbound(std::str::from_utf8(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Axes, GpsUpdate, InboundKind};

    fn create_test_frame() -> OutboundFrame {
        OutboundFrame::Gps(GpsUpdate {
            drone_id: "test-drone".into(),
            latitude: 53.2,
            longitude: 63.6,
            altitude: 120.0,
            velocity: Axes::new(0.0, 0.00012, 0.0),
            acceleration: Axes::new(-0.000018, 0.0, 0.0),
            target: Axes::new(53.2, 63.6, 120.0),
            timestamp: "2024-05-01T12:30:00.000000+00:00".into(),
        })
    }

    #[test]
    fn test_encode_is_single_json_object() {
        let text = encode(&create_test_frame()).expect("encode failed");
        assert!(text.starts_with('{') && text.ends_with('}'));
        assert!(!text.contains('\n'));

        let decoded = decode_frame(&text).expect("decode failed");
        assert_eq!(decoded, create_test_frame());
    }

    #[test]
    fn test_decode_inbound_json() {
        let msg = decode_inbound(r#"{"type":"init","client":"web"}"#).expect("decode failed");
        assert_eq!(msg.kind, InboundKind::Init);
        assert_eq!(msg.body["client"], "web");
    }

    #[test]
    fn test_decode_inbound_rejects_garbage() {
        let result = decode_inbound("not json");
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn test_decode_inbound_bytes() {
        let msg = decode_inbound_bytes(br#"{"type":"gps_ack"}"#).expect("decode failed");
        assert_eq!(msg.kind, InboundKind::GpsAck);

        let result = decode_inbound_bytes(&[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(CodecError::InvalidUtf8(_))));
    }

    #[test]
    fn test_message_too_large() {
        let oversized = " ".repeat(MAX_INBOUND_SIZE + 1);
        let result = decode_inbound(&oversized);
        assert!(matches!(result, Err(CodecError::MessageTooLarge(_))));
    }
}
