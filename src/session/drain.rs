//! Inbound message drain
//!
//! Consumes client frames so the transport keeps flowing. Payloads are parsed
//! and logged; nothing is sent back.

use anyhow::Result;
use dronesim_shared::{codec, codec::CodecError, InboundKind, InboundMessage};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Read frames until the peer closes or the stream fails
///
/// Each data frame is held for `delay` before it is parsed. Returns `Ok` on a
/// close frame or end of stream.
pub async fn drain<St, E>(stream: &mut St, delay: Duration, received: &mut u64) -> Result<()>
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    while let Some(message) = stream.next().await {
        let parsed = match message? {
            Message::Text(text) => {
                sleep(delay).await;
                debug!("Received message: {}", text);
                codec::decode_inbound(&text)
            }
            Message::Binary(data) => {
                sleep(delay).await;
                debug!("Received binary message: {} bytes", data.len());
                codec::decode_inbound_bytes(&data)
            }
            Message::Close(frame) => {
                debug!("Close frame received: {:?}", frame);
                return Ok(());
            }
            // Pings are answered by the transport
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        *received += 1;
        match parsed {
            Ok(message) => handle_inbound(&message),
            Err(e) => warn_invalid(&e),
        }
    }

    Ok(())
}

/// Hook for inbound commands; currently log-only
pub fn handle_inbound(message: &InboundMessage) {
    match &message.kind {
        InboundKind::Init => info!("Initialization request received"),
        InboundKind::GpsAck => debug!("GPS acknowledgement received"),
        InboundKind::Other(kind) => info!("Unhandled message type: {}", kind),
        InboundKind::Untyped => debug!("Message without type: {}", message.body),
    }
}

fn warn_invalid(err: &CodecError) {
    warn!("Invalid JSON received: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::time::Instant;
    use tokio_tungstenite::tungstenite::Error as WsError;

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payloads_are_skipped() {
        let mut frames = stream::iter(vec![
            Ok::<_, WsError>(Message::text("not json")),
            Ok(Message::text(r#"{"type":"init"}"#)),
            Ok(Message::binary(vec![0xff, 0x00])),
            Ok(Message::text(r#"{"type":"gps_ack"}"#)),
        ]);
        let mut received = 0;

        let started = Instant::now();
        let result = drain(&mut frames, Duration::from_millis(100), &mut received).await;

        assert!(result.is_ok());
        assert_eq!(received, 4);
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_close_frame_ends_drain() {
        let mut frames = stream::iter(vec![
            Ok::<_, WsError>(Message::Close(None)),
            Ok(Message::text("never read")),
        ]);
        let mut received = 0;

        let result = drain(&mut frames, Duration::ZERO, &mut received).await;

        assert!(result.is_ok());
        assert_eq!(received, 0);
    }

    #[tokio::test]
    async fn test_receive_error_ends_drain() {
        let mut frames = stream::iter(vec![
            Ok(Message::text("{}")),
            Err(WsError::ConnectionClosed),
            Ok(Message::text("never read")),
        ]);
        let mut received = 0;

        let result = drain(&mut frames, Duration::ZERO, &mut received).await;

        assert!(result.is_err());
        assert_eq!(received, 1);
    }

    #[tokio::test]
    async fn test_control_frames_are_not_counted() {
        let mut frames = stream::iter(vec![
            Ok::<_, WsError>(Message::Ping(vec![1])),
            Ok(Message::Pong(vec![2])),
        ]);
        let mut received = 0;

        drain(&mut frames, Duration::ZERO, &mut received).await.unwrap();
        assert_eq!(received, 0);
    }
}
