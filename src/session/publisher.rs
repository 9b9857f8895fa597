//! Telemetry publisher
//!
//! Owns the trajectory model for one connection and streams a `gps` frame
//! every tick until a send fails.

use anyhow::Result;
use chrono::{DateTime, Utc};
use dronesim_shared::{codec, format_timestamp, GpsUpdate, OutboundFrame, TrajectoryModel};
use futures::{Sink, SinkExt};
use rand::Rng;
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_tungstenite::tungstenite::Message;

/// Periodic telemetry source for a single connection
pub struct Publisher<R> {
    drone_id: String,
    model: TrajectoryModel<R>,
    tick: Duration,
    last_stamp: Option<DateTime<Utc>>,
}

impl<R: Rng> Publisher<R> {
    pub fn new(drone_id: impl Into<String>, model: TrajectoryModel<R>, tick: Duration) -> Self {
        Self {
            drone_id: drone_id.into(),
            model,
            tick,
            last_stamp: None,
        }
    }

    /// Run the tick loop, counting delivered frames in `frames_sent`
    ///
    /// Only returns when the sink rejects a frame. Dropping the future stops
    /// the loop and releases the model.
    pub async fn run<S>(mut self, sink: &mut S, frames_sent: &mut u64) -> Result<Infallible>
    where
        S: Sink<Message> + Unpin,
        S::Error: std::error::Error + Send + Sync + 'static,
    {
        let mut last_tick = Instant::now();

        loop {
            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_secs_f64();
            last_tick = now;

            self.model.advance(dt);

            let frame = self.next_frame();
            sink.send(Message::text(codec::encode(&frame)?)).await?;
            *frames_sent += 1;

            sleep(self.tick).await;
        }
    }

    fn next_frame(&mut self) -> OutboundFrame {
        let timestamp = self.next_timestamp();
        OutboundFrame::Gps(GpsUpdate::snapshot(&self.drone_id, &self.model, timestamp))
    }

    /// Wall-clock timestamp, never earlier than the previous one
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        format_timestamp(stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::StreamExt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_publisher() -> Publisher<ChaCha8Rng> {
        let model = TrajectoryModel::new(0.0, 0.0, 100.0, ChaCha8Rng::seed_from_u64(3));
        Publisher::new("test-drone", model, Duration::from_millis(10))
    }

    fn gps_of(message: Message) -> GpsUpdate {
        let text = message.into_text().expect("text frame");
        match codec::decode_frame(&text).expect("valid frame") {
            OutboundFrame::Gps(update) => update,
            other => panic!("expected gps frame, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_every_tick() {
        let (mut tx, rx) = mpsc::unbounded::<Message>();
        let mut frames_sent = 0;

        let result = tokio::time::timeout(
            Duration::from_millis(95),
            test_publisher().run(&mut tx, &mut frames_sent),
        )
        .await;
        assert!(result.is_err(), "publisher should still be running");
        drop(tx);

        let frames: Vec<GpsUpdate> = rx.map(gps_of).collect().await;
        assert_eq!(frames.len() as u64, frames_sent);
        assert_eq!(frames.len(), 10);

        for update in &frames {
            assert_eq!(update.drone_id, "test-drone");
            assert_eq!(update.altitude, 100.0);
            assert_eq!(update.velocity.alt, 0.0);
            assert_eq!(update.target.lat, update.latitude);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamps_non_decreasing() {
        let (mut tx, rx) = mpsc::unbounded::<Message>();
        let mut frames_sent = 0;

        let _ = tokio::time::timeout(
            Duration::from_millis(200),
            test_publisher().run(&mut tx, &mut frames_sent),
        )
        .await;
        drop(tx);

        let stamps: Vec<DateTime<chrono::FixedOffset>> = rx
            .map(gps_of)
            .map(|u| DateTime::parse_from_rfc3339(&u.timestamp).expect("rfc3339"))
            .collect()
            .await;
        assert!(stamps.len() > 1);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(stamps.iter().all(|s| s.offset().local_minus_utc() == 0));
    }

    #[tokio::test]
    async fn test_stops_when_sink_closes() {
        let (mut tx, rx) = mpsc::unbounded::<Message>();
        drop(rx);
        let mut frames_sent = 0;

        let result = test_publisher().run(&mut tx, &mut frames_sent).await;
        assert!(result.is_err());
        assert_eq!(frames_sent, 0);
    }

    #[test]
    fn test_timestamp_never_goes_backwards() {
        let mut publisher = test_publisher();
        let future = Utc::now() + chrono::Duration::hours(1);
        publisher.last_stamp = Some(future);

        let stamp = publisher.next_timestamp();
        assert_eq!(stamp, format_timestamp(future));
    }
}
