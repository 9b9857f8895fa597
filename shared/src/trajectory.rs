//! Trajectory Model
//!
//! Smoothed circular flight for a single simulated drone. Each call to
//! [`TrajectoryModel::advance`] moves the phase along the circle and pulls the
//! reported position, velocity and acceleration toward their closed-form
//! values with a first-order low-pass filter.

use crate::protocol::Axes;
use crate::sim;
use rand::Rng;
use std::f64::consts::TAU;

/// Shape and filter parameters of the simulated flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryParams {
    /// Phase advance rate (rad/s)
    pub angular_speed: f64,
    /// Circle radius (degrees)
    pub radius: f64,
    /// Fraction of the previous value kept by each smoothing step
    pub smooth_factor: f64,
    /// Peak-to-peak position jitter (degrees)
    pub noise_amplitude: f64,
}

impl Default for TrajectoryParams {
    fn default() -> Self {
        Self {
            angular_speed: sim::ANGULAR_SPEED,
            radius: sim::RADIUS_DEG,
            smooth_factor: sim::SMOOTH_FACTOR,
            noise_amplitude: sim::NOISE_AMPLITUDE,
        }
    }
}

impl TrajectoryParams {
    /// Ideal point on the circle at `angle`, as (lat, lng) offsets from the center
    fn position_offset(&self, angle: f64) -> (f64, f64) {
        (self.radius * angle.cos(), self.radius * angle.sin())
    }

    /// Tangential velocity at `angle`
    fn velocity_at(&self, angle: f64) -> Axes {
        let speed = self.radius * self.angular_speed;
        Axes::new(-speed * angle.sin(), speed * angle.cos(), 0.0)
    }

    /// Centripetal acceleration at `angle`
    fn acceleration_at(&self, angle: f64) -> Axes {
        let magnitude = self.radius * self.angular_speed * self.angular_speed;
        Axes::new(-magnitude * angle.cos(), -magnitude * angle.sin(), 0.0)
    }

    /// One exponential smoothing step
    fn smooth(&self, previous: f64, ideal: f64) -> f64 {
        self.smooth_factor * previous + (1.0 - self.smooth_factor) * ideal
    }
}

/// Physics state for one simulated drone
///
/// The random source is injected so a seeded generator yields a reproducible
/// trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryModel<R> {
    params: TrajectoryParams,
    center_lat: f64,
    center_lng: f64,
    altitude: f64,
    angle: f64,
    lat: f64,
    lng: f64,
    velocity: Axes,
    acceleration: Axes,
    target: Axes,
    rng: R,
}

impl<R: Rng> TrajectoryModel<R> {
    /// Create a model with the default flight parameters
    pub fn new(center_lat: f64, center_lng: f64, altitude: f64, rng: R) -> Self {
        Self::with_params(center_lat, center_lng, altitude, TrajectoryParams::default(), rng)
    }

    /// Create a model with explicit flight parameters
    pub fn with_params(
        center_lat: f64,
        center_lng: f64,
        altitude: f64,
        params: TrajectoryParams,
        rng: R,
    ) -> Self {
        let angle = 0.0;
        let (d_lat, d_lng) = params.position_offset(angle);
        let lat = center_lat + d_lat;
        let lng = center_lng + d_lng;

        Self {
            params,
            center_lat,
            center_lng,
            altitude,
            angle,
            lat,
            lng,
            velocity: params.velocity_at(angle),
            acceleration: params.acceleration_at(angle),
            target: Axes::new(lat, lng, altitude),
            rng,
        }
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Negative or non-finite `dt` is treated as zero. The smoothing step is
    /// applied once per call regardless of `dt`.
    pub fn advance(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let p = self.params;

        self.angle = wrap_angle(self.angle + p.angular_speed * dt);

        let (d_lat, d_lng) = p.position_offset(self.angle);
        self.lat = p.smooth(self.lat, self.center_lat + d_lat);
        self.lng = p.smooth(self.lng, self.center_lng + d_lng);

        self.lat += self.jitter();
        self.lng += self.jitter();

        let ideal_velocity = p.velocity_at(self.angle);
        self.velocity = Axes::new(
            p.smooth(self.velocity.lat, ideal_velocity.lat),
            p.smooth(self.velocity.lng, ideal_velocity.lng),
            0.0,
        );

        let ideal_acceleration = p.acceleration_at(self.angle);
        self.acceleration = Axes::new(
            p.smooth(self.acceleration.lat, ideal_acceleration.lat),
            p.smooth(self.acceleration.lng, ideal_acceleration.lng),
            0.0,
        );

        self.target = Axes::new(self.lat, self.lng, self.altitude);
    }

    /// Uniform noise in `[-amplitude/2, amplitude/2]`
    fn jitter(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * self.params.noise_amplitude
    }
}

impl<R> TrajectoryModel<R> {
    /// Current phase in `[0, 2π)`
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn latitude(&self) -> f64 {
        self.lat
    }

    pub fn longitude(&self) -> f64 {
        self.lng
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn velocity(&self) -> Axes {
        self.velocity
    }

    pub fn acceleration(&self) -> Axes {
        self.acceleration
    }

    /// Mirrors the current position and altitude
    pub fn target(&self) -> Axes {
        self.target
    }
}

/// Wrap an angle into `[0, 2π)`
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
