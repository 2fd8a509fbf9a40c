//! Lunch Wheel - a physics-driven spinning selection wheel
//!
//! Core modules:
//! - `sim`: Wheel engine (gesture tracking, friction integration, segment geometry, winner resolution)
//! - `audio`: Tick tone capability and Web Audio implementation
//! - `platform`: Frame scheduling, pointer capture and host session glue
//! - `settings`: Data-driven wheel tuning
//! - `item`: Selectable items (restaurants)

pub mod audio;
pub mod error;
pub mod item;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{AudioError, WheelError};
pub use item::{Restaurant, WheelItem};
pub use settings::WheelSettings;

use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Wheel tuning defaults
pub mod consts {
    /// Multiplicative velocity decay applied once per frame
    pub const FRICTION: f64 = 0.985;
    /// Release velocities below this magnitude never start a spin (rad/s)
    pub const MIN_START_VELOCITY: f64 = 1.0;
    /// Accepted spins are boosted to at least this magnitude (rad/s)
    pub const START_FLOOR: f64 = 5.0;
    /// Spin is settled once |velocity| drops below this (rad/s)
    pub const SETTLE_THRESHOLD: f64 = 0.1;
    /// Largest frame delta fed to the integrator (seconds)
    pub const MAX_STEP_DT: f64 = 0.1;
    /// Hard cap on simulated spin time (seconds)
    pub const MAX_SPIN_SECS: f64 = 30.0;
    /// Frame time assumed for the first frame of a spin (60 Hz)
    pub const NOMINAL_FRAME_DT: f64 = 1.0 / 60.0;

    /// Trailing window of drag samples used for release velocity (ms)
    pub const GESTURE_WINDOW_MS: f64 = 100.0;
    /// Lower bound on the window duration when dividing (seconds)
    pub const GESTURE_MIN_DURATION: f64 = 0.1;
    /// Release velocity gain
    pub const GESTURE_GAIN: f64 = 10.0;

    /// Segment crossings slower than this stay silent (rad/s)
    pub const MIN_AUDIBLE_SPEED: f64 = 0.5;
    /// Tick tone start/end frequency (Hz) and length (seconds)
    pub const TICK_FREQ_START: f32 = 800.0;
    pub const TICK_FREQ_END: f32 = 400.0;
    pub const TICK_DURATION: f64 = 0.1;
    pub const TICK_GAIN: f32 = 0.3;

    /// Pause between the wheel stopping and the winner being surfaced (ms)
    pub const SETTLE_DELAY_MS: f64 = 800.0;

    /// Programmatic spin impulse magnitude range (rad/s)
    pub const IMPULSE_MIN: f64 = 10.0;
    pub const IMPULSE_MAX: f64 = 30.0;

    /// Segment labels longer than this are truncated
    pub const LABEL_MAX_CHARS: usize = 15;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap an angle difference into (-π, π]
#[inline]
pub fn wrap_delta(mut delta: f64) -> f64 {
    if !delta.is_finite() {
        return 0.0;
    }
    delta = delta.rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    delta
}

/// Angle of a pointer around the wheel center, in the wheel's local frame
#[inline]
pub fn pointer_angle(pointer: DVec2, center: DVec2) -> f64 {
    let d = pointer - center;
    d.y.atan2(d.x)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
