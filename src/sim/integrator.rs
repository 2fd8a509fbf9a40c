//! Spin integrator
//!
//! Owns rotation and angular velocity. Advanced by the host's frame clock, one
//! `step` per displayed frame; it never schedules itself.
//!
//! Friction is applied once per call, not scaled by elapsed time, so the decay
//! rate follows the display refresh rate. `FrictionModel::TimeScaled` scales
//! it by the frame delta instead.

use crate::consts::NOMINAL_FRAME_DT;
use crate::settings::{FrictionModel, PhysicsTuning};

/// Outcome of a `start` request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// Spin began with this (possibly floored) velocity
    Started(f64),
    /// A spin is already running; nothing changed
    AlreadySpinning,
    /// Velocity too small to count as a spin
    TooSlow,
}

/// State after one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub rotation: f64,
    pub velocity: f64,
    /// True exactly once, on the step where the spin comes to rest
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct SpinIntegrator {
    tuning: PhysicsTuning,
    rotation: f64,
    velocity: f64,
    active: bool,
    /// Simulated seconds since `start`
    elapsed: f64,
}

impl SpinIntegrator {
    pub fn new(tuning: PhysicsTuning) -> Self {
        Self {
            tuning,
            rotation: 0.0,
            velocity: 0.0,
            active: false,
            elapsed: 0.0,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    /// Move the wheel directly (drag follow). Ignored while spinning.
    pub fn rotate_by(&mut self, delta: f64) {
        if !self.active && delta.is_finite() {
            self.rotation += delta;
        }
    }

    /// Begin a spin
    pub fn start(&mut self, initial_velocity: f64) -> StartOutcome {
        if self.active {
            return StartOutcome::AlreadySpinning;
        }
        let speed = initial_velocity.abs();
        if !speed.is_finite() || speed == 0.0 || speed < self.tuning.min_start_velocity {
            return StartOutcome::TooSlow;
        }

        let magnitude = speed.max(self.tuning.start_floor);
        self.velocity = magnitude.copysign(initial_velocity);
        self.active = true;
        self.elapsed = 0.0;
        StartOutcome::Started(self.velocity)
    }

    /// Advance by one frame
    pub fn step(&mut self, dt: f64) -> StepResult {
        if !self.active {
            return self.snapshot(false);
        }

        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.tuning.max_step_dt)
        } else {
            0.0
        };

        self.velocity *= match self.tuning.friction_model {
            FrictionModel::PerFrame => self.tuning.friction,
            FrictionModel::TimeScaled => self.tuning.friction.powf(dt / NOMINAL_FRAME_DT),
        };
        self.rotation += self.velocity * dt;
        self.elapsed += dt;

        let settled = self.velocity.abs() < self.tuning.settle_threshold
            || self.elapsed >= self.tuning.max_spin_secs;
        if settled {
            if self.elapsed >= self.tuning.max_spin_secs {
                log::warn!("Spin hit the {}s cap, forcing settle", self.tuning.max_spin_secs);
            }
            self.velocity = 0.0;
            self.active = false;
        }
        self.snapshot(settled)
    }

    /// Stop immediately without reporting a settle (reset/teardown)
    pub fn halt(&mut self) {
        self.velocity = 0.0;
        self.active = false;
        self.elapsed = 0.0;
    }

    /// Halt and return to the rest orientation
    pub fn reset(&mut self) {
        self.halt();
        self.rotation = 0.0;
    }

    fn snapshot(&self, settled: bool) -> StepResult {
        StepResult {
            rotation: self.rotation,
            velocity: self.velocity,
            settled,
        }
    }
}

impl Default for SpinIntegrator {
    fn default() -> Self {
        Self::new(PhysicsTuning::default())
    }
}
