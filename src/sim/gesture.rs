//! Drag gesture tracking
//!
//! Turns raw pointer angles into a trailing angular-velocity estimate. Only the
//! last `window_ms` of motion counts, so a flick at the end of a long slow drag
//! still spins the wheel hard.

use std::collections::VecDeque;

use crate::settings::GestureTuning;
use crate::wrap_delta;

/// One accumulated drag step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Signed angle delta since the previous sample (radians, in (-π, π])
    pub delta: f64,
    /// Host timestamp (ms)
    pub time_ms: f64,
}

/// Trailing-window drag velocity estimator
#[derive(Debug, Clone)]
pub struct GestureTracker {
    tuning: GestureTuning,
    last_angle: Option<f64>,
    samples: VecDeque<DragSample>,
}

impl GestureTracker {
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            tuning,
            last_angle: None,
            samples: VecDeque::with_capacity(16),
        }
    }

    /// Begin a drag at the given pointer angle, discarding any old samples
    pub fn on_drag_start(&mut self, pointer_angle: f64) {
        self.samples.clear();
        self.last_angle = Some(pointer_angle);
    }

    /// Record a move. Returns the wrapped delta the wheel should follow.
    pub fn on_drag_move(&mut self, pointer_angle: f64, time_ms: f64) -> f64 {
        let Some(last) = self.last_angle else {
            // Move without a start: treat as the start
            self.on_drag_start(pointer_angle);
            return 0.0;
        };

        let delta = wrap_delta(pointer_angle - last);
        self.last_angle = Some(pointer_angle);
        self.samples.push_back(DragSample { delta, time_ms });
        self.evict_before(time_ms);
        delta
    }

    /// Drop samples older than the trailing window, measured back from `now_ms`
    pub fn evict_before(&mut self, now_ms: f64) {
        let cutoff = now_ms - self.tuning.window_ms;
        while self.samples.front().is_some_and(|s| s.time_ms <= cutoff) {
            self.samples.pop_front();
        }
    }

    /// End the drag and return the release velocity (rad/s, signed)
    pub fn on_drag_end(&mut self) -> f64 {
        let velocity = self.release_velocity();
        self.samples.clear();
        self.last_angle = None;
        velocity
    }

    /// Velocity estimate from the current window without ending the drag
    pub fn release_velocity(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };

        let total: f64 = self.samples.iter().map(|s| s.delta).sum();
        let duration = ((last.time_ms - first.time_ms) / 1000.0).max(self.tuning.min_duration);
        let velocity = total / duration * self.tuning.gain;
        if velocity.is_finite() { velocity } else { 0.0 }
    }

    pub fn is_tracking(&self) -> bool {
        self.last_angle.is_some()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Forget everything (pointer cancel, reset)
    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_angle = None;
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_four_sample_flick() {
        let mut tracker = GestureTracker::default();
        tracker.on_drag_start(0.0);
        // +1.2 rad spread over 4 samples spanning 80 ms
        for (i, angle) in [0.3, 0.6, 0.9, 1.2].iter().enumerate() {
            tracker.on_drag_move(*angle, 1000.0 + i as f64 * (80.0 / 3.0));
        }
        assert_eq!(tracker.sample_count(), 4);
        let v = tracker.on_drag_end();
        // 1.2 / max(0.08, 0.1) * 10
        assert!((v - 120.0).abs() < 1e-9, "velocity {v}");
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_single_sample_is_no_spin() {
        let mut tracker = GestureTracker::default();
        tracker.on_drag_start(0.5);
        assert_eq!(tracker.on_drag_end(), 0.0);

        tracker.on_drag_start(0.5);
        tracker.on_drag_move(0.9, 10.0);
        assert_eq!(tracker.on_drag_end(), 0.0);
    }

    #[test]
    fn test_direction_preserved() {
        let mut tracker = GestureTracker::default();
        tracker.on_drag_start(1.0);
        tracker.on_drag_move(0.8, 0.0);
        tracker.on_drag_move(0.6, 16.0);
        tracker.on_drag_move(0.4, 32.0);
        assert!(tracker.on_drag_end() < 0.0);
    }

    #[test]
    fn test_seam_crossing_is_small_step() {
        let mut tracker = GestureTracker::default();
        tracker.on_drag_start(PI - 0.05);
        let delta = tracker.on_drag_move(-PI + 0.05, 16.0);
        assert!((delta - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_old_samples_evicted() {
        let mut tracker = GestureTracker::default();
        tracker.on_drag_start(0.0);
        // Slow drift long ago
        for i in 0..20 {
            tracker.on_drag_move(i as f64 * 0.01, i as f64 * 50.0);
        }
        // Only samples within the last 100 ms survive
        assert!(tracker.sample_count() <= 2);

        // Holding still past the window leaves nothing to fling
        tracker.evict_before(5000.0);
        assert_eq!(tracker.sample_count(), 0);
        assert_eq!(tracker.on_drag_end(), 0.0);
    }

    #[test]
    fn test_move_without_start_anchors() {
        let mut tracker = GestureTracker::default();
        assert_eq!(tracker.on_drag_move(2.0, 0.0), 0.0);
        assert!(tracker.is_tracking());
        assert_eq!(tracker.sample_count(), 0);
    }
}
