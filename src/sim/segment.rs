//! Segment geometry
//!
//! Segment `i` spans `[i * a + rotation, (i + 1) * a + rotation)` with
//! `a = 2π / n`, in the same angular frame the pointer probe lives in.
//! `segment_index_at` is the only place that maps an angle to a segment;
//! rendering, tick cues and winner resolution all go through it.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::{normalize_angle, polar_to_cartesian};

/// Angular width of one segment
#[inline]
pub fn angle_per_segment(item_count: usize) -> f64 {
    TAU / item_count.max(1) as f64
}

/// Index of the segment under `probe_angle` when the wheel is at `rotation`.
///
/// The wheel turns under a stationary probe, so the probe's position in
/// wheel-local space moves opposite to the rotation. Always in `[0, n)`.
pub fn segment_index_at(rotation: f64, item_count: usize, probe_angle: f64) -> usize {
    if item_count <= 1 {
        return 0;
    }
    let per = angle_per_segment(item_count);
    let normalized = normalize_angle(rotation);
    let target = normalize_angle(TAU - normalized + probe_angle);
    // NaN casts to 0; floating error at the top edge wraps via the modulo
    ((target / per).floor() as usize) % item_count
}

/// One wheel slice, as a renderer would draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    /// Start angle (radians, unwrapped: includes the full rotation)
    pub start: f64,
    /// End angle (radians, unwrapped)
    pub end: f64,
}

impl Segment {
    pub fn new(index: usize, item_count: usize, rotation: f64) -> Self {
        let per = angle_per_segment(item_count);
        Self {
            index,
            start: index as f64 * per + rotation,
            end: (index + 1) as f64 * per + rotation,
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Center angle, where the label is oriented
    #[inline]
    pub fn mid_angle(&self) -> f64 {
        self.start + self.span() / 2.0
    }

    /// Point on the segment's center line at `radius` from the hub
    pub fn label_anchor(&self, radius: f64) -> DVec2 {
        polar_to_cartesian(radius, self.mid_angle())
    }
}

/// All segments of an `item_count` wheel at `rotation`
pub fn segments(rotation: f64, item_count: usize) -> impl Iterator<Item = Segment> {
    (0..item_count).map(move |i| Segment::new(i, item_count, rotation))
}
