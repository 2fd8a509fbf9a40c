//! Segment-crossing cue detection
//!
//! Decides when the wheel's rotation carried a new segment under the pointer
//! fast enough to be worth a tick. Playing the tick is the `ToneSink`'s job.

use super::segment::segment_index_at;
use crate::consts::MIN_AUDIBLE_SPEED;

#[derive(Debug, Clone, Copy)]
pub struct CueDetector {
    /// Crossings below this speed stay silent so the final creep doesn't rattle
    pub min_audible_speed: f64,
}

impl Default for CueDetector {
    fn default() -> Self {
        Self {
            min_audible_speed: MIN_AUDIBLE_SPEED,
        }
    }
}

impl CueDetector {
    pub fn new(min_audible_speed: f64) -> Self {
        Self { min_audible_speed }
    }

    /// Should a tick play for this rotation step?
    pub fn on_rotation_advanced(
        &self,
        previous_rotation: f64,
        new_rotation: f64,
        item_count: usize,
        speed: f64,
    ) -> bool {
        if speed.abs() <= self.min_audible_speed {
            return false;
        }
        segment_index_at(previous_rotation, item_count, 0.0)
            != segment_index_at(new_rotation, item_count, 0.0)
    }
}
