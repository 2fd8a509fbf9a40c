//! Wheel session phases and events

use serde::{Deserialize, Serialize};

/// Current phase of a wheel session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WheelPhase {
    /// At rest, waiting for a drag or spin request
    Idle,
    /// Pointer captured; rotation follows the pointer 1:1
    Dragging,
    /// Integrator running; pointer input ignored
    Spinning,
    /// Stopped, holding still before surfacing the result
    Settling { remaining_ms: f64 },
    /// Winner surfaced; waiting for dismissal
    Resolved { index: usize },
}

impl WheelPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WheelPhase::Idle => "Idle",
            WheelPhase::Dragging => "Dragging",
            WheelPhase::Spinning => "Spinning",
            WheelPhase::Settling { .. } => "Settling",
            WheelPhase::Resolved { .. } => "Resolved",
        }
    }

    /// Whether the host must keep delivering frames
    pub fn needs_frames(&self) -> bool {
        matches!(self, WheelPhase::Spinning | WheelPhase::Settling { .. })
    }

    /// Whether the wheel accepts a new drag or spin
    pub fn accepts_input(&self) -> bool {
        matches!(self, WheelPhase::Idle | WheelPhase::Resolved { .. })
    }
}

/// Things the host may want to react to (render, sound, result display)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WheelEvent {
    SpinStarted { velocity: f64 },
    /// A new segment passed under the pointer
    SegmentCrossed { index: usize },
    /// Motion stopped; `index` will be surfaced after the settle delay
    Settled { rotation: f64, index: usize },
    Resolved { index: usize },
    Dismissed,
}
