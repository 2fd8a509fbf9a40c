//! Wheel engine
//!
//! All wheel logic lives here. Nothing in this module touches the DOM, audio
//! devices or timers:
//! - Frames and pointer samples are pushed in by the host
//! - Sound is requested through an injected `ToneSink`
//! - The only randomness is the seeded programmatic impulse

pub mod controller;
pub mod cue;
pub mod gesture;
pub mod integrator;
pub mod resolve;
pub mod segment;
pub mod state;

pub use controller::WheelController;
pub use cue::CueDetector;
pub use gesture::{DragSample, GestureTracker};
pub use integrator::{SpinIntegrator, StartOutcome, StepResult};
pub use resolve::{resolve, resolve_index};
pub use segment::{Segment, angle_per_segment, segment_index_at, segments};
pub use state::{WheelEvent, WheelPhase};
