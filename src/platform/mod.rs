//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Per-frame callbacks (requestAnimationFrame on web, manual stepping natively)
//! - Pointer capture while dragging
//! - Wiring both to a `WheelController` through `WheelSession`

pub mod frame;
pub mod input;
pub mod session;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use frame::{FrameHandle, FrameScheduler, ManualFrames};
pub use input::{CaptureGuard, NoCapture, PointerCapture};
pub use session::WheelSession;
