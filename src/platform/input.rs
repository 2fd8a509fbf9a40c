//! Pointer capture
//!
//! While dragging, the wheel grabs the pointer so moves outside the canvas keep
//! arriving. The grab is held by a `CaptureGuard` and released when the guard
//! drops, which covers release, cancel, reset and teardown alike.

use std::rc::Rc;

/// Host pointer-capture primitive
pub trait PointerCapture {
    fn capture(&self, pointer_id: i32);
    fn release(&self, pointer_id: i32);
}

/// Host without capture support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&self, _pointer_id: i32) {}
    fn release(&self, _pointer_id: i32) {}
}

/// Scoped pointer grab
pub struct CaptureGuard {
    target: Rc<dyn PointerCapture>,
    pointer_id: i32,
}

impl CaptureGuard {
    pub fn acquire(target: Rc<dyn PointerCapture>, pointer_id: i32) -> Self {
        target.capture(pointer_id);
        Self { target, pointer_id }
    }

    pub fn pointer_id(&self) -> i32 {
        self.pointer_id
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.target.release(self.pointer_id);
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("pointer_id", &self.pointer_id)
            .finish()
    }
}
