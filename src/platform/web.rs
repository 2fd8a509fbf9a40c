//! Browser bindings for the platform traits

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, Window};

use super::frame::{FrameHandle, FrameScheduler};
use super::input::PointerCapture;

/// `requestAnimationFrame` scheduler.
///
/// The callback is bound once and re-registered for every request, so a
/// cancelled frame never leaves a dangling closure behind.
pub struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
        }
    }

    /// Install the per-frame callback. Frames requested before this are refused.
    pub fn bind(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let callback = self.callback.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::debug!("cancelAnimationFrame({}) failed: {:?}", handle.0, e);
        }
    }
}

/// Pointer capture on the wheel canvas
pub struct CanvasCapture {
    canvas: HtmlCanvasElement,
}

impl CanvasCapture {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl PointerCapture for CanvasCapture {
    fn capture(&self, pointer_id: i32) {
        if let Err(e) = self.canvas.set_pointer_capture(pointer_id) {
            log::debug!("setPointerCapture({}) failed: {:?}", pointer_id, e);
        }
    }

    fn release(&self, pointer_id: i32) {
        // Already released by the browser after pointerup; that error is expected
        if let Err(e) = self.canvas.release_pointer_capture(pointer_id) {
            log::debug!("releasePointerCapture({}) failed: {:?}", pointer_id, e);
        }
    }
}
