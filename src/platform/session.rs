//! Host session glue
//!
//! Binds a `WheelController` to the host's frame scheduler and pointer
//! capture. Exactly one frame request is outstanding while the wheel is in
//! motion or settling, none otherwise. Teardown cancels it, so no callback can
//! reach the wheel after the session is gone.

use std::rc::Rc;

use super::frame::{FrameHandle, FrameScheduler};
use super::input::{CaptureGuard, PointerCapture};
use crate::error::WheelError;
use crate::item::WheelItem;
use crate::sim::{WheelController, WheelEvent, WheelPhase};

pub struct WheelSession<I: WheelItem, S: FrameScheduler> {
    controller: WheelController<I>,
    scheduler: S,
    capture: Rc<dyn PointerCapture>,
    grab: Option<CaptureGuard>,
    pending_frame: Option<FrameHandle>,
}

impl<I: WheelItem, S: FrameScheduler> WheelSession<I, S> {
    pub fn new(controller: WheelController<I>, scheduler: S, capture: Rc<dyn PointerCapture>) -> Self {
        Self {
            controller,
            scheduler,
            capture,
            grab: None,
            pending_frame: None,
        }
    }

    pub fn controller(&self) -> &WheelController<I> {
        &self.controller
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn is_capturing(&self) -> bool {
        self.grab.is_some()
    }

    pub fn pointer_down(&mut self, pointer_id: i32, pointer_angle: f64, time_ms: f64) -> bool {
        let started = self.controller.pointer_down(pointer_angle, time_ms);
        if started {
            self.grab = Some(CaptureGuard::acquire(self.capture.clone(), pointer_id));
        }
        self.sync();
        started
    }

    /// Pointer currently driving the drag, if any
    pub fn captured_pointer(&self) -> Option<i32> {
        self.grab.as_ref().map(CaptureGuard::pointer_id)
    }

    /// Only the pointer that started the drag may steer or end it
    fn owns_drag(&self, pointer_id: i32) -> bool {
        self.captured_pointer() == Some(pointer_id)
    }

    pub fn pointer_move(&mut self, pointer_id: i32, pointer_angle: f64, time_ms: f64) {
        if self.owns_drag(pointer_id) {
            self.controller.pointer_move(pointer_angle, time_ms);
        }
    }

    pub fn pointer_up(&mut self, pointer_id: i32, time_ms: f64) -> bool {
        if !self.owns_drag(pointer_id) {
            return false;
        }
        let spinning = self.controller.pointer_up(time_ms);
        self.sync();
        spinning
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        if !self.owns_drag(pointer_id) {
            return;
        }
        self.controller.pointer_cancel();
        self.sync();
    }

    /// Programmatic spin (the "Spin" button)
    pub fn spin(&mut self) -> bool {
        let spinning = self.controller.spin_random();
        self.sync();
        spinning
    }

    pub fn dismiss(&mut self) -> bool {
        let dismissed = self.controller.dismiss();
        self.sync();
        dismissed
    }

    pub fn set_items(&mut self, items: Vec<I>) -> Result<(), WheelError> {
        self.controller.set_items(items)?;
        self.sync();
        Ok(())
    }

    /// Events raised by input since the last frame
    pub fn take_events(&mut self) -> Vec<WheelEvent> {
        self.controller.take_events()
    }

    /// Frame callback entry point
    pub fn on_frame(&mut self, time_ms: f64) -> Vec<WheelEvent> {
        // The request that brought us here has fired
        self.pending_frame = None;
        let events = self.controller.frame(time_ms);
        self.sync();
        events
    }

    /// Cancel any pending frame, drop the pointer grab and reset the wheel
    pub fn teardown(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
            log::debug!("Cancelled pending frame {:?}", handle);
        }
        self.grab = None;
        self.controller.reset();
    }

    /// Bring capture and frame requests in line with the controller phase
    fn sync(&mut self) {
        if self.controller.phase() != WheelPhase::Dragging {
            self.grab = None;
        }

        let wants_frame = self.controller.needs_frame();
        match (wants_frame, self.pending_frame) {
            (true, None) => {
                self.pending_frame = self.scheduler.request_frame();
                if self.pending_frame.is_none() {
                    log::warn!("Host refused a frame callback; wheel is frozen");
                }
            }
            (false, Some(handle)) => {
                self.scheduler.cancel_frame(handle);
                self.pending_frame = None;
            }
            _ => {}
        }
    }
}

impl<I: WheelItem, S: FrameScheduler> Drop for WheelSession<I, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::frame::ManualFrames;
    use crate::platform::input::tests::CaptureLog;
    use crate::settings::WheelSettings;

    fn session() -> (WheelSession<&'static str, ManualFrames>, Rc<CaptureLog>) {
        let ctrl =
            WheelController::new(vec!["A", "B", "C", "D"], WheelSettings::default(), 11).unwrap();
        let log = Rc::new(CaptureLog::default());
        let session = WheelSession::new(ctrl, ManualFrames::new(), log.clone());
        (session, log)
    }

    /// Deliver frames the way a host loop would: only when one was requested
    fn pump(session: &mut WheelSession<&'static str, ManualFrames>, mut now: f64) -> f64 {
        for _ in 0..10_000 {
            if session.scheduler_mut().fire().is_none() {
                break;
            }
            now += 16.0;
            session.on_frame(now);
        }
        now
    }

    #[test]
    fn test_capture_released_on_release() {
        let (mut s, log) = session();
        assert!(s.pointer_down(3, 0.0, 0.0));
        assert!(s.is_capturing());
        assert!(log.held());

        s.pointer_move(3, 0.2, 10.0);
        s.pointer_move(3, 0.4, 20.0);
        s.pointer_move(3, 0.6, 30.0);
        assert!(s.pointer_up(3, 30.0));
        assert!(!s.is_capturing());
        assert!(!log.held());
        assert!(s.has_pending_frame());
    }

    #[test]
    fn test_capture_released_on_cancel() {
        let (mut s, log) = session();
        s.pointer_down(1, 0.0, 0.0);
        s.pointer_cancel(1);
        assert!(!log.held());
        assert!(!s.has_pending_frame());
        assert_eq!(s.controller().phase(), WheelPhase::Idle);
    }

    #[test]
    fn test_second_pointer_cannot_steer_drag() {
        let (mut s, log) = session();
        assert!(s.pointer_down(1, 0.0, 0.0));
        assert_eq!(s.captured_pointer(), Some(1));

        // A second finger lands mid-drag: it neither starts its own drag
        // nor moves, releases or cancels the first one
        assert!(!s.pointer_down(2, 1.0, 5.0));
        s.pointer_move(2, 1.5, 10.0);
        s.pointer_move(2, 2.0, 20.0);
        assert_eq!(s.controller().rotation(), 0.0);
        assert!(!s.pointer_up(2, 25.0));
        s.pointer_cancel(2);
        assert_eq!(s.controller().phase(), WheelPhase::Dragging);
        assert!(log.held());

        s.pointer_move(1, 0.1, 30.0);
        assert!((s.controller().rotation() - 0.1).abs() < 1e-12);
        s.pointer_up(1, 40.0);
        assert_eq!(s.captured_pointer(), None);
        assert!(!log.held());
    }

    #[test]
    fn test_frames_requested_until_resolved() {
        let (mut s, _) = session();
        assert!(s.spin());
        assert_eq!(s.scheduler().requested(), 1);
        pump(&mut s, 0.0);
        assert!(matches!(s.controller().phase(), WheelPhase::Resolved { .. }));
        assert!(!s.has_pending_frame());
        assert!(s.scheduler().pending().is_none());
    }

    #[test]
    fn test_teardown_cancels_pending_frame() {
        let (mut s, _) = session();
        s.spin();
        // A few frames in, then the widget goes away mid-spin
        for i in 1..=5 {
            s.scheduler_mut().fire();
            s.on_frame(i as f64 * 16.0);
        }
        assert!(s.has_pending_frame());
        s.teardown();
        assert!(!s.has_pending_frame());
        assert_eq!(s.scheduler().cancelled(), 1);
        assert!(s.scheduler().pending().is_none());
        assert_eq!(s.controller().phase(), WheelPhase::Idle);
    }

    #[test]
    fn test_teardown_during_drag_releases_capture() {
        let (mut s, log) = session();
        s.pointer_down(9, 0.0, 0.0);
        drop(s);
        assert!(!log.held());
    }

    #[test]
    fn test_item_change_stops_frames() {
        let (mut s, _) = session();
        s.spin();
        s.set_items(vec!["X", "Y"]).unwrap();
        assert!(!s.has_pending_frame());
        assert_eq!(s.scheduler().cancelled(), 1);
        assert!(s.set_items(Vec::new()).is_err());
    }

    #[test]
    fn test_dismiss_then_spin_again() {
        let (mut s, _) = session();
        s.spin();
        let now = pump(&mut s, 0.0);
        assert!(s.dismiss());
        assert_eq!(s.take_events(), vec![WheelEvent::Dismissed]);
        assert!(s.spin());
        pump(&mut s, now);
        assert!(s.controller().winner().is_some());
    }
}
