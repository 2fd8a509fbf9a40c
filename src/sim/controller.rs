//! Wheel controller
//!
//! Single owner of the wheel's continuous state. Pointer input and frame ticks
//! both arrive here; rotation is only ever written through the gesture follow
//! path (while Dragging) or the integrator (while Spinning).
//!
//! ```text
//! Idle ──down──▶ Dragging ──up (fast)──▶ Spinning ──slow──▶ Settling ──delay──▶ Resolved
//!  ▲                │ up (slow) / cancel                                          │
//!  └────────────────┴────────────────────── dismiss / new drag ◀──────────────────┘
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::cue::CueDetector;
use super::gesture::GestureTracker;
use super::integrator::{SpinIntegrator, StartOutcome};
use super::resolve::resolve_index;
use super::segment::{Segment, segment_index_at, segments};
use super::state::{WheelEvent, WheelPhase};
use crate::audio::{NullTone, ToneSink};
use crate::consts::NOMINAL_FRAME_DT;
use crate::error::WheelError;
use crate::item::WheelItem;
use crate::settings::WheelSettings;

pub struct WheelController<I> {
    items: Vec<I>,
    settings: WheelSettings,
    phase: WheelPhase,
    tracker: GestureTracker,
    integrator: SpinIntegrator,
    cue: CueDetector,
    tone: Box<dyn ToneSink>,
    rng: Pcg32,
    /// Timestamp of the previous frame while frames are flowing
    last_frame_ms: Option<f64>,
    events: Vec<WheelEvent>,
}

impl<I: WheelItem> WheelController<I> {
    /// Create a wheel over `items`. Fails fast on an empty sequence or bad tuning.
    pub fn new(items: Vec<I>, settings: WheelSettings, seed: u64) -> Result<Self, WheelError> {
        settings.validate()?;
        check_items(&items)?;

        log::debug!("Wheel created with {} items (seed {})", items.len(), seed);
        Ok(Self {
            items,
            tracker: GestureTracker::new(settings.gesture.clone()),
            integrator: SpinIntegrator::new(settings.physics.clone()),
            cue: CueDetector::new(settings.audio.min_audible_speed),
            settings,
            phase: WheelPhase::Idle,
            tone: Box::new(NullTone),
            rng: Pcg32::seed_from_u64(seed),
            last_frame_ms: None,
            events: Vec::new(),
        })
    }

    /// Attach the tick output
    pub fn with_tone(mut self, tone: Box<dyn ToneSink>) -> Self {
        self.tone = tone;
        self
    }

    pub fn set_tone(&mut self, tone: Box<dyn ToneSink>) {
        self.tone = tone;
    }

    // === Queries ===

    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn rotation(&self) -> f64 {
        self.integrator.rotation()
    }

    pub fn velocity(&self) -> f64 {
        self.integrator.velocity()
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    /// Segment bounds at the current rotation, for drawing
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        segments(self.rotation(), self.items.len())
    }

    /// Index of the segment currently under the pointer
    pub fn index_under_pointer(&self) -> usize {
        segment_index_at(self.rotation(), self.items.len(), 0.0)
    }

    /// The surfaced winner, once Resolved
    pub fn winner(&self) -> Option<&I> {
        match self.phase {
            WheelPhase::Resolved { index } => self.items.get(index),
            _ => None,
        }
    }

    /// Whether the host must keep delivering frames
    pub fn needs_frame(&self) -> bool {
        self.phase.needs_frames()
    }

    /// Drain events raised by input calls since the last frame
    pub fn take_events(&mut self) -> Vec<WheelEvent> {
        std::mem::take(&mut self.events)
    }

    // === Pointer input ===

    /// Pointer pressed on the wheel. Returns true if a drag began.
    pub fn pointer_down(&mut self, pointer_angle: f64, _time_ms: f64) -> bool {
        if matches!(self.phase, WheelPhase::Resolved { .. }) {
            self.dismiss();
        }
        if self.phase != WheelPhase::Idle {
            log::debug!("Ignoring pointer down while {}", self.phase.as_str());
            return false;
        }

        self.tracker.on_drag_start(pointer_angle);
        self.set_phase(WheelPhase::Dragging);
        true
    }

    /// Pointer moved; the wheel follows 1:1 while dragging
    pub fn pointer_move(&mut self, pointer_angle: f64, time_ms: f64) {
        if self.phase != WheelPhase::Dragging {
            return;
        }
        let delta = self.tracker.on_drag_move(pointer_angle, time_ms);
        self.integrator.rotate_by(delta);
    }

    /// Pointer released. Returns true if the release started a spin.
    pub fn pointer_up(&mut self, time_ms: f64) -> bool {
        if self.phase != WheelPhase::Dragging {
            return false;
        }
        self.tracker.evict_before(time_ms);
        let velocity = self.tracker.on_drag_end();
        self.set_phase(WheelPhase::Idle);
        self.begin_spin(velocity)
    }

    /// Pointer lost (cancel event, capture stolen). Never spins.
    pub fn pointer_cancel(&mut self) {
        if self.phase == WheelPhase::Dragging {
            self.tracker.clear();
            self.set_phase(WheelPhase::Idle);
        }
    }

    // === Programmatic control ===

    /// Spin with a random impulse drawn from the configured range
    pub fn spin_random(&mut self) -> bool {
        if !self.phase.accepts_input() {
            log::debug!("Spin request ignored while {}", self.phase.as_str());
            return false;
        }
        let range = &self.settings.impulse;
        let magnitude = self.rng.random_range(range.min..=range.max);
        let velocity = if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };
        self.spin_with_velocity(velocity)
    }

    /// Spin with an explicit velocity (still subject to the start threshold)
    pub fn spin_with_velocity(&mut self, velocity: f64) -> bool {
        if matches!(self.phase, WheelPhase::Resolved { .. }) {
            self.dismiss();
        }
        if self.phase != WheelPhase::Idle {
            log::debug!("Spin request ignored while {}", self.phase.as_str());
            return false;
        }
        self.begin_spin(velocity)
    }

    /// Close the surfaced result
    pub fn dismiss(&mut self) -> bool {
        if !matches!(self.phase, WheelPhase::Resolved { .. }) {
            return false;
        }
        self.set_phase(WheelPhase::Idle);
        self.events.push(WheelEvent::Dismissed);
        true
    }

    /// Replace the item sequence; the session starts over
    pub fn set_items(&mut self, items: Vec<I>) -> Result<(), WheelError> {
        check_items(&items)?;
        log::debug!("Item sequence replaced ({} items)", items.len());
        self.items = items;
        self.reset();
        Ok(())
    }

    /// Back to Idle at rest, dropping any spin, drag or pending result
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.integrator.reset();
        self.last_frame_ms = None;
        self.events.clear();
        self.set_phase(WheelPhase::Idle);
    }

    // === Frame clock ===

    /// Advance one display frame. `time_ms` must be monotonic.
    pub fn frame(&mut self, time_ms: f64) -> Vec<WheelEvent> {
        let dt = match self.last_frame_ms {
            Some(last) => (time_ms - last) / 1000.0,
            None => NOMINAL_FRAME_DT,
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.phase {
            WheelPhase::Spinning => {
                self.last_frame_ms = Some(time_ms);
                self.step_spin(dt);
            }
            WheelPhase::Settling { remaining_ms } => {
                self.last_frame_ms = Some(time_ms);
                let remaining_ms = remaining_ms - dt * 1000.0;
                if remaining_ms <= 0.0 {
                    self.surface_winner();
                } else {
                    self.phase = WheelPhase::Settling { remaining_ms };
                }
            }
            _ => {
                self.last_frame_ms = None;
            }
        }

        self.take_events()
    }

    fn step_spin(&mut self, dt: f64) {
        let n = self.items.len();
        let previous = self.integrator.rotation();
        let step = self.integrator.step(dt);

        if self
            .cue
            .on_rotation_advanced(previous, step.rotation, n, step.velocity)
        {
            let index = segment_index_at(step.rotation, n, 0.0);
            self.events.push(WheelEvent::SegmentCrossed { index });
            if let Err(e) = self.tone.play_tick() {
                log::trace!("Tick dropped: {}", e);
            }
        }

        if step.settled {
            let index = resolve_index(step.rotation, n);
            log::debug!("Wheel settled at {:.3} rad (segment {})", step.rotation, index);
            self.events.push(WheelEvent::Settled {
                rotation: step.rotation,
                index,
            });
            self.set_phase(WheelPhase::Settling {
                remaining_ms: self.settings.settle_delay_ms,
            });
            if self.settings.settle_delay_ms <= 0.0 {
                self.surface_winner();
            }
        }
    }

    fn surface_winner(&mut self) {
        let index = resolve_index(self.integrator.rotation(), self.items.len());
        if let Some(item) = self.items.get(index) {
            log::info!("Winner: {} (segment {})", item.label(), index);
        }
        self.set_phase(WheelPhase::Resolved { index });
        self.events.push(WheelEvent::Resolved { index });
    }

    fn begin_spin(&mut self, velocity: f64) -> bool {
        match self.integrator.start(velocity) {
            StartOutcome::Started(velocity) => {
                log::info!("Spin started at {:.2} rad/s", velocity);
                self.last_frame_ms = None;
                self.set_phase(WheelPhase::Spinning);
                self.events.push(WheelEvent::SpinStarted { velocity });
                true
            }
            StartOutcome::AlreadySpinning => {
                log::debug!("Spin already in progress");
                false
            }
            StartOutcome::TooSlow => {
                log::debug!("Release too slow ({:.2} rad/s), no spin", velocity);
                false
            }
        }
    }

    fn set_phase(&mut self, phase: WheelPhase) {
        if self.phase.as_str() != phase.as_str() {
            log::debug!("Wheel {} -> {}", self.phase.as_str(), phase.as_str());
        }
        self.phase = phase;
    }
}

fn check_items<I>(items: &[I]) -> Result<(), WheelError> {
    if items.is_empty() {
        return Err(WheelError::InvalidConfiguration(
            "wheel needs at least one item".to_string(),
        ));
    }
    Ok(())
}

impl<I> std::fmt::Debug for WheelController<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelController")
            .field("items", &self.items.len())
            .field("phase", &self.phase)
            .field("rotation", &self.integrator.rotation())
            .field("velocity", &self.integrator.velocity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingTone;
    use crate::error::AudioError;
    use crate::sim::resolve;

    const FRAME_MS: f64 = 16.0;
    const ITEMS: [&str; 8] = [
        "Pho", "Tacos", "Pizza", "Sushi", "Deli", "Curry", "Burgers", "Falafel",
    ];

    fn wheel() -> WheelController<&'static str> {
        WheelController::new(ITEMS.to_vec(), WheelSettings::default(), 7).unwrap()
    }

    /// Feed frames until Resolved, returning all events and the final clock
    fn run_until_resolved(
        ctrl: &mut WheelController<&'static str>,
        mut now: f64,
    ) -> (Vec<WheelEvent>, f64) {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            if !ctrl.needs_frame() {
                break;
            }
            now += FRAME_MS;
            events.extend(ctrl.frame(now));
        }
        (events, now)
    }

    fn flick(ctrl: &mut WheelController<&'static str>, total: f64, span_ms: f64) -> bool {
        ctrl.pointer_down(0.0, 1000.0);
        for i in 1..=4 {
            let t = 1000.0 + span_ms * (i - 1) as f64 / 3.0;
            ctrl.pointer_move(total * i as f64 / 4.0, t);
        }
        ctrl.pointer_up(1000.0 + span_ms)
    }

    #[test]
    fn test_empty_items_rejected() {
        let result = WheelController::<&str>::new(Vec::new(), WheelSettings::default(), 1);
        assert!(matches!(result, Err(WheelError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = WheelSettings::default();
        settings.physics.friction = 1.2;
        assert!(WheelController::new(ITEMS.to_vec(), settings, 1).is_err());
    }

    #[test]
    fn test_flick_starts_spin() {
        let mut ctrl = wheel();
        assert!(flick(&mut ctrl, 1.2, 80.0));
        assert_eq!(ctrl.phase(), WheelPhase::Spinning);
        assert!(ctrl.velocity() > 0.0);
        // Drag moved the wheel 1:1 before release
        assert!((ctrl.rotation() - 1.2).abs() < 1e-9);
        assert!(matches!(
            ctrl.take_events().as_slice(),
            [WheelEvent::SpinStarted { velocity }] if *velocity > 0.0
        ));
    }

    #[test]
    fn test_tap_does_not_spin() {
        let mut ctrl = wheel();
        assert!(ctrl.pointer_down(0.3, 0.0));
        assert_eq!(ctrl.phase(), WheelPhase::Dragging);
        assert!(!ctrl.pointer_up(5.0));
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert!(ctrl.take_events().is_empty());
        assert!(!ctrl.needs_frame());
    }

    #[test]
    fn test_tap_does_not_spin_with_tiny_threshold() {
        let mut settings = WheelSettings::default();
        settings.physics.min_start_velocity = 0.0;
        assert!(WheelController::new(ITEMS.to_vec(), settings.clone(), 7).is_err());

        settings.physics.min_start_velocity = 1e-9;
        let mut ctrl = WheelController::new(ITEMS.to_vec(), settings, 7).unwrap();
        ctrl.pointer_down(0.3, 0.0);
        assert!(!ctrl.pointer_up(5.0));
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert_eq!(ctrl.velocity(), 0.0);
    }

    #[test]
    fn test_slow_drag_returns_to_idle() {
        let mut ctrl = wheel();
        // 0.005 rad over 80 ms -> 0.5 rad/s after gain, below the start threshold
        assert!(!flick(&mut ctrl, 0.005, 80.0));
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
    }

    #[test]
    fn test_held_still_before_release_does_not_spin() {
        let mut ctrl = wheel();
        ctrl.pointer_down(0.0, 0.0);
        ctrl.pointer_move(0.5, 10.0);
        ctrl.pointer_move(1.0, 20.0);
        // Release long after the last movement
        assert!(!ctrl.pointer_up(2000.0));
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
    }

    #[test]
    fn test_pointer_cancel_never_spins() {
        let mut ctrl = wheel();
        ctrl.pointer_down(0.0, 1000.0);
        ctrl.pointer_move(0.6, 1020.0);
        ctrl.pointer_move(1.2, 1040.0);
        ctrl.pointer_cancel();
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert!(!ctrl.pointer_up(1050.0));
        assert!(ctrl.take_events().is_empty());
    }

    #[test]
    fn test_pointer_ignored_while_spinning() {
        let mut ctrl = wheel();
        assert!(ctrl.spin_with_velocity(20.0));
        ctrl.frame(0.0);
        let rotation = ctrl.rotation();
        assert!(!ctrl.pointer_down(1.0, 1.0));
        ctrl.pointer_move(2.0, 2.0);
        assert_eq!(ctrl.rotation(), rotation);
        assert_eq!(ctrl.phase(), WheelPhase::Spinning);
    }

    #[test]
    fn test_spin_is_not_reentrant() {
        let mut ctrl = wheel();
        assert!(ctrl.spin_random());
        let velocity = ctrl.velocity();
        assert!(!ctrl.spin_random());
        assert!(!ctrl.spin_with_velocity(99.0));
        assert_eq!(ctrl.velocity(), velocity);
    }

    #[test]
    fn test_random_impulse_in_range_and_seeded() {
        let mut a = wheel();
        let mut b = wheel();
        assert!(a.spin_random());
        assert!(b.spin_random());
        assert_eq!(a.velocity(), b.velocity());
        let speed = a.velocity().abs();
        assert!((10.0..=30.0).contains(&speed));
    }

    #[test]
    fn test_random_impulse_uses_both_directions() {
        let mut ctrl = wheel();
        let mut saw_positive = false;
        let mut saw_negative = false;
        for _ in 0..64 {
            ctrl.reset();
            ctrl.spin_random();
            if ctrl.velocity() > 0.0 {
                saw_positive = true;
            } else {
                saw_negative = true;
            }
        }
        assert!(saw_positive && saw_negative);
    }

    #[test]
    fn test_full_spin_resolves_once_after_delay() {
        let mut ctrl = wheel();
        assert!(ctrl.spin_with_velocity(12.0));
        let (events, _) = run_until_resolved(&mut ctrl, 0.0);

        let settled_at = events
            .iter()
            .position(|e| matches!(e, WheelEvent::Settled { .. }))
            .expect("settled");
        let resolved: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, WheelEvent::Resolved { .. }))
            .collect();
        assert_eq!(resolved.len(), 1);

        let Some(WheelEvent::Settled { rotation, index }) = events.get(settled_at).copied() else {
            panic!("no settle event");
        };
        assert!(index < ITEMS.len());
        assert_eq!(ctrl.rotation(), rotation, "rotation frozen while settling");
        assert_eq!(ctrl.phase(), WheelPhase::Resolved { index });
        assert_eq!(ctrl.winner(), resolve(rotation, &ITEMS));
        assert!(!ctrl.needs_frame());
    }

    #[test]
    fn test_settle_delay_holds_result() {
        let mut ctrl = wheel();
        ctrl.spin_with_velocity(6.0);
        let mut now = 0.0;
        while !matches!(ctrl.phase(), WheelPhase::Settling { .. }) {
            now += FRAME_MS;
            ctrl.frame(now);
        }
        // 700 ms later the result is still held back
        for _ in 0..43 {
            now += FRAME_MS;
            assert!(!ctrl
                .frame(now)
                .iter()
                .any(|e| matches!(e, WheelEvent::Resolved { .. })));
        }
        assert!(ctrl.winner().is_none());
        for _ in 0..10 {
            now += FRAME_MS;
            ctrl.frame(now);
        }
        assert!(ctrl.winner().is_some());
    }

    #[test]
    fn test_reset_clears_pending_result() {
        let mut ctrl = wheel();
        ctrl.spin_with_velocity(6.0);
        let mut now = 0.0;
        while !matches!(ctrl.phase(), WheelPhase::Settling { .. }) {
            now += FRAME_MS;
            ctrl.frame(now);
        }
        ctrl.reset();
        for _ in 0..100 {
            now += FRAME_MS;
            assert!(ctrl.frame(now).is_empty());
        }
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert!(ctrl.winner().is_none());
    }

    #[test]
    fn test_dismiss_and_new_drag() {
        let mut ctrl = wheel();
        ctrl.spin_with_velocity(8.0);
        run_until_resolved(&mut ctrl, 0.0);
        assert!(ctrl.winner().is_some());

        assert!(ctrl.dismiss());
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert!(ctrl.winner().is_none());
        assert_eq!(ctrl.take_events(), vec![WheelEvent::Dismissed]);
        assert!(!ctrl.dismiss());

        ctrl.spin_with_velocity(8.0);
        run_until_resolved(&mut ctrl, 10_000.0);
        // A new drag dismisses the previous result
        assert!(ctrl.pointer_down(0.0, 0.0));
        assert_eq!(ctrl.phase(), WheelPhase::Dragging);
        assert!(ctrl.winner().is_none());
    }

    #[test]
    fn test_set_items_resets_session() {
        let mut ctrl = wheel();
        ctrl.spin_with_velocity(20.0);
        ctrl.frame(0.0);
        ctrl.set_items(vec!["A", "B"]).unwrap();
        assert_eq!(ctrl.phase(), WheelPhase::Idle);
        assert_eq!(ctrl.velocity(), 0.0);
        assert_eq!(ctrl.segments().count(), 2);

        assert!(ctrl.set_items(Vec::new()).is_err());
        assert_eq!(ctrl.items().len(), 2);
    }

    #[test]
    fn test_single_item_always_wins() {
        let mut ctrl = WheelController::new(vec!["Only"], WheelSettings::default(), 3).unwrap();
        let ticks = RecordingTone::new();
        let counter = ticks.counter();
        ctrl.set_tone(Box::new(ticks));
        ctrl.spin_random();
        run_until_resolved(&mut ctrl, 0.0);
        assert_eq!(ctrl.winner(), Some(&"Only"));
        assert_eq!(counter.get(), 0, "one segment never crosses");
    }

    #[test]
    fn test_ticks_follow_crossings() {
        let tone = RecordingTone::new();
        let counter = tone.counter();
        let mut ctrl = wheel().with_tone(Box::new(tone));
        ctrl.spin_with_velocity(25.0);
        let (events, _) = run_until_resolved(&mut ctrl, 0.0);
        let crossings = events
            .iter()
            .filter(|e| matches!(e, WheelEvent::SegmentCrossed { .. }))
            .count();
        assert!(crossings > 8);
        assert_eq!(counter.get(), crossings);
    }

    struct BrokenSpeaker;

    impl ToneSink for BrokenSpeaker {
        fn play_tick(&self) -> Result<(), AudioError> {
            Err(AudioError::Unavailable)
        }
    }

    #[test]
    fn test_audio_failure_does_not_stop_spin() {
        let mut ctrl = wheel().with_tone(Box::new(BrokenSpeaker));
        ctrl.spin_with_velocity(25.0);
        run_until_resolved(&mut ctrl, 0.0);
        assert!(ctrl.winner().is_some());
    }

    #[test]
    fn test_frame_while_idle_is_inert() {
        let mut ctrl = wheel();
        assert!(ctrl.frame(100.0).is_empty());
        assert_eq!(ctrl.rotation(), 0.0);
    }

    #[test]
    fn test_segments_track_rotation() {
        let mut ctrl = wheel();
        ctrl.pointer_down(0.0, 0.0);
        ctrl.pointer_move(0.5, 16.0);
        let first = ctrl.segments().next().unwrap();
        assert!((first.start - 0.5).abs() < 1e-12);
        assert_eq!(ctrl.index_under_pointer(), segment_index_at(0.5, 8, 0.0));
    }
}
