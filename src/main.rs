//! Lunch Wheel entry point
//!
//! On the web this mounts the wheel on `#canvas` and drives it from browser
//! events. Natively it runs one headless spin and prints the winner.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::{Rc, Weak};

    use glam::DVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, PointerEvent};

    use lunch_wheel::audio::AudioManager;
    use lunch_wheel::item::{Restaurant, WheelItem, restaurants_from_json};
    use lunch_wheel::platform::WheelSession;
    use lunch_wheel::platform::web::{CanvasCapture, RafScheduler};
    use lunch_wheel::sim::{WheelController, WheelEvent};
    use lunch_wheel::{WheelSettings, pointer_angle};

    const COLORS: [&str; 10] = [
        "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
        "#BB8FCE", "#85C1E9",
    ];
    const HUB_RADIUS: f64 = 20.0;
    const POINTER_SIZE: f64 = 15.0;
    /// Label start distance from the hub center
    const LABEL_INSET: f64 = 20.0;

    /// Wheel instance plus everything needed to draw it
    struct App {
        session: WheelSession<Restaurant, RafScheduler>,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        document: Document,
        /// Shares the context owned by the controller's tone sink
        audio: AudioManager,
        /// Drawing size in CSS pixels
        size: f64,
    }

    impl App {
        fn center(&self) -> DVec2 {
            DVec2::splat(self.size / 2.0)
        }

        fn radius(&self) -> f64 {
            self.size / 2.0 - 20.0
        }

        fn angle_of(&self, event: &PointerEvent) -> f64 {
            let pos = DVec2::new(event.offset_x() as f64, event.offset_y() as f64);
            pointer_angle(pos, self.center())
        }

        /// React to wheel events, then redraw
        fn after_update(&mut self, events: Vec<WheelEvent>) {
            for event in events {
                match event {
                    WheelEvent::SpinStarted { velocity } => {
                        log::debug!("Spin started at {:.2} rad/s", velocity);
                    }
                    WheelEvent::Resolved { .. } => self.show_winner(),
                    WheelEvent::Dismissed => self.hide_winner(),
                    WheelEvent::Settled { index, .. } => {
                        log::debug!("Wheel stopped on segment {}", index);
                    }
                    WheelEvent::SegmentCrossed { .. } => {}
                }
            }
            self.update_controls();
            self.draw();
        }

        fn show_winner(&self) {
            let Some(winner) = self.session.controller().winner() else {
                return;
            };
            if let Some(el) = self.document.get_element_by_id("winner-name") {
                el.set_text_content(Some(winner.label()));
            }
            if let Some(el) = self.document.get_element_by_id("winner-address") {
                el.set_text_content(Some(&winner.formatted_address));
            }
            if let Some(el) = self.document.get_element_by_id("winner") {
                let _ = el.set_attribute("class", "");
            }
        }

        fn hide_winner(&self) {
            if let Some(el) = self.document.get_element_by_id("winner") {
                let _ = el.set_attribute("class", "hidden");
            }
        }

        fn update_controls(&self) {
            let busy = !self.session.controller().phase().accepts_input();
            if let Some(btn) = self.document.get_element_by_id("spin-btn") {
                let _ = if busy {
                    btn.set_attribute("disabled", "")
                } else {
                    btn.remove_attribute("disabled")
                };
            }
        }

        fn draw(&self) {
            let ctx = &self.ctx;
            let c = self.center();
            let radius = self.radius();
            let controller = self.session.controller();
            let items = controller.items();

            ctx.clear_rect(0.0, 0.0, self.size, self.size);

            for segment in controller.segments() {
                ctx.begin_path();
                ctx.move_to(c.x, c.y);
                let _ = ctx.arc(c.x, c.y, radius, segment.start, segment.end);
                ctx.close_path();
                ctx.set_fill_style_str(COLORS[segment.index % COLORS.len()]);
                ctx.fill();
                ctx.set_stroke_style_str("#fff");
                ctx.set_line_width(2.0);
                ctx.stroke();

                let Some(item) = items.get(segment.index) else {
                    continue;
                };
                let anchor = c + segment.label_anchor(LABEL_INSET);
                ctx.save();
                let _ = ctx.translate(anchor.x, anchor.y);
                let _ = ctx.rotate(segment.mid_angle());
                ctx.set_text_align("left");
                ctx.set_fill_style_str("#fff");
                ctx.set_font("bold 14px Arial");
                ctx.set_shadow_color("rgba(0,0,0,0.5)");
                ctx.set_shadow_blur(2.0);
                let max_width = radius - 2.0 * LABEL_INSET;
                let _ = ctx.fill_text_with_max_width(&item.short_label(), 0.0, 5.0, max_width);
                ctx.restore();
            }

            // Hub
            ctx.begin_path();
            let _ = ctx.arc(c.x, c.y, HUB_RADIUS, 0.0, TAU);
            ctx.set_fill_style_str("#333");
            ctx.fill();
            ctx.set_stroke_style_str("#fff");
            ctx.set_line_width(3.0);
            ctx.stroke();

            // Pointer, fixed at angle 0
            ctx.begin_path();
            ctx.move_to(c.x + radius + 10.0, c.y);
            ctx.line_to(c.x + radius - 10.0, c.y - POINTER_SIZE);
            ctx.line_to(c.x + radius - 10.0, c.y + POINTER_SIZE);
            ctx.close_path();
            ctx.set_fill_style_str("#333");
            ctx.fill();
            ctx.set_stroke_style_str("#fff");
            ctx.set_line_width(2.0);
            ctx.stroke();
        }
    }

    /// Items come from `<script id="wheel-data" type="application/json">`
    fn load_items(document: &Document) -> Result<Vec<Restaurant>, JsValue> {
        let json = document
            .get_element_by_id("wheel-data")
            .and_then(|el| el.text_content())
            .ok_or_else(|| JsValue::from_str("missing #wheel-data"))?;
        restaurants_from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Lunch Wheel starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        // Backing store at device resolution, drawing in CSS pixels
        let dpr = window.device_pixel_ratio();
        let size = canvas.client_width().min(canvas.client_height()).max(1) as f64;
        canvas.set_width((size * dpr) as u32);
        canvas.set_height((size * dpr) as u32);
        ctx.scale(dpr, dpr)?;

        let items = load_items(&document)?;
        let settings = WheelSettings::load();
        let tone = AudioManager::new(settings.effective_volume());
        let seed = js_sys::Date::now() as u64;
        let controller = WheelController::new(items, settings, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .with_tone(Box::new(tone.clone()));

        log::info!(
            "Wheel initialized with {} items, seed {}",
            controller.items().len(),
            seed
        );

        let session = WheelSession::new(
            controller,
            RafScheduler::new(window.clone()),
            Rc::new(CanvasCapture::new(canvas.clone())),
        );
        let app = Rc::new(RefCell::new(App {
            session,
            canvas: canvas.clone(),
            ctx,
            document: document.clone(),
            audio: tone,
            size,
        }));

        // The frame callback holds a weak handle so the app can be dropped
        let weak: Weak<RefCell<App>> = Rc::downgrade(&app);
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if let Some(app) = weak.upgrade() {
                let mut a = app.borrow_mut();
                let events = a.session.on_frame(time);
                a.after_update(events);
            }
        });
        app.borrow_mut().session.scheduler_mut().bind(on_frame);

        setup_pointer_handlers(&app)?;
        setup_controls(&app, &document)?;

        app.borrow().draw();
        app.borrow().update_controls();

        log::info!("Lunch Wheel running!");
        Ok(())
    }

    fn setup_pointer_handlers(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
        let canvas = app.borrow().canvas.clone();

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.audio.resume();
                let angle = a.angle_of(&event);
                a.session
                    .pointer_down(event.pointer_id(), angle, event.time_stamp());
                let events = a.session.take_events();
                a.after_update(events);
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                if a.session.captured_pointer() != Some(event.pointer_id()) {
                    return;
                }
                let angle = a.angle_of(&event);
                a.session
                    .pointer_move(event.pointer_id(), angle, event.time_stamp());
                a.draw();
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                a.session.pointer_up(event.pointer_id(), event.time_stamp());
                let events = a.session.take_events();
                a.after_update(events);
            });
            canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                a.session.pointer_cancel(event.pointer_id());
                let events = a.session.take_events();
                a.after_update(events);
            });
            canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_controls(app: &Rc<RefCell<App>>, document: &Document) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("spin-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.session.spin();
                let events = a.session.take_events();
                a.after_update(events);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("winner-close") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.session.dismiss();
                let events = a.session.take_events();
                a.after_update(events);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Escape closes the winner display
        {
            let app = app.clone();
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Escape" {
                    let mut a = app.borrow_mut();
                    if a.session.dismiss() {
                        let events = a.session.take_events();
                        a.after_update(events);
                    }
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), lunch_wheel::WheelError> {
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use lunch_wheel::audio::RecordingTone;
    use lunch_wheel::item::{WheelItem, restaurants_from_json};
    use lunch_wheel::platform::{ManualFrames, NoCapture, WheelSession};
    use lunch_wheel::sim::{WheelController, WheelEvent};
    use lunch_wheel::{WheelError, WheelSettings, consts::NOMINAL_FRAME_DT};

    env_logger::init();
    log::info!("Lunch Wheel (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let labels: Vec<String> = if args.first().map(String::as_str) == Some("--json") {
        let path = args.get(1).ok_or_else(|| {
            WheelError::InvalidConfiguration("--json expects a file path".to_string())
        })?;
        let json = std::fs::read_to_string(path)?;
        restaurants_from_json(&json)?
            .into_iter()
            .map(|r| r.name)
            .collect()
    } else if args.is_empty() {
        ["Taqueria", "Pho House", "Burger Barn", "Sushi Bar", "Pizza Place", "Thai Garden"]
            .into_iter()
            .map(String::from)
            .collect()
    } else {
        args
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let tone = RecordingTone::new();
    let ticks = tone.counter();
    let controller =
        WheelController::new(labels, WheelSettings::load(), seed)?.with_tone(Box::new(tone));
    let mut session = WheelSession::new(controller, ManualFrames::new(), Rc::new(NoCapture));

    session.spin();
    for event in session.take_events() {
        log::info!("{:?}", event);
    }

    // Stand-in for the display refresh: deliver frames while one is requested
    let frame_ms = NOMINAL_FRAME_DT * 1000.0;
    let mut now = 0.0;
    while session.scheduler_mut().fire().is_some() {
        now += frame_ms;
        for event in session.on_frame(now) {
            match event {
                WheelEvent::SegmentCrossed { .. } => log::trace!("{:?}", event),
                _ => log::info!("{:?}", event),
            }
        }
    }

    let controller = session.controller();
    match controller.winner() {
        Some(winner) => println!(
            "Winner: {} ({} ticks, {:.1}s)",
            winner.label(),
            ticks.get(),
            now / 1000.0
        ),
        None => println!("No winner"),
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
