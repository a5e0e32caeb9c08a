//! Valentine Dodge entry point
//!
//! On the web this wires the evasion engine to the prompt screen's DOM: it
//! measures layout every call, drives the frame loop with
//! `requestAnimationFrame`, and cancels every pending callback on accept
//! and unmount. Natively it runs a headless demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_prompt {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlElement, MouseEvent, TouchEvent};

    use valentine_dodge::sim::{Layout, Rect, chase_flicker, chase_scale};
    use valentine_dodge::{Engine, Measure, Session, Settings};

    const ARENA_ID: &str = "dodge-arena";
    const ACCEPT_ID: &str = "dodge-accept";
    const DECLINE_ID: &str = "dodge-decline";
    const MESSAGE_ID: &str = "dodge-message";
    const RESTART_ID: &str = "restart-btn";
    /// Global JS function receiving the completion payload, if the page defines one
    const COMPLETION_HOOK: &str = "onValentineComplete";

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn to_rect(el: &Element) -> Rect {
        let r = el.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
    }

    /// Reads live element rectangles on every call
    struct DomMeasure {
        arena: Element,
        accept: Element,
        decline: HtmlElement,
    }

    impl Measure for DomMeasure {
        fn measure(&self) -> Option<Layout> {
            if !self.arena.is_connected() || !self.decline.is_connected() {
                return None;
            }
            // Offset size ignores the chase scale transform
            let body_size = Vec2::new(
                self.decline.offset_width() as f32,
                self.decline.offset_height() as f32,
            );
            let layout = Layout::new(to_rect(&self.arena), to_rect(&self.accept), body_size);
            (!layout.is_unusable()).then_some(layout)
        }
    }

    /// Prompt screen instance holding all state
    struct Prompt {
        engine: Engine<DomMeasure>,
        session: Session,
        decline: HtmlElement,
        message: Option<Element>,
        frame_handle: Option<i32>,
        feedback_timeout: Option<i32>,
        fade_interval: Option<i32>,
        completion_timeout: Option<i32>,
        chase_started: Option<f64>,
    }

    impl Prompt {
        fn set_style(&self, name: &str, value: &str) {
            let _ = self.decline.style().set_property(name, value);
        }

        fn render_position(&self, pos: Vec2) {
            self.set_style("left", &format!("{:.1}px", pos.x));
            self.set_style("top", &format!("{:.1}px", pos.y));
        }

        /// Scale and flicker while the pointer is chasing the button
        fn render_chase(&mut self, now: f64) {
            let elapsed = match (self.engine.is_evading(), self.chase_started) {
                (true, Some(start)) => Some(now - start),
                (true, None) => {
                    self.chase_started = Some(now);
                    Some(0.0)
                }
                (false, _) => {
                    self.chase_started = None;
                    None
                }
            };
            let (scale, alarm) = match elapsed {
                Some(t) => (chase_scale(t), chase_flicker(t)),
                None => (1.0, false),
            };
            self.set_style("transform", &format!("scale({})", scale));
            self.set_style("background-color", if alarm { "#ef4444" } else { "#3b82f6" });
        }

        fn render_feedback(&self, now: f64) {
            if let Some(el) = &self.message {
                el.set_text_content(self.engine.feedback(now));
            }
        }

        fn cancel_frame(&mut self) {
            if let Some(handle) = self.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
        }

        fn cancel_timers(&mut self) {
            if let Some(window) = web_sys::window() {
                for handle in [self.feedback_timeout.take(), self.completion_timeout.take()]
                    .into_iter()
                    .flatten()
                {
                    window.clear_timeout_with_handle(handle);
                }
                if let Some(handle) = self.fade_interval.take() {
                    window.clear_interval_with_handle(handle);
                }
            }
        }

        /// Screen torn down: nothing may fire afterwards
        fn unmount(&mut self) {
            self.cancel_frame();
            self.cancel_timers();
            self.engine.unmount();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Valentine Dodge starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("No document, nothing to do");
            return;
        };

        let decline = document
            .get_element_by_id(DECLINE_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let (Some(arena), Some(accept), Some(decline)) = (
            document.get_element_by_id(ARENA_ID),
            document.get_element_by_id(ACCEPT_ID),
            decline,
        ) else {
            log::warn!("Prompt screen elements missing, evasive button disabled");
            return;
        };

        let settings = Settings::load();
        let seed = now_ms() as u64;
        let measure = DomMeasure {
            arena: arena.clone(),
            accept: accept.clone(),
            decline: decline.clone(),
        };
        let mut engine = Engine::new(settings, seed, measure);
        let start = engine.initialize();

        let prompt = Rc::new(RefCell::new(Prompt {
            engine,
            session: Session::new(),
            decline: decline.clone(),
            message: document.get_element_by_id(MESSAGE_ID),
            frame_handle: None,
            feedback_timeout: None,
            fade_interval: None,
            completion_timeout: None,
            chase_started: None,
        }));
        {
            let p = prompt.borrow();
            p.set_style("position", "absolute");
            p.set_style("transition", "transform 0.1s ease-out");
            p.render_position(start);
        }

        log::info!("Prompt initialized with seed: {}", seed);

        setup_pointer_handlers(&arena, &decline, prompt.clone());
        setup_accept(&accept, prompt.clone());
        setup_restart(prompt.clone());
        setup_lifecycle(prompt);

        log::info!("Valentine Dodge running!");
    }

    /// Schedule the next frame unless one is already pending
    fn request_frame(prompt: Rc<RefCell<Prompt>>) {
        if prompt.borrow().frame_handle.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let p = prompt.clone();
        let closure = Closure::once(move |time: f64| {
            frame(p, time);
        });
        if let Ok(handle) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            prompt.borrow_mut().frame_handle = Some(handle);
        }
        closure.forget();
    }

    fn frame(prompt: Rc<RefCell<Prompt>>, _time: f64) {
        let keep_running = {
            let mut p = prompt.borrow_mut();
            p.frame_handle = None;
            if let Some(outcome) = p.engine.step() {
                p.render_position(outcome.position);
            }
            p.render_chase(now_ms());
            p.engine.is_running()
        };

        if keep_running {
            request_frame(prompt);
        }
    }

    fn pointer_moved(prompt: &Rc<RefCell<Prompt>>, x: f32, y: f32) {
        let running = {
            let mut p = prompt.borrow_mut();
            p.engine.on_pointer_move(x, y);
            p.render_chase(now_ms());
            p.engine.is_running()
        };
        if running {
            request_frame(prompt.clone());
        }
    }

    fn setup_pointer_handlers(arena: &Element, decline: &HtmlElement, prompt: Rc<RefCell<Prompt>>) {
        // Mouse move over the arena
        {
            let prompt = prompt.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                pointer_moved(&prompt, event.client_x() as f32, event.client_y() as f32);
            });
            let _ = arena
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start and move
        for kind in ["touchstart", "touchmove"] {
            let prompt = prompt.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    pointer_moved(&prompt, touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = arena.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Direct click on the decline button
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                activated(&prompt);
            });
            let _ = decline
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn activated(prompt: &Rc<RefCell<Prompt>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let now = now_ms();
        {
            let mut p = prompt.borrow_mut();
            let count = p.engine.on_activate(now);
            log::info!("Decline clicked ({} so far)", count);
            p.render_feedback(now);

            // Debounce: a new click restarts the clear timer
            if let Some(handle) = p.feedback_timeout.take() {
                window.clear_timeout_with_handle(handle);
            }
            if let Some(deadline) = p.engine.feedback_deadline() {
                let prompt = prompt.clone();
                let closure = Closure::once(move || {
                    let mut p = prompt.borrow_mut();
                    p.feedback_timeout = None;
                    let now = now_ms();
                    if p.engine.expire_feedback(now) {
                        p.render_feedback(now);
                    }
                });
                let delay = (deadline - now).max(0.0) as i32;
                if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    delay,
                ) {
                    p.feedback_timeout = Some(handle);
                }
                closure.forget();
            }
        }
        request_frame(prompt.clone());
    }

    fn setup_accept(accept: &Element, prompt: Rc<RefCell<Prompt>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            accepted(&prompt);
        });
        let _ = accept.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn accepted(prompt: &Rc<RefCell<Prompt>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut p = prompt.borrow_mut();
        if p.engine.is_accepted() {
            return;
        }
        let total = p.engine.on_accept();
        p.cancel_frame();
        p.cancel_timers();
        p.render_feedback(now_ms());
        p.render_chase(now_ms());
        log::info!("Accepted! Decline control evaded {} times", total);

        // Slide off the nearest edge and fade out
        if let Some(dismissal) = p.engine.dismissal().copied() {
            p.set_style(
                "transition",
                &format!("all {}ms ease-out", dismissal.slide_ms as u32),
            );
            p.render_position(dismissal.target);

            let started = now_ms();
            let decline = p.decline.clone();
            let fade_prompt = prompt.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let opacity = dismissal.opacity_at(now_ms() - started);
                let _ = decline.style().set_property("opacity", &opacity.to_string());
                if opacity <= 0.0 {
                    if let (Some(window), Ok(mut p)) =
                        (web_sys::window(), fade_prompt.try_borrow_mut())
                    {
                        if let Some(handle) = p.fade_interval.take() {
                            window.clear_interval_with_handle(handle);
                        }
                    }
                }
            });
            if let Ok(handle) = window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                60,
            ) {
                p.fade_interval = Some(handle);
            }
            closure.forget();
        }

        // Report upward after a short beat
        let delay = p.engine.completion_delay_ms() as i32;
        let report_prompt = prompt.clone();
        let closure = Closure::once(move || {
            let mut p = report_prompt.borrow_mut();
            p.completion_timeout = None;
            let Some(evasions) = p.engine.take_completion() else {
                return;
            };
            if p.session.record_completion(evasions, now_ms()).is_some() {
                if let Some(payload) = p.session.payload_json() {
                    notify_completion(&payload);
                }
            }
        });
        if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay,
        ) {
            p.completion_timeout = Some(handle);
        }
        closure.forget();
    }

    /// Hand the payload to the page's completion hook, if it has one
    fn notify_completion(payload: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let hook = js_sys::Reflect::get(&window, &JsValue::from_str(COMPLETION_HOOK))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        match hook {
            Some(f) => {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(payload)) {
                    log::warn!("Completion hook failed: {:?}", e);
                }
            }
            None => log::info!("Completion payload: {}", payload),
        }
    }

    fn setup_restart(prompt: Rc<RefCell<Prompt>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id(RESTART_ID) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut p = prompt.borrow_mut();
                p.unmount();
                p.session.restart();
                p.engine.reset();
                let start = p.engine.initialize();
                p.chase_started = None;
                p.set_style("transition", "transform 0.1s ease-out");
                p.set_style("opacity", "1");
                p.render_position(start);
                p.render_chase(now_ms());
                p.render_feedback(now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle(prompt: Rc<RefCell<Prompt>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Hidden tab: drop the pending frame, resume when visible again
        {
            let prompt = prompt.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let resume = {
                    let mut p = prompt.borrow_mut();
                    if hidden {
                        p.cancel_frame();
                        false
                    } else {
                        p.engine.is_running()
                    }
                };
                if resume {
                    request_frame(prompt.clone());
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Page going away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                prompt.borrow_mut().unmount();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_prompt::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Valentine Dodge (native) starting...");
    log::info!("The prompt screen runs in the browser - build for wasm32 to use it");

    demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Launch the button across a fixed layout and report where it settles
#[cfg(not(target_arch = "wasm32"))]
fn demo() {
    use glam::Vec2;
    use valentine_dodge::sim::{Layout, Rect};
    use valentine_dodge::{Engine, Session, Settings};

    let layout = Layout::new(
        Rect::new(0.0, 0.0, 300.0, 150.0),
        Rect::new(100.0, 0.0, 100.0, 50.0),
        Vec2::new(80.0, 30.0),
    );
    let mut engine = Engine::new(Settings::default(), 2024, layout);
    let start = engine.initialize();
    log::info!("Spawned at ({:.1}, {:.1})", start.x, start.y);

    engine.apply_impulse(Vec2::new(18.0, 0.0));
    let mut frames = 0u32;
    while let Some(outcome) = engine.step() {
        frames += 1;
        if outcome.rested {
            log::info!(
                "Rested after {} frames at ({:.1}, {:.1})",
                frames,
                outcome.position.x,
                outcome.position.y
            );
        }
    }

    engine.on_activate(0.0);
    engine.on_activate(100.0);
    let total = engine.on_accept();

    let mut session = Session::new();
    if let Some(evasions) = engine.take_completion() {
        session.record_completion(evasions, 0.0);
    }
    println!(
        "Accepted after {} evasions; payload: {}",
        total,
        session.payload_json().unwrap_or_default()
    );
}
