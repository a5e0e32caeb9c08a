//! Evasion engine: the input-facing contract over the simulation
//!
//! The engine is the only thing that mutates the body. Every call re-measures
//! the live layout through [`Measure`]; if nothing can be measured the call is
//! a no-op and the next input or frame picks things back up.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::COMPLETION_DELAY_MS;
use crate::settings::{Settings, Tuning};
use crate::sim::{
    Body, Dismissal, EvasionCounter, Feedback, Layout, RngState, StepOutcome, clamp_to_arena,
    escape_direction, sd_rect,
};
use crate::{rotate, unit_from_angle};

/// Source of fresh layout measurements
pub trait Measure {
    /// Current layout, or `None` while anything is unmounted or zero-sized
    fn measure(&self) -> Option<Layout>;
}

impl Measure for Layout {
    fn measure(&self) -> Option<Layout> {
        (!self.is_unusable()).then_some(*self)
    }
}

impl Measure for Option<Layout> {
    fn measure(&self) -> Option<Layout> {
        self.as_ref().and_then(|layout| layout.measure())
    }
}

/// Where the body starts: centered below the accept control
///
/// Falls back to a fixed coordinate when the accept control has no size.
pub fn spawn_position(layout: &Layout, tuning: &Tuning) -> Vec2 {
    let (fx, fy) = tuning.fallback_position;
    let pos = if layout.obstacle.is_degenerate() {
        Vec2::new(fx, fy)
    } else {
        let obstacle = layout.local_obstacle();
        Vec2::new(
            obstacle.center().x - layout.body_size.x / 2.0,
            obstacle.max().y + tuning.spawn_gap,
        )
    };
    clamp_to_arena(pos, layout.arena_size(), layout.body_size)
}

/// The evasive decline control
pub struct Engine<M: Measure> {
    settings: Settings,
    measure: M,
    rng_state: RngState,
    rng: Pcg32,
    body: Option<Body>,
    counter: EvasionCounter,
    clicks: u32,
    evading: bool,
    running: bool,
    accepted: bool,
    completion: Option<u32>,
    feedback: Option<Feedback>,
    dismissal: Option<Dismissal>,
}

impl<M: Measure> Engine<M> {
    /// Create an engine reading layout from `measure`
    pub fn new(settings: Settings, seed: u64, measure: M) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            rng: rng_state.to_rng(),
            rng_state,
            settings,
            measure,
            body: None,
            counter: EvasionCounter::default(),
            clicks: 0,
            evading: false,
            running: false,
            accepted: false,
            completion: None,
            feedback: None,
            dismissal: None,
        }
    }

    /// Place the body at its starting spot and return that position
    ///
    /// Without a measurable layout the fallback coordinate is used and the
    /// body size is picked up on the first step.
    pub fn initialize(&mut self) -> Vec2 {
        let tuning = &self.settings.tuning;
        let body = match self.measure.measure() {
            Some(layout) => Body::new(spawn_position(&layout, tuning), layout.body_size),
            None => {
                let (x, y) = tuning.fallback_position;
                log::debug!("Layout not measurable at mount, using fallback position");
                Body::new(Vec2::new(x, y), Vec2::ZERO)
            }
        };
        log::info!("Decline control mounted at ({:.1}, {:.1})", body.pos.x, body.pos.y);
        self.body = Some(body);
        body.pos
    }

    /// React to the pointer at `(x, y)` in layout coordinates
    ///
    /// Inside the dodge threshold the body starts evading (counted once per
    /// approach) and, if it has slowed enough, flees away from the pointer.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.accepted {
            return;
        }
        let Some(layout) = self.measure.measure() else {
            return;
        };
        let Some(body) = self.body.as_mut() else {
            return;
        };
        let tuning = &self.settings.tuning;
        body.size = layout.body_size;

        // Motion left over from a frame that lost the layout
        if !self.running && body.speed() >= tuning.rest_speed {
            self.running = true;
        }

        let pointer = layout.to_local(Vec2::new(x, y));
        let rect = body.rect();
        let distance = sd_rect(pointer, &rect);

        if distance < tuning.dodge_threshold {
            if !self.evading {
                self.evading = true;
                let n = self.counter.bump();
                log::debug!("Evading started (count {})", n);
            }

            // Throttle: no new dodge while still fleeing from the last one
            if body.speed() < tuning.restart_speed() {
                let away = match escape_direction(pointer, &rect) {
                    Some(dir) => dir,
                    None => unit_from_angle(self.rng.random_range(0.0..TAU)),
                };
                let jitter = tuning.jitter_degrees.abs().to_radians();
                let jitter = self.rng.random_range(-jitter..=jitter);
                body.vel = rotate(away, jitter) * tuning.launch_speed;
                self.running = true;
            }
        } else if distance > tuning.release_distance() && self.evading {
            self.evading = false;
            log::debug!("Evading stopped");
        }
    }

    /// Handle a direct click or tap on the body; returns the updated counter
    ///
    /// Launches in a random direction nudged away from the arena center,
    /// and (re)starts the feedback message for `tuning.feedback_ms`.
    pub fn on_activate(&mut self, now_ms: f64) -> u32 {
        if self.accepted {
            return self.counter.get();
        }
        let Some(layout) = self.measure.measure() else {
            return self.counter.get();
        };
        let Some(body) = self.body.as_mut() else {
            return self.counter.get();
        };
        let tuning = &self.settings.tuning;
        body.size = layout.body_size;

        let dir = unit_from_angle(self.rng.random_range(0.0..TAU));
        let away = (body.rect().center() - layout.arena_size() * 0.5).normalize_or_zero();
        body.vel = (dir + away * tuning.center_bias) * tuning.launch_speed;
        self.running = true;

        // Rotation follows the click index, not the evasion counter
        if let Some((index, message)) = self.settings.message_for(self.clicks) {
            log::debug!("Feedback: {}", message);
            self.feedback = Some(Feedback {
                index,
                expires_at_ms: now_ms + tuning.feedback_ms,
            });
        }

        self.clicks = self.clicks.wrapping_add(1);
        self.counter.bump()
    }

    /// Apply a raw impulse, replacing the current velocity
    pub fn apply_impulse(&mut self, vel: Vec2) {
        if self.accepted {
            return;
        }
        if let Some(body) = self.body.as_mut() {
            body.vel = vel;
            self.running = vel.length() >= self.settings.tuning.rest_speed;
            if !self.running {
                body.stop();
            }
        }
    }

    /// The user picked the accept control; returns the final counter
    ///
    /// Stops the frame loop for good. Calling it again returns the same
    /// value and changes nothing.
    pub fn on_accept(&mut self) -> u32 {
        if self.accepted {
            return self.counter.get();
        }
        self.accepted = true;
        self.running = false;
        self.evading = false;
        self.feedback = None;

        if let Some(body) = self.body.as_mut() {
            body.stop();
            if let Some(layout) = self.measure.measure() {
                self.dismissal = Some(Dismissal::toward_nearest_edge(body, layout.arena_size()));
            }
        }

        let total = self.counter.get();
        self.completion = Some(total);
        log::info!("Accepted after {} evasions", total);
        total
    }

    /// Final counter to report, handed out exactly once after accept
    pub fn take_completion(&mut self) -> Option<u32> {
        self.completion.take()
    }

    /// Advance one display frame
    ///
    /// Returns `None` when nothing was simulated (at rest, accepted, or the
    /// layout is unmeasurable). Losing the layout parks the loop with the
    /// velocity kept; the next pointer move or click picks it back up.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if !self.running {
            return None;
        }
        let Some(layout) = self.measure.measure() else {
            self.running = false;
            log::debug!("Layout not measurable, frame loop parked");
            return None;
        };
        let body = self.body.as_mut()?;

        let outcome = crate::sim::step(body, &layout, &self.settings.tuning);
        if outcome.rested {
            self.running = false;
            log::debug!(
                "Came to rest at ({:.1}, {:.1})",
                outcome.position.x,
                outcome.position.y
            );
        }
        Some(outcome)
    }

    /// Screen is going away: stop everything that could fire later
    pub fn unmount(&mut self) {
        self.running = false;
        self.evading = false;
        self.feedback = None;
        if let Some(body) = self.body.as_mut() {
            body.stop();
        }
        log::debug!("Decline control unmounted");
    }

    /// Flow restarted from the beginning: forget everything, counter included
    pub fn reset(&mut self) {
        self.unmount();
        self.body = None;
        self.counter.reset();
        self.clicks = 0;
        self.accepted = false;
        self.completion = None;
        self.dismissal = None;
        self.rng = self.rng_state.to_rng();
        log::info!("Evasion engine reset");
    }

    /// Current feedback message, if one is still showing at `now_ms`
    pub fn feedback(&self, now_ms: f64) -> Option<&str> {
        let feedback = self.feedback.filter(|f| f.is_live(now_ms))?;
        self.settings.messages.get(feedback.index).map(String::as_str)
    }

    /// When the current feedback message should be cleared
    pub fn feedback_deadline(&self) -> Option<f64> {
        self.feedback.map(|f| f.expires_at_ms)
    }

    /// Drop the feedback message if it has expired; true if one was cleared
    pub fn expire_feedback(&mut self, now_ms: f64) -> bool {
        match self.feedback {
            Some(f) if !f.is_live(now_ms) => {
                self.feedback = None;
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        self.body.map(|b| b.pos)
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn counter(&self) -> u32 {
        self.counter.get()
    }

    /// Whether the host should schedule another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_evading(&self) -> bool {
        self.evading
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn dismissal(&self) -> Option<&Dismissal> {
        self.dismissal.as_ref()
    }

    /// Delay between accept and reporting completion upward
    pub fn completion_delay_ms(&self) -> f64 {
        COMPLETION_DELAY_MS
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }
}
