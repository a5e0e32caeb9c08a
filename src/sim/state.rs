//! Simulation state for the evasive button
//!
//! The engine owns all of this exclusively; the presentation layer only
//! reads positions and counters back out.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::{DISMISS_OVERSHOOT, DISMISS_SLIDE_MS};

/// Live layout measured from the page, in one coordinate space (usually
/// client/screen pixels). Re-measured on every call, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Container the body moves within
    pub arena: Rect,
    /// The accept control
    pub obstacle: Rect,
    /// Rendered size of the body
    pub body_size: Vec2,
}

impl Layout {
    pub fn new(arena: Rect, obstacle: Rect, body_size: Vec2) -> Self {
        Self {
            arena,
            obstacle,
            body_size,
        }
    }

    /// Arena size (positions are offsets inside this)
    #[inline]
    pub fn arena_size(&self) -> Vec2 {
        self.arena.size
    }

    /// Obstacle rectangle relative to the arena's top-left corner
    #[inline]
    pub fn local_obstacle(&self) -> Rect {
        self.obstacle.translate(-self.arena.origin)
    }

    /// Convert a point in layout space to arena-local coordinates
    #[inline]
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        p - self.arena.origin
    }

    /// True when the arena or body can't be measured yet
    pub fn is_unusable(&self) -> bool {
        self.arena.is_degenerate() || !(self.body_size.x > 0.0 && self.body_size.y > 0.0)
    }
}

/// The evasive control's simulated state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Offset of the top-left corner inside the arena
    pub pos: Vec2,
    /// Units per frame
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Body rectangle in arena-local coordinates
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}

/// How many times the decline control was clicked or dodged the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvasionCounter(u32);

impl EvasionCounter {
    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Bump the counter, returning the new value
    pub fn bump(&mut self) -> u32 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// RNG state wrapper so a seed can be recorded and replayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// A click feedback message waiting to be cleared
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Index into the message list
    pub index: usize,
    /// Clock time (ms) when the message should disappear
    pub expires_at_ms: f64,
}

impl Feedback {
    #[inline]
    pub fn is_live(&self, now_ms: f64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Exit slide performed by the decline control once the user accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dismissal {
    /// Arena-local position the body slides to (outside the arena)
    pub target: Vec2,
    /// Length of the slide (ms)
    pub slide_ms: f64,
}

impl Dismissal {
    /// Slide off through the arena edge closest to the body's center
    ///
    /// Ties resolve left, right, top, bottom.
    pub fn toward_nearest_edge(body: &Body, arena_size: Vec2) -> Self {
        let c = body.rect().center();
        let to_left = c.x;
        let to_right = arena_size.x - c.x;
        let to_top = c.y;
        let to_bottom = arena_size.y - c.y;
        let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

        let mut target = body.pos;
        if nearest == to_left {
            target.x = -DISMISS_OVERSHOOT;
        } else if nearest == to_right {
            target.x = arena_size.x + DISMISS_OVERSHOOT;
        } else if nearest == to_top {
            target.y = -DISMISS_OVERSHOOT;
        } else {
            target.y = arena_size.y + DISMISS_OVERSHOOT;
        }

        Self {
            target,
            slide_ms: DISMISS_SLIDE_MS,
        }
    }

    /// Opacity `elapsed_ms` after the dismissal started
    pub fn opacity_at(&self, elapsed_ms: f64) -> f32 {
        super::fx::fade_opacity(elapsed_ms)
    }
}
