//! Deterministic simulation module
//!
//! All motion and collision logic lives here. This module must be pure:
//! - Fixed per-frame deltas only
//! - Seeded RNG only (owned by the engine)
//! - No DOM or platform dependencies

pub mod collision;
pub mod fx;
pub mod rect;
pub mod sdf;
pub mod state;
pub mod step;

pub use collision::{CollisionResult, Side, clamp_to_arena, resolve_obstacle, resolve_walls};
pub use fx::{chase_flicker, chase_scale, fade_opacity};
pub use rect::Rect;
pub use sdf::{escape_direction, sd_rect};
pub use state::{Body, Dismissal, EvasionCounter, Feedback, Layout, RngState};
pub use step::{StepOutcome, step};
