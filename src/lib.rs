//! Valentine Dodge - the evasive "No" button of a Valentine prompt screen
//!
//! Core modules:
//! - `sim`: Deterministic simulation (body state, collisions, per-frame step)
//! - `engine`: Input-facing contract (pointer, activate, accept) over the sim
//! - `settings`: Data-driven tuning and feedback messages
//! - `session`: Flow-level completion report with reset-on-restart

pub mod engine;
pub mod session;
pub mod settings;
pub mod sim;

pub use engine::{Engine, Measure};
pub use session::{CompletionReport, Session};
pub use settings::{Settings, SettingsError, Tuning};

use glam::Vec2;

/// Default tuning constants
pub mod consts {
    /// Fraction of velocity kept after a wall or obstacle bounce
    pub const RESTITUTION: f32 = 0.7;
    /// Per-frame velocity multiplier
    pub const FRICTION: f32 = 0.985;
    /// Speed (units/frame) below which the body is considered at rest
    pub const REST_SPEED: f32 = 0.15;
    /// Speed of a fresh impulse (units/frame)
    pub const LAUNCH_SPEED: f32 = 18.0;

    /// Margin kept between the body and the accept control
    pub const OBSTACLE_GAP: f32 = 2.0;
    /// Vertical gap between the accept control and the body at spawn
    pub const SPAWN_GAP: f32 = 16.0;
    /// Spawn position used when the accept control has no measurable size
    pub const FALLBACK_POSITION: (f32, f32) = (20.0, 70.0);

    /// Pointer distance (from the body's nearest edge) that starts a dodge
    pub const DODGE_THRESHOLD: f32 = 60.0;
    /// Evading ends once the pointer is this many thresholds away
    pub const RELEASE_FACTOR: f32 = 2.5;
    /// A new dodge only fires once speed drops below this fraction of launch speed
    pub const RESTART_FRACTION: f32 = 0.3;
    /// Random angular jitter applied to dodge direction (degrees, +/-)
    pub const JITTER_DEGREES: f32 = 10.0;
    /// Weight of the push away from arena center on a direct click
    pub const CENTER_BIAS: f32 = 0.35;

    /// How long a click feedback message stays visible (ms)
    pub const FEEDBACK_MS: f64 = 2000.0;
    /// Delay between accept and reporting completion (ms)
    pub const COMPLETION_DELAY_MS: f64 = 500.0;

    /// Distance beyond the arena edge the body slides to on dismissal
    pub const DISMISS_OVERSHOOT: f32 = 100.0;
    /// Length of the dismissal slide (ms)
    pub const DISMISS_SLIDE_MS: f64 = 3000.0;
}

/// Rotate a vector by `angle` radians (counter-clockwise in math coords)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Unit vector pointing along `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_from_angle_is_normalized() {
        for i in 0..16 {
            let a = i as f32 * 0.4;
            assert!((unit_from_angle(a).length() - 1.0).abs() < 1e-5);
        }
    }
}
