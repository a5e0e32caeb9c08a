//! Signed distance from a pointer to the body rectangle
//!
//! Positive outside (Euclidean distance to the nearest edge), negative inside
//! (the larger of the two axis distances to the boundary, negated).

use glam::Vec2;

use super::rect::Rect;

/// Signed distance from `p` to `rect`
pub fn sd_rect(p: Vec2, rect: &Rect) -> f32 {
    let half = rect.size * 0.5;
    let d = (p - rect.center()).abs() - half;
    let outside = d.max(Vec2::ZERO).length();
    let inside = d.x.max(d.y).min(0.0);
    outside + inside
}

/// Direction to push the body so it moves away from `p`
///
/// Uses the center-to-center direction; falls back to `None` when the
/// pointer sits exactly on the body's center.
pub fn escape_direction(p: Vec2, rect: &Rect) -> Option<Vec2> {
    let away = rect.center() - p;
    if away.length_squared() < 1e-6 {
        None
    } else {
        Some(away.normalize())
    }
}
