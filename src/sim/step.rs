//! Per-frame simulation step
//!
//! One call per display frame while the body is moving. Deltas are fixed
//! per frame rather than scaled by elapsed time, so a tab that was hidden
//! never resumes with one huge jump.

use glam::Vec2;

use super::collision::{clamp_to_arena, resolve_obstacle, resolve_walls};
use super::state::{Body, Layout};
use crate::settings::Tuning;

/// What a single step produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Arena-local body position after resolution
    pub position: Vec2,
    /// Whether another frame should be scheduled
    pub running: bool,
    /// True only on the frame where the body came to rest
    pub rested: bool,
}

/// Advance the body by one frame
///
/// Order matters: walls, then the obstacle, then a wall re-clamp, so an
/// obstacle push near a corner can't carry the body through the arena edge.
pub fn step(body: &mut Body, layout: &Layout, tuning: &Tuning) -> StepOutcome {
    let arena_size = layout.arena_size();
    // The body may have been resized by a responsive layout
    body.size = layout.body_size;

    body.pos += body.vel;

    resolve_walls(
        &mut body.pos,
        &mut body.vel,
        arena_size,
        body.size,
        tuning.restitution,
    );

    if !layout.obstacle.is_degenerate() {
        resolve_obstacle(
            &mut body.pos,
            &mut body.vel,
            body.size,
            &layout.local_obstacle(),
            tuning.gap,
            arena_size,
            tuning.restitution,
        );
    }

    body.pos = clamp_to_arena(body.pos, arena_size, body.size);

    body.vel *= tuning.friction;

    let rested = body.speed() < tuning.rest_speed;
    if rested {
        body.stop();
    }

    StepOutcome {
        position: body.pos,
        running: !rested,
        rested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;

    fn layout() -> Layout {
        Layout::new(
            Rect::new(0.0, 0.0, 300.0, 150.0),
            Rect::new(100.0, 0.0, 100.0, 50.0),
            Vec2::new(80.0, 30.0),
        )
    }

    #[test]
    fn test_step_integrates_and_applies_friction() {
        let tuning = Tuning::default();
        let mut body = Body::new(Vec2::new(10.0, 100.0), Vec2::new(80.0, 30.0));
        body.vel = Vec2::new(4.0, 0.0);

        let out = step(&mut body, &layout(), &tuning);

        assert!(out.running);
        assert!(!out.rested);
        assert!((out.position.x - 14.0).abs() < 1e-5);
        assert!((body.vel.x - 4.0 * 0.985).abs() < 1e-5);
    }

    #[test]
    fn test_step_comes_to_rest() {
        let tuning = Tuning::default();
        let mut body = Body::new(Vec2::new(10.0, 100.0), Vec2::new(80.0, 30.0));
        body.vel = Vec2::new(0.151, 0.0);

        let out = step(&mut body, &layout(), &tuning);

        assert!(out.rested);
        assert!(!out.running);
        assert_eq!(body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_step_bounces_off_right_wall() {
        let tuning = Tuning::default();
        let mut body = Body::new(Vec2::new(215.0, 100.0), Vec2::new(80.0, 30.0));
        body.vel = Vec2::new(10.0, 0.0);

        let out = step(&mut body, &layout(), &tuning);

        assert_eq!(out.position.x, 220.0);
        assert!((body.vel.x - -10.0 * 0.7 * 0.985).abs() < 1e-4);
    }

    #[test]
    fn test_step_picks_up_resized_body() {
        let tuning = Tuning::default();
        let mut body = Body::new(Vec2::new(215.0, 100.0), Vec2::new(40.0, 20.0));
        body.vel = Vec2::new(1.0, 0.0);

        let out = step(&mut body, &layout(), &tuning);

        assert_eq!(body.size, Vec2::new(80.0, 30.0));
        assert!(out.position.x <= 220.0);
    }

    #[test]
    fn test_step_ignores_degenerate_obstacle() {
        let tuning = Tuning::default();
        let mut layout = layout();
        layout.obstacle = Rect::new(100.0, 0.0, 0.0, 0.0);
        let mut body = Body::new(Vec2::new(110.0, 10.0), Vec2::new(80.0, 30.0));
        body.vel = Vec2::new(1.0, 0.0);

        let out = step(&mut body, &layout, &tuning);
        assert!((out.position.x - 111.0).abs() < 1e-5);
        assert!((out.position.y - 10.0).abs() < 1e-5);
    }
}
