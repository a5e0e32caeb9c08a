//! Collision detection and response against the arena walls and the accept control
//!
//! Everything is axis-aligned: walls reflect one velocity component, the
//! obstacle pushes the body out along the axis of least penetration.

use glam::Vec2;

use super::rect::Rect;

/// Side of a rectangle a collision pushed the body toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Fixed check order; the first side wins a penetration tie
    pub const ORDER: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// Outward unit normal of this side
    pub fn normal(self) -> Vec2 {
        match self {
            Side::Left => Vec2::NEG_X,
            Side::Right => Vec2::X,
            Side::Top => Vec2::NEG_Y,
            Side::Bottom => Vec2::Y,
        }
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Direction the body was pushed (unit, axis-aligned)
    pub normal: Vec2,
    /// Distance the body was moved to resolve the overlap
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Point a velocity component along `normal` and scale it by `restitution`
///
/// Using the magnitude (rather than a plain negation) keeps a body that is
/// already moving away from the surface from being turned back into it.
#[inline]
pub fn bounce_velocity(vel: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    if normal.x != 0.0 {
        Vec2::new(vel.x.abs() * normal.x.signum() * restitution, vel.y)
    } else {
        Vec2::new(vel.x, vel.y.abs() * normal.y.signum() * restitution)
    }
}

/// Largest position the body may take inside an arena of `arena_size`
#[inline]
pub fn max_position(arena_size: Vec2, body_size: Vec2) -> Vec2 {
    (arena_size - body_size).max(Vec2::ZERO)
}

/// Clamp a body position inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, arena_size: Vec2, body_size: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, max_position(arena_size, body_size))
}

/// Reflect off the arena walls
///
/// On each crossed boundary the position is clamped to it and the
/// perpendicular velocity component is turned inward and scaled by
/// `restitution`. Returns how many walls were hit.
pub fn resolve_walls(
    pos: &mut Vec2,
    vel: &mut Vec2,
    arena_size: Vec2,
    body_size: Vec2,
    restitution: f32,
) -> u32 {
    let hi = max_position(arena_size, body_size);
    let mut hits = 0;

    if pos.x < 0.0 {
        pos.x = 0.0;
        *vel = bounce_velocity(*vel, Vec2::X, restitution);
        hits += 1;
    } else if pos.x > hi.x {
        pos.x = hi.x;
        *vel = bounce_velocity(*vel, Vec2::NEG_X, restitution);
        hits += 1;
    }

    if pos.y < 0.0 {
        pos.y = 0.0;
        *vel = bounce_velocity(*vel, Vec2::Y, restitution);
        hits += 1;
    } else if pos.y > hi.y {
        pos.y = hi.y;
        *vel = bounce_velocity(*vel, Vec2::NEG_Y, restitution);
        hits += 1;
    }

    hits
}

/// Penetration depth needed to push `body` out of `solid` through `side`
fn push_distance(body: &Rect, solid: &Rect, side: Side) -> f32 {
    match side {
        Side::Left => body.max().x - solid.min().x,
        Side::Right => solid.max().x - body.min().x,
        Side::Top => body.max().y - solid.min().y,
        Side::Bottom => solid.max().y - body.min().y,
    }
}

/// Push the body out of the obstacle (inflated by `gap`)
///
/// The axis of least penetration wins, checked left, right, top, bottom with
/// ties going to the earlier side. Pushes that would leave the arena are
/// passed over while an in-arena alternative exists, so the following wall
/// re-clamp cannot shove the body back into the obstacle.
pub fn resolve_obstacle(
    pos: &mut Vec2,
    vel: &mut Vec2,
    body_size: Vec2,
    obstacle: &Rect,
    gap: f32,
    arena_size: Vec2,
    restitution: f32,
) -> CollisionResult {
    let solid = obstacle.inflate(gap);
    let body = Rect::from_origin_size(*pos, body_size);
    if !body.overlaps(&solid) {
        return CollisionResult::miss();
    }

    let hi = max_position(arena_size, body_size);
    let fits = |p: Vec2| {
        const EPS: f32 = 1e-3;
        p.x >= -EPS && p.y >= -EPS && p.x <= hi.x + EPS && p.y <= hi.y + EPS
    };

    let mut best: Option<(Side, f32)> = None;
    let mut best_in_arena: Option<(Side, f32)> = None;
    for side in Side::ORDER {
        let depth = push_distance(&body, &solid, side);
        if best.is_none_or(|(_, d)| depth < d) {
            best = Some((side, depth));
        }
        let moved = *pos + side.normal() * depth;
        if fits(moved) && best_in_arena.is_none_or(|(_, d)| depth < d) {
            best_in_arena = Some((side, depth));
        }
    }

    let Some((side, depth)) = best_in_arena.or(best) else {
        return CollisionResult::miss();
    };

    let normal = side.normal();
    *pos += normal * depth;
    *vel = bounce_velocity(*vel, normal, restitution);

    CollisionResult {
        hit: true,
        normal,
        penetration: depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: Vec2 = Vec2::new(300.0, 150.0);
    const BODY: Vec2 = Vec2::new(80.0, 30.0);

    fn obstacle() -> Rect {
        Rect::new(100.0, 0.0, 100.0, 50.0)
    }

    #[test]
    fn test_bounce_velocity() {
        let v = bounce_velocity(Vec2::new(10.0, 3.0), Vec2::NEG_X, 0.5);
        assert!((v.x - -5.0).abs() < 1e-6);
        assert!((v.y - 3.0).abs() < 1e-6);

        // Already moving away: direction kept, only scaled
        let v = bounce_velocity(Vec2::new(-10.0, 3.0), Vec2::NEG_X, 0.5);
        assert!((v.x - -5.0).abs() < 1e-6);
    }

    #[test]
    fn test_walls_clamp_and_reflect() {
        let mut pos = Vec2::new(230.0, -4.0);
        let mut vel = Vec2::new(10.0, -6.0);
        let hits = resolve_walls(&mut pos, &mut vel, ARENA, BODY, 0.7);

        assert_eq!(hits, 2);
        assert_eq!(pos, Vec2::new(220.0, 0.0));
        assert!((vel.x - -7.0).abs() < 1e-5);
        assert!((vel.y - 4.2).abs() < 1e-5);
    }

    #[test]
    fn test_walls_inside_untouched() {
        let mut pos = Vec2::new(50.0, 50.0);
        let mut vel = Vec2::new(3.0, 3.0);
        assert_eq!(resolve_walls(&mut pos, &mut vel, ARENA, BODY, 0.7), 0);
        assert_eq!(pos, Vec2::new(50.0, 50.0));
        assert_eq!(vel, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_obstacle_push_from_left() {
        // Body right edge at 102, obstacle (inflated) starts at 98: 4 deep
        let mut pos = Vec2::new(22.0, 20.0);
        let mut vel = Vec2::new(5.0, 1.0);
        let result = resolve_obstacle(&mut pos, &mut vel, BODY, &obstacle(), 2.0, ARENA, 0.7);

        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_X);
        assert!((result.penetration - 4.0).abs() < 1e-5);
        assert!((pos.x - 18.0).abs() < 1e-5);
        assert!((vel.x - -3.5).abs() < 1e-5);
        assert!((vel.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_obstacle_push_from_below() {
        let mut pos = Vec2::new(110.0, 49.0);
        let mut vel = Vec2::new(0.0, -8.0);
        let result = resolve_obstacle(&mut pos, &mut vel, BODY, &obstacle(), 2.0, ARENA, 0.7);

        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((pos.y - 52.0).abs() < 1e-5);
        assert!((vel.y - 5.6).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_skips_push_out_of_arena() {
        // Near the top: pushing up is shallowest but would leave the arena
        let mut pos = Vec2::new(150.0, 2.0);
        let mut vel = Vec2::ZERO;
        let result = resolve_obstacle(&mut pos, &mut vel, BODY, &obstacle(), 2.0, ARENA, 0.7);

        assert!(result.hit);
        assert_ne!(result.normal, Vec2::NEG_Y);
        let body = Rect::from_origin_size(pos, BODY);
        assert!(!body.overlaps(&obstacle().inflate(2.0)));
        assert_eq!(clamp_to_arena(pos, ARENA, BODY), pos);
    }

    #[test]
    fn test_obstacle_tie_goes_to_left() {
        // Body centred on a square obstacle: every side needs the same push
        let obstacle = Rect::new(100.0, 50.0, 20.0, 20.0);
        let mut pos = Vec2::new(100.0, 50.0);
        let mut vel = Vec2::ZERO;
        let result = resolve_obstacle(
            &mut pos,
            &mut vel,
            Vec2::new(20.0, 20.0),
            &obstacle,
            0.0,
            ARENA,
            0.7,
        );
        assert_eq!(result.normal, Vec2::NEG_X);
    }

    #[test]
    fn test_obstacle_miss() {
        let mut pos = Vec2::new(0.0, 100.0);
        let mut vel = Vec2::new(1.0, 1.0);
        let result = resolve_obstacle(&mut pos, &mut vel, BODY, &obstacle(), 2.0, ARENA, 0.7);
        assert!(!result.hit);
        assert_eq!(vel, Vec2::new(1.0, 1.0));
    }
}
