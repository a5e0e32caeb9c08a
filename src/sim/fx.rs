//! Chase-mode visual cadence and the dismissal fade
//!
//! Pure functions of elapsed time; the host owns the clock.

/// Scale cycle while the body is being chased
pub const CHASE_SCALES: [f32; 7] = [1.2, 0.8, 1.4, 0.7, 1.3, 0.9, 1.5];
/// Time each chase scale is held (ms)
pub const CHASE_SCALE_PERIOD_MS: f64 = 300.0;
/// Flicker half-period (ms)
pub const CHASE_FLICKER_PERIOD_MS: f64 = 200.0;

/// Opacity lost per fade step
pub const FADE_STEP: f32 = 0.02;
/// Time between fade steps (ms)
pub const FADE_STEP_MS: f64 = 60.0;

/// Display scale `elapsed_ms` into a chase (1.0 before the first change)
pub fn chase_scale(elapsed_ms: f64) -> f32 {
    if elapsed_ms < CHASE_SCALE_PERIOD_MS {
        return 1.0;
    }
    let ticks = (elapsed_ms / CHASE_SCALE_PERIOD_MS) as usize;
    CHASE_SCALES[(ticks - 1) % CHASE_SCALES.len()]
}

/// Whether the alternate (alarm) color is showing `elapsed_ms` into a chase
pub fn chase_flicker(elapsed_ms: f64) -> bool {
    if elapsed_ms < 0.0 {
        return false;
    }
    ((elapsed_ms / CHASE_FLICKER_PERIOD_MS) as u64) % 2 == 1
}

/// Opacity of a fading element `elapsed_ms` after the fade began
pub fn fade_opacity(elapsed_ms: f64) -> f32 {
    if elapsed_ms <= 0.0 {
        return 1.0;
    }
    let steps = (elapsed_ms / FADE_STEP_MS) as u32;
    (1.0 - steps as f32 * FADE_STEP).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chase_scale_cycle() {
        assert_eq!(chase_scale(0.0), 1.0);
        assert_eq!(chase_scale(299.0), 1.0);
        assert_eq!(chase_scale(300.0), 1.2);
        assert_eq!(chase_scale(650.0), 0.8);
        // Wraps after seven steps
        assert_eq!(chase_scale(300.0 * 8.0), 1.2);
    }

    #[test]
    fn test_chase_flicker_alternates() {
        assert!(!chase_flicker(0.0));
        assert!(chase_flicker(200.0));
        assert!(!chase_flicker(400.0));
        assert!(!chase_flicker(-5.0));
    }

    #[test]
    fn test_fade_reaches_zero() {
        assert_eq!(fade_opacity(0.0), 1.0);
        assert!((fade_opacity(600.0) - 0.8).abs() < 1e-5);
        // 50 steps of 0.02 at 60 ms each
        assert!(fade_opacity(3000.0) < 1e-6);
        assert_eq!(fade_opacity(10_000.0), 0.0);
    }
}
