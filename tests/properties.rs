use glam::Vec2;
use proptest::prelude::*;

use valentine_dodge::sim::{Layout, Rect};
use valentine_dodge::{Engine, Settings};

const GAP: f32 = 2.0;

fn layout() -> Layout {
    Layout::new(
        Rect::new(0.0, 0.0, 300.0, 150.0),
        Rect::new(100.0, 0.0, 100.0, 50.0),
        Vec2::new(80.0, 30.0),
    )
}

fn engine(seed: u64) -> Engine<Layout> {
    let mut engine = Engine::new(Settings::default(), seed, layout());
    engine.initialize();
    engine
}

fn assert_contained(pos: Vec2) {
    assert!(pos.x >= 0.0 && pos.x <= 220.0, "x out of arena: {}", pos.x);
    assert!(pos.y >= 0.0 && pos.y <= 120.0, "y out of arena: {}", pos.y);
}

/// One input the user could make between frames
#[derive(Debug, Clone)]
enum Input {
    Impulse(f32, f32),
    Pointer(f32, f32),
    Click,
    Frames(u8),
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        (-18.0f32..18.0, -18.0f32..18.0).prop_map(|(x, y)| Input::Impulse(x, y)),
        (-50.0f32..350.0, -50.0f32..200.0).prop_map(|(x, y)| Input::Pointer(x, y)),
        Just(Input::Click),
        (1u8..60).prop_map(Input::Frames),
    ]
}

proptest! {
    #[test]
    fn prop_body_stays_in_arena_and_clear_of_obstacle(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input(), 1..40),
    ) {
        let mut engine = engine(seed);
        let obstacle = layout().obstacle;
        let mut now = 0.0;

        for input in inputs {
            match input {
                Input::Impulse(x, y) => engine.apply_impulse(Vec2::new(x, y)),
                Input::Pointer(x, y) => engine.on_pointer_move(x, y),
                Input::Click => {
                    engine.on_activate(now);
                }
                Input::Frames(n) => {
                    for _ in 0..n {
                        if let Some(outcome) = engine.step() {
                            assert_contained(outcome.position);
                            let body = engine.body().unwrap().rect();
                            prop_assert!(body.overlap_depth(&obstacle) <= GAP);
                        }
                    }
                }
            }
            now += 16.0;
        }
    }

    #[test]
    fn prop_speed_decays_strictly_to_rest(
        seed in any::<u64>(),
        vx in -18.0f32..18.0,
        vy in -18.0f32..18.0,
    ) {
        let v0 = Vec2::new(vx, vy);
        prop_assume!(v0.length() > 0.2);

        let mut engine = engine(seed);
        engine.apply_impulse(v0);
        let bound = engine.settings().tuning.max_frames_to_rest(v0.length());

        let mut prev = v0.length();
        let mut frames = 0;
        while let Some(outcome) = engine.step() {
            frames += 1;
            let speed = engine.body().unwrap().speed();
            prop_assert!(speed < prev || speed == 0.0);
            prev = speed;
            if outcome.rested {
                prop_assert_eq!(engine.body().unwrap().vel, Vec2::ZERO);
            }
            prop_assert!(frames <= bound, "took {} frames, bound {}", frames, bound);
        }
        prop_assert!(!engine.is_running());
        prop_assert_eq!(engine.body().unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn prop_activate_counts_up_from_one(seed in any::<u64>(), n in 1u32..50) {
        let mut engine = engine(seed);
        for k in 1..=n {
            prop_assert_eq!(engine.on_activate(k as f64), k);
            engine.step();
        }
    }

    #[test]
    fn prop_messages_rotate(seed in any::<u64>(), m in 1usize..10, n in 1usize..40) {
        let settings = Settings {
            messages: (0..m).map(|i| format!("message {}", i)).collect(),
            ..Default::default()
        };
        let mut engine = Engine::new(settings, seed, layout());
        engine.initialize();

        for k in 0..n {
            let now = k as f64 * 10.0;
            engine.on_activate(now);
            let expected = format!("message {}", k % m);
            prop_assert_eq!(engine.feedback(now), Some(expected.as_str()));
        }
    }

    #[test]
    fn prop_accept_is_idempotent(seed in any::<u64>(), clicks in 0u32..10, frames in 0u8..30) {
        let mut engine = engine(seed);
        for k in 0..clicks {
            engine.on_activate(k as f64);
        }
        for _ in 0..frames {
            engine.step();
        }

        let first = engine.on_accept();
        let second = engine.on_accept();
        prop_assert_eq!(first, clicks);
        prop_assert_eq!(first, second);
        prop_assert!(!engine.is_running());
        prop_assert!(engine.step().is_none());
        prop_assert_eq!(engine.take_completion(), Some(first));
        prop_assert_eq!(engine.take_completion(), None);
    }
}
