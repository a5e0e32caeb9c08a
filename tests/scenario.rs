use glam::Vec2;

use valentine_dodge::sim::{Layout, Rect};
use valentine_dodge::{Engine, Session, Settings};

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.tuning.gap = 2.0;
    settings.tuning.launch_speed = 18.0;
    settings.tuning.friction = 0.985;
    settings.tuning.rest_speed = 0.15;
    settings
}

fn layout() -> Layout {
    Layout::new(
        Rect::new(0.0, 0.0, 300.0, 150.0),
        Rect::new(100.0, 0.0, 100.0, 50.0),
        Vec2::new(80.0, 30.0),
    )
}

#[test]
fn test_single_impulse_settles_inside_arena() {
    let mut engine = Engine::new(settings(), 42, layout());
    let start = engine.initialize();
    assert_eq!(start, Vec2::new(110.0, 66.0));

    engine.apply_impulse(Vec2::new(18.0, 0.0));
    let bound = engine.settings().tuning.max_frames_to_rest(18.0);

    let mut frames = 0;
    let mut last = None;
    while let Some(outcome) = engine.step() {
        frames += 1;
        last = Some(outcome);
        assert!(frames <= bound);
    }

    let outcome = last.expect("body should have moved");
    assert!(outcome.rested);
    assert!(!outcome.running);

    let body = engine.body().unwrap();
    assert_eq!(body.vel.x, 0.0);
    assert_eq!(body.vel.y, 0.0);
    assert!((0.0..=220.0).contains(&body.pos.x));
    // Purely horizontal motion below the obstacle never changes y
    assert_eq!(body.pos.y, 66.0);
}

#[test]
fn test_pointer_in_screen_coordinates() {
    // Same arena placed lower on the page; pointer arrives in page space
    let mut layout = layout();
    layout.arena = Rect::new(20.0, 500.0, 300.0, 150.0);
    layout.obstacle = Rect::new(120.0, 500.0, 100.0, 50.0);

    let mut engine = Engine::new(settings(), 3, layout);
    engine.initialize();

    // Just below the body's bottom edge (local y 96 -> page y 596)
    engine.on_pointer_move(170.0, 600.0);
    assert!(engine.is_evading());
    assert_eq!(engine.counter(), 1);
    // Fleeing upward-ish, away from the pointer below
    assert!(engine.body().unwrap().vel.y < 0.0);
}

#[test]
fn test_full_prompt_flow() {
    let mut engine = Engine::new(settings(), 9, layout());
    let mut session = Session::new();
    engine.initialize();

    // Pointer sneaks up, user clicks twice, then gives in
    engine.on_pointer_move(100.0, 81.0);
    for _ in 0..20 {
        engine.step();
    }
    assert_eq!(engine.on_activate(1000.0), 2);
    assert_eq!(engine.on_activate(1100.0), 3);
    assert!(engine.feedback(1200.0).is_some());

    assert_eq!(engine.on_accept(), 3);
    assert!(engine.feedback(1200.0).is_none());
    assert!(engine.dismissal().is_some());

    let evasions = engine.take_completion().unwrap();
    let report = session.record_completion(evasions, 1500.0).unwrap();
    assert_eq!(report.evasions, 3);
    assert!(session.payload_json().unwrap().contains("\"evasions\":3"));

    // A second accept must not report again
    assert_eq!(engine.on_accept(), 3);
    assert!(engine.take_completion().is_none());

    // Restarting the flow clears both sides
    session.restart();
    engine.reset();
    engine.initialize();
    assert_eq!(engine.counter(), 0);
    assert!(!session.is_complete());
}
