//! Edge case tests and robustness validation
//!
//! Extreme inputs and awkward timings must degrade to clamped values or
//! silent no-ops; nothing in the engine core has a fatal state.

use modstep::messaging::channels::EventConsumer;
use modstep::{
    AudioInterface, EngineConfig, EngineEvent, SequencerEngine, StepDomain, create_event_channel,
    create_notification_channel,
};
use ringbuf::traits::Consumer;

fn engine(config: EngineConfig) -> (SequencerEngine, EventConsumer) {
    let (event_tx, event_rx) = create_event_channel(8192);
    let (notification_tx, _notification_rx) = create_notification_channel(64);
    (
        SequencerEngine::new(config, event_tx, notification_tx),
        event_rx,
    )
}

/// Ticking at the swing extremes (0 and 100) degenerates one interval
/// of each pair to zero length but must not panic or stall
#[test]
fn test_extreme_swing_values_tick_cleanly() {
    let (engine, _rx) = engine(EngineConfig::default());
    let step = engine
        .with_patterns(|p| p[0].tracks()[0].steps()[0].id)
        .unwrap();
    engine.toggle_step(step);

    for swing in [0, 100] {
        engine.set_swing(swing);
        for _ in 0..32 {
            engine.tick_once();
        }
    }
}

/// Micro-timing at both bounds keeps the scheduled time inside the
/// tick window even for degenerate zero-length intervals
#[test]
fn test_micro_timing_bounds_with_extreme_swing() {
    let (engine, mut rx) = engine(EngineConfig::default());
    let step = engine
        .with_patterns(|p| p[0].tracks()[0].steps()[0].id)
        .unwrap();
    engine.toggle_step(step);
    engine.adjust_timing(step, 50);
    engine.set_swing(100);

    for _ in 0..4 {
        engine.tick_once();
    }

    let fired: Vec<_> = (0..)
        .map_while(|_| rx.try_pop())
        .filter(|e| matches!(e, EngineEvent::Fired(_)))
        .collect();
    assert!(!fired.is_empty());
}

#[test]
fn test_all_numeric_commands_with_extreme_values() {
    let (engine, _rx) = engine(EngineConfig::default());
    let step = engine
        .with_patterns(|p| p[0].tracks()[0].steps()[0].id)
        .unwrap();

    for value in [i32::MIN, -1, 0, 1, i32::MAX] {
        engine.set_bpm(value);
        engine.set_swing(value);
        engine.set_step_note(step, value);
        engine.set_step_velocity(step, value);
        engine.set_step_length(step, value);
        engine.set_step_probability(step, value);
        engine.adjust_velocity(step, value);
        engine.adjust_timing(step, value);
        engine.set_track_length(
            engine.with_patterns(|p| p[0].tracks()[0].id).unwrap(),
            value,
        );
    }

    let (bpm, swing) = (engine.bpm(), engine.swing());
    assert!((20..=300).contains(&bpm));
    assert!(swing <= 100);

    engine
        .with_patterns(|p| {
            let s = &p[0].tracks()[0].steps()[0];
            assert!(s.note() <= 127);
            assert!((1..=127).contains(&s.velocity()));
            assert!((1..=96).contains(&s.length()));
            assert!(s.probability() <= 100);
            assert!((-50..=50).contains(&s.micro_timing()));
            let track = &p[0].tracks()[0];
            assert!((1..=track.step_count()).contains(&track.length()));
        })
        .unwrap();
}

/// A 64-step domain wraps its playhead correctly past u32-ish tick
/// counts of several bars
#[test]
fn test_long_run_on_largest_domain() {
    let (engine, _rx) = engine(EngineConfig {
        domain: StepDomain::SixtyFour,
        tracks_per_pattern: 1,
        ..EngineConfig::default()
    });

    for _ in 0..64 * 3 + 5 {
        engine.tick_once();
    }
    assert_eq!(engine.current_step(), 4);
}

/// Stop before play, double stop, double play: all safe
#[test]
fn test_transport_command_orderings() {
    let (engine, _rx) = engine(EngineConfig::default());

    engine.stop();
    engine.stop();
    assert!(!engine.is_playing());

    engine.play();
    engine.play();
    assert!(engine.is_playing());

    engine.stop();
    engine.stop();
    assert!(!engine.is_playing());
    assert_eq!(engine.current_step(), 0);
}

/// Generated content with every optional field missing, present, or
/// out of range
#[test]
fn test_generated_content_field_extremes() {
    let (engine, _rx) = engine(EngineConfig::default());
    let track = engine.with_patterns(|p| p[0].tracks()[0].id).unwrap();

    let payload = r#"{
        "kind": "drum",
        "records": [
            { "position": 0, "velocity": 2000, "probability": -50 },
            { "position": 15, "velocity": -2000, "probability": 500, "flam": true }
        ]
    }"#;
    assert_eq!(engine.apply_generated_json(track, payload), Ok(2));

    engine
        .with_patterns(|p| {
            let steps = p[0].tracks()[0].steps();
            assert_eq!(steps[0].velocity(), 127);
            assert_eq!(steps[0].probability(), 0);
            assert_eq!(steps[15].velocity(), 1);
            assert_eq!(steps[15].probability(), 100);
            assert!(steps[15].micro_timing() < 0);
        })
        .unwrap();
}

#[test]
fn test_malformed_json_payload_is_declined() {
    let (engine, _rx) = engine(EngineConfig::default());
    let track = engine.with_patterns(|p| p[0].tracks()[0].id).unwrap();
    let before = engine.snapshot();

    assert!(engine.apply_generated_json(track, "{").is_err());
    assert!(engine.apply_generated_json(track, "[1,2,3]").is_err());
    assert!(
        engine
            .apply_generated_json(track, r#"{ "kind": "drum", "records": [ { "position": 0 } ] }"#)
            .is_err()
    );
    assert_eq!(engine.snapshot(), before);
}

/// Selecting an interface with zero outputs: nothing to assign, no
/// crash, add_cv_config stays a no-op
#[test]
fn test_zero_output_interface() {
    let (engine, _rx) = engine(EngineConfig::default());

    engine.select_audio_interface(AudioInterface::new("Broken", 0, true));
    assert!(engine.cv_configs().is_empty());
    assert!(engine.add_cv_config().is_none());
}

/// Event buffer overflow: a consumer that never drains only costs
/// events, never playback
#[test]
fn test_event_overflow_does_not_stall_ticks() {
    let (event_tx, _event_rx) = create_event_channel(8); // tiny on purpose
    let (notification_tx, _notification_rx) = create_notification_channel(4);
    let engine = SequencerEngine::new(
        EngineConfig::default(),
        event_tx,
        notification_tx,
    );
    let step = engine
        .with_patterns(|p| p[0].tracks()[0].steps()[0].id)
        .unwrap();
    engine.toggle_step(step);

    for _ in 0..1000 {
        engine.tick_once();
    }
    assert_eq!(engine.current_step(), (999 % 16) as u32);
}
