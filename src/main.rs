use modstep::cv::interface::InterfaceManager;
use modstep::{
    AudioInterface, EngineConfig, EngineEvent, SequencerEngine, create_event_channel,
    create_notification_channel,
};
use ringbuf::traits::Consumer;
use std::thread;
use std::time::Duration;

// Ringbuffer capacity constants
// The event stream carries one playhead event plus a handful of
// fire/CV events per tick; 1024 covers several seconds of backlog at
// the fastest supported tempo.
const EVENT_RINGBUFFER_CAPACITY: usize = 1024;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

fn main() {
    println!("=== modstep ===");
    println!("Step sequencer engine demo\n");

    let (event_tx, mut event_rx) = create_event_channel(EVENT_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);

    let engine = SequencerEngine::new(EngineConfig::default(), event_tx, notification_tx);

    // Pick an output interface: first DC-coupled device on the host,
    // else a virtual ES-8 so the demo maps CV anyway
    let manager = InterfaceManager::new();
    let interfaces = manager.list_output_interfaces();
    println!("Output interfaces:");
    for iface in &interfaces {
        println!(
            "  {} ({} outputs{})",
            iface.name,
            iface.output_count,
            if iface.dc_coupled { ", DC-coupled" } else { "" }
        );
    }

    let selected = interfaces
        .into_iter()
        .find(|i| i.dc_coupled)
        .unwrap_or_else(|| AudioInterface::new("Virtual ES-8", 8, true));
    println!("\nUsing: {}\n", selected.name);
    engine.select_audio_interface(selected);

    seed_demo_pattern(&engine);

    engine.set_bpm(120);
    engine.play();

    // Two bars of sixteenths at 120 BPM = 4 seconds
    for _ in 0..400 {
        thread::sleep(Duration::from_millis(10));

        while let Some(event) = event_rx.try_pop() {
            match event {
                EngineEvent::Fired(fire) => {
                    println!(
                        "fire  track={} note={} vel={} len={}p{}{}",
                        fire.track_id,
                        fire.note,
                        fire.velocity,
                        fire.length,
                        if fire.slide { " slide" } else { "" },
                        if fire.accent { " accent" } else { "" },
                    );
                }
                EngineEvent::Cv(cv) => println!("cv    {:?}", cv),
                EngineEvent::Playhead { step, .. } if step == 0 => println!("--- bar ---"),
                _ => {}
            }
        }
        while let Some(notification) = notification_rx.try_pop() {
            eprintln!("[{:?}] {}", notification.level, notification.message);
        }
    }

    engine.stop();
    println!("\nStopped.");
}

/// Four-on-the-floor kick, offbeat hats with probability, and a
/// generated bass line coming in over the content contract
fn seed_demo_pattern(engine: &SequencerEngine) {
    let (kick, hat, bass) = engine
        .with_patterns(|patterns| {
            let tracks = patterns[0].tracks();
            let kick: Vec<_> = tracks[0].steps().iter().map(|s| s.id).collect();
            let hat: Vec<_> = tracks[1].steps().iter().map(|s| s.id).collect();
            (kick, hat, tracks[2].id)
        })
        .unwrap_or_default();
    if kick.len() < 16 || hat.len() < 16 {
        return;
    }

    for index in (0..16).step_by(4) {
        engine.toggle_step(kick[index]);
    }

    for index in (2..16).step_by(4) {
        engine.toggle_step(hat[index]);
        engine.set_step_probability(hat[index], 70);
        engine.set_step_velocity(hat[index], 80);
    }

    let bass_line = r#"{
        "kind": "melodic",
        "records": [
            { "pitch": 36, "velocity": 110, "start": 0, "duration": 2, "accent": true },
            { "pitch": 39, "velocity": 95, "start": 6, "duration": 1, "slide": true },
            { "pitch": 43, "velocity": 90, "start": 10, "duration": 1 },
            { "pitch": 36, "velocity": 100, "start": 12, "duration": 3 }
        ]
    }"#;
    if let Err(error) = engine.apply_generated_json(bass, bass_line) {
        eprintln!("demo bass line declined: {}", error);
    }
}
