// Step evaluator - Per-tick fire decision and value resolution
// Turns the step under a track's cursor into at most one FireEvent

use crate::sequencer::step::{Step, StepId};
use crate::sequencer::track::{Track, TrackId};
use rand::Rng;
use std::time::{Duration, Instant};

/// A resolved trigger for one step on one tick
///
/// `scheduled_at` carries the micro-timing shift already applied; the
/// shift never leaves the step's own tick window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireEvent {
    pub track_id: TrackId,
    pub step_id: StepId,
    pub note: u8,
    pub velocity: u8,
    /// Gate length in clock pulses (24 PPQN)
    pub length: u8,
    pub slide: bool,
    pub accent: bool,
    pub scheduled_at: Instant,
}

/// Decide whether a step fires this cycle
///
/// A disabled step never fires. Probability 100 always fires; anything
/// lower rolls a fresh uniform draw in [0,100) on every cycle, so rolls
/// are independent across cycles and across steps.
pub fn should_fire<R: Rng>(step: &Step, rng: &mut R) -> bool {
    if !step.is_on {
        return false;
    }

    let probability = step.effective_probability();
    if probability >= 100 {
        return true;
    }

    rng.gen_range(0..100) < probability
}

/// Micro-timing shift for a step, as a signed offset inside `interval`
///
/// The stored offset is a percent of one tick window in -50..=50, so the
/// result is at most half a window either way and cannot cross into a
/// neighboring step's window.
pub fn timing_shift(step: &Step, interval: Duration) -> Duration {
    let fraction = step.micro_timing().unsigned_abs() as f64 / 100.0;
    Duration::from_secs_f64(interval.as_secs_f64() * fraction)
}

/// Evaluate the step under a track's cursor for the tick starting at
/// `tick_at` and spanning `interval`
///
/// Returns `None` when the step is off or loses its probability roll;
/// silence is a valid outcome, not an error. Parameter locks override
/// only the parameter they name, leaving the rest at stored values.
pub fn evaluate<R: Rng>(
    track: &Track,
    tick_at: Instant,
    interval: Duration,
    rng: &mut R,
) -> Option<FireEvent> {
    let step = track.current_step();

    if !should_fire(step, rng) {
        return None;
    }

    let shift = timing_shift(step, interval);
    let scheduled_at = if step.micro_timing() < 0 {
        tick_at.checked_sub(shift).unwrap_or(tick_at)
    } else {
        tick_at + shift
    };

    Some(FireEvent {
        track_id: track.id,
        step_id: step.id,
        note: step.effective_note(),
        velocity: step.effective_velocity(),
        length: step.effective_length(),
        slide: step.slide,
        accent: step.accent,
        scheduled_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::step::LockableParam;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_track() -> Track {
        Track::new("T".to_string(), 16, [0, 0, 0])
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn test_disabled_step_never_fires() {
        let track = test_track();
        let mut rng = rng();

        for _ in 0..100 {
            assert!(!should_fire(track.current_step(), &mut rng));
        }
    }

    #[test]
    fn test_full_probability_always_fires() {
        let mut track = test_track();
        track.step_at_mut(0).unwrap().is_on = true;
        let mut rng = rng();

        for _ in 0..100 {
            assert!(should_fire(track.current_step(), &mut rng));
        }
    }

    #[test]
    fn test_zero_probability_never_fires() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_probability(0);
        }
        let mut rng = rng();

        for _ in 0..100 {
            assert!(!should_fire(track.current_step(), &mut rng));
        }
    }

    #[test]
    fn test_partial_probability_fires_sometimes() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_probability(50);
        }
        let mut rng = rng();

        let fired = (0..1000)
            .filter(|_| should_fire(track.current_step(), &mut rng))
            .count();

        // Loose bounds; a fair 50% coin lands well inside them
        assert!(fired > 350, "fired {}", fired);
        assert!(fired < 650, "fired {}", fired);
    }

    #[test]
    fn test_fire_event_carries_stored_values() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_note(48);
            step.set_velocity(90);
            step.set_length(24);
            step.slide = true;
        }
        let mut rng = rng();

        let ev = evaluate(&track, Instant::now(), Duration::from_millis(125), &mut rng).unwrap();
        assert_eq!(ev.track_id, track.id);
        assert_eq!(ev.note, 48);
        assert_eq!(ev.velocity, 90);
        assert_eq!(ev.length, 24);
        assert!(ev.slide);
        assert!(!ev.accent);
    }

    #[test]
    fn test_locks_override_only_named_parameter() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_note(60);
            step.set_velocity(80);
            step.set_lock(LockableParam::Note, 72);
        }
        let mut rng = rng();

        let ev = evaluate(&track, Instant::now(), Duration::from_millis(125), &mut rng).unwrap();
        assert_eq!(ev.note, 72);
        assert_eq!(ev.velocity, 80);
    }

    #[test]
    fn test_probability_lock_drives_the_roll() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_probability(100);
            step.set_lock(LockableParam::Probability, 0);
        }
        let mut rng = rng();

        for _ in 0..100 {
            assert!(!should_fire(track.current_step(), &mut rng));
        }
    }

    #[test]
    fn test_positive_micro_timing_shifts_late_within_window() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_micro_timing(50);
        }
        let mut rng = rng();
        let interval = Duration::from_millis(125);
        let base = Instant::now();

        let ev = evaluate(&track, base, interval, &mut rng).unwrap();
        let shift = ev.scheduled_at - base;
        assert_eq!(shift, interval / 2);
        assert!(shift < interval);
    }

    #[test]
    fn test_negative_micro_timing_shifts_early() {
        let mut track = test_track();
        {
            let step = track.step_at_mut(0).unwrap();
            step.is_on = true;
            step.set_micro_timing(-20);
        }
        let mut rng = rng();
        let interval = Duration::from_millis(100);
        let base = Instant::now() + Duration::from_secs(1);

        let ev = evaluate(&track, base, interval, &mut rng).unwrap();
        assert!(ev.scheduled_at < base);
        assert_eq!(base - ev.scheduled_at, Duration::from_millis(20));
    }

    #[test]
    fn test_zero_micro_timing_fires_on_the_tick() {
        let mut track = test_track();
        track.step_at_mut(0).unwrap().is_on = true;
        let mut rng = rng();
        let base = Instant::now();

        let ev = evaluate(&track, base, Duration::from_millis(125), &mut rng).unwrap();
        assert_eq!(ev.scheduled_at, base);
    }
}
