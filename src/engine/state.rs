// EngineState - The single owned aggregate all commands mutate
//
// Lives behind one mutex: a tick locks it for the whole
// evaluate/map/publish pass, so concurrent edit commands observe either
// the full pre-tick or full post-tick state, never a torn read.

use crate::cv::interface::AudioInterface;
use crate::cv::mapper::CvGateMapper;
use crate::engine::selection::Selection;
use crate::messaging::channels::{EventProducer, NotificationProducer};
use crate::messaging::event::EngineEvent;
use crate::messaging::notification::Notification;
use crate::sequencer::clock::ClockShared;
use crate::sequencer::evaluator;
use crate::sequencer::pattern::Pattern;
use crate::sequencer::step::PULSES_PER_STEP;
use std::time::{Duration, Instant};

pub struct EngineState {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) current_pattern: usize,
    pub(crate) selection: Selection,
    pub(crate) selected_interface: Option<AudioInterface>,
    pub(crate) mapper: CvGateMapper,
    events: EventProducer,
    notifications: NotificationProducer,
}

/// Push an event, dropping it when the consumer has fallen behind.
/// The event stream is observational; playback never blocks on it.
fn push(events: &mut EventProducer, event: EngineEvent) {
    let _ = ringbuf::traits::Producer::try_push(events, event);
}

impl EngineState {
    pub(crate) fn new(
        patterns: Vec<Pattern>,
        events: EventProducer,
        notifications: NotificationProducer,
    ) -> Self {
        Self {
            patterns,
            current_pattern: 0,
            selection: Selection::new(),
            selected_interface: None,
            mapper: CvGateMapper::new(),
            events,
            notifications,
        }
    }

    pub(crate) fn push_event(&mut self, event: EngineEvent) {
        push(&mut self.events, event);
    }

    pub(crate) fn notify(&mut self, notification: Notification) -> bool {
        ringbuf::traits::Producer::try_push(&mut self.notifications, notification).is_ok()
    }

    pub(crate) fn pattern(&self) -> Option<&Pattern> {
        self.patterns.get(self.current_pattern)
    }

    pub(crate) fn pattern_mut(&mut self) -> Option<&mut Pattern> {
        self.patterns.get_mut(self.current_pattern)
    }

    /// Run one tick: advance gate timers, evaluate every track's cursor
    /// step, map fires to CV, advance cursors, publish
    ///
    /// Mute suppresses a track's output but its cursor still advances;
    /// while any track is soloed, only solo tracks are audible.
    pub(crate) fn tick(&mut self, shared: &ClockShared, tick_at: Instant, interval: Duration) {
        let tick = shared.tick_count();

        let Self {
            patterns,
            current_pattern,
            mapper,
            events,
            ..
        } = self;

        let Some(pattern) = patterns.get_mut(*current_pattern) else {
            shared.advance_tick();
            return;
        };

        let playhead = (tick % pattern.step_count() as u64) as u32;
        shared.set_current_step(playhead);
        push(events, EngineEvent::Playhead {
            step: playhead,
            tick,
        });

        for cv in mapper.advance(PULSES_PER_STEP) {
            push(events, EngineEvent::Cv(cv));
        }

        let solo_active = pattern.any_solo();
        let mut rng = rand::thread_rng();

        for track in pattern.tracks_mut() {
            let audible = !track.is_muted && (!solo_active || track.is_solo);
            if audible
                && let Some(fired) = evaluator::evaluate(track, tick_at, interval, &mut rng)
            {
                push(events, EngineEvent::Fired(fired));
                for cv in mapper.map_fire(&fired) {
                    push(events, EngineEvent::Cv(cv));
                }
            }
            track.advance_cursor();
        }

        shared.advance_tick();
    }

    /// Reset the playhead, every track cursor and all open gates,
    /// used when the transport stops
    pub(crate) fn reset_playback(&mut self, shared: &ClockShared) {
        shared.reset_position();

        for pattern in &mut self.patterns {
            pattern.reset_cursors();
        }

        let Self { mapper, events, .. } = self;
        for cv in mapper.all_gates_off() {
            push(events, EngineEvent::Cv(cv));
        }
        push(events, EngineEvent::TransportStopped);
    }
}
