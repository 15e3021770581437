// SequencerEngine - Command API and observable state
//
// Every mutation command resolves its target by id through the current
// pattern -> track -> step chain; a missing id anywhere in the chain
// makes the command a silent no-op. UI and network races against a
// running transport are expected and must never crash playback.

use crate::cv::config::{ConfigId, CvOutputConfig};
use crate::cv::interface::AudioInterface;
use crate::engine::selection::Selection;
use crate::engine::snapshot::EngineSnapshot;
use crate::engine::state::EngineState;
use crate::messaging::channels::{EventProducer, NotificationProducer};
use crate::messaging::event::EngineEvent;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::remote::content::{ContentError, GeneratedContent};
use crate::sequencer::clock::{ClockShared, TransportClock, tick_interval};
use crate::sequencer::pattern::{Pattern, StepDomain};
use crate::sequencer::step::{LockableParam, StepId, claim_id_floor};
use crate::sequencer::track::TrackId;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Construction-time defaults for the engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bpm: u32,
    pub swing: u8,
    pub pattern_count: usize,
    pub tracks_per_pattern: usize,
    pub domain: StepDomain,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bpm: 120,
            swing: 50,
            pattern_count: 4,
            tracks_per_pattern: 4,
            domain: StepDomain::Sixteen,
        }
    }
}

/// The sequencer engine: owns the pattern collection, selection,
/// transport clock and CV mapper
///
/// Constructed once at process start; all mutation funnels through the
/// methods below so the tick/edit atomicity contract holds. Methods
/// take `&self` and the engine can be shared across threads.
pub struct SequencerEngine {
    state: Arc<Mutex<EngineState>>,
    shared: Arc<ClockShared>,
    clock: Mutex<TransportClock>,
}

impl SequencerEngine {
    pub fn new(
        config: EngineConfig,
        events: EventProducer,
        notifications: NotificationProducer,
    ) -> Self {
        let patterns = (0..config.pattern_count.max(1))
            .map(|i| {
                Pattern::new(
                    format!("Pattern {}", i + 1),
                    config.domain,
                    config.tracks_per_pattern,
                )
            })
            .collect();

        let shared = ClockShared::new(config.bpm);
        shared.set_swing(config.swing as i32);

        Self {
            state: Arc::new(Mutex::new(EngineState::new(patterns, events, notifications))),
            clock: Mutex::new(TransportClock::new(Arc::clone(&shared))),
            shared,
        }
    }

    /// Rebuild an engine from a snapshot, e.g. for command replay
    pub fn from_snapshot(
        snapshot: EngineSnapshot,
        events: EventProducer,
        notifications: NotificationProducer,
    ) -> Self {
        claim_id_floor(snapshot.max_entity_id());

        let shared = ClockShared::new(snapshot.bpm);
        shared.set_swing(snapshot.swing as i32);

        let mut state = EngineState::new(snapshot.patterns, events, notifications);
        // Cursors are runtime state; a restored engine starts from a
        // clean playhead
        for pattern in &mut state.patterns {
            pattern.reset_cursors();
        }
        state.current_pattern = snapshot.current_pattern.min(state.patterns.len().saturating_sub(1));
        state.selected_interface = snapshot.selected_interface;
        state.mapper.set_configs(snapshot.cv_configs);

        Self {
            state: Arc::new(Mutex::new(state)),
            clock: Mutex::new(TransportClock::new(Arc::clone(&shared))),
            shared,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> Option<R> {
        self.state.lock().ok().map(|mut state| f(&mut state))
    }

    // --- Transport ---

    /// Start playback; no-op when already running
    pub fn play(&self) {
        if self.shared.is_running() {
            return;
        }

        self.with_state(|state| state.push_event(EngineEvent::TransportStarted));

        let state = Arc::clone(&self.state);
        let shared = Arc::clone(&self.shared);

        if let Ok(mut clock) = self.clock.lock() {
            clock.start(move |_tick, interval| {
                if let Ok(mut state) = state.lock() {
                    state.tick(&shared, Instant::now(), interval);
                }
            });
        }
    }

    /// Stop playback, cancel any pending tick and reset the playhead
    pub fn stop(&self) {
        if let Ok(mut clock) = self.clock.lock() {
            clock.stop();
        }
        self.with_state(|state| state.reset_playback(&self.shared));
    }

    pub fn toggle_playback(&self) {
        if self.shared.is_running() {
            self.stop();
        } else {
            self.play();
        }
    }

    /// Run a single tick synchronously
    ///
    /// For hosts that derive time from an external clock, and for
    /// offline tests. Not meant to be mixed with a running internal
    /// clock.
    pub fn tick_once(&self) {
        let interval = tick_interval(
            self.shared.bpm(),
            self.shared.swing(),
            self.shared.tick_count(),
        );
        self.with_state(|state| state.tick(&self.shared, Instant::now(), interval));
    }

    /// Set the tempo, clamped to 20-300 BPM; effective on the next tick
    pub fn set_bpm(&self, bpm: i32) {
        self.shared.set_bpm(bpm);
    }

    /// Set the swing amount, clamped to 0-100 (50 = straight)
    pub fn set_swing(&self, swing: i32) {
        self.shared.set_swing(swing);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.is_running()
    }

    pub fn bpm(&self) -> u32 {
        self.shared.bpm()
    }

    pub fn swing(&self) -> u8 {
        self.shared.swing()
    }

    /// Playhead position within the current pattern's step domain
    pub fn current_step(&self) -> u32 {
        self.shared.current_step()
    }

    // --- Pattern / selection ---

    /// Switch the active pattern; out-of-range indices are ignored
    ///
    /// Track cursors of the new pattern are phase-aligned to the global
    /// tick count so a switch mid-playback stays in time. The selection
    /// is cleared.
    pub fn select_pattern(&self, index: i32) {
        let tick = self.shared.tick_count();
        self.with_state(|state| {
            if index < 0 || index as usize >= state.patterns.len() {
                return;
            }
            state.current_pattern = index as usize;
            state.selection.clear();
            if let Some(pattern) = state.pattern_mut() {
                for track in pattern.tracks_mut() {
                    track.align_cursor(tick);
                }
            }
        });
    }

    pub fn current_pattern_index(&self) -> usize {
        self.with_state(|state| state.current_pattern).unwrap_or(0)
    }

    pub fn select_track(&self, track_id: TrackId) {
        self.with_state(|state| {
            if state.pattern().is_some_and(|p| p.track(track_id).is_some()) {
                state.selection.select_track(track_id);
            }
        });
    }

    pub fn toggle_mute(&self, track_id: TrackId) {
        self.with_state(|state| {
            if let Some(track) = state.pattern_mut().and_then(|p| p.track_mut(track_id)) {
                track.is_muted = !track.is_muted;
            }
        });
    }

    pub fn toggle_solo(&self, track_id: TrackId) {
        self.with_state(|state| {
            if let Some(track) = state.pattern_mut().and_then(|p| p.track_mut(track_id)) {
                track.is_solo = !track.is_solo;
            }
        });
    }

    /// Set a track's playable step count (polymeter), clamped to the
    /// pattern's step domain
    pub fn set_track_length(&self, track_id: TrackId, length: i32) {
        self.with_state(|state| {
            if let Some(track) = state.pattern_mut().and_then(|p| p.track_mut(track_id)) {
                track.set_length(length.max(1) as usize);
            }
        });
    }

    /// Toggle a step in or out of the selection set
    pub fn select_step(&self, step_id: StepId) {
        self.with_state(|state| {
            if state.pattern().is_some_and(|p| p.step(step_id).is_some()) {
                state.selection.toggle_step(step_id);
            }
        });
    }

    pub fn set_inspector_visible(&self, visible: bool) {
        self.with_state(|state| state.selection.show_inspector = visible);
    }

    /// A copy of the current selection
    pub fn selection(&self) -> Selection {
        self.with_state(|state| state.selection.clone())
            .unwrap_or_default()
    }

    // --- Step edits ---

    fn with_step(&self, step_id: StepId, f: impl FnOnce(&mut crate::sequencer::step::Step)) {
        self.with_state(|state| {
            if let Some(step) = state.pattern_mut().and_then(|p| p.step_mut(step_id)) {
                f(step);
            }
        });
    }

    pub fn toggle_step(&self, step_id: StepId) {
        self.with_step(step_id, |step| step.is_on = !step.is_on);
    }

    pub fn set_step_note(&self, step_id: StepId, note: i32) {
        self.with_step(step_id, |step| step.set_note(note));
    }

    pub fn set_step_velocity(&self, step_id: StepId, velocity: i32) {
        self.with_step(step_id, |step| step.set_velocity(velocity));
    }

    pub fn set_step_length(&self, step_id: StepId, length: i32) {
        self.with_step(step_id, |step| step.set_length(length));
    }

    pub fn set_step_probability(&self, step_id: StepId, probability: i32) {
        self.with_step(step_id, |step| step.set_probability(probability));
    }

    /// Adjust a step's velocity by a signed delta, clamped to 1-127
    pub fn adjust_velocity(&self, step_id: StepId, delta: i32) {
        self.with_step(step_id, |step| step.adjust_velocity(delta));
    }

    /// Adjust a step's micro-timing by a signed delta, clamped to
    /// -50..=50 percent of the tick window
    pub fn adjust_timing(&self, step_id: StepId, delta: i32) {
        self.with_step(step_id, |step| step.adjust_micro_timing(delta));
    }

    pub fn toggle_step_slide(&self, step_id: StepId) {
        self.with_step(step_id, |step| step.slide = !step.slide);
    }

    pub fn toggle_step_accent(&self, step_id: StepId) {
        self.with_step(step_id, |step| step.accent = !step.accent);
    }

    /// Set a per-step parameter lock, value clamped to the parameter's
    /// domain
    pub fn set_parameter_lock(&self, step_id: StepId, param: LockableParam, value: i32) {
        self.with_step(step_id, |step| step.set_lock(param, value));
    }

    pub fn clear_parameter_lock(&self, step_id: StepId, param: LockableParam) {
        self.with_step(step_id, |step| step.clear_lock(param));
    }

    // --- Interface / CV ---

    /// Select the output interface and rebuild the default channel
    /// assignment for the current pattern's tracks
    pub fn select_audio_interface(&self, interface: AudioInterface) {
        self.with_state(|state| {
            let tracks: Vec<_> = state
                .pattern()
                .map(|p| p.tracks().to_vec())
                .unwrap_or_default();
            state.mapper.configure_for_interface(&interface, &tracks);
            state.selected_interface = Some(interface);
        });
    }

    pub fn selected_interface(&self) -> Option<AudioInterface> {
        self.with_state(|state| state.selected_interface.clone())
            .flatten()
    }

    /// Append one CV config on the next free channel; no-op when the
    /// channel budget is exhausted
    pub fn add_cv_config(&self) -> Option<ConfigId> {
        self.with_state(|state| {
            let interface = state.selected_interface.clone();
            state.mapper.add_config(interface.as_ref())
        })
        .flatten()
    }

    pub fn update_cv_config(&self, config: CvOutputConfig) {
        self.with_state(|state| state.mapper.update_config(config));
    }

    pub fn remove_cv_config(&self, id: ConfigId) {
        self.with_state(|state| state.mapper.remove_config(id));
    }

    pub fn cv_configs(&self) -> Vec<CvOutputConfig> {
        self.with_state(|state| state.mapper.configs().to_vec())
            .unwrap_or_default()
    }

    // --- External generated content ---

    /// Commit externally generated note/drum content to a track
    ///
    /// Every field is validated and clamped with the same rules as
    /// local edits. Content addressing a missing track or an
    /// out-of-range position is declined with an error (and reported on
    /// the notification channel); playback state is untouched either
    /// way.
    pub fn apply_generated_content(
        &self,
        track_id: TrackId,
        content: &GeneratedContent,
    ) -> Result<usize, ContentError> {
        self.with_state(|state| {
            let result = match state.pattern_mut().and_then(|p| p.track_mut(track_id)) {
                Some(track) => content.apply_to_track(track),
                None => Err(ContentError::UnknownTrack(track_id)),
            };

            if let Err(ref error) = result {
                state.notify(Notification::error(
                    NotificationCategory::Content,
                    format!("Generated content declined: {}", error),
                ));
            }
            result
        })
        .unwrap_or(Err(ContentError::EngineUnavailable))
    }

    /// Parse a JSON content payload and commit it to a track
    pub fn apply_generated_json(
        &self,
        track_id: TrackId,
        json: &str,
    ) -> Result<usize, ContentError> {
        let content = GeneratedContent::from_json(json).map_err(|e| {
            let error = ContentError::Malformed(e.to_string());
            self.with_state(|state| {
                state.notify(Notification::error(
                    NotificationCategory::Content,
                    format!("Generated content declined: {}", error),
                ));
            });
            error
        })?;
        self.apply_generated_content(track_id, &content)
    }

    // --- Observable state ---

    /// Serializable projection of the engine's structured state
    pub fn snapshot(&self) -> EngineSnapshot {
        self.with_state(|state| EngineSnapshot {
            bpm: self.shared.bpm(),
            swing: self.shared.swing(),
            patterns: state.patterns.clone(),
            current_pattern: state.current_pattern,
            cv_configs: state.mapper.configs().to_vec(),
            selected_interface: state.selected_interface.clone(),
        })
        .unwrap_or(EngineSnapshot {
            bpm: self.shared.bpm(),
            swing: self.shared.swing(),
            patterns: Vec::new(),
            current_pattern: 0,
            cv_configs: Vec::new(),
            selected_interface: None,
        })
    }

    /// Run `f` with read access to the current pattern collection
    pub fn with_patterns<R>(&self, f: impl FnOnce(&[Pattern]) -> R) -> Option<R> {
        self.with_state(|state| f(&state.patterns))
    }
}

impl Drop for SequencerEngine {
    fn drop(&mut self) {
        if let Ok(mut clock) = self.clock.lock() {
            clock.stop();
        }
    }
}
