// Track - Ordered sequence of steps plus per-track playback state

use crate::sequencer::step::{Step, StepId, mint_entity_id};
use serde::{Deserialize, Serialize};

/// Unique identifier for tracks
pub type TrackId = u64;

/// A track: a fixed-size row of steps with its own playable length
///
/// The step count is fixed by the owning pattern's step domain at
/// creation. `length` can be shorter than the step count, which lets
/// tracks of differing lengths cycle independently (polymeter). The
/// cursor is runtime playback state and is not serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier
    pub id: TrackId,

    /// Track name
    pub name: String,

    steps: Vec<Step>,
    length: usize,

    pub is_muted: bool,
    pub is_solo: bool,

    /// Display color (RGB), consumed by the presentation layer
    pub color: [u8; 3],

    #[serde(skip)]
    cursor: usize,
}

impl Track {
    /// Create a new track with `step_count` steps, all triggers off
    pub fn new(name: String, step_count: usize, color: [u8; 3]) -> Self {
        let step_count = step_count.clamp(1, 64);
        let steps = (0..step_count).map(Step::new).collect();

        Self {
            id: mint_entity_id(),
            name,
            steps,
            length: step_count,
            is_muted: false,
            is_solo: false,
            color,
            cursor: 0,
        }
    }

    /// Get all steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Total step count (the pattern's step domain)
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Playable step count
    pub fn length(&self) -> usize {
        self.length
    }

    /// Set the playable step count, clamped to `1..=step_count`
    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(1, self.steps.len());
        if self.cursor >= self.length {
            self.cursor %= self.length;
        }
    }

    /// Get a step by ID
    pub fn step(&self, step_id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Get a mutable step by ID
    pub fn step_mut(&mut self, step_id: StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Get a step by position
    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Get a mutable step by position
    pub fn step_at_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    /// The step currently under this track's cursor
    pub fn current_step(&self) -> &Step {
        &self.steps[self.cursor]
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance the cursor one step, wrapping at the playable length
    pub fn advance_cursor(&mut self) -> usize {
        self.cursor = (self.cursor + 1) % self.length;
        self.cursor
    }

    /// Reset the cursor to step 0
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Place the cursor where a given global tick count would have it,
    /// used to keep phase when switching patterns mid-playback
    pub fn align_cursor(&mut self, tick_count: u64) {
        self.cursor = (tick_count % self.length as u64) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_creation() {
        let track = Track::new("Kick".to_string(), 16, [200, 60, 60]);

        assert_eq!(track.name, "Kick");
        assert_eq!(track.step_count(), 16);
        assert_eq!(track.length(), 16);
        assert!(!track.is_muted);
        assert!(!track.is_solo);
        assert_eq!(track.cursor(), 0);
    }

    #[test]
    fn test_step_indices_are_sequential() {
        let track = Track::new("T".to_string(), 8, [0, 0, 0]);
        for (i, step) in track.steps().iter().enumerate() {
            assert_eq!(step.index, i);
        }
    }

    #[test]
    fn test_cursor_wraps_at_playable_length() {
        let mut track = Track::new("T".to_string(), 16, [0, 0, 0]);
        track.set_length(3);

        assert_eq!(track.advance_cursor(), 1);
        assert_eq!(track.advance_cursor(), 2);
        assert_eq!(track.advance_cursor(), 0);
    }

    #[test]
    fn test_set_length_clamps() {
        let mut track = Track::new("T".to_string(), 16, [0, 0, 0]);

        track.set_length(99);
        assert_eq!(track.length(), 16);

        track.set_length(0);
        assert_eq!(track.length(), 1);
    }

    #[test]
    fn test_shrinking_length_rewraps_cursor() {
        let mut track = Track::new("T".to_string(), 16, [0, 0, 0]);
        for _ in 0..10 {
            track.advance_cursor();
        }
        assert_eq!(track.cursor(), 10);

        track.set_length(4);
        assert!(track.cursor() < 4);
    }

    #[test]
    fn test_step_lookup_by_id() {
        let mut track = Track::new("T".to_string(), 16, [0, 0, 0]);
        let id = track.steps()[5].id;

        assert!(track.step(id).is_some());
        track.step_mut(id).unwrap().is_on = true;
        assert!(track.step_at(5).unwrap().is_on);

        assert!(track.step(u64::MAX).is_none());
    }

    #[test]
    fn test_align_cursor() {
        let mut track = Track::new("T".to_string(), 16, [0, 0, 0]);
        track.set_length(5);

        track.align_cursor(12);
        assert_eq!(track.cursor(), 2);
    }
}
