// Pattern - Named collection of tracks sharing one step-count domain

use crate::sequencer::step::{Step, StepId, mint_entity_id};
use crate::sequencer::track::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Unique identifier for patterns
pub type PatternId = u64;

/// Default track color palette, cycled by track index
const TRACK_COLORS: [[u8; 3]; 4] = [
    [231, 111, 81],
    [233, 196, 106],
    [42, 157, 143],
    [38, 70, 83],
];

/// Shared step-count domain of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDomain {
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl StepDomain {
    pub fn step_count(&self) -> usize {
        match self {
            StepDomain::Sixteen => 16,
            StepDomain::ThirtyTwo => 32,
            StepDomain::SixtyFour => 64,
        }
    }
}

/// A pattern: one playable unit of tracks
///
/// Every track in a pattern has the same total step count (the pattern's
/// step domain); a track's playable length may be shorter, not longer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Unique identifier
    pub id: PatternId,

    /// Pattern name
    pub name: String,

    domain: StepDomain,
    tracks: Vec<Track>,
}

impl Pattern {
    /// Create a new pattern with `track_count` empty tracks
    pub fn new(name: String, domain: StepDomain, track_count: usize) -> Self {
        let tracks = (0..track_count)
            .map(|i| {
                Track::new(
                    format!("Track {}", i + 1),
                    domain.step_count(),
                    TRACK_COLORS[i % TRACK_COLORS.len()],
                )
            })
            .collect();

        Self {
            id: mint_entity_id(),
            name,
            domain,
            tracks,
        }
    }

    pub fn domain(&self) -> StepDomain {
        self.domain
    }

    /// Total steps per track in this pattern
    pub fn step_count(&self) -> usize {
        self.domain.step_count()
    }

    /// Get all tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    /// Append a new empty track sharing this pattern's step domain
    pub fn add_track(&mut self) -> TrackId {
        let index = self.tracks.len();
        let track = Track::new(
            format!("Track {}", index + 1),
            self.domain.step_count(),
            TRACK_COLORS[index % TRACK_COLORS.len()],
        );
        let id = track.id;
        self.tracks.push(track);
        id
    }

    /// Remove a track by ID
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == track_id)?;
        Some(self.tracks.remove(index))
    }

    /// Get a track by ID
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// Get a mutable track by ID
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    /// Find the track owning a given step
    pub fn track_containing_step(&self, step_id: StepId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.step(step_id).is_some())
    }

    /// Find the step with a given id, wherever it lives
    pub fn step(&self, step_id: StepId) -> Option<&Step> {
        self.tracks.iter().find_map(|t| t.step(step_id))
    }

    /// Get a mutable step by id, wherever it lives
    pub fn step_mut(&mut self, step_id: StepId) -> Option<&mut Step> {
        self.tracks.iter_mut().find_map(|t| t.step_mut(step_id))
    }

    /// True if any track in the pattern is soloed
    pub fn any_solo(&self) -> bool {
        self.tracks.iter().any(|t| t.is_solo)
    }

    /// Reset every track cursor to step 0
    pub fn reset_cursors(&mut self) {
        for track in &mut self.tracks {
            track.reset_cursor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_creation() {
        let pattern = Pattern::new("A1".to_string(), StepDomain::Sixteen, 4);

        assert_eq!(pattern.name, "A1");
        assert_eq!(pattern.step_count(), 16);
        assert_eq!(pattern.tracks().len(), 4);
        for track in pattern.tracks() {
            assert_eq!(track.step_count(), 16);
        }
    }

    #[test]
    fn test_step_domains() {
        assert_eq!(StepDomain::Sixteen.step_count(), 16);
        assert_eq!(StepDomain::ThirtyTwo.step_count(), 32);
        assert_eq!(StepDomain::SixtyFour.step_count(), 64);
    }

    #[test]
    fn test_add_and_remove_track() {
        let mut pattern = Pattern::new("A1".to_string(), StepDomain::ThirtyTwo, 1);

        let id = pattern.add_track();
        assert_eq!(pattern.tracks().len(), 2);
        assert_eq!(pattern.track(id).unwrap().step_count(), 32);

        let removed = pattern.remove_track(id);
        assert!(removed.is_some());
        assert_eq!(pattern.tracks().len(), 1);

        assert!(pattern.remove_track(u64::MAX).is_none());
    }

    #[test]
    fn test_step_lookup_across_tracks() {
        let mut pattern = Pattern::new("A1".to_string(), StepDomain::Sixteen, 3);
        let step_id = pattern.tracks()[2].steps()[7].id;

        let owner = pattern.track_containing_step(step_id).unwrap();
        assert_eq!(owner.id, pattern.tracks()[2].id);

        pattern.step_mut(step_id).unwrap().is_on = true;
        assert!(pattern.step(step_id).unwrap().is_on);
    }

    #[test]
    fn test_any_solo() {
        let mut pattern = Pattern::new("A1".to_string(), StepDomain::Sixteen, 2);
        assert!(!pattern.any_solo());

        pattern.tracks_mut()[1].is_solo = true;
        assert!(pattern.any_solo());
    }
}
