// Selection - Which track/steps edit commands currently address
// Pure state, independent of playback, never persisted

use crate::sequencer::step::StepId;
use crate::sequencer::track::TrackId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    track: Option<TrackId>,
    steps: HashSet<StepId>,
    pub show_inspector: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub fn steps(&self) -> &HashSet<StepId> {
        &self.steps
    }

    pub fn is_step_selected(&self, step_id: StepId) -> bool {
        self.steps.contains(&step_id)
    }

    /// Select a track; switching to a different track drops the step
    /// selection
    pub fn select_track(&mut self, track_id: TrackId) {
        if self.track != Some(track_id) {
            self.steps.clear();
        }
        self.track = Some(track_id);
    }

    /// Toggle a step in or out of the selection set
    pub fn toggle_step(&mut self, step_id: StepId) {
        if !self.steps.insert(step_id) {
            self.steps.remove(&step_id);
        }
    }

    /// Drop the whole selection, e.g. when the active pattern changes
    pub fn clear(&mut self) {
        self.track = None;
        self.steps.clear();
        self.show_inspector = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selecting_other_track_drops_steps() {
        let mut selection = Selection::new();
        selection.select_track(1);
        selection.toggle_step(10);
        selection.toggle_step(11);
        assert_eq!(selection.steps().len(), 2);

        selection.select_track(1); // same track keeps steps
        assert_eq!(selection.steps().len(), 2);

        selection.select_track(2);
        assert!(selection.steps().is_empty());
    }

    #[test]
    fn test_toggle_step() {
        let mut selection = Selection::new();
        selection.toggle_step(7);
        assert!(selection.is_step_selected(7));
        selection.toggle_step(7);
        assert!(!selection.is_step_selected(7));
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::new();
        selection.select_track(1);
        selection.toggle_step(10);
        selection.show_inspector = true;

        selection.clear();
        assert_eq!(selection.track(), None);
        assert!(selection.steps().is_empty());
        assert!(!selection.show_inspector);
    }
}
