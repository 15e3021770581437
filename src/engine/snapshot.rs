// Engine state snapshot - Serializable projection for replay/restore
//
// This is a state contract, not a file format: consumers may hold it,
// ship it over a channel, or round-trip it through JSON. Runtime-only
// state (cursors, open gates, selection) is deliberately absent.

use crate::cv::config::CvOutputConfig;
use crate::cv::interface::AudioInterface;
use crate::sequencer::pattern::Pattern;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub bpm: u32,
    pub swing: u8,
    pub patterns: Vec<Pattern>,
    pub current_pattern: usize,
    pub cv_configs: Vec<CvOutputConfig>,
    pub selected_interface: Option<AudioInterface>,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Highest entity id present anywhere in the snapshot
    ///
    /// Restoring must raise the id counter past this so ids minted
    /// afterwards never collide with restored ones.
    pub fn max_entity_id(&self) -> u64 {
        let mut max = 0;

        for pattern in &self.patterns {
            max = max.max(pattern.id);
            for track in pattern.tracks() {
                max = max.max(track.id);
                for step in track.steps() {
                    max = max.max(step.id);
                }
            }
        }
        for config in &self.cv_configs {
            max = max.max(config.id);
        }

        max
    }
}
