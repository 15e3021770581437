// Generated-content contract - Note/drum data proposed by an external
// generative collaborator
//
// Only the data contract lives here; whatever channel carries the
// payload is someone else's problem. Records are validated and clamped
// with the same rules as local edits before anything is committed, and
// a declined payload leaves the pattern untouched.

use crate::sequencer::step::PULSES_PER_STEP;
use crate::sequencer::track::{Track, TrackId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Micro-timing offset committed for a flammed drum hit: the front
/// half of the step window, early
const FLAM_OFFSET: i32 = -25;

/// One drum hit proposed for a step position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumStepRecord {
    pub position: u32,
    pub velocity: i32,
    #[serde(default)]
    pub probability: Option<i32>,
    #[serde(default)]
    pub flam: Option<bool>,
}

/// One melodic note proposed for a step position
///
/// `start` is a step index, `duration` a step count; duration maps to
/// gate length in clock pulses and clamps like any local edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodicNoteRecord {
    pub pitch: i32,
    pub velocity: i32,
    pub start: u32,
    pub duration: u32,
    #[serde(default)]
    pub slide: Option<bool>,
    #[serde(default)]
    pub accent: Option<bool>,
}

/// A generated-content payload scoped to one target track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "lowercase")]
pub enum GeneratedContent {
    Drum(Vec<DrumStepRecord>),
    Melodic(Vec<MelodicNoteRecord>),
}

/// Why a content payload was declined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("target track {0} no longer exists")]
    UnknownTrack(TrackId),

    #[error("record {index}: position {position} is outside the track's {step_count}-step domain")]
    PositionOutOfRange {
        index: usize,
        position: u32,
        step_count: usize,
    },

    #[error("content payload is malformed: {0}")]
    Malformed(String),

    #[error("engine state is unavailable")]
    EngineUnavailable,
}

impl GeneratedContent {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn record_count(&self) -> usize {
        match self {
            GeneratedContent::Drum(records) => records.len(),
            GeneratedContent::Melodic(records) => records.len(),
        }
    }

    /// Validate every record against the track, then commit them all
    ///
    /// Validation happens up front so a declined payload never
    /// half-applies. Returns the number of committed records.
    pub fn apply_to_track(&self, track: &mut Track) -> Result<usize, ContentError> {
        let step_count = track.step_count();

        match self {
            GeneratedContent::Drum(records) => {
                for (index, record) in records.iter().enumerate() {
                    if record.position as usize >= step_count {
                        return Err(ContentError::PositionOutOfRange {
                            index,
                            position: record.position,
                            step_count,
                        });
                    }
                }

                for record in records {
                    if let Some(step) = track.step_at_mut(record.position as usize) {
                        step.is_on = true;
                        step.set_velocity(record.velocity);
                        if let Some(probability) = record.probability {
                            step.set_probability(probability);
                        }
                        if record.flam == Some(true) {
                            step.set_micro_timing(FLAM_OFFSET);
                        }
                    }
                }
                Ok(records.len())
            }
            GeneratedContent::Melodic(records) => {
                for (index, record) in records.iter().enumerate() {
                    if record.start as usize >= step_count {
                        return Err(ContentError::PositionOutOfRange {
                            index,
                            position: record.start,
                            step_count,
                        });
                    }
                }

                for record in records {
                    if let Some(step) = track.step_at_mut(record.start as usize) {
                        step.is_on = true;
                        step.set_note(record.pitch);
                        step.set_velocity(record.velocity);
                        let pulses = record.duration.max(1).saturating_mul(PULSES_PER_STEP as u32);
                        step.set_length(pulses.min(96) as i32);
                        step.slide = record.slide.unwrap_or(false);
                        step.accent = record.accent.unwrap_or(false);
                    }
                }
                Ok(records.len())
            }
        }
    }
}
