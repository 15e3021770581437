// CV output channel configuration

use crate::sequencer::step::mint_entity_id;
use crate::sequencer::track::TrackId;
use serde::{Deserialize, Serialize};

/// Unique identifier for CV output configs
pub type ConfigId = u64;

/// What a physical output channel carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// 1 V/oct pitch CV
    Pitch,
    /// Gate held high for a note's duration
    Gate,
}

/// Assignment of one physical output channel to a track
///
/// `track_id` is a non-owning back-reference: the track may be deleted
/// out from under the config, in which case the mapper treats the
/// config as having no target and skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvOutputConfig {
    /// Unique identifier
    pub id: ConfigId,

    /// Physical output channel, 1-based
    pub channel: u16,

    pub kind: OutputKind,

    pub track_id: Option<TrackId>,
}

impl CvOutputConfig {
    pub fn new(channel: u16, kind: OutputKind, track_id: Option<TrackId>) -> Self {
        Self {
            id: mint_entity_id(),
            channel,
            kind,
            track_id,
        }
    }
}
