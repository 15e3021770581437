// Engine event types - What consumers observe while the transport runs

use crate::cv::mapper::CvEvent;
use crate::sequencer::evaluator::FireEvent;

/// One observable engine occurrence, pushed on the event channel
///
/// The presentation layer and the CV backend both drain this stream;
/// the engine never blocks on either of them.
#[derive(Debug, Clone, Copy)]
pub enum EngineEvent {
    TransportStarted,
    TransportStopped,
    /// Playhead moved to a step of the current pattern
    Playhead { step: u32, tick: u64 },
    /// A step fired with its resolved values
    Fired(FireEvent),
    /// A CV/gate level change on a physical output channel
    Cv(CvEvent),
}
