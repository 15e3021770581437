// modstep - Step sequencer engine for modular synth voices (CV/gate out)

pub mod cv;
pub mod engine;
pub mod messaging;
pub mod remote;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use cv::config::{ConfigId, CvOutputConfig, OutputKind};
pub use cv::interface::AudioInterface;
pub use cv::mapper::{CvEvent, CvGateMapper};
pub use engine::commands::{EngineConfig, SequencerEngine};
pub use engine::selection::Selection;
pub use engine::snapshot::EngineSnapshot;
pub use messaging::channels::{create_event_channel, create_notification_channel};
pub use messaging::event::EngineEvent;
pub use sequencer::clock::{ClockShared, ClockState, MAX_BPM, MIN_BPM};
pub use sequencer::evaluator::FireEvent;
pub use sequencer::pattern::{Pattern, PatternId, StepDomain};
pub use sequencer::step::{LockableParam, PULSES_PER_STEP, Step, StepId};
pub use sequencer::track::{Track, TrackId};
