// Sequencer module
// Pattern/track/step data model, transport clock, and step evaluation

pub mod clock;
pub mod evaluator;
pub mod pattern;
pub mod step;
pub mod track;

pub use clock::{ClockShared, ClockState, TransportClock, nominal_interval, tick_interval};
pub use evaluator::FireEvent;
pub use pattern::{Pattern, PatternId, StepDomain};
pub use step::{LockableParam, ParameterLock, Step, StepId};
pub use track::{Track, TrackId};
