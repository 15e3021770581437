// CV module
// Interface descriptors, output channel configs, and the CV/gate mapper

pub mod config;
pub mod interface;
pub mod mapper;

pub use config::{ConfigId, CvOutputConfig, OutputKind};
pub use interface::{AudioInterface, InterfaceManager};
pub use mapper::{CvEvent, CvGateMapper, pitch_cv};
