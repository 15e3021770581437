// Remote module - Data contract for externally generated content

pub mod content;

pub use content::{ContentError, DrumStepRecord, GeneratedContent, MelodicNoteRecord};
