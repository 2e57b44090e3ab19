//! Domain types: categories, transcriptions, detections, extractions, outcomes.

pub mod category;
pub mod detection;
pub mod extraction;
pub mod outcome;
pub mod transcription;

pub use category::Category;
pub use detection::Detection;
pub use extraction::{
    ActivityDraft, ActivityKind, CommitmentDraft, Extraction, IdeaDraft, Priority, TaskDraft,
};
pub use outcome::{Disposition, EntityCounts, Outcome};
pub use transcription::Transcription;
