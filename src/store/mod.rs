//! SQLite persistence gateway.
//!
//! One audit row per transcription (`audio_notes`, UNIQUE on the
//! transcription id) owning at most one typed entity row. The uniqueness
//! constraint is what makes processing idempotent under concurrent
//! delivery: the second insert fails and is surfaced as
//! [`StoreError::Duplicate`], which the orchestrator treats as "already
//! processed".

mod notes;
mod schema;

pub use notes::{
    ActivityRow, AudioNote, CommitmentRow, IdeaRow, NoteStore, StoreError, TaskRow,
};
pub use schema::SCHEMA_SQL;
