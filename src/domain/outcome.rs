//! Structured result of processing one transcription.

use serde::{Deserialize, Serialize};

use super::Category;

/// How many entity rows an extraction produced, per category.
///
/// Exactly one entry is non-zero for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub tasks: u32,
    pub activity_logs: u32,
    pub commitments: u32,
    pub ideas: u32,
}

impl EntityCounts {
    pub fn total(&self) -> u32 {
        self.tasks + self.activity_logs + self.commitments + self.ideas
    }
}

/// Terminal state of a pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Entity row created and audit record marked processed
    Completed,

    /// This transcription id already has an audit record
    AlreadyProcessed,

    /// No keyword matched; audit record stored and marked processed
    StoredUnclassified,

    /// Model transport or parse failure
    ExtractionFailed,

    /// Extracted record was missing required fields
    InvalidExtraction,

    /// The store rejected a write
    PersistenceFailed,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Disposition::Completed => "completed",
            Disposition::AlreadyProcessed => "already processed",
            Disposition::StoredUnclassified => "stored, unclassified",
            Disposition::ExtractionFailed => "extraction failed",
            Disposition::InvalidExtraction => "invalid extraction",
            Disposition::PersistenceFailed => "persistence failed",
        };
        f.write_str(s)
    }
}

/// What happened to one transcription, as reported by the orchestrator.
///
/// The orchestrator is the single source of truth for whether processing
/// occurred; every failure carries enough detail to log actionable
/// diagnostics (category attempted, audit id, underlying message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub disposition: Disposition,
    pub note_id: Option<i64>,
    pub category: Category,
    pub created: Option<EntityCounts>,
    pub error: Option<String>,
}

impl Outcome {
    pub fn completed(note_id: i64, category: Category, created: EntityCounts) -> Self {
        Self {
            success: true,
            disposition: Disposition::Completed,
            note_id: Some(note_id),
            category,
            created: Some(created),
            error: None,
        }
    }

    /// `category` is what detection resolved before the duplicate was
    /// noticed; `Unclassified` when the pre-check short-circuits before
    /// detection runs.
    pub fn already_processed(category: Category) -> Self {
        Self {
            success: false,
            disposition: Disposition::AlreadyProcessed,
            note_id: None,
            category,
            created: None,
            error: Some("already processed".to_string()),
        }
    }

    pub fn stored_unclassified(note_id: i64) -> Self {
        Self {
            success: true,
            disposition: Disposition::StoredUnclassified,
            note_id: Some(note_id),
            category: Category::Unclassified,
            created: None,
            error: None,
        }
    }

    pub fn failed(
        disposition: Disposition,
        note_id: Option<i64>,
        category: Category,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            disposition,
            note_id,
            category,
            created: None,
            error: Some(error.into()),
        }
    }
}
