//! Message categories detected from the leading keyword of a voice note.

use serde::{Deserialize, Serialize};

/// What kind of record a voice note describes.
///
/// `Unclassified` is a valid terminal state, not an error: the note is still
/// stored, it just never reaches extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Something to do in the future
    Task,

    /// Something already done (a log entry)
    ActivityLog,

    /// A promise made to or by another person
    Commitment,

    /// A captured thought or idea
    Idea,

    /// No keyword matched
    Unclassified,
}

impl Category {
    /// Stable string form, used for the `detected_category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Task => "task",
            Category::ActivityLog => "activity_log",
            Category::Commitment => "commitment",
            Category::Idea => "idea",
            Category::Unclassified => "unclassified",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). Unknown strings map to `Unclassified`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "task" => Category::Task,
            "activity_log" => Category::ActivityLog,
            "commitment" => Category::Commitment,
            "idea" => Category::Idea,
            _ => Category::Unclassified,
        }
    }

    /// Whether this category proceeds to extraction.
    pub fn is_classified(&self) -> bool {
        !matches!(self, Category::Unclassified)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
