//! Result of fuzzy keyword detection.

use serde::{Deserialize, Serialize};

use super::Category;

/// Outcome of matching a note's first word against the keyword table.
///
/// Derived, never persisted directly; `confidence` is the similarity score
/// that triggered the match (1.0 for an exact keyword, 0.0 for no match).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub category: Category,

    /// Input with the keyword stripped; the full original text when nothing
    /// matched or nothing remains after the keyword.
    pub cleaned_text: String,

    /// Normalized edit-distance similarity in [0, 1]
    pub confidence: f64,

    /// The table keyword that won, if any
    pub matched_keyword: Option<String>,
}

impl Detection {
    pub fn unclassified(text: impl Into<String>) -> Self {
        Self {
            category: Category::Unclassified,
            cleaned_text: text.into(),
            confidence: 0.0,
            matched_keyword: None,
        }
    }
}
