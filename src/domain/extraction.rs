//! Typed extraction records shaped from model output.
//!
//! The model is asked for JSON with exact field names, but its output is
//! untrusted: [`Extraction::from_model_json`] checks presence and types
//! explicitly instead of assuming the schema was honored. A mistyped
//! required field is a hard parse error; a missing or null one becomes an
//! empty string so [`Extraction::is_valid`] rejects the record afterwards.
//! Enum-ish strings fall back to defaults with a warning, and unparseable
//! dates become `None`.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::Category;

/// Task priority, inferred by the model from tone and urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "URGENT",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Case-insensitive parse; unknown values fall back to `Medium`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "URGENT" => Priority::Urgent,
            "HIGH" => Priority::High,
            "MEDIUM" => Priority::Medium,
            "LOW" => Priority::Low,
            other => {
                warn!(priority = other, "Unknown priority from model, using MEDIUM");
                Priority::Medium
            }
        }
    }
}

/// Broad bucket for an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityKind {
    Work,
    Personal,
    Social,
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Work => "WORK",
            ActivityKind::Personal => "PERSONAL",
            ActivityKind::Social => "SOCIAL",
            ActivityKind::Other => "OTHER",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "WORK" => ActivityKind::Work,
            "PERSONAL" => ActivityKind::Personal,
            "SOCIAL" => ActivityKind::Social,
            "OTHER" => ActivityKind::Other,
            other => {
                warn!(kind = other, "Unknown activity kind from model, using OTHER");
                ActivityKind::Other
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub description: String,
    pub duration_hours: Option<f64>,
    pub project: Option<String>,
    pub people: Vec<String>,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentDraft {
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub deadline: Option<NaiveDate>,
    pub self_committed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// One extraction record, keyed by category.
///
/// A sum type rather than a struct with four optional payloads: exactly one
/// payload can exist, by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Extraction {
    Task(TaskDraft),
    ActivityLog(ActivityDraft),
    Commitment(CommitmentDraft),
    Idea(IdeaDraft),
}

impl Extraction {
    pub fn category(&self) -> Category {
        match self {
            Extraction::Task(_) => Category::Task,
            Extraction::ActivityLog(_) => Category::ActivityLog,
            Extraction::Commitment(_) => Category::Commitment,
            Extraction::Idea(_) => Category::Idea,
        }
    }

    /// Shape a parsed model response into a typed record for `category`.
    ///
    /// Errors when `category` is `Unclassified`, when the value is not an
    /// object, or when a required field carries the wrong type. An absent
    /// required field shapes to an empty string and is left for
    /// [`is_valid`](Self::is_valid) to reject.
    pub fn from_model_json(category: Category, value: &Value) -> Result<Self> {
        value
            .as_object()
            .context("Model response is not a JSON object")?;

        match category {
            Category::Task => Ok(Extraction::Task(TaskDraft {
                title: required_str(value, "title")?,
                description: optional_str(value, "description"),
                due_date: optional_date(value, "due_date"),
                priority: optional_str(value, "priority")
                    .map(|s| Priority::from_str_lossy(&s))
                    .unwrap_or_default(),
            })),
            Category::ActivityLog => Ok(Extraction::ActivityLog(ActivityDraft {
                description: required_str(value, "description")?,
                duration_hours: value.get("duration_hours").and_then(Value::as_f64),
                project: optional_str(value, "project"),
                people: string_list(value, "people"),
                kind: optional_str(value, "category")
                    .map(|s| ActivityKind::from_str_lossy(&s))
                    .unwrap_or(ActivityKind::Other),
            })),
            Category::Commitment => Ok(Extraction::Commitment(CommitmentDraft {
                title: required_str(value, "title")?,
                description: optional_str(value, "description"),
                counterparty: required_str(value, "counterparty")?,
                deadline: optional_date(value, "deadline"),
                self_committed: value
                    .get("self_committed")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            })),
            Category::Idea => Ok(Extraction::Idea(IdeaDraft {
                title: required_str(value, "title")?,
                description: optional_str(value, "description"),
                category: optional_str(value, "category"),
            })),
            Category::Unclassified => bail!("Cannot shape an extraction for unclassified input"),
        }
    }

    /// Minimum required fields per category, checked before persistence.
    pub fn is_valid(&self) -> bool {
        match self {
            Extraction::Task(t) => !t.title.trim().is_empty(),
            Extraction::ActivityLog(a) => !a.description.trim().is_empty(),
            Extraction::Commitment(c) => {
                !c.title.trim().is_empty() && !c.counterparty.trim().is_empty()
            }
            Extraction::Idea(i) => !i.title.trim().is_empty(),
        }
    }
}

fn required_str(value: &Value, field: &str) -> Result<String> {
    match value.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => {
            warn!(field, "Required field missing from model response");
            Ok(String::new())
        }
        Some(other) => bail!(
            "Field '{}' has wrong type (expected string, got {})",
            field,
            json_type_name(other)
        ),
    }
}

fn optional_str(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Lenient date parse: `YYYY-MM-DD`, tolerating a trailing time component.
/// Unparseable values are dropped with a warning rather than failing the
/// whole extraction.
fn optional_date(value: &Value, field: &str) -> Option<NaiveDate> {
    let raw = optional_str(value, field)?;
    let day_part = raw.get(..10).unwrap_or(&raw);

    match NaiveDate::parse_from_str(day_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(field, value = %raw, "Unparseable date from model, dropping");
            None
        }
    }
}

fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
