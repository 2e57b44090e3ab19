//! Schema-constrained entity extraction via a language model.
//!
//! Builds a category-specific prompt, runs one completion at low
//! temperature, parses the response strictly as JSON, and shapes it into a
//! typed [`Extraction`]. A transport failure, empty response, or malformed
//! JSON is a hard error for the orchestrator to report, never a silent
//! skip. No retries at this layer.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::{ChatModel, ChatRequest};
use crate::domain::{Category, Extraction};

const SYSTEM_INSTRUCTION: &str = "You are an assistant that extracts structured information \
from voice notes. ALWAYS respond with valid JSON and nothing else.";

/// Default sampling temperature; low for deterministic extraction.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default response-size ceiling.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Extraction settings, loaded from config.
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Extracts typed records from cleaned transcription text.
pub struct Extractor {
    model: Arc<dyn ChatModel>,
    settings: ExtractorSettings,
}

impl Extractor {
    pub fn new(model: Arc<dyn ChatModel>, settings: ExtractorSettings) -> Self {
        Self { model, settings }
    }

    /// Extract a record for `category` from `cleaned_text`, anchoring
    /// relative date phrases to `today`.
    ///
    /// Returns `Ok(None)` for unclassified input (precondition, not an
    /// error); raises on transport or parse failure.
    pub async fn extract(
        &self,
        cleaned_text: &str,
        category: Category,
        today: NaiveDate,
    ) -> Result<Option<Extraction>> {
        if !category.is_classified() {
            debug!("Unclassified input, nothing to extract");
            return Ok(None);
        }

        info!(category = %category, model = self.model.name(), "Extracting entities");

        let request = ChatRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: build_prompt(category, cleaned_text, today),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            json_only: true,
        };

        let content = self
            .model
            .complete(&request)
            .await
            .with_context(|| format!("Model call failed for category '{}'", category))?;

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Model response is not valid JSON: {}", truncate(&content)))?;

        let extraction = Extraction::from_model_json(category, &value)
            .context("Model response did not match the expected schema")?;

        debug!(category = %category, "Extraction shaped");
        Ok(Some(extraction))
    }
}

/// Category-specific instruction prompt. Embeds the input verbatim, names
/// the exact JSON fields and types, and anchors relative dates to `today`.
fn build_prompt(category: Category, text: &str, today: NaiveDate) -> String {
    match category {
        Category::Task => format!(
            r#"Extract from this note a TASK (something to do in the future).

Transcription: "{text}"

Extract the following fields as JSON:
{{
  "title": "string (short, imperative, max 100 chars)",
  "description": "string (full detail, optional)",
  "due_date": "string ISO date (infer from 'tomorrow', 'on Monday', 'in 3 days', etc. Use the current date as reference: {today}. If no date is mentioned, null)",
  "priority": "URGENT | HIGH | MEDIUM | LOW (infer from tone/urgency, default MEDIUM)"
}}

Respond ONLY with the JSON, no additional text."#
        ),
        Category::ActivityLog => format!(
            r#"Extract from this note a LOG of a PAST activity (something already done).

Transcription: "{text}"

Extract the following fields as JSON:
{{
  "description": "string (what was done, past tense)",
  "duration_hours": "number (if time is mentioned: '2 hours'=2, 'all morning'=4, 'half an hour'=0.5, else null)",
  "project": "string (project/client name if mentioned, else null)",
  "people": ["array of names of people mentioned"],
  "category": "WORK | PERSONAL | SOCIAL | OTHER (infer from context)"
}}

Respond ONLY with the JSON, no additional text."#
        ),
        Category::Commitment => format!(
            r#"Extract from this note a COMMITMENT involving another person.

Transcription: "{text}"

Extract the following fields as JSON:
{{
  "title": "string (what was committed, short)",
  "description": "string (full context, optional)",
  "counterparty": "string (name of the person involved)",
  "deadline": "string ISO date (if mentioned, e.g. 'by Friday'. Use the current date as reference: {today}. If not mentioned, null)",
  "self_committed": "boolean (true if I promised to do something, false if the OTHER person promised)"
}}

Respond ONLY with the JSON, no additional text."#
        ),
        Category::Idea => format!(
            r#"Extract from this note an IDEA or thought.

Transcription: "{text}"

Extract the following fields as JSON:
{{
  "title": "string (summary in 5-10 words)",
  "description": "string (full detail)",
  "category": "string (kind of idea: 'product', 'improvement', 'strategy', 'content', 'other', etc.)"
}}

Respond ONLY with the JSON, no additional text."#
        ),
        Category::Unclassified => String::new(),
    }
}

fn truncate(s: &str) -> &str {
    let end = s
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}
