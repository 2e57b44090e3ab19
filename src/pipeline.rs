//! Pipeline orchestrator: one transcription in, one structured outcome out.
//!
//! Sequences duplicate check, detection, audit insert, extraction,
//! validation, and persistence, short-circuiting on the first terminal
//! state. Infallible at the boundary: every error from the later steps is
//! converted into a failure [`Outcome`] instead of propagating, so the
//! caller (webhook handler, CLI) never crashes on a bad note.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::domain::{Disposition, Outcome, Transcription};
use crate::extractor::Extractor;
use crate::matcher::KeywordMatcher;
use crate::store::{NoteStore, StoreError};

/// Orchestrates the classification-and-extraction pipeline.
///
/// Collaborators are injected; the processor holds no mutable state of its
/// own, so one instance serves all invocations.
pub struct Processor {
    matcher: KeywordMatcher,
    extractor: Extractor,
    store: Arc<NoteStore>,
}

impl Processor {
    pub fn new(matcher: KeywordMatcher, extractor: Extractor, store: Arc<NoteStore>) -> Self {
        Self {
            matcher,
            extractor,
            store,
        }
    }

    /// Process one transcription to a terminal outcome.
    #[instrument(skip(self, transcription), fields(transcription_id = transcription.id))]
    pub async fn process(&self, transcription: &Transcription) -> Outcome {
        info!(
            text = %head(&transcription.text),
            "Processing transcription"
        );

        // Step 1: duplicate check
        match self.store.is_processed(transcription.id) {
            Ok(true) => {
                info!("Transcription already has an audit record, skipping");
                return Outcome::already_processed(crate::domain::Category::Unclassified);
            }
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, "Duplicate check failed");
                return Outcome::failed(
                    Disposition::PersistenceFailed,
                    None,
                    crate::domain::Category::Unclassified,
                    e.to_string(),
                );
            }
        }

        // Step 2: detect (always succeeds, worst case Unclassified)
        let detection = self.matcher.detect(&transcription.text);
        info!(
            category = %detection.category,
            confidence = detection.confidence,
            "Detection complete"
        );

        // Step 3: record the audit row, classified or not. A uniqueness
        // conflict here means a concurrent delivery won the race: also a
        // duplicate, not a fault.
        let note = match self.store.create_note(transcription, &detection) {
            Ok(note) => note,
            Err(StoreError::Duplicate(_)) => {
                info!("Concurrent delivery already recorded this transcription");
                return Outcome::already_processed(detection.category);
            }
            Err(e) => {
                error!(error = %e, "Failed to create audit record");
                return Outcome::failed(
                    Disposition::PersistenceFailed,
                    None,
                    detection.category,
                    e.to_string(),
                );
            }
        };

        // Step 4: unclassified input terminates here, stored and processed.
        // A failed flag write is not a clean terminal state; report it.
        if !detection.category.is_classified() {
            info!("No keyword detected, stored as unclassified");
            if let Err(e) = self.store.mark_processed(note.id) {
                error!(error = %e, "Failed to flag unclassified note as processed");
                return Outcome::failed(
                    Disposition::PersistenceFailed,
                    Some(note.id),
                    detection.category,
                    e.to_string(),
                );
            }
            return Outcome::stored_unclassified(note.id);
        }

        // Step 5: extract
        let extraction = match self
            .extractor
            .extract(&detection.cleaned_text, detection.category, Utc::now().date_naive())
            .await
        {
            Ok(Some(extraction)) => extraction,
            Ok(None) => {
                // Unreachable once classified, but reported rather than assumed
                warn!("Extractor returned nothing for classified input");
                return Outcome::failed(
                    Disposition::ExtractionFailed,
                    Some(note.id),
                    detection.category,
                    "extractor returned no record",
                );
            }
            Err(e) => {
                error!(category = %detection.category, error = %e, "Extraction failed");
                return Outcome::failed(
                    Disposition::ExtractionFailed,
                    Some(note.id),
                    detection.category,
                    format!("{:#}", e),
                );
            }
        };

        // Step 6: validate minimum required fields
        if !extraction.is_valid() {
            warn!(category = %detection.category, "Extraction missing required fields");
            return Outcome::failed(
                Disposition::InvalidExtraction,
                Some(note.id),
                detection.category,
                "extraction missing required fields",
            );
        }

        // Step 7: persist entity + mark processed
        match self.store.persist_extraction(note.id, &extraction) {
            Ok(counts) => {
                info!(
                    category = %detection.category,
                    entities = counts.total(),
                    "Processing completed"
                );
                Outcome::completed(note.id, detection.category, counts)
            }
            Err(e) => {
                error!(category = %detection.category, error = %e, "Persistence failed");
                Outcome::failed(
                    Disposition::PersistenceFailed,
                    Some(note.id),
                    detection.category,
                    e.to_string(),
                )
            }
        }
    }
}

/// First 80 chars of the text, for log lines.
fn head(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(80)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}
