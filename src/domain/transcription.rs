//! Inbound transcription payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transcribed voice note as delivered by the transcription service.
///
/// Immutable once received. `id` is assigned by the caller and is the
/// idempotency key for the whole pipeline: at most one audit row and one
/// entity row ever exist for a given `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Caller-assigned unique identifier
    #[serde(rename = "transcription_id")]
    pub id: i64,

    /// Raw transcribed text
    pub text: String,

    /// URL of the source audio in the object store, if kept
    #[serde(default)]
    pub audio_url: Option<String>,

    /// When the note was received; defaults to now for payloads that omit it
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl Transcription {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            audio_url: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }
}
