//! voznote - voice-note capture pipeline
//!
//! Ingests voice-note transcriptions, classifies them by their leading
//! trigger word, extracts structured records with a language model, and
//! persists them idempotently; a daily digest is compiled and delivered
//! over Telegram.
//!
//! # Architecture
//!
//! One transcription flows through a fixed pipeline:
//! - `matcher`: fuzzy keyword detection over the first word
//! - `extractor`: schema-constrained extraction via a chat model
//! - `store`: idempotent persistence (audit row + one typed entity row)
//! - `pipeline`: the orchestrator sequencing the above
//!
//! Around the core:
//! - `adapters`: model and Telegram clients (injected, substitutable)
//! - `server`: thin webhook ingress
//! - `digest` / `scheduler`: daily summary job
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the webhook server + digest scheduler
//! voznote serve
//!
//! # Push one transcription through the pipeline
//! voznote process --id 42 --text "teo comprar leche mañana"
//!
//! # See how a word scores against the keyword table
//! voznote detect tayo
//!
//! # Send today's digest immediately
//! voznote digest --plain
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod digest;
pub mod domain;
pub mod extractor;
pub mod matcher;
pub mod pipeline;
pub mod scheduler;
pub mod server;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::{ChatModel, ChatRequest, OpenAiClient, TelegramClient};
pub use config::Config;
pub use domain::{Category, Detection, Disposition, EntityCounts, Extraction, Outcome, Transcription};
pub use extractor::{Extractor, ExtractorSettings};
pub use matcher::{KeywordEntry, KeywordMatcher};
pub use pipeline::Processor;
pub use store::{AudioNote, NoteStore, StoreError};
