//! Adapter interfaces for external systems.
//!
//! The model client and the messaging client are constructed at the process
//! entry point and injected into the pipeline and digest job, so tests can
//! substitute fakes.

pub mod openai;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

pub use openai::OpenAiClient;
pub use telegram::{TelegramClient, TelegramConfig};

/// One chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System instruction
    pub system: String,

    /// User prompt
    pub user: String,

    /// Sampling temperature (low for deterministic extraction)
    pub temperature: f32,

    /// Response size ceiling
    pub max_tokens: u32,

    /// Ask the backend to emit JSON only
    pub json_only: bool,
}

/// Trait for language-model completion backends.
///
/// Failure modes a caller must expect: transport error, API error status,
/// empty content. No retry here; retry policy belongs to the transport.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Run one completion and return the raw response text
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
