//! Telegram Bot API client for outbound digests and notifications.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Telegram caps messages at 4096 chars; stay under with headroom for the
/// chunk prefix.
const MAX_MESSAGE_LENGTH: usize = 4000;

/// Pause between chunks to avoid rate limiting.
const INTER_CHUNK_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the Telegram client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Telegram Bot API client.
pub struct TelegramClient {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

/// Response envelope from the Bot API.
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

impl TelegramClient {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: TelegramConfig) -> Self {
        Self::new(config.bot_token, config.chat_id)
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Send a single text message, returning the Telegram message id.
    pub async fn send_message(&self, text: &str) -> Result<i64> {
        let url = self.api_url("sendMessage");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .context("Failed to send Telegram message")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        if !result.ok {
            anyhow::bail!(
                "Telegram API error: {}",
                result.description.unwrap_or_default()
            );
        }

        Ok(result.result.map(|r| r.message_id).unwrap_or(0))
    }

    /// Send a message of any length, chunking on line boundaries when it
    /// exceeds the Telegram limit. Chunks carry an `(i/n)` prefix and are
    /// sent sequentially with a short delay between them.
    pub async fn send_long_message(&self, text: &str) -> Result<()> {
        if text.len() <= MAX_MESSAGE_LENGTH {
            self.send_message(text).await?;
            return Ok(());
        }

        let chunks = chunk_lines(text, MAX_MESSAGE_LENGTH);
        let total = chunks.len();
        debug!(total, "Splitting long Telegram message");

        for (i, chunk) in chunks.iter().enumerate() {
            let prefixed = format!("*({}/{})*\n\n{}", i + 1, total, chunk);
            self.send_message(&prefixed).await?;

            if i + 1 < total {
                tokio::time::sleep(INTER_CHUNK_DELAY).await;
            }
        }

        Ok(())
    }
}

/// Split `text` into chunks of at most `max_len` bytes, breaking on line
/// boundaries. A single line longer than `max_len` becomes its own chunk.
fn chunk_lines(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        if !current.is_empty() && current.len() + line.len() + 1 > max_len {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TelegramClient::new("TOKEN".to_string(), "123".to_string());
        assert_eq!(
            client.api_url("sendMessage"),
            "https://api.telegram.org/botTOKEN/sendMessage"
        );
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_lines("hola\nmundo", 100);
        assert_eq!(chunks, vec!["hola\nmundo"]);
    }

    #[test]
    fn test_chunks_break_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let chunks = chunk_lines(text, 10);

        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc\ndddd"]);
        for chunk in &chunks {
            assert!(chunk.len() <= 10);
        }
    }

    #[test]
    fn test_oversized_line_is_own_chunk() {
        let long_line = "x".repeat(50);
        let text = format!("short\n{}\ntail", long_line);
        let chunks = chunk_lines(&text, 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], long_line);
    }

    #[test]
    fn test_no_content_lost() {
        let text = (0..200)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk_lines(&text, 300);

        assert_eq!(chunks.join("\n"), text);
    }
}
