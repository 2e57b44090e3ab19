//! Configuration loading.
//!
//! Sources (highest priority first):
//! 1. Environment variables (VOZNOTE_HOME, VOZNOTE_DB, OPENAI_API_KEY,
//!    TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, CONFIDENCE_THRESHOLD)
//! 2. Config file (.voznote/config.yaml, searched upward from the current
//!    directory)
//! 3. Defaults (~/.voznote)
//!
//! Loaded once at the process entry point and passed down explicitly; the
//! collaborator clients built from it are injected, not global.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Category;
use crate::extractor::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::matcher::{default_keywords, KeywordEntry, DEFAULT_THRESHOLD};

/// Raw config file schema (matches the YAML structure).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub keywords: Vec<KeywordFileEntry>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub model: Option<ModelFileConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramFileConfig>,
    #[serde(default)]
    pub digest: Option<DigestFileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordFileEntry {
    pub word: String,
    pub category: Category,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelFileConfig {
    pub name: Option<String>,
    pub digest_name: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramFileConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DigestFileConfig {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub use_ai: Option<bool>,
}

/// Resolved model settings.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: String,
    pub name: String,
    /// Model used for the digest summary (may differ from extraction)
    pub digest_name: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Resolved Telegram settings; `None` when no chat is configured, which
/// disables the digest scheduler.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct DigestSettings {
    /// Delivery time, UTC
    pub hour: u32,
    pub minute: u32,
    pub use_ai: bool,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            hour: 20,
            minute: 0,
            use_ai: true,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub keywords: Vec<KeywordEntry>,
    pub threshold: f64,
    pub db_path: PathBuf,
    pub port: u16,
    pub model: ModelSettings,
    pub telegram: Option<TelegramSettings>,
    pub digest: DigestSettings,
    /// Path to the config file, when one was found
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load() -> Result<Self> {
        let config_file = find_config_file();
        let file = match &config_file {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        let home = voznote_home()?;

        let keywords = if file.keywords.is_empty() {
            default_keywords()
        } else {
            file.keywords
                .iter()
                .map(|k| KeywordEntry::new(k.word.clone(), k.category))
                .collect()
        };

        let threshold = std::env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(file.threshold)
            .unwrap_or(DEFAULT_THRESHOLD);

        let db_path = std::env::var("VOZNOTE_DB")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                file.database
                    .as_ref()
                    .and_then(|d| d.path.as_ref())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| home.join("voznote.db"));

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or_else(|| file.server.as_ref().and_then(|s| s.port))
            .unwrap_or(3100);

        let model_file = file.model.unwrap_or_default();
        let name = std::env::var("OPENAI_MODEL")
            .ok()
            .or(model_file.name)
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let model = ModelSettings {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            digest_name: std::env::var("OPENAI_DIGEST_MODEL")
                .ok()
                .or(model_file.digest_name)
                .unwrap_or_else(|| name.clone()),
            name,
            base_url: std::env::var("OPENAI_BASE_URL").ok().or(model_file.base_url),
            temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(model_file.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: std::env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(model_file.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let telegram_file = file.telegram.unwrap_or_default();
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .or(telegram_file.bot_token);
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .or(telegram_file.chat_id);
        let telegram = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings { bot_token, chat_id }),
            _ => None,
        };

        let digest_file = file.digest.unwrap_or_default();
        let digest_defaults = DigestSettings::default();
        let digest = DigestSettings {
            hour: digest_file.hour.unwrap_or(digest_defaults.hour).min(23),
            minute: digest_file.minute.unwrap_or(digest_defaults.minute).min(59),
            use_ai: digest_file.use_ai.unwrap_or(digest_defaults.use_ai),
        };

        Ok(Self {
            keywords,
            threshold,
            db_path,
            port,
            model,
            telegram,
            digest,
            config_file,
        })
    }
}

/// The voznote home directory (~/.voznote or $VOZNOTE_HOME).
pub fn voznote_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("VOZNOTE_HOME") {
        return Ok(PathBuf::from(home));
    }

    Ok(dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".voznote"))
}

/// Find the config file by searching the current directory and parents.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".voznote").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
