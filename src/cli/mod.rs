//! Command-line interface for voznote.
//!
//! `serve` runs the webhook ingress plus the digest scheduler; `process`
//! pushes a single transcription through the pipeline; `detect` exercises
//! the keyword matcher; `digest` sends the daily summary immediately.

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{ChatModel, OpenAiClient, TelegramClient};
use crate::config::Config;
use crate::digest::DigestJob;
use crate::domain::Transcription;
use crate::extractor::{Extractor, ExtractorSettings};
use crate::matcher::{similarity, KeywordMatcher};
use crate::pipeline::Processor;
use crate::store::NoteStore;
use crate::{scheduler, server};

/// voznote - voice-note capture pipeline
#[derive(Parser, Debug)]
#[command(name = "voznote")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server and digest scheduler
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process a single transcription and print the outcome
    Process {
        /// Transcription identifier
        #[arg(long)]
        id: i64,

        /// Transcription text (reads from stdin if not provided)
        #[arg(long)]
        text: Option<String>,

        /// Audio file URL to record on the audit row
        #[arg(long)]
        audio_url: Option<String>,
    },

    /// Score a word against the keyword table
    Detect {
        /// Word or phrase to test
        text: String,
    },

    /// Generate and send today's digest now
    Digest {
        /// Use the plain renderer even when AI summaries are enabled
        #[arg(long)]
        plain: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Commands::Serve { port } => serve(config, port).await,
            Commands::Process {
                id,
                text,
                audio_url,
            } => process_one(config, id, text, audio_url).await,
            Commands::Detect { text } => detect(config, &text),
            Commands::Digest { plain } => digest(config, plain).await,
        }
    }
}

fn build_store(config: &Config) -> Result<Arc<NoteStore>> {
    Ok(Arc::new(NoteStore::open(&config.db_path)?))
}

fn build_model(config: &Config, digest: bool) -> Result<Arc<dyn ChatModel>> {
    if config.model.api_key.is_empty() {
        anyhow::bail!("OPENAI_API_KEY is not set");
    }

    let name = if digest {
        config.model.digest_name.clone()
    } else {
        config.model.name.clone()
    };

    Ok(match &config.model.base_url {
        Some(base_url) => Arc::new(OpenAiClient::with_base_url(
            config.model.api_key.clone(),
            name,
            base_url.clone(),
        )),
        None => Arc::new(OpenAiClient::new(config.model.api_key.clone(), name)),
    })
}

fn build_processor(config: &Config, store: Arc<NoteStore>) -> Result<Processor> {
    let matcher = KeywordMatcher::new(config.keywords.clone(), config.threshold);
    let extractor = Extractor::new(
        build_model(config, false)?,
        ExtractorSettings {
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
        },
    );
    Ok(Processor::new(matcher, extractor, store))
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port);
    let store = build_store(&config)?;
    let processor = Arc::new(build_processor(&config, store.clone())?);

    match &config.telegram {
        Some(telegram) => {
            let model = if config.digest.use_ai {
                Some(build_model(&config, true)?)
            } else {
                None
            };
            let job = Arc::new(DigestJob::new(
                store,
                model,
                Arc::new(TelegramClient::new(
                    telegram.bot_token.clone(),
                    telegram.chat_id.clone(),
                )),
                config.digest.use_ai,
            ));
            scheduler::spawn_daily(job, config.digest.clone());
        }
        None => {
            tracing::warn!("Telegram not configured, digest scheduler disabled");
        }
    }

    server::serve(processor, port).await
}

async fn process_one(
    config: Config,
    id: i64,
    text: Option<String>,
    audio_url: Option<String>,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read transcription from stdin")?;
            buffer.trim().to_string()
        }
    };

    if text.is_empty() {
        anyhow::bail!("Transcription text is empty");
    }

    let store = build_store(&config)?;
    let processor = build_processor(&config, store)?;

    let mut transcription = Transcription::new(id, text);
    transcription.audio_url = audio_url;

    let outcome = processor.process(&transcription).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn detect(config: Config, text: &str) -> Result<()> {
    let matcher = KeywordMatcher::new(config.keywords.clone(), config.threshold);
    let detection = matcher.detect(text);

    let first = text.split_whitespace().next().unwrap_or("");
    println!("Scores for \"{}\" (threshold {}):", first, config.threshold);
    for entry in &config.keywords {
        let score = similarity(&first.to_lowercase(), &entry.word);
        let mark = if score >= config.threshold { "✓" } else { "✗" };
        println!(
            "  {} {:10} {:>3}%  ({})",
            mark,
            entry.word,
            (score * 100.0).round() as i64,
            entry.category
        );
    }

    println!();
    println!("Category:     {}", detection.category);
    println!("Confidence:   {:.2}", detection.confidence);
    println!("Cleaned text: {}", detection.cleaned_text);
    Ok(())
}

async fn digest(config: Config, plain: bool) -> Result<()> {
    let telegram = config
        .telegram
        .as_ref()
        .context("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID are not configured")?;

    let store = build_store(&config)?;
    let use_ai = config.digest.use_ai && !plain;

    // The plain digest works without a model key
    let model = if use_ai {
        Some(build_model(&config, true)?)
    } else {
        None
    };

    let job = DigestJob::new(
        store,
        model,
        Arc::new(TelegramClient::new(
            telegram.bot_token.clone(),
            telegram.chat_id.clone(),
        )),
        use_ai,
    );
    job.send_daily().await
}
