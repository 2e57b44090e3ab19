//! Daily digest: gather today's records, render a summary, deliver it.
//!
//! Two renderers: a deterministic plain-text one, and an optional
//! model-written one that falls back to the plain renderer on any model
//! error. Delivery goes through the Telegram client's chunked send.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::adapters::{ChatModel, ChatRequest, TelegramClient};
use crate::store::{ActivityRow, CommitmentRow, IdeaRow, NoteStore, TaskRow};

const DIGEST_SYSTEM: &str = "You are a friendly, motivating personal assistant \
that helps summarize the day.";

/// Sampling temperature for the digest (conversational, not extraction).
const DIGEST_TEMPERATURE: f32 = 0.7;
const DIGEST_MAX_TOKENS: u32 = 1500;

/// Everything captured on one day.
#[derive(Debug, Default)]
pub struct DigestData {
    pub activities: Vec<ActivityRow>,
    pub tasks: Vec<TaskRow>,
    pub commitments: Vec<CommitmentRow>,
    pub ideas: Vec<IdeaRow>,
}

impl DigestData {
    pub fn total(&self) -> usize {
        self.activities.len() + self.tasks.len() + self.commitments.len() + self.ideas.len()
    }
}

/// Builds and delivers the daily digest.
///
/// `model` is optional: without one (or with `use_ai` off) the plain
/// renderer is used.
pub struct DigestJob {
    store: Arc<NoteStore>,
    model: Option<Arc<dyn ChatModel>>,
    telegram: Arc<TelegramClient>,
    use_ai: bool,
}

impl DigestJob {
    pub fn new(
        store: Arc<NoteStore>,
        model: Option<Arc<dyn ChatModel>>,
        telegram: Arc<TelegramClient>,
        use_ai: bool,
    ) -> Self {
        Self {
            store,
            model,
            telegram,
            use_ai,
        }
    }

    /// Query all records created on `day` (UTC).
    pub fn gather(&self, day: NaiveDate) -> Result<DigestData> {
        let data = DigestData {
            activities: self.store.activities_on(day)?,
            tasks: self.store.open_tasks_on(day)?,
            commitments: self.store.open_commitments_on(day)?,
            ideas: self.store.ideas_on(day)?,
        };

        info!(
            activities = data.activities.len(),
            tasks = data.tasks.len(),
            commitments = data.commitments.len(),
            ideas = data.ideas.len(),
            "Digest data gathered"
        );

        Ok(data)
    }

    /// Generate and send today's digest.
    pub async fn send_daily(&self) -> Result<()> {
        let today = Utc::now().date_naive();
        let data = self.gather(today)?;

        if data.total() == 0 {
            info!("Nothing captured today, sending tip instead of digest");
            self.telegram
                .send_message(
                    "*Daily Summary*\n\n\
                     No activities, tasks, commitments or ideas were captured today.\n\n\
                     Tip: start your voice notes with a trigger word \
                     (teo, juan, ide, compa) so they get processed automatically.",
                )
                .await
                .context("Failed to send empty-day tip")?;
            return Ok(());
        }

        let summary = match (&self.model, self.use_ai) {
            (Some(model), true) => match self.render_ai(model.as_ref(), &data).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(error = %e, "AI digest failed, falling back to plain summary");
                    render_plain(&data, today)
                }
            },
            _ => render_plain(&data, today),
        };

        self.telegram
            .send_long_message(&summary)
            .await
            .context("Failed to deliver digest")?;

        info!("Daily digest delivered");
        Ok(())
    }

    /// Model-written conversational summary.
    async fn render_ai(&self, model: &dyn ChatModel, data: &DigestData) -> Result<String> {
        let prompt = format!(
            "You generate daily summaries for a personal assistant.\n\n\
             Based on the following data from today, write a conversational \
             executive summary addressed directly to the user:\n\n\
             **Activity logs (what they did today):**\n{}\n\n\
             **Open tasks (to do):**\n{}\n\n\
             **Commitments:**\n{}\n\n\
             **Ideas:**\n{}\n\n\
             Format: 1) personal greeting, 2) summary of activities done \
             (emphasize accomplishments), 3) most important open tasks, \
             4) active commitments, 5) captured ideas, 6) motivating close.\n\
             Be concise but friendly. At most 600 words. If a section is \
             empty, mention it briefly without being negative.",
            describe_activities(&data.activities),
            describe_tasks(&data.tasks),
            describe_commitments(&data.commitments),
            describe_ideas(&data.ideas),
        );

        let request = ChatRequest {
            system: DIGEST_SYSTEM.to_string(),
            user: prompt,
            temperature: DIGEST_TEMPERATURE,
            max_tokens: DIGEST_MAX_TOKENS,
            json_only: false,
        };

        model.complete(&request).await
    }
}

/// Deterministic sectioned summary (the AI fallback and the `--plain` path).
pub fn render_plain(data: &DigestData, day: NaiveDate) -> String {
    let mut out = format!("*Daily Summary — {}*\n\n", day.format("%A, %d %B %Y"));

    if data.activities.is_empty() {
        out.push_str("No activities logged today.\n\n");
    } else {
        out.push_str(&format!("*DONE TODAY* ({})\n", data.activities.len()));
        for (i, activity) in data.activities.iter().enumerate() {
            let duration = activity
                .duration_hours
                .map(|h| format!(" ({}h)", h))
                .unwrap_or_default();
            let project = activity
                .project
                .as_deref()
                .map(|p| format!(" - {}", p))
                .unwrap_or_default();
            let people = if activity.people.is_empty() {
                String::new()
            } else {
                format!(" with {}", activity.people.join(", "))
            };
            out.push_str(&format!(
                "{}. {}{}{}{}\n",
                i + 1,
                activity.description,
                duration,
                project,
                people
            ));
        }
        out.push('\n');
    }

    if data.tasks.is_empty() {
        out.push_str("No open tasks.\n\n");
    } else {
        out.push_str(&format!("*OPEN TASKS* ({})\n", data.tasks.len()));
        for (i, task) in data.tasks.iter().enumerate() {
            let due = task
                .due_date
                .map(|d| format!(" - due {}", d))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}. [{}] {}{}\n",
                i + 1,
                task.priority.as_str(),
                task.title,
                due
            ));
            if let Some(description) = &task.description {
                out.push_str(&format!("   _{}_\n", description));
            }
        }
        out.push('\n');
    }

    if !data.commitments.is_empty() {
        out.push_str(&format!("*COMMITMENTS* ({})\n", data.commitments.len()));
        for (i, commitment) in data.commitments.iter().enumerate() {
            let who = if commitment.self_committed {
                "(I committed)".to_string()
            } else {
                format!("({} committed)", commitment.counterparty)
            };
            let deadline = commitment
                .deadline
                .map(|d| format!(" - by {}", d))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}. {} {}{}\n",
                i + 1,
                commitment.title,
                who,
                deadline
            ));
        }
        out.push('\n');
    }

    if !data.ideas.is_empty() {
        out.push_str(&format!("*IDEAS* ({})\n", data.ideas.len()));
        for (i, idea) in data.ideas.iter().enumerate() {
            let category = idea
                .category
                .as_deref()
                .map(|c| format!(" [{}]", c))
                .unwrap_or_default();
            out.push_str(&format!("{}. {}{}\n", i + 1, idea.title, category));
            if let Some(description) = &idea.description {
                out.push_str(&format!("   _{}_\n", description));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "_Generated automatically at {} UTC_",
        Utc::now().format("%H:%M")
    ));

    out
}

fn describe_activities(activities: &[ActivityRow]) -> String {
    if activities.is_empty() {
        return "(none)".to_string();
    }
    activities
        .iter()
        .map(|a| {
            format!(
                "- {} [{}]{}",
                a.description,
                a.kind.as_str(),
                a.duration_hours
                    .map(|h| format!(" {}h", h))
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_tasks(tasks: &[TaskRow]) -> String {
    if tasks.is_empty() {
        return "(none)".to_string();
    }
    tasks
        .iter()
        .map(|t| {
            format!(
                "- {} [{}]{}",
                t.title,
                t.priority.as_str(),
                t.due_date.map(|d| format!(" due {}", d)).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_commitments(commitments: &[CommitmentRow]) -> String {
    if commitments.is_empty() {
        return "(none)".to_string();
    }
    commitments
        .iter()
        .map(|c| {
            format!(
                "- {} (with {}{})",
                c.title,
                c.counterparty,
                c.deadline.map(|d| format!(", by {}", d)).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_ideas(ideas: &[IdeaRow]) -> String {
    if ideas.is_empty() {
        return "(none)".to_string();
    }
    ideas
        .iter()
        .map(|i| format!("- {}", i.title))
        .collect::<Vec<_>>()
        .join("\n")
}
