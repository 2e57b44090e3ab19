//! Thin HTTP ingress.
//!
//! Two routes: `GET /health` and `POST /webhook`. The webhook validates the
//! payload shape, answers 202 immediately, and runs the pipeline in a
//! background task; the pipeline reports its own outcome through logs and
//! the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::domain::Transcription;
use crate::pipeline::Processor;

#[derive(Clone)]
struct AppState {
    processor: Arc<Processor>,
}

/// Build the ingress router.
pub fn build_router(processor: Arc<Processor>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(AppState { processor })
}

/// Bind and serve until the process is stopped.
pub async fn serve(processor: Arc<Processor>, port: u16) -> Result<()> {
    let app = build_router(processor);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("voznote listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "voznote",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<Transcription>,
) -> (StatusCode, Json<Value>) {
    if payload.id <= 0 || payload.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "transcription_id must be positive and text non-empty",
            })),
        );
    }

    info!(transcription_id = payload.id, "Webhook received");
    let transcription_id = payload.id;

    // Answer 202 now, process in the background
    tokio::spawn(async move {
        let outcome = state.processor.process(&payload).await;
        if !outcome.success {
            error!(
                transcription_id,
                disposition = %outcome.disposition,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Processing failed"
            );
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": "processing started",
            "transcription_id": transcription_id,
        })),
    )
}
