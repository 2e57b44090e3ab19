//! End-to-end pipeline tests with a scripted model and an in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use voznote::adapters::{ChatModel, ChatRequest};
use voznote::domain::{Category, Disposition, Priority, Transcription};
use voznote::extractor::{Extractor, ExtractorSettings};
use voznote::matcher::KeywordMatcher;
use voznote::pipeline::Processor;
use voznote::store::NoteStore;

/// Model that always returns the same response and counts invocations.
struct ScriptedModel {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(s) => Ok(s.clone()),
            Err(e) => anyhow::bail!("{}", e),
        }
    }
}

fn processor(model: Arc<ScriptedModel>, store: Arc<NoteStore>) -> Processor {
    Processor::new(
        KeywordMatcher::default(),
        Extractor::new(model, ExtractorSettings::default()),
        store,
    )
}

#[tokio::test]
async fn test_task_flow_completes_and_round_trips() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning(
        r#"{
            "title": "Comprar leche",
            "description": "De camino a casa",
            "due_date": "2026-08-25",
            "priority": "HIGH"
        }"#,
    );
    let processor = processor(model.clone(), store.clone());

    let transcription =
        Transcription::new(100, "Teo comprar leche mañana").with_audio_url("https://x/100.m4a");
    let outcome = processor.process(&transcription).await;

    assert!(outcome.success, "outcome: {:?}", outcome);
    assert_eq!(outcome.disposition, Disposition::Completed);
    assert_eq!(outcome.category, Category::Task);
    let counts = outcome.created.unwrap();
    assert_eq!(counts.tasks, 1);
    assert_eq!(counts.total(), 1);
    assert_eq!(model.call_count(), 1);

    // Round trip: fields survive persistence (dates at day granularity)
    let note_id = outcome.note_id.unwrap();
    let task = store.task_for_note(note_id).unwrap().unwrap();
    assert_eq!(task.title, "Comprar leche");
    assert_eq!(task.description.as_deref(), Some("De camino a casa"));
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 8, 25));
    assert_eq!(task.priority, Priority::High);

    let note = store.get_note(100).unwrap().unwrap();
    assert!(note.processed);
    assert_eq!(note.detected_category, Category::Task);
    assert_eq!(note.detection_confidence, 1.0);
    assert_eq!(note.audio_url.as_deref(), Some("https://x/100.m4a"));
}

#[tokio::test]
async fn test_second_invocation_is_already_processed() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning(r#"{"title": "Comprar leche", "priority": "MEDIUM"}"#);
    let processor = processor(model.clone(), store.clone());

    let transcription = Transcription::new(200, "teo comprar leche");

    let first = processor.process(&transcription).await;
    assert_eq!(first.disposition, Disposition::Completed);

    let second = processor.process(&transcription).await;
    assert_eq!(second.disposition, Disposition::AlreadyProcessed);
    assert!(!second.success);

    // No duplicate rows, no second model call
    assert_eq!(store.note_count().unwrap(), 1);
    assert_eq!(store.entity_count().unwrap(), 1);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_unclassified_is_stored_and_processed() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning("{}");
    let processor = processor(model.clone(), store.clone());

    let transcription = Transcription::new(300, "hola qué tal todo bien");
    let outcome = processor.process(&transcription).await;

    assert!(outcome.success);
    assert_eq!(outcome.disposition, Disposition::StoredUnclassified);
    assert_eq!(outcome.category, Category::Unclassified);
    assert!(outcome.created.is_none());

    // Audit row stored and flagged processed; extractor never invoked
    let note = store.get_note(300).unwrap().unwrap();
    assert!(note.processed);
    assert_eq!(note.detection_confidence, 0.0);
    assert_eq!(store.entity_count().unwrap(), 0);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_typo_below_threshold_goes_unclassified() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning("{}");
    let processor = processor(model.clone(), store.clone());

    // "tayo" vs "teo": similarity 0.5, below the 0.6 threshold
    let outcome = processor
        .process(&Transcription::new(310, "tayo llamar al cliente"))
        .await;

    assert_eq!(outcome.disposition, Disposition::StoredUnclassified);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_model_failure_reports_extraction_failed() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::failing("connection refused");
    let processor = processor(model.clone(), store.clone());

    let outcome = processor
        .process(&Transcription::new(400, "teo preparar informe"))
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.disposition, Disposition::ExtractionFailed);
    assert_eq!(outcome.category, Category::Task);
    assert!(outcome.error.unwrap().contains("connection refused"));

    // Audit row exists but stays unprocessed; no entity row
    let note = store.get_note(400).unwrap().unwrap();
    assert!(!note.processed);
    assert_eq!(store.entity_count().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_model_output_reports_extraction_failed() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning("I'm sorry, I can't produce JSON right now");
    let processor = processor(model.clone(), store.clone());

    let outcome = processor
        .process(&Transcription::new(410, "ide una app de recetas"))
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.disposition, Disposition::ExtractionFailed);
    assert_eq!(outcome.category, Category::Idea);
}

#[tokio::test]
async fn test_idea_missing_title_is_invalid_extraction() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    // Valid JSON, but no title: validator must reject, no idea row created
    let model = ScriptedModel::returning(r#"{"description": "una app de recetas"}"#);
    let processor = processor(model.clone(), store.clone());

    let outcome = processor
        .process(&Transcription::new(500, "ide una app de recetas"))
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.disposition, Disposition::InvalidExtraction);
    assert_eq!(outcome.category, Category::Idea);

    let note = store.get_note(500).unwrap().unwrap();
    assert!(!note.processed);
    assert!(store.idea_for_note(note.id).unwrap().is_none());
}

#[tokio::test]
async fn test_commitment_flow() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning(
        r#"{
            "title": "Enviar la propuesta",
            "counterparty": "Marta",
            "deadline": "2026-08-28",
            "self_committed": true
        }"#,
    );
    let processor = processor(model.clone(), store.clone());

    let outcome = processor
        .process(&Transcription::new(600, "compa enviar la propuesta a Marta el viernes"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.category, Category::Commitment);
    assert_eq!(outcome.created.unwrap().commitments, 1);

    let row = store
        .commitment_for_note(outcome.note_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(row.counterparty, "Marta");
    assert_eq!(row.deadline, NaiveDate::from_ymd_opt(2026, 8, 28));
    assert!(row.self_committed);
}

#[tokio::test]
async fn test_activity_flow_with_people() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let model = ScriptedModel::returning(
        r#"{
            "description": "Reunión de planificación con el equipo",
            "duration_hours": 1.5,
            "project": "voznote",
            "people": ["Ana", "Luis"],
            "category": "WORK"
        }"#,
    );
    let processor = processor(model.clone(), store.clone());

    let outcome = processor
        .process(&Transcription::new(700, "juan reunión de planificación hora y media"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.created.unwrap().activity_logs, 1);

    let row = store
        .activity_for_note(outcome.note_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(row.people, vec!["Ana", "Luis"]);
    assert_eq!(row.duration_hours, Some(1.5));
    assert_eq!(row.project.as_deref(), Some("voznote"));
}

#[tokio::test]
async fn test_on_disk_store_survives_reopen() {
    let temp = tempfile::TempDir::new().unwrap();
    let db_path = temp.path().join("voznote.db");

    {
        let store = Arc::new(NoteStore::open(&db_path).unwrap());
        let model = ScriptedModel::returning(r#"{"title": "Persistida", "priority": "LOW"}"#);
        let outcome = processor(model, store)
            .process(&Transcription::new(800, "teo tarea persistida"))
            .await;
        assert!(outcome.success);
    }

    // Reopen: idempotency still holds across processes
    let store = Arc::new(NoteStore::open(&db_path).unwrap());
    assert!(store.is_processed(800).unwrap());

    let model = ScriptedModel::returning(r#"{"title": "Persistida", "priority": "LOW"}"#);
    let outcome = processor(model.clone(), store.clone())
        .process(&Transcription::new(800, "teo tarea persistida"))
        .await;
    assert_eq!(outcome.disposition, Disposition::AlreadyProcessed);
    assert_eq!(store.note_count().unwrap(), 1);
    assert_eq!(model.call_count(), 0);
}
