//! The `NoteStore` gateway over rusqlite.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::domain::{
    ActivityKind, Category, Detection, EntityCounts, Extraction, Priority, Transcription,
};

use super::schema::SCHEMA_SQL;

/// Store failures the orchestrator can act on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The transcription id already has an audit row. Not a fault: under
    /// concurrent delivery the UNIQUE constraint fires instead of the
    /// pre-check, and the caller treats this as "already processed".
    #[error("transcription {0} already recorded")]
    Duplicate(i64),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Audit record: one row per transcription, created before extraction.
///
/// `processed` is the sole mutation, set true only after a terminal outcome.
#[derive(Debug, Clone)]
pub struct AudioNote {
    pub id: i64,
    pub transcription_id: i64,
    pub transcript: String,
    pub audio_url: Option<String>,
    pub detected_category: Category,
    pub detection_confidence: f64,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: i64,
    pub note_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub id: i64,
    pub note_id: i64,
    pub description: String,
    pub duration_hours: Option<f64>,
    pub project: Option<String>,
    pub people: Vec<String>,
    pub kind: ActivityKind,
    pub activity_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CommitmentRow {
    pub id: i64,
    pub note_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub counterparty: String,
    pub deadline: Option<NaiveDate>,
    pub self_committed: bool,
    pub fulfilled: bool,
}

#[derive(Debug, Clone)]
pub struct IdeaRow {
    pub id: i64,
    pub note_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub implemented: bool,
}

/// SQLite-backed persistence gateway.
pub struct NoteStore {
    conn: Mutex<Connection>,
}

impl NoteStore {
    /// Open or create the store at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        Self::init(&conn)?;

        info!(path = %db_path.display(), "NoteStore opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Idempotent persistence gateway
    // ---------------------------------------------------------------

    /// Existence check on the audit row for a transcription id.
    pub fn is_processed(&self, transcription_id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let exists: Option<i64> = conn
            .prepare_cached("SELECT id FROM audio_notes WHERE transcription_id = ?1")?
            .query_row(params![transcription_id], |row| row.get(0))
            .optional()?;
        Ok(exists.is_some())
    }

    /// Insert the audit row with `processed = false`.
    ///
    /// A UNIQUE violation on the transcription id maps to
    /// [`StoreError::Duplicate`].
    pub fn create_note(
        &self,
        transcription: &Transcription,
        detection: &Detection,
    ) -> Result<AudioNote, StoreError> {
        let created_at = Utc::now();
        let conn = self.conn.lock();

        let id = conn
            .prepare_cached(
                "INSERT INTO audio_notes
                 (transcription_id, transcript, audio_url, detected_category,
                  detection_confidence, processed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            )?
            .insert(params![
                transcription.id,
                transcription.text,
                transcription.audio_url,
                detection.category.as_str(),
                detection.confidence,
                created_at.to_rfc3339(),
            ])
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate(transcription.id)
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

        debug!(note_id = id, transcription_id = transcription.id, "Audit record created");

        Ok(AudioNote {
            id,
            transcription_id: transcription.id,
            transcript: transcription.text.clone(),
            audio_url: transcription.audio_url.clone(),
            detected_category: detection.category,
            detection_confidence: detection.confidence,
            processed: false,
            created_at,
        })
    }

    /// Fetch the audit row for a transcription id.
    pub fn get_note(&self, transcription_id: i64) -> Result<Option<AudioNote>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT id, transcription_id, transcript, audio_url, detected_category,
                        detection_confidence, processed, created_at
                 FROM audio_notes WHERE transcription_id = ?1",
            )?
            .query_row(params![transcription_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .optional()?;

        row.map(
            |(id, tid, transcript, audio_url, category, confidence, processed, created_at)| {
                Ok(AudioNote {
                    id,
                    transcription_id: tid,
                    transcript,
                    audio_url,
                    detected_category: Category::from_str_lossy(&category),
                    detection_confidence: confidence,
                    processed,
                    created_at: parse_timestamp(&created_at)?,
                })
            },
        )
        .transpose()
    }

    /// Set the audit row's processed flag. Used for terminal states that
    /// create no entity (unclassified input).
    pub fn mark_processed(&self, note_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE audio_notes SET processed = 1 WHERE id = ?1",
            params![note_id],
        )?;
        Ok(())
    }

    /// Insert exactly one typed entity row for the record's category and mark
    /// the owning audit row processed, in one transaction. Returns counts
    /// with exactly one non-zero entry. On failure the transaction rolls back
    /// and the processed flag stays false, so a later re-run keyed by the
    /// same transcription can retry.
    pub fn persist_extraction(
        &self,
        note_id: i64,
        extraction: &Extraction,
    ) -> Result<EntityCounts, StoreError> {
        let created_at = Utc::now().to_rfc3339();
        let mut counts = EntityCounts::default();

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        match extraction {
            Extraction::Task(task) => {
                tx.execute(
                    "INSERT INTO tasks (note_id, title, description, due_date, priority, completed, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                    params![
                        note_id,
                        task.title,
                        task.description,
                        task.due_date.map(|d| d.to_string()),
                        task.priority.as_str(),
                        created_at,
                    ],
                )?;
                counts.tasks = 1;
            }
            Extraction::ActivityLog(activity) => {
                let people = serde_json::to_string(&activity.people)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                tx.execute(
                    "INSERT INTO activity_logs
                     (note_id, description, duration_hours, project, people, kind, activity_date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        note_id,
                        activity.description,
                        activity.duration_hours,
                        activity.project,
                        people,
                        activity.kind.as_str(),
                        Utc::now().date_naive().to_string(),
                        created_at,
                    ],
                )?;
                counts.activity_logs = 1;
            }
            Extraction::Commitment(commitment) => {
                tx.execute(
                    "INSERT INTO commitments
                     (note_id, title, description, counterparty, deadline, self_committed, fulfilled, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                    params![
                        note_id,
                        commitment.title,
                        commitment.description,
                        commitment.counterparty,
                        commitment.deadline.map(|d| d.to_string()),
                        commitment.self_committed,
                        created_at,
                    ],
                )?;
                counts.commitments = 1;
            }
            Extraction::Idea(idea) => {
                tx.execute(
                    "INSERT INTO ideas (note_id, title, description, category, implemented, created_at)
                     VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                    params![note_id, idea.title, idea.description, idea.category, created_at],
                )?;
                counts.ideas = 1;
            }
        }

        tx.execute(
            "UPDATE audio_notes SET processed = 1 WHERE id = ?1",
            params![note_id],
        )?;
        tx.commit()?;

        debug!(note_id, category = %extraction.category(), "Extraction persisted");
        Ok(counts)
    }

    // ---------------------------------------------------------------
    // Entity fetchers
    // ---------------------------------------------------------------

    pub fn task_for_note(&self, note_id: i64) -> Result<Option<TaskRow>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT id, note_id, title, description, due_date, priority, completed
                 FROM tasks WHERE note_id = ?1",
            )?
            .query_row(params![note_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                ))
            })
            .optional()?;

        row.map(|(id, note_id, title, description, due_date, priority, completed)| {
            Ok(TaskRow {
                id,
                note_id,
                title,
                description,
                due_date: due_date.as_deref().map(parse_day).transpose()?,
                priority: Priority::from_str_lossy(&priority),
                completed,
            })
        })
        .transpose()
    }

    pub fn activity_for_note(&self, note_id: i64) -> Result<Option<ActivityRow>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT id, note_id, description, duration_hours, project, people, kind, activity_date
                 FROM activity_logs WHERE note_id = ?1",
            )?
            .query_row(params![note_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .optional()?;

        row.map(
            |(id, note_id, description, duration_hours, project, people, kind, activity_date)| {
                Ok(ActivityRow {
                    id,
                    note_id,
                    description,
                    duration_hours,
                    project,
                    people: serde_json::from_str(&people)
                        .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                    kind: ActivityKind::from_str_lossy(&kind),
                    activity_date: parse_day(&activity_date)?,
                })
            },
        )
        .transpose()
    }

    pub fn commitment_for_note(&self, note_id: i64) -> Result<Option<CommitmentRow>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT id, note_id, title, description, counterparty, deadline, self_committed, fulfilled
                 FROM commitments WHERE note_id = ?1",
            )?
            .query_row(params![note_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, bool>(7)?,
                ))
            })
            .optional()?;

        row.map(
            |(id, note_id, title, description, counterparty, deadline, self_committed, fulfilled)| {
                Ok(CommitmentRow {
                    id,
                    note_id,
                    title,
                    description,
                    counterparty,
                    deadline: deadline.as_deref().map(parse_day).transpose()?,
                    self_committed,
                    fulfilled,
                })
            },
        )
        .transpose()
    }

    pub fn idea_for_note(&self, note_id: i64) -> Result<Option<IdeaRow>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT id, note_id, title, description, category, implemented
                 FROM ideas WHERE note_id = ?1",
            )?
            .query_row(params![note_id], |row| {
                Ok(IdeaRow {
                    id: row.get(0)?,
                    note_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    category: row.get(4)?,
                    implemented: row.get(5)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Counters (used by tests and the stats log line)
    // ---------------------------------------------------------------

    pub fn note_count(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM audio_notes", [], |row| row.get(0))?)
    }

    pub fn entity_count(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        Ok(conn.query_row(
            "SELECT (SELECT COUNT(*) FROM tasks)
                  + (SELECT COUNT(*) FROM activity_logs)
                  + (SELECT COUNT(*) FROM commitments)
                  + (SELECT COUNT(*) FROM ideas)",
            [],
            |row| row.get(0),
        )?)
    }

    // ---------------------------------------------------------------
    // Daily digest queries
    // ---------------------------------------------------------------

    /// Activity logs created on `day` (UTC), oldest first.
    pub fn activities_on(&self, day: NaiveDate) -> Result<Vec<ActivityRow>, StoreError> {
        let (start, end) = day_bounds(day);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, note_id, description, duration_hours, project, people, kind, activity_date
             FROM activity_logs
             WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, note_id, description, duration_hours, project, people, kind, activity_date) =
                row?;
            out.push(ActivityRow {
                id,
                note_id,
                description,
                duration_hours,
                project,
                people: serde_json::from_str(&people)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                kind: ActivityKind::from_str_lossy(&kind),
                activity_date: parse_day(&activity_date)?,
            });
        }
        Ok(out)
    }

    /// Open tasks created on `day` (UTC), highest priority first.
    pub fn open_tasks_on(&self, day: NaiveDate) -> Result<Vec<TaskRow>, StoreError> {
        let (start, end) = day_bounds(day);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, note_id, title, description, due_date, priority, completed
             FROM tasks
             WHERE created_at >= ?1 AND created_at < ?2 AND completed = 0
             ORDER BY CASE priority
                 WHEN 'URGENT' THEN 0
                 WHEN 'HIGH' THEN 1
                 WHEN 'MEDIUM' THEN 2
                 ELSE 3 END",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, bool>(6)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, note_id, title, description, due_date, priority, completed) = row?;
            out.push(TaskRow {
                id,
                note_id,
                title,
                description,
                due_date: due_date.as_deref().map(parse_day).transpose()?,
                priority: Priority::from_str_lossy(&priority),
                completed,
            });
        }
        Ok(out)
    }

    /// Unfulfilled commitments created on `day` (UTC), earliest deadline first.
    pub fn open_commitments_on(&self, day: NaiveDate) -> Result<Vec<CommitmentRow>, StoreError> {
        let (start, end) = day_bounds(day);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, note_id, title, description, counterparty, deadline, self_committed, fulfilled
             FROM commitments
             WHERE created_at >= ?1 AND created_at < ?2 AND fulfilled = 0
             ORDER BY deadline IS NULL, deadline ASC",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, bool>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, note_id, title, description, counterparty, deadline, self_committed, fulfilled) =
                row?;
            out.push(CommitmentRow {
                id,
                note_id,
                title,
                description,
                counterparty,
                deadline: deadline.as_deref().map(parse_day).transpose()?,
                self_committed,
                fulfilled,
            });
        }
        Ok(out)
    }

    /// Ideas captured on `day` (UTC), oldest first.
    pub fn ideas_on(&self, day: NaiveDate) -> Result<Vec<IdeaRow>, StoreError> {
        let (start, end) = day_bounds(day);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, note_id, title, description, category, implemented
             FROM ideas
             WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok(IdeaRow {
                id: row.get(0)?,
                note_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                category: row.get(4)?,
                implemented: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
impl NoteStore {
    /// Direct connection access for tests that need to alter the schema.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        f(&self.conn.lock())
    }
}

/// Only UNIQUE and PRIMARY KEY violations count as duplicates; other
/// constraint failures (NOT NULL, FK) must surface as plain store errors.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}

fn parse_day(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| StoreError::Corrupt(format!("bad date '{}': {}", s, e)))
}

/// RFC 3339 bounds for a UTC day; created_at timestamps sort
/// lexicographically within the same offset.
fn day_bounds(day: NaiveDate) -> (String, String) {
    let next = day.succ_opt().unwrap_or(day);
    (format!("{}T00:00:00", day), format!("{}T00:00:00", next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitmentDraft, Detection, IdeaDraft, TaskDraft};

    fn store() -> NoteStore {
        NoteStore::open_in_memory().unwrap()
    }

    fn task_detection() -> Detection {
        Detection {
            category: Category::Task,
            cleaned_text: "comprar leche mañana".to_string(),
            confidence: 1.0,
            matched_keyword: Some("teo".to_string()),
        }
    }

    #[test]
    fn test_create_note_and_existence_check() {
        let store = store();
        let t = Transcription::new(1, "teo comprar leche mañana");

        assert!(!store.is_processed(1).unwrap());

        let note = store.create_note(&t, &task_detection()).unwrap();
        assert!(!note.processed);
        assert_eq!(note.transcription_id, 1);

        assert!(store.is_processed(1).unwrap());
    }

    #[test]
    fn test_duplicate_insert_maps_to_duplicate_error() {
        let store = store();
        let t = Transcription::new(5, "teo algo");

        store.create_note(&t, &task_detection()).unwrap();
        let err = store.create_note(&t, &task_detection()).unwrap_err();

        match err {
            StoreError::Duplicate(id) => assert_eq!(id, 5),
            other => panic!("Expected Duplicate, got {:?}", other),
        }
        assert_eq!(store.note_count().unwrap(), 1);
    }

    #[test]
    fn test_only_unique_violations_count_as_duplicates() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute(
            "INSERT INTO audio_notes
             (transcription_id, transcript, detected_category, detection_confidence, processed, created_at)
             VALUES (1, 'teo algo', 'task', 1.0, 0, '2026-08-24T12:00:00+00:00')",
            [],
        )
        .unwrap();

        let unique = conn
            .execute(
                "INSERT INTO audio_notes
                 (transcription_id, transcript, detected_category, detection_confidence, processed, created_at)
                 VALUES (1, 'teo algo', 'task', 1.0, 0, '2026-08-24T12:00:01+00:00')",
                [],
            )
            .unwrap_err();
        assert!(is_unique_violation(&unique));

        let not_null = conn
            .execute(
                "INSERT INTO audio_notes
                 (transcription_id, transcript, detected_category, detection_confidence, processed, created_at)
                 VALUES (2, NULL, 'task', 1.0, 0, '2026-08-24T12:00:02+00:00')",
                [],
            )
            .unwrap_err();
        assert!(!is_unique_violation(&not_null));
    }

    #[test]
    fn test_task_round_trip() {
        let store = store();
        let t = Transcription::new(2, "teo preparar informe").with_audio_url("https://x/2.m4a");
        let note = store.create_note(&t, &task_detection()).unwrap();

        let draft = TaskDraft {
            title: "Preparar informe".to_string(),
            description: Some("Informe trimestral para el directorio".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 28),
            priority: Priority::High,
        };
        let counts = store
            .persist_extraction(note.id, &Extraction::Task(draft.clone()))
            .unwrap();

        assert_eq!(counts.tasks, 1);
        assert_eq!(counts.total(), 1);

        let row = store.task_for_note(note.id).unwrap().unwrap();
        assert_eq!(row.title, draft.title);
        assert_eq!(row.description, draft.description);
        assert_eq!(row.due_date, draft.due_date);
        assert_eq!(row.priority, Priority::High);
        assert!(!row.completed);

        // Persisting marked the audit record processed
        let note = store.get_note(2).unwrap().unwrap();
        assert!(note.processed);
    }

    #[test]
    fn test_persist_commitment() {
        let store = store();
        let t = Transcription::new(3, "compa enviar propuesta a Marta");
        let note = store
            .create_note(
                &t,
                &Detection {
                    category: Category::Commitment,
                    cleaned_text: "enviar propuesta a Marta".to_string(),
                    confidence: 1.0,
                    matched_keyword: Some("compa".to_string()),
                },
            )
            .unwrap();

        let counts = store
            .persist_extraction(
                note.id,
                &Extraction::Commitment(CommitmentDraft {
                    title: "Enviar propuesta".to_string(),
                    description: None,
                    counterparty: "Marta".to_string(),
                    deadline: None,
                    self_committed: true,
                }),
            )
            .unwrap();
        assert_eq!(counts.commitments, 1);

        let row = store.commitment_for_note(note.id).unwrap().unwrap();
        assert_eq!(row.counterparty, "Marta");
        assert!(row.self_committed);
        assert!(!row.fulfilled);
    }

    #[test]
    fn test_mark_processed_for_unclassified() {
        let store = store();
        let t = Transcription::new(4, "hola qué tal");
        let note = store
            .create_note(&t, &Detection::unclassified("hola qué tal"))
            .unwrap();

        store.mark_processed(note.id).unwrap();

        let note = store.get_note(4).unwrap().unwrap();
        assert!(note.processed);
        assert_eq!(note.detected_category, Category::Unclassified);
        assert_eq!(store.entity_count().unwrap(), 0);
    }

    #[test]
    fn test_daily_queries_pick_up_todays_rows() {
        let store = store();
        let today = Utc::now().date_naive();

        let t = Transcription::new(6, "ide una app de recetas");
        let note = store
            .create_note(
                &t,
                &Detection {
                    category: Category::Idea,
                    cleaned_text: "una app de recetas".to_string(),
                    confidence: 1.0,
                    matched_keyword: Some("ide".to_string()),
                },
            )
            .unwrap();
        store
            .persist_extraction(
                note.id,
                &Extraction::Idea(IdeaDraft {
                    title: "App de recetas".to_string(),
                    description: None,
                    category: Some("producto".to_string()),
                }),
            )
            .unwrap();

        let ideas = store.ideas_on(today).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "App de recetas");

        assert!(store.open_tasks_on(today).unwrap().is_empty());
        assert!(store.activities_on(today).unwrap().is_empty());
        assert!(store.open_commitments_on(today).unwrap().is_empty());
    }

    #[test]
    fn test_open_tasks_ordered_by_priority() {
        let store = store();
        let today = Utc::now().date_naive();

        for (i, priority) in [Priority::Low, Priority::Urgent, Priority::Medium]
            .into_iter()
            .enumerate()
        {
            let t = Transcription::new(10 + i as i64, "teo tarea");
            let note = store.create_note(&t, &task_detection()).unwrap();
            store
                .persist_extraction(
                    note.id,
                    &Extraction::Task(TaskDraft {
                        title: format!("tarea {}", i),
                        description: None,
                        due_date: None,
                        priority,
                    }),
                )
                .unwrap();
        }

        let tasks = store.open_tasks_on(today).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].priority, Priority::Urgent);
        assert_eq!(tasks[2].priority, Priority::Low);
    }
}
