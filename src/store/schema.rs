//! Schema for the audit table and the four entity tables.
//!
//! Optional extraction fields map to NULLable columns; the people list is a
//! JSON text column. Dates are TEXT: `created_at` as RFC 3339, day-granular
//! fields as `YYYY-MM-DD`.

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS audio_notes (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    transcription_id     INTEGER NOT NULL UNIQUE,
    transcript           TEXT NOT NULL,
    audio_url            TEXT,
    detected_category    TEXT NOT NULL,
    detection_confidence REAL NOT NULL,
    processed            INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id     INTEGER NOT NULL REFERENCES audio_notes(id),
    title       TEXT NOT NULL,
    description TEXT,
    due_date    TEXT,
    priority    TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_logs (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id        INTEGER NOT NULL REFERENCES audio_notes(id),
    description    TEXT NOT NULL,
    duration_hours REAL,
    project        TEXT,
    people         TEXT NOT NULL DEFAULT '[]',
    kind           TEXT NOT NULL,
    activity_date  TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS commitments (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id        INTEGER NOT NULL REFERENCES audio_notes(id),
    title          TEXT NOT NULL,
    description    TEXT,
    counterparty   TEXT NOT NULL,
    deadline       TEXT,
    self_committed INTEGER NOT NULL,
    fulfilled      INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ideas (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id     INTEGER NOT NULL REFERENCES audio_notes(id),
    title       TEXT NOT NULL,
    description TEXT,
    category    TEXT,
    implemented INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_note ON tasks(note_id);
CREATE INDEX IF NOT EXISTS idx_activity_logs_note ON activity_logs(note_id);
CREATE INDEX IF NOT EXISTS idx_commitments_note ON commitments(note_id);
CREATE INDEX IF NOT EXISTS idx_ideas_note ON ideas(note_id);
";
