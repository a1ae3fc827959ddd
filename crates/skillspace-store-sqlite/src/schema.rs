//! SQL schema for the SkillSpace SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Read-only to the engine; written by the catalog import path.
CREATE TABLE IF NOT EXISTS courses (
    course_id    TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'draft',   -- 'draft' | 'published'
    modules_json TEXT NOT NULL DEFAULT '[]',      -- ordered modules with lessons and quiz
    updated_at   TEXT NOT NULL
);

-- One row per (student, course). The whole document is rewritten on every
-- save, guarded by `version` so concurrent writers cannot lose updates.
CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id     TEXT PRIMARY KEY,
    student_id        TEXT NOT NULL,
    course_id         TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'enrolled',
    progress          INTEGER NOT NULL DEFAULT 0,
    completed_lessons TEXT NOT NULL DEFAULT '[]',
    assignments       TEXT NOT NULL DEFAULT '[]',   -- append-only log
    quizzes           TEXT NOT NULL DEFAULT '[]',   -- append-only log
    version           INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE (student_id, course_id),
    CHECK  (progress BETWEEN 0 AND 100)
);

CREATE INDEX IF NOT EXISTS enrollments_course_idx  ON enrollments(course_id);
CREATE INDEX IF NOT EXISTS enrollments_created_idx ON enrollments(created_at);

PRAGMA user_version = 1;
";
