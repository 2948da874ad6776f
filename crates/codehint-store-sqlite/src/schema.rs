//! SQL schema for the codehint SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    email  TEXT NOT NULL UNIQUE
);

-- Both ledgers are strictly append-only.
-- No UPDATE or DELETE is ever issued against them.
CREATE TABLE IF NOT EXISTS without_extension_solved_questions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    question_title  TEXT NOT NULL,
    solved_at       TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    user_id         INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS extension_solved_questions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    question_title  TEXT NOT NULL,
    solved_at       TEXT NOT NULL,
    user_id         INTEGER NOT NULL REFERENCES users(id)
);

-- At most one outstanding code per address; only the hash is kept.
-- Expired rows are purged whenever a new challenge is written.
CREATE TABLE IF NOT EXISTS otp_challenges (
    email       TEXT PRIMARY KEY,
    code_hash   TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS without_extension_user_idx
    ON without_extension_solved_questions(user_id);
CREATE INDEX IF NOT EXISTS extension_user_idx
    ON extension_solved_questions(user_id);

PRAGMA user_version = 1;
";
