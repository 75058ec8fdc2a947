//! SQL schema for the Encore SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS recommendations (
    id                    TEXT PRIMARY KEY,
    user_id               TEXT NOT NULL,
    source_item           TEXT NOT NULL,
    recommended_item_id   TEXT NOT NULL,
    recommended_item_name TEXT NOT NULL,
    reasoning             TEXT NOT NULL,
    confidence            REAL NOT NULL,   -- always within [0, 1]
    feedback              INTEGER,         -- NULL unset | 1 positive | 0 negative
    created_at            TEXT NOT NULL    -- ISO 8601 UTC; refreshed on feedback
);

CREATE INDEX IF NOT EXISTS recs_user_source_idx
    ON recommendations(user_id, source_item);
CREATE INDEX IF NOT EXISTS recs_user_target_idx
    ON recommendations(user_id, recommended_item_id);

PRAGMA user_version = 1;
";
