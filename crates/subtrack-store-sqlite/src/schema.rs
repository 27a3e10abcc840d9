//! SQL schema for the subtrack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subscriptions (
    id            TEXT PRIMARY KEY,
    service_name  TEXT NOT NULL,
    price         INTEGER NOT NULL CHECK (price > 0),
    user_id       TEXT NOT NULL,
    start_date    TEXT NOT NULL,   -- YYYY-MM-01
    end_date      TEXT,            -- YYYY-MM-01 or NULL while still running
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at    TEXT NOT NULL,
    CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx    ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_service_idx ON subscriptions(service_name);
CREATE INDEX IF NOT EXISTS subscriptions_start_idx   ON subscriptions(start_date);

PRAGMA user_version = 1;
";
