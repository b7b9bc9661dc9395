//! SQL schema for the Rentwise SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 2000;

CREATE TABLE IF NOT EXISTS cases (
    case_id            TEXT PRIMARY KEY,
    created_at         TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at         TEXT NOT NULL,
    status             TEXT NOT NULL,   -- 'intake' | 'reasoned' | 'drafted' | 'escalated' | 'closed'
    category           TEXT NOT NULL,
    subcategory        TEXT,
    issue              TEXT NOT NULL,
    description        TEXT,
    renter_json        TEXT NOT NULL,
    provider_json      TEXT,
    answers_json       TEXT NOT NULL DEFAULT '{}',
    evidence_json      TEXT NOT NULL DEFAULT '[]',
    risk_flags_json    TEXT NOT NULL DEFAULT '[]',
    critical_deadline  TEXT,            -- ISO 8601 date
    recommendation     TEXT,
    law_citations_json TEXT NOT NULL DEFAULT '[]'
);

-- Timeline entries are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS case_events (
    case_id       TEXT NOT NULL REFERENCES cases(case_id),
    seq           INTEGER NOT NULL,
    occurred_at   TEXT NOT NULL,
    label         TEXT NOT NULL,
    metadata_json TEXT NOT NULL DEFAULT '{}',
    PRIMARY KEY (case_id, seq)
);

-- Documents are write-once; redrafting inserts a new row.
CREATE TABLE IF NOT EXISTS case_documents (
    document_id   TEXT PRIMARY KEY,
    case_id       TEXT NOT NULL REFERENCES cases(case_id),
    doc_type      TEXT NOT NULL,
    filename      TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    content_hash  TEXT NOT NULL,
    urls_json     TEXT NOT NULL DEFAULT '{}',
    metadata_json TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS case_events_case_idx    ON case_events(case_id, seq);
CREATE INDEX IF NOT EXISTS case_documents_case_idx ON case_documents(case_id);
CREATE INDEX IF NOT EXISTS cases_created_idx       ON cases(created_at);

PRAGMA user_version = 1;
";
