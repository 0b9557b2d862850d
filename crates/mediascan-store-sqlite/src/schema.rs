//! SQL schema for the subject snapshot table.
//!
//! Each row holds one subject document exactly as the platform stored it, so
//! every historical field spelling is still visible to the classifier.

/// Schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    document    TEXT NOT NULL DEFAULT '{}'   -- JSON object of record fields
);

PRAGMA user_version = 1;
";
