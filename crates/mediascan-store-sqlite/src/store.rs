//! [`SqliteSubjectSource`] is the SQLite implementation of [`SubjectSource`].

use std::path::Path;

use mediascan_core::{source::SubjectSource, subject::Subject};
use rusqlite::OpenFlags;
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subject snapshot backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSubjectSource {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSubjectSource {
  /// Open an existing snapshot without write access. Used by the scan job,
  /// which never modifies subjects.
  pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(Self { conn })
  }

  /// Open an empty in-memory snapshot.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let source = Self { conn };
    source.init_schema().await?;
    Ok(source)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace one subject document. Seeding only; a scan never
  /// writes.
  pub async fn insert_subject(&self, subject: &Subject) -> Result<()> {
    let id = subject.id.clone();
    let document = Value::Object(subject.fields.clone()).to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO subjects (subject_id, document) VALUES (?1, ?2)",
          rusqlite::params![id, document],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

fn decode_subject(id: String, document: &str) -> Result<Subject> {
  let value: Value = serde_json::from_str(document).map_err(|source| Error::Document {
    id: id.clone(),
    source,
  })?;
  match value {
    Value::Object(fields) => Ok(Subject { id, fields }),
    _ => Err(Error::NotAnObject(id)),
  }
}

// ─── SubjectSource impl ──────────────────────────────────────────────────────

impl SubjectSource for SqliteSubjectSource {
  type Error = Error;

  async fn read_all_subjects(&self) -> Result<Vec<Subject>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT subject_id, document FROM subjects ORDER BY subject_id")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(count = rows.len(), "read subject snapshot");
    rows
      .into_iter()
      .map(|(id, document)| decode_subject(id, &document))
      .collect()
  }
}
