//! Tests for `SqliteSubjectSource` against an in-memory database.

use mediascan_core::{
  classify::{Category, classify},
  source::SubjectSource,
  subject::Subject,
};
use serde_json::json;

use crate::{Error, SqliteSubjectSource};

async fn source() -> SqliteSubjectSource {
  SqliteSubjectSource::open_in_memory()
    .await
    .expect("in-memory source")
}

async fn insert_raw(s: &SqliteSubjectSource, id: &'static str, document: &'static str) {
  s.conn_for_tests()
    .call(move |conn| {
      conn.execute(
        "INSERT INTO subjects (subject_id, document) VALUES (?1, ?2)",
        rusqlite::params![id, document],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn empty_snapshot_reads_empty() {
  let s = source().await;
  assert!(s.read_all_subjects().await.unwrap().is_empty());
}

#[tokio::test]
async fn subjects_roundtrip_with_all_fields() {
  let s = source().await;
  let subject = Subject::new("p-1")
    .with_field("full_name", "Sami Ali")
    .with_field("trainerId", "t-9")
    .with_field("club_id", json!(null));
  s.insert_subject(&subject).await.unwrap();

  let read = s.read_all_subjects().await.unwrap();
  assert_eq!(read, vec![subject]);
  assert_eq!(classify(&read[0]), Category::Trainer);
}

#[tokio::test]
async fn subjects_are_read_in_id_order() {
  let s = source().await;
  for id in ["c", "a", "b"] {
    s.insert_subject(&Subject::new(id)).await.unwrap();
  }
  let ids: Vec<String> = s
    .read_all_subjects()
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.id)
    .collect();
  assert_eq!(ids, ["a", "b", "c"]);
}

#[tokio::test]
async fn insert_replaces_existing_document() {
  let s = source().await;
  s.insert_subject(&Subject::new("p").with_field("agent_id", "x"))
    .await
    .unwrap();
  s.insert_subject(&Subject::new("p")).await.unwrap();

  let read = s.read_all_subjects().await.unwrap();
  assert_eq!(read.len(), 1);
  assert_eq!(classify(&read[0]), Category::Independent);
}

#[tokio::test]
async fn malformed_document_fails_the_whole_read() {
  let s = source().await;
  s.insert_subject(&Subject::new("good")).await.unwrap();
  insert_raw(&s, "bad", "{not json").await;

  let err = s.read_all_subjects().await.unwrap_err();
  assert!(matches!(err, Error::Document { ref id, .. } if id == "bad"));
}

#[tokio::test]
async fn non_object_document_is_rejected() {
  let s = source().await;
  insert_raw(&s, "list", "[1, 2]").await;

  let err = s.read_all_subjects().await.unwrap_err();
  assert!(matches!(err, Error::NotAnObject(ref id) if id == "list"));
}

#[tokio::test]
async fn missing_table_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("empty.db");
  // Create an empty database file without the schema.
  rusqlite::Connection::open(&path).unwrap();

  let s = SqliteSubjectSource::open_read_only(&path).await.unwrap();
  assert!(matches!(
    s.read_all_subjects().await.unwrap_err(),
    Error::Database(_)
  ));
}

#[tokio::test]
async fn read_only_open_never_creates_a_database() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("missing.db");

  assert!(SqliteSubjectSource::open_read_only(&path).await.is_err());
  assert!(!path.exists());
}

#[tokio::test]
async fn read_only_snapshot_reads_seeded_subjects() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("subjects.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(crate::schema::SCHEMA).unwrap();
    conn
      .execute(
        "INSERT INTO subjects (subject_id, document) VALUES (?1, ?2)",
        rusqlite::params!["p-1", r#"{"clubId":"c-3"}"#],
      )
      .unwrap();
  }

  let s = SqliteSubjectSource::open_read_only(&path).await.unwrap();
  let read = s.read_all_subjects().await.unwrap();
  assert_eq!(read.len(), 1);
  assert_eq!(classify(&read[0]), Category::Club);
}
