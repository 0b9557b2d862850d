//! Error type for `mediascan-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("subject {id}: document is not valid JSON: {source}")]
  Document {
    id:     String,
    #[source]
    source: serde_json::Error,
  },

  #[error("subject {0}: document must be a JSON object")]
  NotAnObject(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
