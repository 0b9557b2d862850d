//! Error type for `mediascan-storage-http`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid storage base URL {url:?}: {reason}")]
  InvalidBaseUrl { url: String, reason: String },

  #[error("http client error: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
