//! Error type for `mediascan-engine`.
//!
//! Only construction can fail. Once a [`crate::Scanner`] exists, every probe
//! failure is absorbed into a finding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid scan configuration: {0}")]
  InvalidConfig(String),

  #[error("core error: {0}")]
  Core(#[from] mediascan_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
