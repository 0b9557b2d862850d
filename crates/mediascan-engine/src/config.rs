//! Tunables for a scan run.

use std::time::Duration;

use crate::{Error, Result};

/// How often a transiently failing existence check is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts per variant, including the first.
  pub budget:  u32,
  /// Fixed pause between two attempts on the same variant.
  pub backoff: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      budget:  2,
      backoff: Duration::from_millis(500),
    }
  }
}

/// Pacing and probing parameters.
///
/// The two delays are part of the contract with the storage backend: the
/// backend's rate limits are met by tuning them, not by code changes.
#[derive(Debug, Clone)]
pub struct ScanConfig {
  pub batch_size:          usize,
  /// Gap before every probe of a non-expected location. With
  /// `concurrency > 1` it becomes the minimum spacing enforced by a shared
  /// [`RequestGate`](crate::RequestGate).
  pub inter_request_delay: Duration,
  /// Pause between batches; skipped after the last one.
  pub inter_batch_delay:   Duration,
  pub retry:               RetryPolicy,
  /// Subjects probed at once within a batch. `1` is fully sequential.
  pub concurrency:         usize,
  /// Identifier variants (file extensions) tried in order at each location.
  pub variants:            Vec<String>,
}

impl Default for ScanConfig {
  fn default() -> Self {
    Self {
      batch_size:          10,
      inter_request_delay: Duration::from_millis(500),
      inter_batch_delay:   Duration::from_millis(2000),
      retry:               RetryPolicy::default(),
      concurrency:         1,
      variants:            ["jpg", "jpeg", "png", "webp"]
        .into_iter()
        .map(str::to_owned)
        .collect(),
    }
  }
}

impl ScanConfig {
  pub fn validate(&self) -> Result<()> {
    if self.batch_size == 0 {
      return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
    }
    if self.concurrency == 0 {
      return Err(Error::InvalidConfig("concurrency must be at least 1".into()));
    }
    if self.retry.budget == 0 {
      return Err(Error::InvalidConfig("retry budget must be at least 1".into()));
    }
    if self.variants.is_empty() {
      return Err(Error::InvalidConfig("at least one variant is required".into()));
    }
    if let Some(v) = self.variants.iter().find(|v| v.trim().is_empty()) {
      return Err(Error::InvalidConfig(format!("blank variant {v:?}")));
    }
    Ok(())
  }
}
