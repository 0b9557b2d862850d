//! The `ExistenceChecker` trait and probe outcome types.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::location::Location;

/// A dereferenceable locator for one artifact candidate (a public URL in
/// production).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(String);

impl Descriptor {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Descriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A failure that says nothing about whether the artifact exists (network
/// error, timeout, throttling). Worth retrying.
#[derive(Debug, Clone, Error)]
#[error("transient storage failure: {0}")]
pub struct TransientError(pub String);

/// Storage-side collaborator used by the prober.
pub trait ExistenceChecker: Send + Sync {
  /// Build the locator for `subject_id` stored under `variant` in `location`.
  fn resolve_descriptor(
    &self,
    subject_id: &str,
    variant: &str,
    location: &Location,
  ) -> Descriptor;

  /// Metadata-only existence check.
  ///
  /// `Ok(false)` is a definitive "not present" and is never retried.
  fn exists<'a>(
    &'a self,
    descriptor: &'a Descriptor,
  ) -> impl Future<Output = Result<bool, TransientError>> + Send + 'a;
}

/// Outcome of probing one location for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeResult {
  /// The first variant that answered positively.
  Found {
    variant:    String,
    descriptor: Descriptor,
  },
  /// Every variant was checked and none is present.
  NotFound,
  /// No variant is present, and at least one ran out of retries before
  /// answering, so absence is not proven.
  Unreachable,
}

impl ProbeResult {
  pub fn is_found(&self) -> bool { matches!(self, Self::Found { .. }) }
}
