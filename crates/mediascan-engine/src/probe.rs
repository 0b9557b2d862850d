//! The existence prober: one subject, one location, several variants.

use mediascan_core::{
  location::Location,
  storage::{Descriptor, ExistenceChecker, ProbeResult},
};
use tracing::{debug, warn};

use crate::{config::RetryPolicy, throttle::Throttle};

/// Answer of a single variant after retries.
enum VariantCheck {
  Present,
  Missing,
  Exhausted,
}

/// Probes one location for one subject by trying each identifier variant in
/// order until one is present.
///
/// Holds only borrowed, read-only collaborators; it keeps no state between
/// calls.
#[derive(Debug)]
pub struct Prober<'a, C, T> {
  checker:  &'a C,
  throttle: &'a T,
  variants: &'a [String],
  retry:    RetryPolicy,
}

impl<'a, C, T> Prober<'a, C, T>
where
  C: ExistenceChecker,
  T: Throttle,
{
  pub fn new(
    checker: &'a C,
    throttle: &'a T,
    variants: &'a [String],
    retry: RetryPolicy,
  ) -> Self {
    Self {
      checker,
      throttle,
      variants,
      retry,
    }
  }

  /// Check whether `subject_id` has an artifact in `location`.
  ///
  /// Descriptors are resolved lazily, one variant at a time, and the first
  /// present variant ends the probe. A location where some variant could not
  /// be checked and none was found reports [`ProbeResult::Unreachable`].
  pub async fn probe(&self, subject_id: &str, location: &Location) -> ProbeResult {
    let candidates = self.variants.iter().map(|variant| {
      let descriptor = self
        .checker
        .resolve_descriptor(subject_id, variant, location);
      (variant, descriptor)
    });

    let mut exhausted = false;
    for (variant, descriptor) in candidates {
      match self.check(&descriptor).await {
        VariantCheck::Present => {
          return ProbeResult::Found {
            variant: variant.clone(),
            descriptor,
          };
        }
        VariantCheck::Missing => {}
        VariantCheck::Exhausted => {
          warn!(
            subject = subject_id,
            %location,
            variant = %variant,
            attempts = self.retry.budget,
            "existence check kept failing; moving to next variant"
          );
          exhausted = true;
        }
      }
    }

    if exhausted {
      ProbeResult::Unreachable
    } else {
      ProbeResult::NotFound
    }
  }

  async fn check(&self, descriptor: &Descriptor) -> VariantCheck {
    for attempt in 1..=self.retry.budget {
      match self.checker.exists(descriptor).await {
        Ok(true) => return VariantCheck::Present,
        Ok(false) => return VariantCheck::Missing,
        Err(err) => {
          debug!(%descriptor, attempt, error = %err, "transient existence check failure");
          if attempt < self.retry.budget {
            self.throttle.pause(self.retry.backoff).await;
          }
        }
      }
    }
    VariantCheck::Exhausted
  }
}
