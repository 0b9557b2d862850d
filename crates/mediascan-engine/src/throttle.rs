//! Pacing primitives.
//!
//! All waiting in the engine goes through [`Throttle`], so tests can record
//! the requested pauses instead of sleeping through them.

use std::{
  future::Future,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use tokio::time::Instant;

/// Something that can wait for a duration.
pub trait Throttle: Send + Sync {
  fn pause(&self, duration: Duration) -> impl Future<Output = ()> + Send + '_;
}

/// Real wall-clock pacing backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioThrottle;

impl Throttle for TokioThrottle {
  async fn pause(&self, duration: Duration) {
    if !duration.is_zero() {
      tokio::time::sleep(duration).await;
    }
  }
}

/// A single-token bucket shared by concurrent probers.
///
/// Each call to [`reserve`](Self::reserve) books the next free slot and
/// returns how long the caller must wait for it. Slots are spaced `interval`
/// apart, so across the whole pool no two gated requests start closer than
/// `interval`. That is the same aggregate rate as one sequential prober
/// sleeping `interval` before each request.
#[derive(Debug)]
pub struct RequestGate {
  interval:  Duration,
  next_slot: Mutex<Option<Instant>>,
}

impl RequestGate {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      next_slot: Mutex::new(None),
    }
  }

  pub fn interval(&self) -> Duration { self.interval }

  /// Book the next slot; returns the wait until it opens.
  pub fn reserve(&self) -> Duration {
    let now = Instant::now();
    let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
    let slot = match *next {
      Some(at) if at > now => at,
      _ => now,
    };
    *next = Some(slot + self.interval);
    slot - now
  }
}
