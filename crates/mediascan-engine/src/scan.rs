//! The batch scheduler.
//!
//! Subjects are processed in consecutive batches. Within a batch each subject
//! is probed at its expected location first; only on a miss are the other
//! known locations searched, in table order, each probe paced by the
//! inter-request delay. Batches are separated by the inter-batch delay.
//!
//! With `concurrency > 1`, up to that many subjects of a batch are in flight
//! at once. Findings are still recorded in subject order. Every location
//! probe, expected location included, then takes a slot from a shared
//! [`RequestGate`], so the pool as a whole never starts two probes closer
//! than the inter-request delay and the request rate does not grow with the
//! pool size.

use std::collections::BTreeSet;

use futures::{StreamExt as _, stream};
use mediascan_core::{
  classify::{Category, classify},
  finding::{Placement, ScanFinding},
  location::LocationTable,
  report::{RunStatus, ScanReport},
  storage::{ExistenceChecker, ProbeResult},
  subject::Subject,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
  Result,
  aggregate::Aggregator,
  config::ScanConfig,
  probe::Prober,
  throttle::{RequestGate, Throttle, TokioThrottle},
};

// ─── Selection ───────────────────────────────────────────────────────────────

/// Keep only subjects whose category is in `only`; an empty set keeps all.
pub fn select_subjects(subjects: Vec<Subject>, only: &BTreeSet<Category>) -> Vec<Subject> {
  if only.is_empty() {
    return subjects;
  }
  subjects
    .into_iter()
    .filter(|s| only.contains(&classify(s)))
    .collect()
}

// ─── Scanner ─────────────────────────────────────────────────────────────────

/// Drives the prober across a subject set and feeds the aggregator.
#[derive(Debug)]
pub struct Scanner<C, T = TokioThrottle> {
  checker:  C,
  throttle: T,
  table:    LocationTable,
  config:   ScanConfig,
  gate:     Option<RequestGate>,
}

impl<C, T> Scanner<C, T>
where
  C: ExistenceChecker,
  T: Throttle,
{
  pub fn new(
    checker: C,
    throttle: T,
    table: LocationTable,
    config: ScanConfig,
  ) -> Result<Self> {
    config.validate()?;
    let gate = (config.concurrency > 1)
      .then(|| RequestGate::new(config.inter_request_delay));
    Ok(Self {
      checker,
      throttle,
      table,
      config,
      gate,
    })
  }

  pub fn checker(&self) -> &C { &self.checker }

  pub fn throttle(&self) -> &T { &self.throttle }

  pub fn table(&self) -> &LocationTable { &self.table }

  pub fn config(&self) -> &ScanConfig { &self.config }

  /// Scan `subjects` with a fresh aggregator and return the final report.
  pub async fn run(&self, subjects: &[Subject], cancel: &CancellationToken) -> ScanReport {
    let aggregator = Aggregator::new(&self.table, subjects.len());
    self.scan(subjects, &aggregator, cancel).await
  }

  /// Scan `subjects`, recording each finding into `aggregator` as soon as it
  /// is known.
  ///
  /// Cancellation is honoured before every subject and during inter-batch
  /// pauses. A cancelled run still returns everything recorded so far, with
  /// status [`RunStatus::Cancelled`].
  pub async fn scan(
    &self,
    subjects: &[Subject],
    aggregator: &Aggregator,
    cancel: &CancellationToken,
  ) -> ScanReport {
    let batch_size = self.config.batch_size;
    let total_batches = subjects.len().div_ceil(batch_size);

    info!(
      subjects = subjects.len(),
      batches = total_batches,
      batch_size,
      concurrency = self.config.concurrency,
      inter_request_ms = self.config.inter_request_delay.as_millis() as u64,
      inter_batch_ms = self.config.inter_batch_delay.as_millis() as u64,
      "starting placement scan"
    );

    for (index, batch) in subjects.chunks(batch_size).enumerate() {
      info!(batch = index + 1, of = total_batches, size = batch.len(), "processing batch");

      let finished = if self.config.concurrency > 1 {
        self.run_batch_pooled(batch, aggregator, cancel).await
      } else {
        self.run_batch_sequential(batch, aggregator, cancel).await
      };
      if !finished {
        return self.cancelled(aggregator);
      }

      if index + 1 < total_batches {
        debug!(
          delay_ms = self.config.inter_batch_delay.as_millis() as u64,
          "pausing before next batch"
        );
        tokio::select! {
          () = self.throttle.pause(self.config.inter_batch_delay) => {}
          () = cancel.cancelled() => return self.cancelled(aggregator),
        }
      }
    }

    let report = aggregator.finish(RunStatus::Complete);
    let totals = report.totals();
    info!(
      scanned = report.scanned,
      correct = totals.correct,
      misplaced = totals.misplaced,
      absent = totals.absent,
      indeterminate = totals.indeterminate,
      "placement scan complete"
    );
    report
  }

  /// Audit a single subject: classify, probe the expected location, then
  /// search the others.
  pub async fn audit(&self, subject: &Subject) -> ScanFinding {
    let category = classify(subject);
    let expected = self.table.expected_location(category);
    let prober = Prober::new(
      &self.checker,
      &self.throttle,
      &self.config.variants,
      self.config.retry,
    );

    let mut unreachable = Vec::new();
    self.pace_probe(false).await;
    let placement = match prober.probe(&subject.id, expected).await {
      ProbeResult::Found { .. } => Placement::PlacedCorrectly,
      at_expected => {
        if at_expected == ProbeResult::Unreachable {
          unreachable.push(expected.clone());
        }

        let mut misplaced = None;
        for location in self.table.others(expected) {
          self.pace_probe(true).await;
          match prober.probe(&subject.id, location).await {
            ProbeResult::Found {
              variant,
              descriptor,
            } => {
              misplaced = Some(Placement::Misplaced {
                actual_location: location.clone(),
                variant,
                descriptor,
              });
              break;
            }
            ProbeResult::NotFound => {}
            ProbeResult::Unreachable => unreachable.push(location.clone()),
          }
        }

        match misplaced {
          Some(placement) => placement,
          None if unreachable.is_empty() => Placement::Absent,
          None => Placement::Indeterminate { unreachable },
        }
      }
    };

    match &placement {
      Placement::Misplaced {
        actual_location, ..
      } => info!(
        subject = %subject.id,
        %category,
        expected = %expected,
        actual = %actual_location,
        "artifact in wrong location"
      ),
      Placement::Indeterminate { unreachable } => info!(
        subject = %subject.id,
        %category,
        unreachable = unreachable.len(),
        "placement could not be determined"
      ),
      other => debug!(subject = %subject.id, %category, placement = ?other, "audited"),
    }

    ScanFinding {
      subject_id: subject.id.clone(),
      display_name: subject.display_name().to_owned(),
      category,
      expected_location: expected.clone(),
      placement,
    }
  }

  async fn run_batch_sequential(
    &self,
    batch: &[Subject],
    aggregator: &Aggregator,
    cancel: &CancellationToken,
  ) -> bool {
    for subject in batch {
      if cancel.is_cancelled() {
        return false;
      }
      aggregator.record(self.audit(subject).await);
    }
    true
  }

  async fn run_batch_pooled(
    &self,
    batch: &[Subject],
    aggregator: &Aggregator,
    cancel: &CancellationToken,
  ) -> bool {
    // `buffered` yields in input order, so recording stays deterministic.
    let mut findings = stream::iter(batch)
      .map(|subject| async move {
        if cancel.is_cancelled() {
          None
        } else {
          Some(self.audit(subject).await)
        }
      })
      .buffered(self.config.concurrency);

    while let Some(finding) = findings.next().await {
      match finding {
        Some(finding) => aggregator.record(finding),
        None => return false,
      }
    }
    true
  }

  /// Wait before probing one location.
  ///
  /// A cross-location probe always sits out `inter_request_delay` after the
  /// previous probe of the same subject. In pooled mode every probe then also
  /// waits for its slot at the shared gate.
  async fn pace_probe(&self, cross_location: bool) {
    if cross_location {
      self.throttle.pause(self.config.inter_request_delay).await;
    }
    if let Some(gate) = &self.gate {
      self.throttle.pause(gate.reserve()).await;
    }
  }

  fn cancelled(&self, aggregator: &Aggregator) -> ScanReport {
    let report = aggregator.finish(RunStatus::Cancelled);
    info!(
      scanned = report.scanned,
      total = report.total_subjects,
      "placement scan cancelled; returning partial report"
    );
    report
  }
}
