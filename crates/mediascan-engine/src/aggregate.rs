//! Streaming aggregation of findings into a [`ScanReport`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use mediascan_core::{
  classify::Category,
  finding::ScanFinding,
  location::LocationTable,
  report::{CategoryTally, Counts, RunStatus, ScanReport},
};
use strum::IntoEnumIterator;

/// Accumulates findings as they are produced.
///
/// The only shared mutable state of a scan. `record` may be called from
/// several tasks; `snapshot` may be taken at any moment, including mid-run,
/// and always satisfies `totals().total() == scanned`.
#[derive(Debug)]
pub struct Aggregator {
  report: Mutex<ScanReport>,
}

impl Aggregator {
  /// Start an empty report for a run over `total_subjects` subjects.
  pub fn new(table: &LocationTable, total_subjects: usize) -> Self {
    let categories = Category::iter()
      .map(|category| {
        (category, CategoryTally {
          expected_location: table.expected_location(category).clone(),
          counts:            Counts::default(),
        })
      })
      .collect();

    Self {
      report: Mutex::new(ScanReport {
        status: RunStatus::Running,
        started_at: Utc::now(),
        finished_at: None,
        total_subjects,
        scanned: 0,
        categories,
        misplaced: Vec::new(),
        indeterminate: Vec::new(),
      }),
    }
  }

  pub fn record(&self, finding: ScanFinding) {
    let mut report = self.lock();

    report
      .categories
      .entry(finding.category)
      .or_insert_with(|| CategoryTally {
        expected_location: finding.expected_location.clone(),
        counts:            Counts::default(),
      })
      .counts
      .record(&finding.placement);
    report.scanned += 1;

    if let Some(row) = finding.misplaced_row() {
      report.misplaced.push(row);
    }
    if let Some(row) = finding.indeterminate_row() {
      report.indeterminate.push(row);
    }
  }

  /// A copy of the report as it stands now.
  pub fn snapshot(&self) -> ScanReport { self.lock().clone() }

  /// Close the run with `status` and return the final report.
  ///
  /// Only the first call stamps the status and finish time; later calls
  /// return the already-closed report unchanged.
  pub fn finish(&self, status: RunStatus) -> ScanReport {
    let mut report = self.lock();
    if report.status == RunStatus::Running {
      report.status = status;
      report.finished_at = Some(Utc::now());
    }
    report.clone()
  }

  fn lock(&self) -> MutexGuard<'_, ScanReport> {
    self.report.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
