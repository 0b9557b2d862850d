//! The aggregate scan report handed to the renderer and the remediation job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  classify::Category,
  finding::{Placement, ScanFinding},
  location::Location,
  storage::Descriptor,
};

// ─── Counters ────────────────────────────────────────────────────────────────

/// Outcome counters for a category or for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
  pub correct:       usize,
  pub misplaced:     usize,
  pub absent:        usize,
  pub indeterminate: usize,
}

impl Counts {
  pub fn total(&self) -> usize {
    self.correct + self.misplaced + self.absent + self.indeterminate
  }

  pub fn record(&mut self, placement: &Placement) {
    match placement {
      Placement::PlacedCorrectly => self.correct += 1,
      Placement::Misplaced { .. } => self.misplaced += 1,
      Placement::Absent => self.absent += 1,
      Placement::Indeterminate { .. } => self.indeterminate += 1,
    }
  }
}

impl std::ops::AddAssign for Counts {
  fn add_assign(&mut self, rhs: Self) {
    self.correct += rhs.correct;
    self.misplaced += rhs.misplaced;
    self.absent += rhs.absent;
    self.indeterminate += rhs.indeterminate;
  }
}

/// Counters for one category, alongside the location it should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
  pub expected_location: Location,
  #[serde(flatten)]
  pub counts:            Counts,
}

// ─── Detail rows ─────────────────────────────────────────────────────────────

/// A subject whose artifact sits in the wrong location. One row per subject;
/// this list is what the remediation job consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisplacedSubject {
  pub subject_id:        String,
  pub display_name:      String,
  pub category:          Category,
  pub expected_location: Location,
  pub actual_location:   Location,
  pub variant:           String,
  pub descriptor:        Descriptor,
}

/// A subject whose placement could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndeterminateSubject {
  pub subject_id:        String,
  pub display_name:      String,
  pub category:          Category,
  pub expected_location: Location,
  pub unreachable:       Vec<Location>,
}

impl ScanFinding {
  pub fn misplaced_row(&self) -> Option<MisplacedSubject> {
    let Placement::Misplaced {
      actual_location,
      variant,
      descriptor,
    } = &self.placement
    else {
      return None;
    };
    Some(MisplacedSubject {
      subject_id:        self.subject_id.clone(),
      display_name:      self.display_name.clone(),
      category:          self.category,
      expected_location: self.expected_location.clone(),
      actual_location:   actual_location.clone(),
      variant:           variant.clone(),
      descriptor:        descriptor.clone(),
    })
  }

  pub fn indeterminate_row(&self) -> Option<IndeterminateSubject> {
    let Placement::Indeterminate { unreachable } = &self.placement else {
      return None;
    };
    Some(IndeterminateSubject {
      subject_id:        self.subject_id.clone(),
      display_name:      self.display_name.clone(),
      category:          self.category,
      expected_location: self.expected_location.clone(),
      unreachable:       unreachable.clone(),
    })
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Where the run that produced a report stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
  Running,
  Complete,
  Cancelled,
}

/// The aggregate of a scan, complete or partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
  pub status:         RunStatus,
  pub started_at:     DateTime<Utc>,
  pub finished_at:    Option<DateTime<Utc>>,
  /// Subjects selected for this run.
  pub total_subjects: usize,
  /// Subjects with a finding so far.
  pub scanned:        usize,
  pub categories:     BTreeMap<Category, CategoryTally>,
  pub misplaced:      Vec<MisplacedSubject>,
  pub indeterminate:  Vec<IndeterminateSubject>,
}

impl ScanReport {
  /// Grand totals across all categories.
  pub fn totals(&self) -> Counts {
    let mut totals = Counts::default();
    for tally in self.categories.values() {
      totals += tally.counts;
    }
    totals
  }
}
