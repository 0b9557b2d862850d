//! Per-subject audit findings.

use serde::{Deserialize, Serialize};

use crate::{classify::Category, location::Location, storage::Descriptor};

/// Where a subject's artifact was found relative to where it should be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
  PlacedCorrectly,
  Misplaced {
    actual_location: Location,
    variant:         String,
    descriptor:      Descriptor,
  },
  /// Every location answered and none holds the artifact.
  Absent,
  /// Not found anywhere, but at least one location could not be checked.
  /// Kept apart from `Absent` so a count never hides a swallowed fault.
  Indeterminate { unreachable: Vec<Location> },
}

/// The outcome for one subject. Produced exactly once per scanned subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFinding {
  pub subject_id:        String,
  pub display_name:      String,
  pub category:          Category,
  pub expected_location: Location,
  pub placement:         Placement,
}
