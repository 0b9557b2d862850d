//! Storage locations and the category → expected-location table.
//!
//! The table is fixed when it is built. It is never discovered by listing the
//! storage backend, so a scan stays deterministic while that backend is flaky.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{Error, Result, classify::Category};

/// A storage namespace (an object-storage bucket in practice).
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
  pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for Location {
  fn from(s: &str) -> Self { Self::new(s) }
}

/// Maps every [`Category`] to exactly one expected [`Location`] and holds the
/// closed, ordered list of all known locations.
#[derive(Debug, Clone)]
pub struct LocationTable {
  expected: BTreeMap<Category, Location>,
  order:    Vec<Location>,
}

impl LocationTable {
  /// Build a table, checking that it is total and self-consistent.
  ///
  /// `order` is the enumeration order used for cross-location search.
  pub fn new(
    expected: impl IntoIterator<Item = (Category, Location)>,
    order: impl IntoIterator<Item = Location>,
  ) -> Result<Self> {
    let expected: BTreeMap<_, _> = expected.into_iter().collect();

    let mut known: Vec<Location> = Vec::new();
    for location in order {
      if known.contains(&location) {
        return Err(Error::DuplicateLocation(location));
      }
      known.push(location);
    }

    for category in Category::iter() {
      let location = expected
        .get(&category)
        .ok_or(Error::UnmappedCategory(category))?;
      if !known.contains(location) {
        return Err(Error::UnknownExpectedLocation {
          category,
          location: location.clone(),
        });
      }
    }

    Ok(Self {
      expected,
      order: known,
    })
  }

  /// The table used by the production deployment.
  pub fn standard() -> Self {
    let expected = [
      (Category::Independent, "avatars"),
      (Category::Trainer, "playertrainer"),
      (Category::Club, "playerclub"),
      (Category::Agent, "playeragent"),
      (Category::Academy, "playeracademy"),
    ]
    .into_iter()
    .map(|(c, name)| (c, Location::new(name)))
    .collect();

    let order = [
      "avatars",
      "playertrainer",
      "playerclub",
      "playeracademy",
      "playeragent",
    ]
    .into_iter()
    .map(Location::new)
    .collect();

    Self { expected, order }
  }

  pub fn expected_location(&self, category: Category) -> &Location {
    // Every category is present; `new` and `standard` both guarantee it.
    &self.expected[&category]
  }

  /// All known locations in enumeration order.
  pub fn all_locations(&self) -> &[Location] { &self.order }

  /// Every known location except `skip`, in enumeration order.
  pub fn others<'a>(
    &'a self,
    skip: &'a Location,
  ) -> impl Iterator<Item = &'a Location> + 'a {
    self.order.iter().filter(move |l| *l != skip)
  }
}

impl Default for LocationTable {
  fn default() -> Self { Self::standard() }
}
