//! Error types for `mediascan-core`.

use thiserror::Error;

use crate::{classify::Category, location::Location};

#[derive(Debug, Error)]
pub enum Error {
  #[error("no expected location configured for category {0}")]
  UnmappedCategory(Category),

  #[error("location {0} is listed more than once")]
  DuplicateLocation(Location),

  #[error("expected location {location} for {category} is not a known location")]
  UnknownExpectedLocation {
    category: Category,
    location: Location,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
