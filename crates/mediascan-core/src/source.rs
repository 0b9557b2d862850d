//! The `SubjectSource` trait: the database side of a scan.

use std::future::Future;

use crate::subject::Subject;

/// Whole-collection reader for subject records.
///
/// A scan reads the collection exactly once, before any probing starts. A
/// failed read is fatal: classification depends on seeing every field of every
/// subject, so a partial set is never acceptable.
pub trait SubjectSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read every subject, in a stable order.
  fn read_all_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;
}
