//! HTTP existence checks against public object-storage URLs.
//!
//! Artifacts are addressed as
//! `{base}/storage/v1/object/public/{location}/{subject_id}.{variant}` and
//! checked with a `HEAD` request, so no object body is ever downloaded.

pub mod error;

mod checker;

pub use checker::{HttpExistenceChecker, StorageConfig, classify_status};
pub use error::{Error, Result};
