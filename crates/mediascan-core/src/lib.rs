//! Core types for the media placement scanner.
//!
//! Holds the subject model, the classifier and location table, and the two
//! collaborator traits ([`source::SubjectSource`] and
//! [`storage::ExistenceChecker`]). No database or HTTP dependencies live here.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod error;
pub mod finding;
pub mod location;
pub mod report;
pub mod source;
pub mod storage;
pub mod subject;

pub use error::{Error, Result};
