//! SQLite-backed subject source for the placement scanner.
//!
//! Wraps [`tokio_rusqlite`] so the whole-collection read runs on a dedicated
//! thread without blocking the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteSubjectSource;

#[cfg(test)]
mod tests;
