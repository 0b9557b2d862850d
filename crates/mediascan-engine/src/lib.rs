//! The placement scan engine.
//!
//! [`Scanner`] drives a [`Prober`] over batches of subjects, paced through a
//! [`Throttle`], and streams every finding into an [`Aggregator`]. The
//! [`render`] module turns the resulting report into console or structured
//! output.
//!
//! Storage and database access stay behind the traits in `mediascan-core`;
//! nothing in this crate does I/O of its own beyond sleeping.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod probe;
pub mod render;
pub mod scan;
pub mod throttle;

pub use aggregate::Aggregator;
pub use config::{RetryPolicy, ScanConfig};
pub use error::{Error, Result};
pub use probe::Prober;
pub use scan::{Scanner, select_subjects};
pub use throttle::{RequestGate, Throttle, TokioThrottle};
