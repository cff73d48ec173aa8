//! Batch conversion of jQuery sources into React component files.
//!
//! Discovers `.js`/`.html` inputs from directories, files or glob patterns,
//! converts them in parallel, and writes one component per file while
//! keeping a per-file success/failure tally.

pub mod discover;
pub mod naming;
pub mod runner;

pub use discover::{discover, SourceFile};
pub use naming::component_name;
pub use runner::{BatchConfig, BatchReport, BatchRunner, FileReport, FileStatus};

/// Errors that stop a batch run as a whole.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Invalid input pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Failed to serialize report: {0}")]
    Report(String),
}
