//! Watch mode for jquereact.
//!
//! Watches source directories and converts each matching file again when it
//! changes, the way a build-tool plugin would on every save.

pub mod filter;
pub mod session;
pub mod watcher;

pub use filter::WatchFilter;
pub use session::{WatchConfig, WatchSession};
pub use watcher::{classify_event, FileWatcher, WatchEvent};

/// Errors that can occur in watch mode.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Invalid watch pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Failed to watch files: {0}")]
    Notify(String),
}
