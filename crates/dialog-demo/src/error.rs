//! Error handling for the dialog-demo binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for dialog-demo operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running the demo.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Errors surfaced by the dialog invoker or presenter.
    #[error("Dialog error: {0}")]
    Dialog(#[from] dialogkit::Error),
    /// The profile file could not be loaded.
    #[error("{}", .0.pretty())]
    Profile(#[from] dialogkit::ConfigError),
    /// Failed to render the report.
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A mixin replaced dispatch and nothing reached the presenter.
    #[error("Dialog was not presented")]
    NotPresented,
}
