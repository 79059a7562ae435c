//! Error types for bgscan-core.

use thiserror::Error;

/// Result type alias for bgscan-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the data model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unrecognised metadata category name.
    #[error("invalid metadata category: {0:?} (expected file, print, printer or slicer)")]
    InvalidCategory(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
