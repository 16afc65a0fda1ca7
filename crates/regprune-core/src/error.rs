//! Error types for regprune core operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading retention rules.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file exists but could not be read.
    #[error("Failed to read retention config from {path}: {source}")]
    ConfigRead {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A retention count is not a non-negative integer.
    #[error("Invalid retention count '{value}' for repository {repository}: {reason}")]
    MalformedRule {
        /// Repository the rule applies to.
        repository: String,
        /// Raw value found in the configuration.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl Error {
    /// Returns true if this error must abort the whole run.
    ///
    /// Only file-level configuration failures are fatal; a malformed rule
    /// only disables that one repository.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigRead { .. })
    }
}
