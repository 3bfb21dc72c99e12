//! Error types and result type for the dictionary crate.
//!
//! All fallible operations in this crate return [`Result<T>`], whose error type is
//! [`DictError`]. The enum uses the `snafu` library for ergonomic error handling with
//! automatic backtrace capture.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::{DictError, Result};
//!
//! fn build() -> Result<()> {
//!     Err(DictError::index_build("entry 3 has no source word"))
//! }
//!
//! match build() {
//!     Ok(()) => {}
//!     Err(e) if e.is_index_build() => eprintln!("fix the data and retry: {}", e),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! # Error Variants
//!
//! - [`DictError::NotInitialized`]: a query ran before the engine finished a build
//! - [`DictError::IndexBuild`]: malformed source data, the build was aborted
//! - [`DictError::Cache`]: the offline cache could not be read or written
//! - [`DictError::Load`]: the dictionary source could not be reached or parsed
//! - [`DictError::Io`]: I/O errors from file operations
//! - [`DictError::ParserError`]: JSON parsing errors
//! - [`DictError::InvalidParameter`]: invalid arguments or configuration
//! - [`DictError::UserInterrupted`]: a progress reporter cancelled a build

use std::io;
use snafu::{Snafu, Backtrace};

// Re-export snafu for context providers
pub use snafu;

/// Main error type for the dictionary crate.
///
/// All errors include automatic backtrace capture for debugging purposes.
/// Use the helper methods on `DictError` for convenient error construction.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DictError {
    /// The search engine was queried before `initialize` succeeded.
    #[snafu(display("Search engine is not initialized"))]
    NotInitialized {
        backtrace: Backtrace,
    },

    /// Source data was malformed; the build was discarded.
    #[snafu(display("Index build error: {message}"))]
    IndexBuild {
        message: String,
        backtrace: Backtrace,
    },

    /// The persistence layer behind the offline cache failed.
    #[snafu(display("Cache error: {message}"))]
    Cache {
        message: String,
        backtrace: Backtrace,
    },

    /// The dictionary source could not be reached or parsed.
    #[snafu(display("Load error: {message}"))]
    Load {
        message: String,
        backtrace: Backtrace,
    },

    /// I/O error occurred during file operations.
    #[snafu(display("IO error: {source}"))]
    Io {
        source: io::Error,
        backtrace: Backtrace,
    },

    /// Error parsing JSON or other structured data formats.
    #[snafu(display("Parser error: {source}"))]
    ParserError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        backtrace: Backtrace,
    },

    /// Function was called with invalid parameters.
    #[snafu(display("Invalid parameter: {message}"))]
    InvalidParameter {
        message: String,
        backtrace: Backtrace,
    },

    /// Operation was interrupted by a progress reporter.
    #[snafu(display("User interrupted"))]
    UserInterrupted {
        backtrace: Backtrace,
    },
}

impl From<io::Error> for DictError {
    fn from(source: io::Error) -> Self {
        Self::Io { source, backtrace: Backtrace::capture() }
    }
}

impl From<serde_json::Error> for DictError {
    fn from(source: serde_json::Error) -> Self {
        Self::ParserError {
            source: Box::new(source),
            backtrace: Backtrace::capture(),
        }
    }
}

/// Helper methods for creating errors without context providers.
impl DictError {
    /// Creates a `NotInitialized` error.
    pub fn not_initialized() -> Self {
        Self::NotInitialized {
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `IndexBuild` error with the given message.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndowe_dict::DictError;
    ///
    /// let error = DictError::index_build("entry 0 is missing its source word");
    /// assert!(error.is_index_build());
    /// ```
    pub fn index_build<S: Into<String>>(message: S) -> Self {
        Self::IndexBuild {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `Cache` error with the given message.
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `Load` error with the given message.
    pub fn load<S: Into<String>>(message: S) -> Self {
        Self::Load {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `InvalidParameter` error with the given message.
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `UserInterrupted` error.
    pub fn user_interrupted() -> Self {
        Self::UserInterrupted {
            backtrace: Backtrace::capture(),
        }
    }

    /// Checks if this error is a `NotInitialized` variant.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, DictError::NotInitialized { .. })
    }

    /// Checks if this error is an `IndexBuild` variant.
    pub fn is_index_build(&self) -> bool {
        matches!(self, DictError::IndexBuild { .. })
    }

    /// Checks if this error is a `Cache` variant.
    pub fn is_cache(&self) -> bool {
        matches!(self, DictError::Cache { .. })
    }

    /// Checks if this error is a `Load` variant.
    pub fn is_load(&self) -> bool {
        matches!(self, DictError::Load { .. })
    }
}

/// A specialized `Result` type for dictionary operations.
///
/// This is a convenience type alias that uses [`DictError`] as the error type.
pub type Result<T> = std::result::Result<T, DictError>;
