//! Error types for denv-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for denv-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for denv-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Caller passed something the operation cannot act on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote key does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// Packing or unpacking a bundle failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Bundle entry would land outside the extraction directory
    #[error("Refusing to extract '{0}': path escapes the destination directory")]
    PathTraversal(String),

    /// Rename wrote the new key but could not remove the old one
    #[error(
        "Rename partially applied: '{new_key}' was written but '{old_key}' could not be deleted ({reason}); both keys now exist"
    )]
    RenamePartial {
        old_key: String,
        new_key: String,
        reason: String,
    },

    /// One or more required credentials are missing
    #[error("Configuration incomplete: missing {0}")]
    ConfigIncomplete(String),

    /// Configuration file could not be read or is malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::ConfigIncomplete(_) | Error::Config(_) => 2, // UsageError
            Error::Store(_) => 3,                                                          // StoreError
            Error::NotFound(_) => 5,                                                       // NotFound
            Error::RenamePartial { .. } | Error::PathTraversal(_) => 6,                    // PartialState
            _ => 1,                                                                        // GeneralError
        }
    }

    /// Whether the error leaves local or remote state in a shape the user must inspect
    pub const fn leaves_partial_state(&self) -> bool {
        matches!(self, Error::RenamePartial { .. } | Error::PathTraversal(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.display().to_string());
        match err.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Archive(format!(
                "filesystem loop detected at {}",
                path.unwrap_or_default()
            )),
        }
    }
}
