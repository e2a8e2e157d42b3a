//! Error types for DDS handling.

use thiserror::Error;

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] mipkit_common::Error),

    /// The input is not a DDS container (bad magic, bad header size, or truncated header).
    #[error("not a DDS file: {0}")]
    NotDds(String),

    /// The header declares something a texture cannot be.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The declared surfaces extend past the end of the data.
    #[error("truncated pixel data: needed {needed} bytes but only {available} available")]
    Truncated { needed: u64, available: u64 },

    /// A size computation overflowed.
    #[error("size overflow computing {0}")]
    Overflow(&'static str),

    /// The payload handed to the writer does not match the declared layout.
    #[error("payload size mismatch: expected {expected}, got {actual}")]
    PayloadSizeMismatch { expected: u64, actual: u64 },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidArgument(reason.into())
    }
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
