//! Error types for texture loading.

use thiserror::Error;

/// Errors that can occur when loading a texture.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DDS parsing or layout error.
    #[error("DDS error: {0}")]
    Dds(#[from] mipkit_dds::Error),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The input is not in a recognised container format.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for texture loading.
pub type Result<T> = std::result::Result<T, Error>;
