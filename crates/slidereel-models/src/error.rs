//! Errors raised by model construction and pure parsing helpers.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or validating models.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A metadata value was not a plain numeric fraction.
    #[error("invalid numeric fraction: {0:?}")]
    InvalidFraction(String),

    /// A file extension is not one of the supported photo/video extensions.
    #[error("unsupported media file: {0}")]
    UnsupportedMedia(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    pub fn invalid_fraction(value: impl Into<String>) -> Self {
        Self::InvalidFraction(value.into())
    }

    pub fn unsupported_media(name: impl Into<String>) -> Self {
        Self::UnsupportedMedia(name.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
