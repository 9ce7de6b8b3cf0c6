//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading data, configuring or training the ACGAN
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid argument to an operation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dataset layout or content problem
    #[error("Data error: {0}")]
    Data(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Tensor shape differs from what a model expects
    #[error("Shape mismatch for {name}: expected {expected:?}, got {got:?}")]
    ShapeMismatch { name: String, expected: Vec<usize>, got: Vec<usize> },

    /// Run directories are never reused
    #[error("Run directory already exists: {0}")]
    RunExists(PathBuf),
}
