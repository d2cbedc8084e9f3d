//! Crate-level error type

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can stop a surface or coordinator from being set up.
///
/// Nothing that happens to an individual dropped item ends up here: item
/// failures degrade the descriptor or drop it from the batch.
#[derive(Debug, Error)]
pub enum DropError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for drop operations
pub type DropResult<T> = Result<T, DropError>;
