//! Error types for micrograin-stats

use thiserror::Error;

/// Errors that can occur while computing statistics
#[derive(Debug, Error)]
pub enum StatsError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] micrograin_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl StatsError {
    /// Stable numeric code for this error
    pub fn code(&self) -> i32 {
        match self {
            StatsError::Core(e) => e.code(),
            StatsError::InvalidParameters(_) => -4000,
        }
    }
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
