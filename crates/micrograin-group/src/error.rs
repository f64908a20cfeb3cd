//! Error types for micrograin-group

use thiserror::Error;

/// Errors that can occur while grouping features
#[derive(Debug, Error)]
pub enum GroupError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] micrograin_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// No feature could seed a parent group
    #[error("no usable parent groups found; check feature phases and tolerances")]
    NoGroupsFound,
}

impl GroupError {
    /// Stable numeric code for this error
    pub fn code(&self) -> i32 {
        match self {
            GroupError::Core(e) => e.code(),
            GroupError::InvalidParameters(_) => -3000,
            GroupError::NoGroupsFound => -3001,
        }
    }
}

/// Result type for grouping operations
pub type GroupResult<T> = Result<T, GroupError>;
