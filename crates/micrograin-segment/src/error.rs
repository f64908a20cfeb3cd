//! Error types for micrograin-segment

use micrograin_core::CrystalStructure;
use thiserror::Error;

/// Errors that can occur during segmentation
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] micrograin_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A completed pass discovered no feature
    #[error(
        "no usable features found ({found} discovered); the misorientation threshold is likely too strict"
    )]
    InsufficientFeatures { found: usize },

    /// C-axis segmentation over a phase without a c-axis
    #[error("phase {phase} has crystal structure {structure}; c-axis segmentation requires hexagonal phases")]
    NonHexagonalPhase {
        phase: i32,
        structure: CrystalStructure,
    },
}

impl SegmentError {
    /// Stable numeric code for this error
    pub fn code(&self) -> i32 {
        match self {
            SegmentError::Core(e) => e.code(),
            SegmentError::InvalidParameters(_) => -2000,
            SegmentError::InsufficientFeatures { .. } => -2001,
            SegmentError::NonHexagonalPhase { .. } => -2002,
        }
    }
}

/// Result type for segmentation operations
pub type SegmentResult<T> = Result<T, SegmentError>;
