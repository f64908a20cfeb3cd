//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building regression fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// Core library error while assembling a fixture
    #[error("core error: {0}")]
    Core(#[from] micrograin_core::Error),

    /// A fixture region lies outside the grid
    #[error("region {region:?} exceeds grid dimensions {dims:?}")]
    RegionOutOfBounds {
        region: [(usize, usize); 3],
        dims: (usize, usize, usize),
    },

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Label comparison failed
    #[error("label comparison failed at index {index}: first difference at voxel {voxel}")]
    LabelMismatch { index: usize, voxel: usize },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
