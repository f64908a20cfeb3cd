//! Error types for micrograin-core
//!
//! Provides a unified error type for the data model: grid geometry, typed
//! arrays, orientation math and crystal symmetry lookups. Every variant
//! carries a stable numeric code (see [`Error::code`]) so that callers can
//! branch on the failure without parsing the message.

use thiserror::Error;

/// micrograin-core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid grid dimensions
    #[error("invalid grid dimensions: {nx}x{ny}x{nz}")]
    InvalidDimension { nx: usize, ny: usize, nz: usize },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Array tuple count does not match the geometry or table it belongs to
    #[error("array '{name}' has {actual} tuples, expected {expected}")]
    TupleCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Array component count does not match what the operation reads
    #[error("array '{name}' has {actual} components, expected {expected}")]
    ComponentCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Crystal structure index outside the supported Laue classes
    #[error("invalid crystal structure index: {0}")]
    InvalidCrystalStructure(u32),

    /// Phase id with no entry in the crystal structure table
    #[error("phase {phase} has no crystal structure entry (table holds {len} phases)")]
    UnknownPhase { phase: i32, len: usize },

    /// Quaternion with zero (or non-finite) norm
    #[error("degenerate quaternion: [{0}, {1}, {2}, {3}]")]
    DegenerateQuaternion(f64, f64, f64, f64),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Stable numeric code for this error
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidDimension { .. } => -1000,
            Error::IndexOutOfBounds { .. } => -1001,
            Error::TupleCountMismatch { .. } => -1002,
            Error::ComponentCountMismatch { .. } => -1003,
            Error::InvalidCrystalStructure(_) => -1010,
            Error::UnknownPhase { .. } => -1011,
            Error::DegenerateQuaternion(..) => -1020,
            Error::InvalidParameter(_) => -1030,
        }
    }
}

/// Result type alias for micrograin-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            Error::InvalidDimension {
                nx: 0,
                ny: 1,
                nz: 1,
            },
            Error::IndexOutOfBounds { index: 3, len: 2 },
            Error::TupleCountMismatch {
                name: "Phases".into(),
                expected: 4,
                actual: 3,
            },
            Error::ComponentCountMismatch {
                name: "Quats".into(),
                expected: 4,
                actual: 3,
            },
            Error::InvalidCrystalStructure(42),
            Error::UnknownPhase { phase: 3, len: 2 },
            Error::DegenerateQuaternion(0.0, 0.0, 0.0, 0.0),
            Error::InvalidParameter("x".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidCrystalStructure(42);
        assert_eq!(err.to_string(), "invalid crystal structure index: 42");
    }
}
