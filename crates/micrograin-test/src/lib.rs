//! micrograin-test - Regression test framework for micrograin
//!
//! This crate provides the harness used by the `tests/*_reg.rs` suites of
//! the other crates:
//!
//! - [`RegParams`] - Numbered value and label comparisons with a summary
//! - [`synthetic`] - Hand-built voxel grids and labeling property checks
//!
//! # Usage
//!
//! ```ignore
//! use micrograin_test::RegParams;
//!
//! let mut rp = RegParams::new("segment");
//! rp.compare_values(2.0, feature_count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;
pub mod synthetic;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use synthetic::{SyntheticGrid, bunge, labels_complete, labels_connected, x_stripes};
