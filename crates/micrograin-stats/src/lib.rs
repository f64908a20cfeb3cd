//! micrograin-stats - Orientation statistics over segmented grids
//!
//! This crate provides the statistics that sit between segmentation and
//! grouping:
//!
//! - **Kernel-averaged misorientation** - Mean misorientation of each voxel to
//!   its same-feature neighbors in a rectangular window
//! - **Feature statistics** - Average orientations, feature phases and the
//!   per-voxel deviation from the feature average
//! - **Neighbors** - Face-contact adjacency between features
//!
//! The per-voxel kernels run in parallel over z-planes and poll the
//! cancellation token once per plane.
//!
//! # Example
//!
//! ```
//! use micrograin_core::{CrystalStructure, DataArray, Geometry, VoxelGrid};
//! use micrograin_stats::{KernelOptions, kernel_average_misorientations};
//!
//! let geom = Geometry::new(3, 3, 1).unwrap();
//! let phases = DataArray::with_value("Phases", 9, 1, 1).unwrap();
//! let mut quats = DataArray::new("Quats", 9, 4).unwrap();
//! for i in 0..9 {
//!     quats.tuple_mut(i)[3] = 1.0;
//! }
//! let table = [CrystalStructure::Unknown, CrystalStructure::CubicHigh];
//! let grid = VoxelGrid::new(geom, &phases, &quats, &table).unwrap();
//! let ids = DataArray::with_value("FeatureIds", 9, 1, 1).unwrap();
//!
//! let kam = kernel_average_misorientations(&grid, &ids, &KernelOptions::new(1, 1, 0), None)
//!     .unwrap();
//! assert!(kam.value.as_slice().iter().all(|&v| v.abs() < 1e-4));
//! ```

pub mod error;
pub mod features;
pub mod kernel;
pub mod neighbors;
mod voxel_map;

pub use micrograin_core;

pub use error::{StatsError, StatsResult};
pub use features::{average_orientations, feature_phases, feature_reference_misorientations};
pub use kernel::{KernelOptions, kernel_average_misorientations};
pub use neighbors::find_neighbors;
