//! micrograin - Segmentation and crystallographic grouping of microstructures
//!
//! # Overview
//!
//! micrograin turns per-voxel crystal orientation maps into features and
//! parent groups:
//!
//! - Segmentation of voxels into features by misorientation or c-axis
//!   alignment (seeded flood fill)
//! - Feature statistics (average orientations, phases, neighbor lists,
//!   kernel-averaged misorientation)
//! - Grouping of neighboring features into colonies and twins (graph flood
//!   fill)
//! - Seedable randomization of feature and parent ids
//!
//! # Example
//!
//! ```
//! use micrograin::segment::{SegmentOptions, segment_features};
//! use micrograin::stats::find_neighbors;
//! use micrograin::{CrystalStructure, DataArray, Geometry, VoxelGrid};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // Two voxels of phase 1 separated by a phase 0 voxel
//! let geom = Geometry::new(3, 1, 1).unwrap();
//! let phases = DataArray::from_vec("Phases", 1, vec![1, 0, 1]).unwrap();
//! let mut quats = DataArray::new("Quats", 3, 4).unwrap();
//! for i in 0..3 {
//!     quats.tuple_mut(i)[3] = 1.0;
//! }
//! let table = [CrystalStructure::Unknown, CrystalStructure::CubicHigh];
//! let grid = VoxelGrid::new(geom, &phases, &quats, &table).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let out = segment_features(&grid, &SegmentOptions::default(), &mut rng, None).unwrap();
//! assert_eq!(out.value.feature_ids.as_slice(), &[1, 0, 2]);
//!
//! let graph = find_neighbors(&geom, &out.value.feature_ids, 3).unwrap();
//! assert_eq!(graph.num_entries(), 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use micrograin_core::*;

// Re-export pass crates as modules to avoid name conflicts
pub use micrograin_group as group;
pub use micrograin_segment as segment;
pub use micrograin_stats as stats;
