//! micrograin-segment - Feature segmentation of orientation fields
//!
//! This crate labels voxel grids into features (grains):
//!
//! - **Segmentation engine** - Seeded breadth-first region growing with a
//!   pluggable similarity test and seed policy
//! - **Misorientation segmentation** - Same-phase voxels within a
//!   symmetry-reduced misorientation tolerance
//! - **C-axis segmentation** - Hexagonal voxels with aligned c-axes
//! - **Id randomization** - Seedable permutation of feature ids fixing 0
//!
//! # Example
//!
//! ```
//! use micrograin_core::{CrystalStructure, DataArray, Geometry, VoxelGrid};
//! use micrograin_segment::{SegmentOptions, segment_features};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let geom = Geometry::new(4, 1, 1).unwrap();
//! let phases = DataArray::from_vec("Phases", 1, vec![1, 1, 0, 1]).unwrap();
//! let mut quats = DataArray::new("Quats", 4, 4).unwrap();
//! for i in 0..4 {
//!     quats.tuple_mut(i)[3] = 1.0;
//! }
//! let table = [CrystalStructure::Unknown, CrystalStructure::CubicHigh];
//! let grid = VoxelGrid::new(geom, &phases, &quats, &table).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let out = segment_features(&grid, &SegmentOptions::default(), &mut rng, None).unwrap();
//! assert_eq!(out.value.feature_ids.as_slice(), &[1, 1, 0, 2]);
//! ```

pub mod caxis;
pub mod engine;
pub mod error;
pub mod misorientation;
pub mod randomize;

pub use micrograin_core;

pub use error::{SegmentError, SegmentResult};

pub use engine::{LinearSeedScan, SeedPolicy, Segmentation, SegmentationEngine, Segmenter};

pub use misorientation::{
    FeatureSegmentation, MisorientationSegmenter, SegmentOptions, segment_features,
};

pub use caxis::{CAxisSegmentOptions, CAxisSegmenter, segment_features_by_c_axis};

pub use randomize::{feature_id_permutation, randomize_feature_ids};
