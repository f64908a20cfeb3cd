//! micrograin core - data structures for microstructure analysis
//!
//! This crate provides the data model shared by the segmentation, grouping
//! and statistics crates:
//!
//! - [`Geometry`] / [`Stencil`] - Regular voxel grids and neighbor stencils
//! - [`DataArray`] - Named multi-component arrays (cell, feature, ensemble)
//! - [`VoxelGrid`] - Validated view of per-voxel phases, quaternions and mask
//! - [`SlotTable`] / [`ActiveFlags`] - Side tables that grow with new ids
//! - [`Orientation`] / [`AxisAngle`] - Crystal orientations
//! - [`CrystalStructure`] / [`LaueOps`] - Symmetry operators and misorientation
//! - [`AdjacencyGraph`] - Feature neighbor lists
//! - [`CancelToken`] - Coarse-grained cooperative cancellation
//! - [`Outcome`] / [`Warning`] - Successful results with accumulated warnings
//! - [`relabel`] - Id permutations used by the randomization passes
//!
//! # Example
//!
//! ```
//! use micrograin_core::{CrystalStructure, Orientation};
//! use nalgebra::Vector3;
//!
//! let ops = CrystalStructure::CubicHigh.laue_ops().unwrap();
//! let a = Orientation::identity();
//! let b = Orientation::from_axis_angle(&Vector3::z(), 3f64.to_radians());
//! let angle = ops.misorientation_angle(&a, &b).to_degrees();
//! assert!((angle - 3.0).abs() < 1e-9);
//! ```

pub mod array;
pub mod cancel;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod orientation;
pub mod outcome;
pub mod relabel;
pub mod symmetry;
pub mod table;

// Re-export the linear algebra crate used by the orientation types
pub use nalgebra;

pub use array::DataArray;
pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use geometry::{Geometry, Stencil};
pub use graph::AdjacencyGraph;
pub use grid::VoxelGrid;
pub use orientation::{AxisAngle, Orientation, angle_between};
pub use outcome::{Outcome, Warning, push_warning};
pub use relabel::{apply_permutation, invert_permutation, is_relabeling};
pub use symmetry::{CrystalStructure, LaueOps};
pub use table::{ActiveFlags, SlotTable};

/// Label conventions shared by every pass
pub mod labels {
    /// Feature id of unassigned / background voxels
    pub const BACKGROUND: i32 = 0;
    /// Parent id of features not yet placed in a group
    pub const UNGROUPED: i32 = -1;
}
