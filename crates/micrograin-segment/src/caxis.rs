//! Feature segmentation by c-axis alignment
//!
//! Hexagonal voxels join a feature when their c-axes, expressed in the
//! sample frame, are parallel or antiparallel within a tolerance. Rotations
//! about the c-axis are ignored.

use crate::engine::Segmenter;
use crate::error::{SegmentError, SegmentResult};
use crate::misorientation::{FeatureSegmentation, run_driver, validate_tolerance};
use micrograin_core::nalgebra::Vector3;
use micrograin_core::{CancelToken, Outcome, Stencil, VoxelGrid, angle_between};
use rand::Rng;
use std::f64::consts::PI;

/// Options for c-axis segmentation
#[derive(Debug, Clone)]
pub struct CAxisSegmentOptions {
    /// Largest c-axis misalignment (degrees) between voxels of one feature
    pub misorientation_tolerance: f64,
    /// Grid connectivity used to grow features
    pub stencil: Stencil,
    /// Shuffle feature ids after segmentation
    pub randomize_feature_ids: bool,
}

impl Default for CAxisSegmentOptions {
    fn default() -> Self {
        Self {
            misorientation_tolerance: 5.0,
            stencil: Stencil::SixWay,
            randomize_feature_ids: false,
        }
    }
}

impl CAxisSegmentOptions {
    pub fn new(misorientation_tolerance: f64) -> Self {
        Self {
            misorientation_tolerance,
            ..Default::default()
        }
    }

    pub fn with_stencil(mut self, stencil: Stencil) -> Self {
        self.stencil = stencil;
        self
    }

    pub fn with_randomize_feature_ids(mut self, randomize: bool) -> Self {
        self.randomize_feature_ids = randomize;
        self
    }

    pub fn validate(&self) -> SegmentResult<()> {
        validate_tolerance(self.misorientation_tolerance)
    }
}

/// Voxels join when their sample-frame c-axes are aligned
#[derive(Debug, Clone)]
pub struct CAxisSegmenter<'a> {
    grid: VoxelGrid<'a>,
    tolerance: f64,
}

impl<'a> CAxisSegmenter<'a> {
    /// Create a segmenter with the tolerance in degrees
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::NonHexagonalPhase`] if an eligible voxel
    /// belongs to a phase without a c-axis.
    pub fn new(grid: VoxelGrid<'a>, tolerance_degrees: f64) -> SegmentResult<Self> {
        for phase in grid.phases_in_use() {
            let structure = grid.crystal_structures()[phase as usize];
            if !structure.is_hexagonal() {
                return Err(SegmentError::NonHexagonalPhase { phase, structure });
            }
        }
        Ok(Self {
            grid,
            tolerance: tolerance_degrees.to_radians(),
        })
    }

    fn c_axis(&self, voxel: usize) -> Vector3<f64> {
        self.grid
            .orientation(voxel)
            .crystal_to_sample(&Vector3::z())
    }
}

impl Segmenter for CAxisSegmenter<'_> {
    fn is_candidate(&self, voxel: usize) -> bool {
        self.grid.is_eligible(voxel)
    }

    fn determine_grouping(&self, reference: usize, neighbor: usize, _feature_id: i32) -> bool {
        let phase = self.grid.phase(reference);
        if phase <= 0 || phase != self.grid.phase(neighbor) {
            return false;
        }
        let w = angle_between(&self.c_axis(reference), &self.c_axis(neighbor));
        w < self.tolerance || PI - w < self.tolerance
    }
}

/// Segment a hexagonal voxel grid into features by c-axis alignment
///
/// # Errors
///
/// Returns [`SegmentError::InvalidParameters`] for a bad tolerance,
/// [`SegmentError::NonHexagonalPhase`] when a non-hexagonal phase is in use,
/// and [`SegmentError::InsufficientFeatures`] when no voxel is eligible to
/// seed a feature.
pub fn segment_features_by_c_axis<R: Rng + ?Sized>(
    grid: &VoxelGrid<'_>,
    options: &CAxisSegmentOptions,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> SegmentResult<Outcome<FeatureSegmentation>> {
    options.validate()?;
    let segmenter = CAxisSegmenter::new(*grid, options.misorientation_tolerance)?;
    run_driver(
        grid,
        &segmenter,
        options.stencil,
        options.randomize_feature_ids,
        rng,
        cancel,
    )
}
