//! Feature segmentation by misorientation
//!
//! Neighboring voxels belong to the same feature when they share a phase
//! and their misorientation, reduced by the phase's crystal symmetry, is
//! below a tolerance.

use crate::engine::{LinearSeedScan, Segmenter, SegmentationEngine};
use crate::error::{SegmentError, SegmentResult};
use crate::randomize::randomize_feature_ids;
use micrograin_core::{ActiveFlags, CancelToken, DataArray, Outcome, Stencil, VoxelGrid};
use rand::Rng;

/// Options for misorientation segmentation
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    /// Largest misorientation (degrees) between voxels of one feature
    pub misorientation_tolerance: f64,
    /// Grid connectivity used to grow features
    pub stencil: Stencil,
    /// Shuffle feature ids after segmentation
    pub randomize_feature_ids: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            misorientation_tolerance: 5.0,
            stencil: Stencil::SixWay,
            randomize_feature_ids: false,
        }
    }
}

impl SegmentOptions {
    /// Create options with the given tolerance in degrees
    pub fn new(misorientation_tolerance: f64) -> Self {
        Self {
            misorientation_tolerance,
            ..Default::default()
        }
    }

    /// Set the connectivity stencil
    pub fn with_stencil(mut self, stencil: Stencil) -> Self {
        self.stencil = stencil;
        self
    }

    /// Enable or disable feature id randomization
    pub fn with_randomize_feature_ids(mut self, randomize: bool) -> Self {
        self.randomize_feature_ids = randomize;
        self
    }

    /// Check the tolerance is a usable angle
    pub fn validate(&self) -> SegmentResult<()> {
        validate_tolerance(self.misorientation_tolerance)
    }
}

pub(crate) fn validate_tolerance(tolerance: f64) -> SegmentResult<()> {
    if !tolerance.is_finite() || tolerance <= 0.0 || tolerance > 180.0 {
        return Err(SegmentError::InvalidParameters(format!(
            "misorientation tolerance must be in (0, 180] degrees, got {tolerance}"
        )));
    }
    Ok(())
}

/// Voxels join when same-phase misorientation is below a tolerance
#[derive(Debug, Clone)]
pub struct MisorientationSegmenter<'a> {
    grid: VoxelGrid<'a>,
    tolerance: f64,
}

impl<'a> MisorientationSegmenter<'a> {
    /// Create a segmenter with the tolerance in degrees
    pub fn new(grid: VoxelGrid<'a>, tolerance_degrees: f64) -> Self {
        Self {
            grid,
            tolerance: tolerance_degrees.to_radians(),
        }
    }
}

impl Segmenter for MisorientationSegmenter<'_> {
    fn is_candidate(&self, voxel: usize) -> bool {
        self.grid.is_eligible(voxel)
    }

    fn determine_grouping(&self, reference: usize, neighbor: usize, _feature_id: i32) -> bool {
        let phase = self.grid.phase(reference);
        if phase <= 0 || phase != self.grid.phase(neighbor) {
            return false;
        }
        let Some(ops) = self.grid.laue_ops(reference) else {
            return false;
        };
        let w = ops.misorientation_angle(
            &self.grid.orientation(reference),
            &self.grid.orientation(neighbor),
        );
        w < self.tolerance
    }
}

/// Labeled grid produced by a segmentation driver
#[derive(Debug, Clone)]
pub struct FeatureSegmentation {
    /// One feature id per voxel, 0 for background
    pub feature_ids: DataArray<i32>,
    /// One flag per feature slot; slot 0 is inactive
    pub active: ActiveFlags,
    pub feature_count: usize,
}

/// Segment a voxel grid into features by misorientation
///
/// # Arguments
///
/// * `grid` - Validated cell data (attach a mask to restrict eligibility)
/// * `options` - Tolerance, stencil and id randomization
/// * `rng` - Generator for the optional id shuffle
/// * `cancel` - Polled once per feature
///
/// # Errors
///
/// Returns [`SegmentError::InvalidParameters`] for a bad tolerance and
/// [`SegmentError::InsufficientFeatures`] when no voxel is eligible to
/// seed a feature.
pub fn segment_features<R: Rng + ?Sized>(
    grid: &VoxelGrid<'_>,
    options: &SegmentOptions,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> SegmentResult<Outcome<FeatureSegmentation>> {
    options.validate()?;
    let segmenter = MisorientationSegmenter::new(*grid, options.misorientation_tolerance);
    run_driver(
        grid,
        &segmenter,
        options.stencil,
        options.randomize_feature_ids,
        rng,
        cancel,
    )
}

/// Shared tail of the segmentation drivers
pub(crate) fn run_driver<S: Segmenter + ?Sized, R: Rng + ?Sized>(
    grid: &VoxelGrid<'_>,
    segmenter: &S,
    stencil: Stencil,
    randomize: bool,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> SegmentResult<Outcome<FeatureSegmentation>> {
    let mut feature_ids = DataArray::new("FeatureIds", grid.num_voxels(), 1)?;
    let mut engine = SegmentationEngine::new(*grid.geometry(), stencil);
    if let Some(token) = cancel {
        engine = engine.with_cancel(token);
    }
    let outcome = engine.run(segmenter, &mut LinearSeedScan, &mut feature_ids)?;

    if randomize && !outcome.cancelled {
        randomize_feature_ids(&mut feature_ids, outcome.value.feature_count, rng);
    }

    Ok(outcome.map(|seg| FeatureSegmentation {
        feature_ids,
        active: seg.active,
        feature_count: seg.feature_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use micrograin_core::nalgebra::Vector3;
    use micrograin_core::{CrystalStructure, Geometry, Orientation};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TABLE: [CrystalStructure; 2] = [CrystalStructure::Unknown, CrystalStructure::CubicHigh];

    fn two_grain_arrays() -> (Geometry, DataArray<i32>, DataArray<f32>) {
        let geom = Geometry::new(4, 2, 1).unwrap();
        let phases = DataArray::with_value("Phases", 8, 1, 1).unwrap();
        let mut quats = DataArray::new("Quats", 8, 4).unwrap();
        let a = Orientation::identity();
        let b = Orientation::from_axis_angle(&Vector3::z(), 20f64.to_radians());
        for idx in 0..8 {
            let (x, _, _) = geom.coords(idx);
            let o = if x < 2 { a } else { b };
            quats.tuple_mut(idx).copy_from_slice(&o.to_xyzw());
        }
        (geom, phases, quats)
    }

    #[test]
    fn test_options_validate() {
        assert!(SegmentOptions::default().validate().is_ok());
        assert!(SegmentOptions::new(0.0).validate().is_err());
        assert!(SegmentOptions::new(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_two_grains() {
        let (geom, phases, quats) = two_grain_arrays();
        let grid = VoxelGrid::new(geom, &phases, &quats, &TABLE).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let out = segment_features(&grid, &SegmentOptions::new(5.0), &mut rng, None).unwrap();
        let seg = out.value;
        assert_eq!(seg.feature_count, 2);
        assert_eq!(seg.feature_ids.as_slice(), &[1, 1, 2, 2, 1, 1, 2, 2]);
        assert_eq!(seg.active.count_active(), 2);
    }

    #[test]
    fn test_loose_tolerance_merges() {
        let (geom, phases, quats) = two_grain_arrays();
        let grid = VoxelGrid::new(geom, &phases, &quats, &TABLE).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let out = segment_features(&grid, &SegmentOptions::new(25.0), &mut rng, None).unwrap();
        assert_eq!(out.value.feature_count, 1);
        assert!(out.value.feature_ids.as_slice().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_no_indexed_voxels() {
        let (geom, mut phases, quats) = two_grain_arrays();
        phases.fill(0);
        let grid = VoxelGrid::new(geom, &phases, &quats, &TABLE).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = segment_features(&grid, &SegmentOptions::new(5.0), &mut rng, None).unwrap_err();
        assert!(matches!(err, SegmentError::InsufficientFeatures { found: 0 }));
        assert_eq!(err.code(), -2001);
    }

    #[test]
    fn test_phase_change_splits() {
        let (geom, mut phases, mut quats) = two_grain_arrays();
        for idx in 0..8 {
            quats.tuple_mut(idx).copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
        }
        phases.set_value(3, 2);
        phases.set_value(7, 2);
        let table = [
            CrystalStructure::Unknown,
            CrystalStructure::CubicHigh,
            CrystalStructure::CubicHigh,
        ];
        let grid = VoxelGrid::new(geom, &phases, &quats, &table).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let out = segment_features(&grid, &SegmentOptions::new(5.0), &mut rng, None).unwrap();
        assert_eq!(out.value.feature_ids.as_slice(), &[1, 1, 1, 2, 1, 1, 1, 2]);
    }
}
