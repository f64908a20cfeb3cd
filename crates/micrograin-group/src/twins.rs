//! Twin merging
//!
//! Neighboring cubic (m-3m) features of the same phase are merged when
//! their misorientation is a Σ3 twin relationship, 60° about <111>.

use crate::colony::validate_tolerances;
use crate::engine::GroupingStrategy;
use crate::error::GroupResult;
use crate::features::FeatureData;
use crate::merge::{MergeInputs, MergeSettings, ParentGrouping, run_merge};
use micrograin_core::{CancelToken, CrystalStructure, Outcome, Warning, push_warning};
use rand::Rng;

/// Warning code for phases that can never be twin-merged
pub const UNSUPPORTED_TWIN_PHASE: i32 = -3101;

const TWIN_ANGLE: f64 = 60.0;
const UNIT_111: f64 = 0.577_350_269_189_625_8;

/// Σ3 twin predicate over feature average orientations
#[derive(Debug, Clone)]
pub struct TwinStrategy<'a> {
    features: FeatureData<'a>,
    angle_tolerance: f64,
    axis_tolerance: f64,
}

impl<'a> TwinStrategy<'a> {
    /// Create the predicate; both tolerances in degrees
    pub fn new(features: FeatureData<'a>, angle_tolerance: f64, axis_tolerance: f64) -> Self {
        Self {
            features,
            angle_tolerance,
            axis_tolerance: axis_tolerance.to_radians(),
        }
    }

    /// Whether two features are twin related
    pub fn is_twin_pair(&self, reference: usize, neighbor: usize) -> bool {
        let phase = self.features.phase(reference);
        if phase <= 0 || phase != self.features.phase(neighbor) {
            return false;
        }
        let structure = self.features.crystal_structure(reference);
        if structure != CrystalStructure::CubicHigh {
            return false;
        }
        let Some(ops) = structure.laue_ops() else {
            return false;
        };
        let miso = ops.fundamental_zone_misorientation(
            &self.features.orientation(reference),
            &self.features.orientation(neighbor),
        );
        let dot = (miso.axis.x.abs() + miso.axis.y.abs() + miso.axis.z.abs()) * UNIT_111;
        let axis_diff = dot.clamp(-1.0, 1.0).acos();
        let angle_diff = (miso.angle_degrees() - TWIN_ANGLE).abs();
        axis_diff < self.axis_tolerance && angle_diff < self.angle_tolerance
    }
}

impl GroupingStrategy for TwinStrategy<'_> {
    fn determine_grouping(&self, reference: usize, neighbor: usize, _parent_id: i32) -> bool {
        self.is_twin_pair(reference, neighbor)
    }
}

/// Options for twin merging
#[derive(Debug, Clone)]
pub struct TwinOptions {
    /// Misorientation angle tolerance in degrees
    pub angle_tolerance: f64,
    /// Misorientation axis tolerance in degrees
    pub axis_tolerance: f64,
    pub use_non_contiguous_neighbors: bool,
    pub random_parent_ids: bool,
}

impl Default for TwinOptions {
    fn default() -> Self {
        Self {
            angle_tolerance: 2.0,
            axis_tolerance: 2.0,
            use_non_contiguous_neighbors: false,
            random_parent_ids: true,
        }
    }
}

impl TwinOptions {
    pub fn new(angle_tolerance: f64, axis_tolerance: f64) -> Self {
        Self {
            angle_tolerance,
            axis_tolerance,
            ..Default::default()
        }
    }

    pub fn with_non_contiguous_neighbors(mut self, enabled: bool) -> Self {
        self.use_non_contiguous_neighbors = enabled;
        self
    }

    pub fn with_random_parent_ids(mut self, enabled: bool) -> Self {
        self.random_parent_ids = enabled;
        self
    }

    pub fn validate(&self) -> GroupResult<()> {
        validate_tolerances(self.angle_tolerance, self.axis_tolerance)
    }
}

/// Merge twin-related neighboring features into parents
///
/// Non-cubic-high phases are reported as warnings.
///
/// # Errors
///
/// Same conditions as [`crate::merge_colonies`].
pub fn merge_twins<R: Rng + ?Sized>(
    inputs: &MergeInputs<'_>,
    options: &TwinOptions,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> GroupResult<Outcome<ParentGrouping>> {
    options.validate()?;

    let mut warnings = Vec::new();
    for phase in inputs.features.phases_in_use() {
        let structure = inputs.features.crystal_structures()[phase as usize];
        if structure != CrystalStructure::CubicHigh {
            push_warning(
                &mut warnings,
                Warning::new(
                    UNSUPPORTED_TWIN_PHASE,
                    format!("phase {phase} ({structure}) is not cubic-high and will not be merged"),
                ),
            );
        }
    }

    let mut strategy =
        TwinStrategy::new(inputs.features, options.angle_tolerance, options.axis_tolerance);
    run_merge(
        inputs,
        &mut strategy,
        MergeSettings {
            use_non_contiguous_neighbors: options.use_non_contiguous_neighbors,
            random_parent_ids: options.random_parent_ids,
        },
        rng,
        cancel,
        warnings,
    )
}
