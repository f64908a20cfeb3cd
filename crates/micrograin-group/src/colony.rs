//! Colony detection
//!
//! Features are merged into colonies when neighboring pairs show a known
//! transformation relationship:
//!
//! - two hexagonal (6/mmm) features of the same phase whose misorientation
//!   matches one of five alpha-alpha variant relationships
//! - a cubic (m-3m) and a hexagonal (6/mmm) feature related by the Burgers
//!   orientation relationship, (110)β ∥ (0001)α and [1-11]β ∥ [2-1-10]α

use crate::engine::GroupingStrategy;
use crate::error::{GroupError, GroupResult};
use crate::features::FeatureData;
use crate::merge::{MergeInputs, MergeSettings, ParentGrouping, run_merge};
use micrograin_core::{
    CancelToken, CrystalStructure, Orientation, Outcome, Warning, angle_between, push_warning,
};
use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use std::sync::LazyLock;

/// Warning code for phases that can never join a colony
pub const UNSUPPORTED_COLONY_PHASE: i32 = -3100;

const SIN_120: f64 = 0.866_025_403_784_438_6;

/// Misorientation (angle in degrees, reduced axis) between alpha variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantRelationship {
    pub angle: f64,
    pub axis: [f64; 3],
}

/// The five alpha-alpha variant relationships of a Burgers transformation
pub const ALPHA_VARIANTS: [VariantRelationship; 5] = [
    VariantRelationship {
        angle: 10.53,
        axis: [0.0, 0.0, 1.0],
    },
    VariantRelationship {
        angle: 90.00,
        axis: [0.9958, 0.0917, 0.0],
    },
    VariantRelationship {
        angle: 60.00,
        axis: [1.0, 0.0, 0.0],
    },
    VariantRelationship {
        angle: 60.83,
        axis: [0.9834, 0.0905, 0.1570],
    },
    VariantRelationship {
        angle: 63.26,
        axis: [0.9549, 0.0, 0.2969],
    },
];

impl VariantRelationship {
    /// Whether a reduced misorientation matches this variant
    ///
    /// `angle` and `angle_tolerance` are in degrees, `axis_tolerance` in
    /// radians. The axis difference compares absolute components.
    pub fn matches(
        &self,
        angle: f64,
        axis: &Vector3<f64>,
        angle_tolerance: f64,
        axis_tolerance: f64,
    ) -> bool {
        let dot = axis.x.abs() * self.axis[0] + axis.y.abs() * self.axis[1] + axis.z.abs() * self.axis[2];
        let axis_diff = dot.clamp(-1.0, 1.0).acos();
        let angle_diff = (angle - self.angle).abs();
        axis_diff < axis_tolerance && angle_diff < angle_tolerance
    }
}

/// The 12 cubic-to-hexagonal crystal direction correspondences
///
/// Column 0 is a β <111> direction parallel to α [2-1-10], column 2 the
/// β {110} normal parallel to α [0001], column 1 completes the right-handed
/// frame.
static BURGERS_CORRESPONDENCES: LazyLock<Vec<Matrix3<f64>>> = LazyLock::new(|| {
    let normals = [
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(1.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 1.0),
        Vector3::new(0.0, 1.0, -1.0),
    ];
    let mut frames = Vec::with_capacity(12);
    for n in normals {
        for (sy, sz) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            let d = Vector3::new(1.0, sy, sz);
            if d.dot(&n) != 0.0 {
                continue;
            }
            let d = d.normalize();
            let n = n.normalize();
            frames.push(Matrix3::from_columns(&[d, n.cross(&d), n]));
        }
    }
    frames
});

/// Crystal direction correspondences used by [`check_for_burgers`]
pub fn burgers_correspondences() -> &'static [Matrix3<f64>] {
    &BURGERS_CORRESPONDENCES
}

fn within(angle: f64, tolerance: f64) -> bool {
    let degrees = angle.to_degrees();
    degrees < tolerance || 180.0 - degrees < tolerance
}

/// Whether a cubic β and a hexagonal α orientation obey the Burgers relation
///
/// For each correspondence the β {110} pole must be parallel (or
/// antiparallel) to the α c-axis within `tolerance` degrees, and the β
/// <111> direction must line up with one of the three α a-directions.
pub fn check_for_burgers(beta: &Orientation, alpha: &Orientation, tolerance: f64) -> bool {
    let g_beta_t = beta.to_matrix().transpose();
    let g_alpha_t = alpha.to_matrix().transpose();

    let c_alpha: Vector3<f64> = g_alpha_t.column(2).into_owned();
    let a1: Vector3<f64> = g_alpha_t.column(0).into_owned();
    let y: Vector3<f64> = g_alpha_t.column(1).into_owned();
    let a_directions = [a1, -0.5 * a1 + SIN_120 * y, -0.5 * a1 - SIN_120 * y];

    for m in burgers_correspondences() {
        let mat = g_beta_t * m;
        let pole: Vector3<f64> = mat.column(2).into_owned();
        if !within(angle_between(&pole, &c_alpha), tolerance) {
            continue;
        }
        let direction: Vector3<f64> = mat.column(0).into_owned();
        if a_directions
            .iter()
            .any(|a| within(angle_between(&direction, a), tolerance))
        {
            return true;
        }
    }
    false
}

/// Colony predicate over feature average orientations
#[derive(Debug, Clone)]
pub struct ColonyStrategy<'a> {
    features: FeatureData<'a>,
    angle_tolerance: f64,
    axis_tolerance: f64,
}

impl<'a> ColonyStrategy<'a> {
    /// Create the predicate; both tolerances in degrees
    pub fn new(features: FeatureData<'a>, angle_tolerance: f64, axis_tolerance: f64) -> Self {
        Self {
            features,
            angle_tolerance,
            axis_tolerance: axis_tolerance.to_radians(),
        }
    }

    /// Whether two features belong to the same colony
    pub fn is_colony_pair(&self, reference: usize, neighbor: usize) -> bool {
        let phase1 = self.features.phase(reference);
        let phase2 = self.features.phase(neighbor);
        if phase1 <= 0 || phase2 <= 0 {
            return false;
        }
        let cs1 = self.features.crystal_structure(reference);
        let cs2 = self.features.crystal_structure(neighbor);
        let q1 = self.features.orientation(reference);
        let q2 = self.features.orientation(neighbor);

        match (cs1, cs2) {
            (CrystalStructure::HexagonalHigh, CrystalStructure::HexagonalHigh)
                if phase1 == phase2 =>
            {
                let Some(ops) = cs1.laue_ops() else {
                    return false;
                };
                let miso = ops.fundamental_zone_misorientation(&q1, &q2);
                let angle = miso.angle_degrees();
                ALPHA_VARIANTS.iter().any(|v| {
                    v.matches(angle, &miso.axis, self.angle_tolerance, self.axis_tolerance)
                })
            }
            (CrystalStructure::CubicHigh, CrystalStructure::HexagonalHigh) => {
                check_for_burgers(&q1, &q2, self.angle_tolerance)
            }
            (CrystalStructure::HexagonalHigh, CrystalStructure::CubicHigh) => {
                check_for_burgers(&q2, &q1, self.angle_tolerance)
            }
            _ => false,
        }
    }
}

impl GroupingStrategy for ColonyStrategy<'_> {
    fn determine_grouping(&self, reference: usize, neighbor: usize, _parent_id: i32) -> bool {
        self.is_colony_pair(reference, neighbor)
    }
}

/// Options for colony merging
#[derive(Debug, Clone)]
pub struct ColonyOptions {
    /// Misorientation angle tolerance in degrees
    pub angle_tolerance: f64,
    /// Misorientation axis tolerance in degrees
    pub axis_tolerance: f64,
    /// Also compare features that are near but not touching
    pub use_non_contiguous_neighbors: bool,
    /// Shuffle parent ids after grouping
    pub random_parent_ids: bool,
}

impl Default for ColonyOptions {
    fn default() -> Self {
        Self {
            angle_tolerance: 1.0,
            axis_tolerance: 1.0,
            use_non_contiguous_neighbors: false,
            random_parent_ids: true,
        }
    }
}

impl ColonyOptions {
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

pub(crate) fn validate_tolerances(angle_tolerance: f64, axis_tolerance: f64) -> GroupResult<()> {
    for (name, value) in [("angle", angle_tolerance), ("axis", axis_tolerance)] {
        if !value.is_finite() || value <= 0.0 || value > 180.0 {
            return Err(GroupError::InvalidParameters(format!(
                "{name} tolerance must be in (0, 180] degrees, got {value}"
            )));
        }
    }
    Ok(())
}

/// Merge neighboring features into parent colonies
///
/// Phases that are neither hexagonal-high nor cubic-high are reported as
/// warnings; their features end up as single-feature parents.
///
/// # Errors
///
/// - invalid tolerances, or non-contiguous neighbors requested without a list
/// - cell feature ids without a feature slot
/// - [`GroupError::NoGroupsFound`] if no feature could seed a parent
pub fn merge_colonies<R: Rng + ?Sized>(
    inputs: &MergeInputs<'_>,
    options: &ColonyOptions,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> GroupResult<Outcome<ParentGrouping>> {
    options.validate()?;

    let mut warnings = Vec::new();
    for phase in inputs.features.phases_in_use() {
        let structure = inputs.features.crystal_structures()[phase as usize];
        if !matches!(
            structure,
            CrystalStructure::HexagonalHigh | CrystalStructure::CubicHigh
        ) {
            push_warning(
                &mut warnings,
                Warning::new(
                    UNSUPPORTED_COLONY_PHASE,
                    format!(
                        "phase {phase} ({structure}) is neither hexagonal-high nor cubic-high and will not be merged"
                    ),
                ),
            );
        }
    }

    let mut strategy =
        ColonyStrategy::new(inputs.features, options.angle_tolerance, options.axis_tolerance);
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

#[cfg(test)]
mod tests {
    use super::*;
    use micrograin_core::DataArray;

    const TABLE: [CrystalStructure; 3] = [
        CrystalStructure::Unknown,
        CrystalStructure::HexagonalHigh,
        CrystalStructure::CubicHigh,
    ];

    fn about(axis: Vector3<f64>, degrees: f64) -> Orientation {
        Orientation::from_axis_angle(&axis, degrees.to_radians())
    }

    fn feature_arrays(
        orientations: &[Orientation],
        phases: &[i32],
    ) -> (DataArray<f32>, DataArray<i32>) {
        let mut quats = DataArray::new("AvgQuats", orientations.len() + 1, 4).unwrap();
        for (i, o) in orientations.iter().enumerate() {
            quats.tuple_mut(i + 1).copy_from_slice(&o.to_xyzw());
        }
        let mut all = vec![0];
        all.extend_from_slice(phases);
        (quats, DataArray::from_vec("Phases", 1, all).unwrap())
    }

    #[test]
    fn test_correspondences_are_rotations() {
        let frames = burgers_correspondences();
        assert_eq!(frames.len(), 12);
        for m in frames {
            assert!((m.determinant() - 1.0).abs() < 1e-12);
            assert!((m.transpose() * m - Matrix3::identity()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_variant_10_53_about_c() {
        let o1 = about(Vector3::x(), 17.0);
        let o2 = Orientation::from_quaternion(
            o1.quaternion() * about(Vector3::z(), 10.53).quaternion(),
        );
        let (quats, phases) = feature_arrays(&[o1, o2], &[1, 1]);
        let features = FeatureData::new(&quats, &phases, &TABLE).unwrap();
        let strategy = ColonyStrategy::new(features, 1.0, 0.02f64.to_degrees());
        assert!(strategy.is_colony_pair(1, 2));
        assert!(strategy.is_colony_pair(2, 1));
    }

    #[test]
    fn test_variant_60_about_a() {
        let o1 = Orientation::identity();
        let o2 = about(Vector3::x(), 60.3);
        let (quats, phases) = feature_arrays(&[o1, o2], &[1, 1]);
        let features = FeatureData::new(&quats, &phases, &TABLE).unwrap();
        assert!(ColonyStrategy::new(features, 1.0, 1.0).is_colony_pair(1, 2));
        assert!(!ColonyStrategy::new(features, 0.2, 1.0).is_colony_pair(1, 2));
    }

    #[test]
    fn test_unrelated_hexagonal_pair() {
        let o1 = Orientation::identity();
        let o2 = about(Vector3::new(1.0, 1.0, 1.0), 35.0);
        let (quats, phases) = feature_arrays(&[o1, o2], &[1, 1]);
        let features = FeatureData::new(&quats, &phases, &TABLE).unwrap();
        assert!(!ColonyStrategy::new(features, 1.0, 1.0).is_colony_pair(1, 2));
    }

    #[test]
    fn test_burgers_exact_relation() {
        let alpha = about(Vector3::new(0.3, -0.2, 0.9), 47.0);
        for m in burgers_correspondences() {
            let beta = Orientation::from_matrix(&(m * alpha.to_matrix()));
            assert!(check_for_burgers(&beta, &alpha, 1.0));
        }
        let unrelated = about(Vector3::new(0.1, 0.7, 0.2), 13.0);
        assert!(!check_for_burgers(&unrelated, &alpha, 1.0));
    }

    #[test]
    fn test_burgers_either_order() {
        let alpha = about(Vector3::y(), 20.0);
        let beta = Orientation::from_matrix(&(burgers_correspondences()[3] * alpha.to_matrix()));
        let (quats, phases) = feature_arrays(&[beta, alpha], &[2, 1]);
        let features = FeatureData::new(&quats, &phases, &TABLE).unwrap();
        let strategy = ColonyStrategy::new(features, 1.0, 1.0);
        assert!(strategy.is_colony_pair(1, 2));
        assert!(strategy.is_colony_pair(2, 1));
    }

    #[test]
    fn test_phase_zero_never_groups() {
        let (quats, phases) = feature_arrays(&[Orientation::identity(); 2], &[0, 1]);
        let features = FeatureData::new(&quats, &phases, &TABLE).unwrap();
        assert!(!ColonyStrategy::new(features, 1.0, 1.0).is_colony_pair(1, 2));
    }

    #[test]
    fn test_options_validate() {
        assert!(ColonyOptions::default().validate().is_ok());
        assert!(ColonyOptions::new(-1.0, 1.0).validate().is_err());
        assert!(ColonyOptions::new(1.0, f64::INFINITY).validate().is_err());
    }
}
