//! Crystal symmetry and misorientation
//!
//! Each [`CrystalStructure`] (Laue class) owns a table of proper rotation
//! operators. [`LaueOps`] uses the table to compute the minimum-angle
//! misorientation between two orientations and to reduce misorientation
//! axes into the standard fundamental triangle.
//!
//! The numeric indices of [`CrystalStructure`] are stable and match the
//! values stored in ensemble `CrystalStructures` arrays.

use crate::error::{Error, Result};
use crate::orientation::{AxisAngle, Orientation};
use nalgebra::{Matrix3, Unit, UnitQuaternion, Vector3};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};
use std::sync::LazyLock;

/// Laue class of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CrystalStructure {
    /// 6/mmm
    HexagonalHigh = 0,
    /// m-3m
    CubicHigh = 1,
    /// 6/m
    HexagonalLow = 2,
    /// m-3
    CubicLow = 3,
    /// -1
    Triclinic = 4,
    /// Placeholder for phase 0 and unindexed phases
    Unknown = 999,
}

impl CrystalStructure {
    /// Look up a stored crystal structure index
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCrystalStructure`] for indices outside the
    /// supported Laue classes.
    pub fn from_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Self::HexagonalHigh),
            1 => Ok(Self::CubicHigh),
            2 => Ok(Self::HexagonalLow),
            3 => Ok(Self::CubicLow),
            4 => Ok(Self::Triclinic),
            999 => Ok(Self::Unknown),
            other => Err(Error::InvalidCrystalStructure(other)),
        }
    }

    /// Convert a whole ensemble table
    pub fn table_from(indices: &[u32]) -> Result<Vec<Self>> {
        indices.iter().map(|&i| Self::from_index(i)).collect()
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HexagonalHigh => "Hexagonal-High 6/mmm",
            Self::CubicHigh => "Cubic-High m-3m",
            Self::HexagonalLow => "Hexagonal-Low 6/m",
            Self::CubicLow => "Cubic-Low m-3 (Tetrahedral)",
            Self::Triclinic => "Triclinic -1",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_hexagonal(self) -> bool {
        matches!(self, Self::HexagonalHigh | Self::HexagonalLow)
    }

    pub fn is_cubic(self) -> bool {
        matches!(self, Self::CubicHigh | Self::CubicLow)
    }

    /// Symmetry operators for this class (`None` for `Unknown`)
    pub fn laue_ops(self) -> Option<&'static LaueOps> {
        match self {
            Self::HexagonalHigh => Some(&HEXAGONAL_HIGH),
            Self::CubicHigh => Some(&CUBIC_HIGH),
            Self::HexagonalLow => Some(&HEXAGONAL_LOW),
            Self::CubicLow => Some(&CUBIC_LOW),
            Self::Triclinic => Some(&TRICLINIC),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for CrystalStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rotation operators of one Laue class
#[derive(Debug, Clone)]
pub struct LaueOps {
    structure: CrystalStructure,
    operators: Vec<UnitQuaternion<f64>>,
}

static HEXAGONAL_HIGH: LazyLock<LaueOps> =
    LazyLock::new(|| LaueOps::build(CrystalStructure::HexagonalHigh));
static CUBIC_HIGH: LazyLock<LaueOps> =
    LazyLock::new(|| LaueOps::build(CrystalStructure::CubicHigh));
static HEXAGONAL_LOW: LazyLock<LaueOps> =
    LazyLock::new(|| LaueOps::build(CrystalStructure::HexagonalLow));
static CUBIC_LOW: LazyLock<LaueOps> = LazyLock::new(|| LaueOps::build(CrystalStructure::CubicLow));
static TRICLINIC: LazyLock<LaueOps> =
    LazyLock::new(|| LaueOps::build(CrystalStructure::Triclinic));

fn rot(axis: Vector3<f64>, angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), angle)
}

/// 6-fold rotations about [0001]
fn hexagonal_rotations() -> Vec<UnitQuaternion<f64>> {
    (0..6)
        .map(|k| rot(Vector3::z(), k as f64 * FRAC_PI_3))
        .collect()
}

/// 2-fold rotations about the six in-plane a- and m-axes
fn hexagonal_dyads() -> Vec<UnitQuaternion<f64>> {
    (0..6)
        .map(|k| {
            let phi = k as f64 * PI / 6.0;
            rot(Vector3::new(phi.cos(), phi.sin(), 0.0), PI)
        })
        .collect()
}

/// Identity, three 2-folds about <100> and eight 3-folds about <111>
fn tetrahedral_rotations() -> Vec<UnitQuaternion<f64>> {
    let mut ops = vec![UnitQuaternion::identity()];
    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        ops.push(rot(axis, PI));
    }
    for sy in [1.0, -1.0] {
        for sz in [1.0, -1.0] {
            let axis = Vector3::new(1.0, sy, sz);
            ops.push(rot(axis, 2.0 * FRAC_PI_3));
            ops.push(rot(axis, -2.0 * FRAC_PI_3));
        }
    }
    ops
}

/// Six 4-folds about <100> and six 2-folds about <110>
fn octahedral_extras() -> Vec<UnitQuaternion<f64>> {
    let mut ops = Vec::with_capacity(12);
    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        ops.push(rot(axis, FRAC_PI_2));
        ops.push(rot(axis, -FRAC_PI_2));
    }
    for axis in [
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(1.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 1.0),
        Vector3::new(0.0, 1.0, -1.0),
    ] {
        ops.push(rot(axis, PI));
    }
    ops
}

impl LaueOps {
    fn build(structure: CrystalStructure) -> Self {
        let operators = match structure {
            CrystalStructure::HexagonalHigh => {
                let mut ops = hexagonal_rotations();
                ops.extend(hexagonal_dyads());
                ops
            }
            CrystalStructure::HexagonalLow => hexagonal_rotations(),
            CrystalStructure::CubicHigh => {
                let mut ops = tetrahedral_rotations();
                ops.extend(octahedral_extras());
                ops
            }
            CrystalStructure::CubicLow => tetrahedral_rotations(),
            CrystalStructure::Triclinic | CrystalStructure::Unknown => {
                vec![UnitQuaternion::identity()]
            }
        };
        Self {
            structure,
            operators,
        }
    }

    pub fn structure(&self) -> CrystalStructure {
        self.structure
    }

    pub fn num_symmetry_operators(&self) -> usize {
        self.operators.len()
    }

    /// Operator `index` as a quaternion
    pub fn symmetry_quaternion(&self, index: usize) -> Option<&UnitQuaternion<f64>> {
        self.operators.get(index)
    }

    /// Operator `index` as a 3×3 rotation matrix
    pub fn symmetry_operator(&self, index: usize) -> Option<Matrix3<f64>> {
        self.operators
            .get(index)
            .map(|q| q.to_rotation_matrix().into_inner())
    }

    pub fn operators(&self) -> &[UnitQuaternion<f64>] {
        &self.operators
    }

    /// Minimum-angle misorientation between two orientations
    ///
    /// The returned axis is expressed in the crystal frame of `o1` and is not
    /// yet reduced; see [`LaueOps::reduce_to_fundamental_zone`].
    pub fn misorientation(&self, o1: &Orientation, o2: &Orientation) -> AxisAngle {
        let delta = o1.quaternion().inverse() * o2.quaternion();
        let best = self
            .operators
            .iter()
            .map(|s| s * delta)
            .max_by(|a, b| a.w.abs().total_cmp(&b.w.abs()))
            .unwrap_or(delta);
        AxisAngle::from_quaternion(&best)
    }

    /// Misorientation angle in radians
    pub fn misorientation_angle(&self, o1: &Orientation, o2: &Orientation) -> f64 {
        self.misorientation(o1, o2).angle
    }

    /// Reduce a misorientation Rodrigues vector into the fundamental triangle
    ///
    /// Only the axis direction changes; the rotation angle is preserved.
    pub fn reduce_to_fundamental_zone(&self, rod: &Vector3<f64>) -> Vector3<f64> {
        let (x, y, z) = (rod.x, rod.y, rod.z);
        match self.structure {
            CrystalStructure::HexagonalHigh | CrystalStructure::HexagonalLow => {
                let sector = FRAC_PI_3;
                let radius = x.hypot(y);
                let mut phi = y.atan2(x).rem_euclid(sector);
                if self.structure == CrystalStructure::HexagonalHigh && phi > sector * 0.5 {
                    phi = sector - phi;
                }
                Vector3::new(radius * phi.cos(), radius * phi.sin(), z.abs())
            }
            CrystalStructure::CubicHigh => {
                let mut c = [x.abs(), y.abs(), z.abs()];
                c.sort_by(|a, b| b.total_cmp(a));
                Vector3::new(c[0], c[1], c[2])
            }
            CrystalStructure::CubicLow => {
                let c = [x.abs(), y.abs(), z.abs()];
                // Cyclic permutations only: rotate the largest component first
                let lead = (0..3)
                    .max_by(|&a, &b| c[a].total_cmp(&c[b]))
                    .unwrap_or(0);
                Vector3::new(c[lead], c[(lead + 1) % 3], c[(lead + 2) % 3])
            }
            CrystalStructure::Triclinic | CrystalStructure::Unknown => {
                if z < 0.0 || (z == 0.0 && (y < 0.0 || (y == 0.0 && x < 0.0))) {
                    -rod
                } else {
                    *rod
                }
            }
        }
    }

    /// Misorientation with the axis reduced into the fundamental triangle
    pub fn fundamental_zone_misorientation(&self, o1: &Orientation, o2: &Orientation) -> AxisAngle {
        let raw = self.misorientation(o1, o2);
        let reduced = self.reduce_to_fundamental_zone(&raw.to_rodrigues());
        // A 180° rotation has an infinite Rodrigues vector; keep its angle
        if reduced.iter().all(|c| c.is_finite()) {
            let mut aa = AxisAngle::from_rodrigues(&reduced);
            aa.angle = raw.angle;
            aa
        } else {
            let axis = self.reduce_to_fundamental_zone(&raw.axis);
            AxisAngle::new(axis, raw.angle)
        }
    }

    /// Symmetry-equivalent of `q` closest to `reference` in quaternion space
    ///
    /// The result is sign-aligned with `reference` so it can be summed into a
    /// running average.
    pub fn nearest_equivalent(&self, reference: &Orientation, q: &Orientation) -> Orientation {
        let reference_coords = reference.quaternion().coords;
        let mut best = *q;
        let mut best_dot = f64::NEG_INFINITY;
        for op in &self.operators {
            let candidate = q.then_crystal(op);
            let dot = reference_coords.dot(&candidate.quaternion().coords);
            if dot.abs() > best_dot {
                best_dot = dot.abs();
                best = if dot < 0.0 {
                    candidate.negated()
                } else {
                    candidate
                };
            }
        }
        best
    }
}
