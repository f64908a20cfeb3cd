//! Crystal orientations and axis-angle rotations
//!
//! An [`Orientation`] is a unit quaternion describing the rotation that takes
//! crystal directions into the sample frame. Arrays store quaternions as four
//! components in `[x, y, z, w]` order (vector part first).
//!
//! [`Orientation::to_matrix`] returns the passive orientation matrix `g`,
//! which maps sample directions into the crystal frame; its transpose maps
//! crystal directions into the sample frame.

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};

/// Below this the rotation axis is undefined and `[0, 0, 1]` is reported
const AXIS_EPSILON: f64 = 1.0e-12;

/// Rotation as a unit axis and an angle in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: Vector3<f64>,
    pub angle: f64,
}

impl AxisAngle {
    pub fn new(axis: Vector3<f64>, angle: f64) -> Self {
        let norm = axis.norm();
        let axis = if norm < AXIS_EPSILON {
            Vector3::z()
        } else {
            axis / norm
        };
        Self { axis, angle }
    }

    /// Axis-angle of a quaternion, with the angle in `[0, π]`
    pub fn from_quaternion(q: &UnitQuaternion<f64>) -> Self {
        let (w, v) = if q.w < 0.0 {
            (-q.w, -q.imag())
        } else {
            (q.w, q.imag())
        };
        let w = w.min(1.0);
        let angle = 2.0 * w.acos();
        let s = (1.0 - w * w).max(0.0).sqrt();
        let axis = if s < AXIS_EPSILON { Vector3::z() } else { v / s };
        Self { axis, angle }
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Rodrigues vector `axis * tan(angle / 2)`
    pub fn to_rodrigues(&self) -> Vector3<f64> {
        self.axis * (self.angle * 0.5).tan()
    }

    /// Inverse of [`AxisAngle::to_rodrigues`]
    pub fn from_rodrigues(rod: &Vector3<f64>) -> Self {
        let len = rod.norm();
        if len < AXIS_EPSILON {
            return Self {
                axis: Vector3::z(),
                angle: 0.0,
            };
        }
        Self {
            axis: rod / len,
            angle: 2.0 * len.atan(),
        }
    }

    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(self.axis), self.angle)
    }
}

/// Crystal-to-sample rotation of one voxel or feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    q: UnitQuaternion<f64>,
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            q: UnitQuaternion::identity(),
        }
    }

    /// Build from quaternion components, normalizing
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateQuaternion`] for a zero or non-finite norm.
    pub fn from_xyzw(x: f64, y: f64, z: f64, w: f64) -> Result<Self> {
        let raw = Quaternion::new(w, x, y, z);
        let norm = raw.norm();
        if !norm.is_finite() || norm < AXIS_EPSILON {
            return Err(Error::DegenerateQuaternion(x, y, z, w));
        }
        Ok(Self {
            q: UnitQuaternion::new_normalize(raw),
        })
    }

    /// Build from a stored `[x, y, z, w]` tuple
    pub fn from_tuple(tuple: &[f32]) -> Result<Self> {
        match tuple {
            [x, y, z, w] => Self::from_xyzw(*x as f64, *y as f64, *z as f64, *w as f64),
            _ => Err(Error::ComponentCountMismatch {
                name: "quaternion".to_string(),
                expected: 4,
                actual: tuple.len(),
            }),
        }
    }

    pub fn from_quaternion(q: UnitQuaternion<f64>) -> Self {
        Self { q }
    }

    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        Self {
            q: AxisAngle::new(*axis, angle).to_quaternion(),
        }
    }

    /// Build from a passive orientation matrix `g` (sample → crystal)
    pub fn from_matrix(g: &Matrix3<f64>) -> Self {
        let rot = Rotation3::from_matrix_unchecked(g.transpose());
        Self {
            q: UnitQuaternion::from_rotation_matrix(&rot),
        }
    }

    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        &self.q
    }

    /// Components in storage order `[x, y, z, w]`
    pub fn to_xyzw(&self) -> [f32; 4] {
        [
            self.q.i as f32,
            self.q.j as f32,
            self.q.k as f32,
            self.q.w as f32,
        ]
    }

    /// Passive orientation matrix `g` (sample → crystal)
    pub fn to_matrix(&self) -> Matrix3<f64> {
        self.q.to_rotation_matrix().into_inner().transpose()
    }

    /// Express a crystal direction in the sample frame
    pub fn crystal_to_sample(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.q * v
    }

    /// Same physical orientation with the opposite quaternion sign
    pub fn negated(&self) -> Self {
        Self {
            q: UnitQuaternion::new_unchecked(-self.q.into_inner()),
        }
    }

    /// Apply a crystal-frame rotation (e.g. a symmetry operator)
    pub fn then_crystal(&self, op: &UnitQuaternion<f64>) -> Self {
        Self { q: self.q * op }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Angle in `[0, π]` between two directions, clamped against rounding
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < AXIS_EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}
