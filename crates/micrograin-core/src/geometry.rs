//! Regular voxel grid geometry
//!
//! A [`Geometry`] describes an `nx × ny × nz` grid of voxels addressed by a
//! linear index `idx = z*nx*ny + y*nx + x`. Neighbor enumeration follows a
//! fixed [`Stencil`]; neighbors across the grid boundary are excluded, there
//! is no wraparound.

use crate::error::{Error, Result};

/// Connectivity stencil for grid neighbor enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stencil {
    /// 4-neighborhood in the xy plane (slice-wise processing)
    FourWay,
    /// 6-neighborhood across faces in 3D
    #[default]
    SixWay,
}

/// Offsets in (-z, -y, -x, +x, +y, +z) order
const SIX_WAY: [(isize, isize, isize); 6] = [
    (0, 0, -1),
    (0, -1, 0),
    (-1, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (0, 0, 1),
];

const FOUR_WAY: [(isize, isize, isize); 4] = [(0, -1, 0), (-1, 0, 0), (1, 0, 0), (0, 1, 0)];

impl Stencil {
    /// Neighbor offsets `(dx, dy, dz)` in visitation order
    pub fn offsets(self) -> &'static [(isize, isize, isize)] {
        match self {
            Stencil::FourWay => &FOUR_WAY,
            Stencil::SixWay => &SIX_WAY,
        }
    }
}

/// Dimensions of a regular voxel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Geometry {
    /// Create a geometry with the given dimensions
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any extent is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use micrograin_core::Geometry;
    ///
    /// let geom = Geometry::new(3, 3, 1).unwrap();
    /// assert_eq!(geom.num_voxels(), 9);
    /// assert_eq!(geom.index(2, 1, 0), 5);
    /// ```
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(Error::InvalidDimension { nx, ny, nz });
        }
        Ok(Self { nx, ny, nz })
    }

    /// Grid extents `(nx, ny, nz)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Total number of voxels
    pub fn num_voxels(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Number of voxels in one z-plane
    pub fn plane_len(&self) -> usize {
        self.nx * self.ny
    }

    /// Linear index of voxel `(x, y, z)`
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.nx * self.ny + y * self.nx + x
    }

    /// Coordinates `(x, y, z)` of a linear index
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize, usize) {
        let plane = self.nx * self.ny;
        let z = idx / plane;
        let rem = idx % plane;
        (rem % self.nx, rem / self.nx, z)
    }

    /// Linear index of `(x+dx, y+dy, z+dz)`, or `None` outside the grid
    #[inline]
    pub fn offset(
        &self,
        (x, y, z): (usize, usize, usize),
        (dx, dy, dz): (isize, isize, isize),
    ) -> Option<usize> {
        let xn = x.checked_add_signed(dx).filter(|&v| v < self.nx)?;
        let yn = y.checked_add_signed(dy).filter(|&v| v < self.ny)?;
        let zn = z.checked_add_signed(dz).filter(|&v| v < self.nz)?;
        Some(self.index(xn, yn, zn))
    }

    /// In-bounds neighbors of `idx` in stencil order
    pub fn neighbors(&self, idx: usize, stencil: Stencil) -> impl Iterator<Item = usize> + use<> {
        let geom = *self;
        let at = self.coords(idx);
        stencil
            .offsets()
            .iter()
            .filter_map(move |&delta| geom.offset(at, delta))
    }

    /// Check that an array with `len` tuples covers this grid
    pub fn check_tuples(&self, name: &str, len: usize) -> Result<()> {
        if len != self.num_voxels() {
            return Err(Error::TupleCountMismatch {
                name: name.to_string(),
                expected: self.num_voxels(),
                actual: len,
            });
        }
        Ok(())
    }
}
