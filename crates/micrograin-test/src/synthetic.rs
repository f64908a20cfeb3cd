//! Synthetic microstructures for tests
//!
//! Small voxel grids with hand-placed phases and orientations, plus checks
//! for the structural properties every labeling should satisfy.

use crate::error::{TestError, TestResult};
use micrograin_core::{CrystalStructure, DataArray, Geometry, Orientation, Stencil, VoxelGrid};
use nalgebra::Matrix3;
use std::collections::HashSet;

/// Half-open `[(x0, x1), (y0, y1), (z0, z1)]` box of voxels
pub type Region = [(usize, usize); 3];

/// Owned cell arrays that can be viewed as a [`VoxelGrid`]
#[derive(Debug, Clone)]
pub struct SyntheticGrid {
    pub geometry: Geometry,
    pub phases: DataArray<i32>,
    pub quats: DataArray<f32>,
    pub mask: DataArray<bool>,
    pub crystal_structures: Vec<CrystalStructure>,
}

impl SyntheticGrid {
    /// Phase 1 everywhere with the identity orientation
    ///
    /// The ensemble table is `[Unknown, structure]`.
    pub fn uniform(
        nx: usize,
        ny: usize,
        nz: usize,
        structure: CrystalStructure,
    ) -> TestResult<Self> {
        Self::with_structures(nx, ny, nz, &[CrystalStructure::Unknown, structure])
    }

    /// Phase 1 everywhere with an explicit ensemble table
    pub fn with_structures(
        nx: usize,
        ny: usize,
        nz: usize,
        crystal_structures: &[CrystalStructure],
    ) -> TestResult<Self> {
        let geometry = Geometry::new(nx, ny, nz)?;
        let n = geometry.num_voxels();
        let phases = DataArray::with_value("Phases", n, 1, 1)?;
        let mut quats = DataArray::new("Quats", n, 4)?;
        let identity = Orientation::identity().to_xyzw();
        for i in 0..n {
            quats.tuple_mut(i).copy_from_slice(&identity);
        }
        let mask = DataArray::with_value("Mask", n, 1, true)?;
        Ok(Self {
            geometry,
            phases,
            quats,
            mask,
            crystal_structures: crystal_structures.to_vec(),
        })
    }

    fn region_indices(&self, region: Region) -> TestResult<Vec<usize>> {
        let dims = self.geometry.dims();
        let limits = [dims.0, dims.1, dims.2];
        if region
            .iter()
            .zip(limits)
            .any(|(&(lo, hi), n)| lo > hi || hi > n)
        {
            return Err(TestError::RegionOutOfBounds { region, dims });
        }
        let [(x0, x1), (y0, y1), (z0, z1)] = region;
        let mut indices = Vec::new();
        for z in z0..z1 {
            for y in y0..y1 {
                for x in x0..x1 {
                    indices.push(self.geometry.index(x, y, z));
                }
            }
        }
        Ok(indices)
    }

    /// Set phase and orientation over a box
    pub fn fill_region(
        &mut self,
        region: Region,
        phase: i32,
        orientation: &Orientation,
    ) -> TestResult<()> {
        let q = orientation.to_xyzw();
        for idx in self.region_indices(region)? {
            self.phases.set_value(idx, phase);
            self.quats.tuple_mut(idx).copy_from_slice(&q);
        }
        Ok(())
    }

    /// Set phase and orientation of one voxel
    pub fn set_voxel(
        &mut self,
        (x, y, z): (usize, usize, usize),
        phase: i32,
        orientation: &Orientation,
    ) {
        let idx = self.geometry.index(x, y, z);
        self.phases.set_value(idx, phase);
        self.quats.tuple_mut(idx).copy_from_slice(&orientation.to_xyzw());
    }

    /// Set mask values over a box
    pub fn mask_region(&mut self, region: Region, value: bool) -> TestResult<()> {
        for idx in self.region_indices(region)? {
            self.mask.set_value(idx, value);
        }
        Ok(())
    }

    /// Validated view without the mask
    pub fn grid(&self) -> TestResult<VoxelGrid<'_>> {
        Ok(VoxelGrid::new(
            self.geometry,
            &self.phases,
            &self.quats,
            &self.crystal_structures,
        )?)
    }

    /// Validated view with the mask attached
    pub fn masked_grid(&self) -> TestResult<VoxelGrid<'_>> {
        Ok(self.grid()?.with_mask(&self.mask)?)
    }
}

/// Slabs of `width` voxels along x, slab `k` using `orientations[k % len]`
pub fn x_stripes(
    nx: usize,
    ny: usize,
    nz: usize,
    width: usize,
    orientations: &[Orientation],
    structure: CrystalStructure,
) -> TestResult<SyntheticGrid> {
    let mut grid = SyntheticGrid::uniform(nx, ny, nz, structure)?;
    if orientations.is_empty() || width == 0 {
        return Ok(grid);
    }
    for (k, x0) in (0..nx).step_by(width).enumerate() {
        let x1 = (x0 + width).min(nx);
        let o = orientations[k % orientations.len()];
        grid.fill_region([(x0, x1), (0, ny), (0, nz)], 1, &o)?;
    }
    Ok(grid)
}

/// Orientation from Bunge Euler angles in degrees
pub fn bunge(phi1: f64, big_phi: f64, phi2: f64) -> Orientation {
    let (s1, c1) = phi1.to_radians().sin_cos();
    let (s, c) = big_phi.to_radians().sin_cos();
    let (s2, c2) = phi2.to_radians().sin_cos();
    let g = Matrix3::new(
        c1 * c2 - s1 * s2 * c,
        s1 * c2 + c1 * s2 * c,
        s2 * s,
        -c1 * s2 - s1 * c2 * c,
        -s1 * s2 + c1 * c2 * c,
        c2 * s,
        s1 * s,
        -c1 * s,
        c,
    );
    Orientation::from_matrix(&g)
}

/// Whether every non-zero label occupies one connected component
pub fn labels_connected(geometry: &Geometry, stencil: Stencil, labels: &[i32]) -> bool {
    let mut seen = vec![false; labels.len()];
    let mut started = HashSet::new();
    for start in 0..labels.len() {
        let id = labels[start];
        if id == 0 || seen[start] {
            continue;
        }
        // A second unvisited component of an id already flooded
        if !started.insert(id) {
            return false;
        }
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(idx) = stack.pop() {
            for n in geometry.neighbors(idx, stencil) {
                if !seen[n] && labels[n] == id {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }
    }
    true
}

/// Whether labels are nonzero exactly on eligible voxels
pub fn labels_complete(grid: &VoxelGrid<'_>, labels: &[i32]) -> bool {
    (0..grid.num_voxels()).all(|i| grid.is_eligible(i) == (labels[i] != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_uniform_grid_validates() {
        let s = SyntheticGrid::uniform(3, 3, 1, CrystalStructure::CubicHigh).unwrap();
        let grid = s.grid().unwrap();
        assert_eq!(grid.num_voxels(), 9);
        assert!(grid.is_eligible(4));
    }

    #[test]
    fn test_region_bounds() {
        let mut s = SyntheticGrid::uniform(2, 2, 1, CrystalStructure::CubicHigh).unwrap();
        let o = Orientation::identity();
        assert!(s.fill_region([(0, 3), (0, 1), (0, 1)], 1, &o).is_err());
        assert!(s.fill_region([(1, 2), (0, 2), (0, 1)], 0, &o).is_ok());
        assert_eq!(s.phases.as_slice(), &[1, 0, 1, 0]);
    }

    #[test]
    fn test_bunge_rotation_about_z() {
        let o = bunge(30.0, 0.0, 0.0);
        let expected = Orientation::from_axis_angle(&Vector3::z(), 30f64.to_radians());
        assert!(o.quaternion().angle_to(expected.quaternion()) < 1e-9);
    }

    #[test]
    fn test_labels_connected() {
        let geom = Geometry::new(3, 1, 1).unwrap();
        assert!(labels_connected(&geom, Stencil::SixWay, &[1, 1, 2]));
        assert!(!labels_connected(&geom, Stencil::SixWay, &[1, 2, 1]));
        assert!(labels_connected(&geom, Stencil::SixWay, &[1, 0, 2]));
    }
}
