//! VoxelGrid - validated view of per-voxel orientation data
//!
//! A [`VoxelGrid`] borrows the cell arrays a segmentation or statistics pass
//! reads (phase ids, `[x, y, z, w]` quaternions, optional mask) together with
//! the ensemble crystal structure table. All structural checks happen in
//! [`VoxelGrid::new`], so the accessors used inside the hot loops are
//! infallible.

use crate::array::DataArray;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::orientation::Orientation;
use crate::symmetry::{CrystalStructure, LaueOps};

/// Borrowed per-voxel inputs over a [`Geometry`]
#[derive(Debug, Clone, Copy)]
pub struct VoxelGrid<'a> {
    geometry: Geometry,
    phases: &'a DataArray<i32>,
    quats: &'a DataArray<f32>,
    mask: Option<&'a DataArray<bool>>,
    crystal_structures: &'a [CrystalStructure],
}

impl<'a> VoxelGrid<'a> {
    /// Validate and wrap the cell arrays
    ///
    /// # Errors
    ///
    /// - tuple counts that do not match the geometry
    /// - `quats` without exactly 4 components
    /// - phase ids outside the crystal structure table
    /// - a phase in use (`> 0`) whose crystal structure is `Unknown`
    /// - a degenerate quaternion on any voxel with phase `> 0`
    pub fn new(
        geometry: Geometry,
        phases: &'a DataArray<i32>,
        quats: &'a DataArray<f32>,
        crystal_structures: &'a [CrystalStructure],
    ) -> Result<Self> {
        geometry.check_tuples(phases.name(), phases.num_tuples())?;
        phases.check_components(1)?;
        geometry.check_tuples(quats.name(), quats.num_tuples())?;
        quats.check_components(4)?;

        for idx in 0..geometry.num_voxels() {
            let phase = phases.value(idx);
            if phase < 0 || phase as usize >= crystal_structures.len() {
                return Err(Error::UnknownPhase {
                    phase,
                    len: crystal_structures.len(),
                });
            }
            if phase > 0 {
                if crystal_structures[phase as usize] == CrystalStructure::Unknown {
                    return Err(Error::InvalidCrystalStructure(
                        CrystalStructure::Unknown.index(),
                    ));
                }
                Orientation::from_tuple(quats.tuple(idx))?;
            }
        }

        Ok(Self {
            geometry,
            phases,
            quats,
            mask: None,
            crystal_structures,
        })
    }

    /// Restrict eligibility to voxels where `mask` is `true`
    pub fn with_mask(mut self, mask: &'a DataArray<bool>) -> Result<Self> {
        self.geometry.check_tuples(mask.name(), mask.num_tuples())?;
        mask.check_components(1)?;
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn num_voxels(&self) -> usize {
        self.geometry.num_voxels()
    }

    #[inline]
    pub fn phase(&self, idx: usize) -> i32 {
        self.phases.value(idx)
    }

    /// Orientation of voxel `idx` (identity for unindexed voxels)
    #[inline]
    pub fn orientation(&self, idx: usize) -> Orientation {
        Orientation::from_tuple(self.quats.tuple(idx)).unwrap_or_default()
    }

    pub fn crystal_structures(&self) -> &[CrystalStructure] {
        self.crystal_structures
    }

    /// Crystal structure of voxel `idx`
    pub fn crystal_structure(&self, idx: usize) -> CrystalStructure {
        self.crystal_structures[self.phase(idx) as usize]
    }

    /// Symmetry operators of voxel `idx` (`None` for phase 0)
    pub fn laue_ops(&self, idx: usize) -> Option<&'static LaueOps> {
        self.crystal_structure(idx).laue_ops()
    }

    /// Phase `> 0` and, when a mask is attached, masked in
    #[inline]
    pub fn is_eligible(&self, idx: usize) -> bool {
        self.phase(idx) > 0 && self.mask.is_none_or(|m| m.value(idx))
    }

    /// Distinct phases `> 0` that occur on eligible voxels, ascending
    pub fn phases_in_use(&self) -> Vec<i32> {
        let mut seen = vec![false; self.crystal_structures.len()];
        for idx in 0..self.num_voxels() {
            if self.is_eligible(idx) {
                seen[self.phase(idx) as usize] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(p, _)| p as i32)
            .collect()
    }
}
