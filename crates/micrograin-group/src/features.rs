//! Per-feature inputs of the grouping predicates

use crate::error::GroupResult;
use micrograin_core::{CrystalStructure, DataArray, Error, Orientation};

/// Borrowed feature-level arrays: average orientation and phase per feature
///
/// Slot 0 is the background feature.
#[derive(Debug, Clone, Copy)]
pub struct FeatureData<'a> {
    avg_quats: &'a DataArray<f32>,
    phases: &'a DataArray<i32>,
    crystal_structures: &'a [CrystalStructure],
}

impl<'a> FeatureData<'a> {
    /// Validate and wrap the feature arrays
    ///
    /// # Errors
    ///
    /// - `avg_quats` and `phases` disagree on the feature count
    /// - wrong component counts (4 and 1)
    /// - a phase id outside the crystal structure table
    /// - a degenerate average orientation on a feature with phase `> 0`
    pub fn new(
        avg_quats: &'a DataArray<f32>,
        phases: &'a DataArray<i32>,
        crystal_structures: &'a [CrystalStructure],
    ) -> GroupResult<Self> {
        avg_quats.check_components(4)?;
        phases.check_components(1)?;
        avg_quats.check_tuples(phases.num_tuples())?;

        for feature in 0..phases.num_tuples() {
            let phase = phases.value(feature);
            if phase < 0 || phase as usize >= crystal_structures.len() {
                return Err(Error::UnknownPhase {
                    phase,
                    len: crystal_structures.len(),
                }
                .into());
            }
            if phase > 0 {
                Orientation::from_tuple(avg_quats.tuple(feature))?;
            }
        }

        Ok(Self {
            avg_quats,
            phases,
            crystal_structures,
        })
    }

    /// Number of feature slots, including slot 0
    pub fn num_features(&self) -> usize {
        self.phases.num_tuples()
    }

    #[inline]
    pub fn phase(&self, feature: usize) -> i32 {
        self.phases.value(feature)
    }

    #[inline]
    pub fn orientation(&self, feature: usize) -> Orientation {
        Orientation::from_tuple(self.avg_quats.tuple(feature)).unwrap_or_default()
    }

    pub fn crystal_structure(&self, feature: usize) -> CrystalStructure {
        self.crystal_structures[self.phase(feature) as usize]
    }

    pub fn crystal_structures(&self) -> &[CrystalStructure] {
        self.crystal_structures
    }

    /// Distinct phases `> 0` carried by some feature, ascending
    pub fn phases_in_use(&self) -> Vec<i32> {
        let mut seen = vec![false; self.crystal_structures.len()];
        for feature in 0..self.num_features() {
            let phase = self.phase(feature);
            if phase > 0 {
                seen[phase as usize] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(p, _)| p as i32)
            .collect()
    }
}
