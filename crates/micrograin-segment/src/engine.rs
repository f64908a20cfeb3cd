//! Seeded region-growing over a voxel grid
//!
//! The [`SegmentationEngine`] assigns a feature id to every candidate voxel
//! by repeatedly picking a seed and growing a breadth-first front of similar
//! voxels from it. What "similar" means is supplied by a [`Segmenter`];
//! where the next seed comes from is supplied by a [`SeedPolicy`].
//!
//! Ids are assigned densely from 1 in discovery order. The engine performs
//! every label write itself, so each voxel is assigned exactly once.

use crate::error::{SegmentError, SegmentResult};
use micrograin_core::labels::BACKGROUND;
use micrograin_core::{ActiveFlags, CancelToken, DataArray, Geometry, Outcome, Stencil};
use tracing::{debug, info};

/// Initial worklist capacity for one feature
const INITIAL_WORKLIST_CAPACITY: usize = 1000;

/// Features between progress messages
const PROGRESS_INTERVAL: i32 = 1000;

/// Pairwise similarity test driving the flood fill
pub trait Segmenter {
    /// Whether `voxel` may seed or join any feature at all
    fn is_candidate(&self, voxel: usize) -> bool;

    /// Whether `neighbor` joins feature `feature_id`, reached from `reference`
    ///
    /// Only called for unassigned candidate neighbors.
    fn determine_grouping(&self, reference: usize, neighbor: usize, feature_id: i32) -> bool;
}

/// Where the next feature starts
pub trait SeedPolicy {
    /// An unassigned candidate voxel, scanning from `hint`, or `None`
    fn next_seed<S: Segmenter + ?Sized>(
        &mut self,
        segmenter: &S,
        labels: &[i32],
        hint: usize,
    ) -> Option<usize>;
}

/// Lowest-index unassigned candidate at or after the hint
///
/// Seeds are handed out in increasing index order, so the scan resumes after
/// the previous seed instead of restarting from 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSeedScan;

impl SeedPolicy for LinearSeedScan {
    fn next_seed<S: Segmenter + ?Sized>(
        &mut self,
        segmenter: &S,
        labels: &[i32],
        hint: usize,
    ) -> Option<usize> {
        (hint..labels.len()).find(|&i| labels[i] == BACKGROUND && segmenter.is_candidate(i))
    }
}

/// Result of one segmentation pass
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Number of features discovered (ids `1..=feature_count`)
    pub feature_count: usize,
    /// One flag per feature slot; slot 0 is inactive
    pub active: ActiveFlags,
}

/// Breadth-first flood fill engine
#[derive(Debug, Clone)]
pub struct SegmentationEngine<'a> {
    geometry: Geometry,
    stencil: Stencil,
    cancel: Option<&'a CancelToken>,
}

impl<'a> SegmentationEngine<'a> {
    pub fn new(geometry: Geometry, stencil: Stencil) -> Self {
        Self {
            geometry,
            stencil,
            cancel: None,
        }
    }

    /// Poll `token` before each new feature
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn stencil(&self) -> Stencil {
        self.stencil
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Label every candidate voxel
    ///
    /// `labels` is reset to 0 before the pass. On cancellation the partial
    /// labeling is kept and the outcome is flagged `cancelled`.
    ///
    /// # Errors
    ///
    /// - `labels` does not cover the grid
    /// - [`SegmentError::InsufficientFeatures`] if a completed pass found no
    ///   feature, leaving slot 0 as the only table entry
    pub fn run<S, P>(
        &self,
        segmenter: &S,
        seeds: &mut P,
        labels: &mut DataArray<i32>,
    ) -> SegmentResult<Outcome<Segmentation>>
    where
        S: Segmenter + ?Sized,
        P: SeedPolicy,
    {
        self.geometry
            .check_tuples(labels.name(), labels.num_tuples())?;
        labels.check_components(1)?;
        labels.fill(BACKGROUND);
        let labels = labels.as_mut_slice();

        info!(
            dims = ?self.geometry.dims(),
            stencil = ?self.stencil,
            "segmenting features"
        );

        let mut active = ActiveFlags::with_len(1);
        let mut worklist: Vec<usize> = Vec::with_capacity(INITIAL_WORKLIST_CAPACITY);
        let mut feature_id: i32 = 1;
        let mut hint = 0;
        let mut cancelled = false;

        loop {
            if self.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(seed) = seeds.next_seed(segmenter, labels, hint) else {
                break;
            };
            hint = seed + 1;

            labels[seed] = feature_id;
            active.set(feature_id as usize, true);
            debug!(feature_id, seed, "feature table grown to {}", active.len());

            worklist.clear();
            worklist.push(seed);
            let mut j = 0;
            while j < worklist.len() {
                let current = worklist[j];
                for neighbor in self.geometry.neighbors(current, self.stencil) {
                    if labels[neighbor] == BACKGROUND
                        && segmenter.is_candidate(neighbor)
                        && segmenter.determine_grouping(current, neighbor, feature_id)
                    {
                        labels[neighbor] = feature_id;
                        worklist.push(neighbor);
                    }
                }
                j += 1;
            }

            if feature_id % PROGRESS_INTERVAL == 0 {
                info!("{feature_id} features segmented");
            }
            feature_id += 1;
        }

        let feature_count = (feature_id - 1) as usize;
        if cancelled {
            info!(feature_count, "segmentation cancelled");
        } else {
            info!(feature_count, "segmentation complete");
            if active.len() < 2 {
                return Err(SegmentError::InsufficientFeatures {
                    found: feature_count,
                });
            }
        }

        Ok(Outcome::new(Segmentation {
            feature_count,
            active,
        })
        .with_cancelled(cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Groups neighbors that carry the same positive value
    struct ValueSegmenter {
        values: Vec<i32>,
    }

    impl Segmenter for ValueSegmenter {
        fn is_candidate(&self, voxel: usize) -> bool {
            self.values[voxel] > 0
        }

        fn determine_grouping(&self, reference: usize, neighbor: usize, _feature_id: i32) -> bool {
            self.values[reference] == self.values[neighbor]
        }
    }

    fn labels_for(geom: &Geometry) -> DataArray<i32> {
        DataArray::new("FeatureIds", geom.num_voxels(), 1).unwrap()
    }

    #[test]
    fn test_two_blocks() {
        let geom = Geometry::new(4, 1, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![1, 1, 2, 2],
        };
        let mut labels = labels_for(&geom);
        let out = SegmentationEngine::new(geom, Stencil::SixWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap();
        assert_eq!(out.value.feature_count, 2);
        assert_eq!(labels.as_slice(), &[1, 1, 2, 2]);
        assert_eq!(out.value.active.as_slice(), &[false, true, true]);
        assert!(!out.cancelled);
    }

    #[test]
    fn test_non_candidates_stay_background() {
        let geom = Geometry::new(5, 1, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![1, 0, 1, 0, 3],
        };
        let mut labels = labels_for(&geom);
        let out = SegmentationEngine::new(geom, Stencil::SixWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap();
        // Same value but separated by a background voxel: three features
        assert_eq!(out.value.feature_count, 3);
        assert_eq!(labels.as_slice(), &[1, 0, 2, 0, 3]);
    }

    #[test]
    fn test_single_feature() {
        let geom = Geometry::new(3, 3, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![1; 9],
        };
        let mut labels = labels_for(&geom);
        let out = SegmentationEngine::new(geom, Stencil::FourWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap();
        assert_eq!(out.value.feature_count, 1);
        assert_eq!(out.value.active.len(), 2);
        assert!(labels.as_slice().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_no_candidates_is_insufficient() {
        let geom = Geometry::new(3, 3, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![0; 9],
        };
        let mut labels = labels_for(&geom);
        let err = SegmentationEngine::new(geom, Stencil::FourWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap_err();
        assert!(matches!(err, SegmentError::InsufficientFeatures { found: 0 }));
        assert!(labels.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_cancelled_before_start() {
        let geom = Geometry::new(4, 1, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![1, 2, 3, 4],
        };
        let token = CancelToken::new();
        token.cancel();
        let mut labels = labels_for(&geom);
        let out = SegmentationEngine::new(geom, Stencil::SixWay)
            .with_cancel(&token)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap();
        assert!(out.cancelled);
        assert_eq!(out.value.feature_count, 0);
        assert!(labels.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_four_way_does_not_cross_planes() {
        let geom = Geometry::new(2, 1, 2).unwrap();
        let seg = ValueSegmenter {
            values: vec![1; 4],
        };
        let mut labels = labels_for(&geom);
        let out = SegmentationEngine::new(geom, Stencil::FourWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap();
        assert_eq!(out.value.feature_count, 2);
        assert_eq!(labels.as_slice(), &[1, 1, 2, 2]);
    }

    #[test]
    fn test_labels_must_cover_grid() {
        let geom = Geometry::new(2, 2, 1).unwrap();
        let seg = ValueSegmenter {
            values: vec![1; 4],
        };
        let mut labels: DataArray<i32> = DataArray::new("FeatureIds", 3, 1).unwrap();
        let err = SegmentationEngine::new(geom, Stencil::SixWay)
            .run(&seg, &mut LinearSeedScan, &mut labels)
            .unwrap_err();
        assert_eq!(err.code(), -1002);
    }
}
