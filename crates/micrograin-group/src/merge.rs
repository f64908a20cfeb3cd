//! Shared driver of the feature merging passes
//!
//! [`MergeInputs`] bundles the feature arrays, the neighbor graphs and the
//! cell feature ids. The colony and twin drivers build a strategy over the
//! inputs and hand it to [`run_merge`], which runs the grouping engine,
//! propagates parent ids to the cells and optionally shuffles them.

use crate::engine::{GroupingEngine, GroupingStrategy, RandomStartSeeds};
use crate::error::{GroupError, GroupResult};
use crate::features::FeatureData;
use crate::shuffle::randomize_parent_ids;
use micrograin_core::labels::{BACKGROUND, UNGROUPED};
use micrograin_core::{ActiveFlags, AdjacencyGraph, CancelToken, DataArray, Error, Outcome, Warning};
use rand::Rng;

/// Inputs of a merging pass
#[derive(Debug, Clone, Copy)]
pub struct MergeInputs<'a> {
    pub features: FeatureData<'a>,
    /// Contiguous neighbors of each feature
    pub neighbors: &'a AdjacencyGraph,
    /// Optional non-contiguous neighbors of each feature
    pub non_contiguous: Option<&'a AdjacencyGraph>,
    /// Feature id of each voxel
    pub cell_feature_ids: &'a DataArray<i32>,
}

impl<'a> MergeInputs<'a> {
    pub fn new(
        features: FeatureData<'a>,
        neighbors: &'a AdjacencyGraph,
        cell_feature_ids: &'a DataArray<i32>,
    ) -> Self {
        Self {
            features,
            neighbors,
            non_contiguous: None,
            cell_feature_ids,
        }
    }

    pub fn with_non_contiguous(mut self, graph: &'a AdjacencyGraph) -> Self {
        self.non_contiguous = Some(graph);
        self
    }
}

/// Parent labeling produced by a merging pass
#[derive(Debug, Clone)]
pub struct ParentGrouping {
    /// Parent id of each feature slot (0 for slot 0 and phase 0 features)
    pub feature_parent_ids: DataArray<i32>,
    /// Parent id of each voxel
    pub cell_parent_ids: DataArray<i32>,
    /// One flag per parent slot; slot 0 is inactive
    pub active: ActiveFlags,
    pub parent_count: usize,
}

/// Knobs shared by the merging drivers
#[derive(Debug, Clone, Copy)]
pub(crate) struct MergeSettings {
    pub use_non_contiguous_neighbors: bool,
    pub random_parent_ids: bool,
}

pub(crate) fn run_merge<S, R>(
    inputs: &MergeInputs<'_>,
    strategy: &mut S,
    settings: MergeSettings,
    rng: &mut R,
    cancel: Option<&CancelToken>,
    warnings: Vec<Warning>,
) -> GroupResult<Outcome<ParentGrouping>>
where
    S: GroupingStrategy + ?Sized,
    R: Rng + ?Sized,
{
    let num_features = inputs.features.num_features();
    let non_contiguous = match (settings.use_non_contiguous_neighbors, inputs.non_contiguous) {
        (true, None) => {
            return Err(GroupError::InvalidParameters(
                "non-contiguous neighbors requested but no non-contiguous neighbor list supplied"
                    .to_string(),
            ));
        }
        (true, graph) => graph,
        (false, _) => None,
    };

    let cell_feature_ids = inputs.cell_feature_ids;
    cell_feature_ids.check_components(1)?;
    for &feature in cell_feature_ids.as_slice() {
        if feature < 0 || feature as usize >= num_features {
            return Err(Error::IndexOutOfBounds {
                index: feature.max(0) as usize,
                len: num_features,
            }
            .into());
        }
    }

    let initial: Vec<i32> = (0..num_features)
        .map(|f| {
            if f == 0 || inputs.features.phase(f) <= 0 {
                BACKGROUND
            } else {
                UNGROUPED
            }
        })
        .collect();
    let mut feature_parent_ids = DataArray::from_vec("FeatureParentIds", 1, initial)?;

    let mut engine = GroupingEngine::new(inputs.neighbors);
    if let Some(graph) = non_contiguous {
        engine = engine.with_non_contiguous(graph);
    }
    if let Some(token) = cancel {
        engine = engine.with_cancel(token);
    }
    let outcome = engine.run(
        strategy,
        &mut RandomStartSeeds::new(&mut *rng),
        &mut feature_parent_ids,
    )?;

    let cell_parent_ids: Vec<i32> = cell_feature_ids
        .as_slice()
        .iter()
        .map(|&f| feature_parent_ids.value(f as usize))
        .collect();
    let mut cell_parent_ids = DataArray::from_vec("CellParentIds", 1, cell_parent_ids)?;

    if settings.random_parent_ids && !outcome.cancelled {
        randomize_parent_ids(
            &mut feature_parent_ids,
            &mut cell_parent_ids,
            outcome.value.parent_count,
            rng,
        );
    }

    Ok(outcome
        .map(|grouping| ParentGrouping {
            feature_parent_ids,
            cell_parent_ids,
            active: grouping.active,
            parent_count: grouping.parent_count,
        })
        .with_warnings(warnings))
}
