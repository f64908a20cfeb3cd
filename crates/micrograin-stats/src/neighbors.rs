//! Contiguous feature neighbors
//!
//! Two features are neighbors when voxels of each share a face. Lists are
//! ordered by first contact in voxel index order and the six-way stencil
//! order, without duplicates.

use crate::error::StatsResult;
use crate::voxel_map::check_feature_ids;
use micrograin_core::labels::BACKGROUND;
use micrograin_core::{AdjacencyGraph, DataArray, Geometry, Stencil};
use tracing::debug;

/// Build the face-contact graph of a segmented grid
///
/// The graph has `num_features` slots; slot 0 and unassigned voxels take no
/// part in it.
///
/// # Errors
///
/// Returns an error if `feature_ids` does not cover the grid or holds ids
/// outside `[0, num_features)`.
pub fn find_neighbors(
    geometry: &Geometry,
    feature_ids: &DataArray<i32>,
    num_features: usize,
) -> StatsResult<AdjacencyGraph> {
    check_feature_ids(geometry, feature_ids, num_features)?;

    let mut graph = AdjacencyGraph::new(num_features);
    for idx in 0..geometry.num_voxels() {
        let feature = feature_ids.value(idx);
        if feature == BACKGROUND {
            continue;
        }
        let feature = feature as usize;
        for other in geometry.neighbors(idx, Stencil::SixWay) {
            let neighbor = feature_ids.value(other);
            if neighbor == BACKGROUND {
                continue;
            }
            let neighbor = neighbor as usize;
            if neighbor != feature && !graph.neighbors(feature).contains(&neighbor) {
                graph.push_neighbor(feature, neighbor);
            }
        }
    }
    debug!(
        features = num_features,
        entries = graph.num_entries(),
        "neighbor lists built"
    );
    Ok(graph)
}
