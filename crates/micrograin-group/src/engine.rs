//! Seeded flood fill over a feature adjacency graph
//!
//! The [`GroupingEngine`] places every ungrouped feature into a parent
//! group. Starting from a seed feature it walks the adjacency graph,
//! asking a [`GroupingStrategy`] whether each neighbor joins the current
//! group. Members are scanned in insertion order and stay in the member
//! list for the rest of the group, so features added late are still asked
//! about their own neighbors.
//!
//! In patch mode the first pass only marks matching neighbors. If the
//! strategy's [`GroupingStrategy::grow_patch`] hook agrees, a second pass
//! over contiguous neighbors calls [`GroupingStrategy::grow_grouping`] and
//! grows the member list from its matches.

use crate::error::{GroupError, GroupResult};
use micrograin_core::labels::UNGROUPED;
use micrograin_core::{ActiveFlags, AdjacencyGraph, CancelToken, DataArray, Error, Outcome};
use rand::Rng;
use tracing::{debug, info};

/// Initial member list capacity for one group
const INITIAL_GROUP_CAPACITY: usize = 64;

/// Groups between progress messages
const PROGRESS_INTERVAL: i32 = 1000;

/// Pairwise grouping test driving the graph flood fill
pub trait GroupingStrategy {
    /// Whether `neighbor` joins parent `parent_id`, reached from `reference`
    ///
    /// Only called for neighbors that are still ungrouped.
    fn determine_grouping(&self, reference: usize, neighbor: usize, parent_id: i32) -> bool;

    /// Whether the finished first pass of `parent_id` should grow further
    ///
    /// Only consulted in patch mode.
    fn grow_patch(&mut self, _parent_id: i32) -> bool {
        false
    }

    /// Whether `neighbor` is added as a member in the patch growth pass
    fn grow_grouping(&self, _reference: usize, _neighbor: usize, _parent_id: i32) -> bool {
        false
    }
}

/// Where the next parent group starts
pub trait GroupSeedPolicy {
    /// An ungrouped feature, or `None` when every feature is placed
    fn next_seed(&mut self, parent_ids: &[i32]) -> Option<usize>;
}

/// Random start index, then a forward (wrapping) scan for an ungrouped feature
#[derive(Debug)]
pub struct RandomStartSeeds<'r, R: Rng + ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> RandomStartSeeds<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + ?Sized> GroupSeedPolicy for RandomStartSeeds<'_, R> {
    fn next_seed(&mut self, parent_ids: &[i32]) -> Option<usize> {
        let n = parent_ids.len();
        if n == 0 {
            return None;
        }
        let start = self.rng.gen_range(0..n);
        (start..n)
            .chain(0..start)
            .find(|&f| parent_ids[f] == UNGROUPED)
    }
}

/// Lowest-index ungrouped feature
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearGroupSeeds;

impl GroupSeedPolicy for LinearGroupSeeds {
    fn next_seed(&mut self, parent_ids: &[i32]) -> Option<usize> {
        parent_ids.iter().position(|&p| p == UNGROUPED)
    }
}

/// Result of one grouping pass
#[derive(Debug, Clone)]
pub struct Grouping {
    /// Number of parent groups created (ids `1..=parent_count`)
    pub parent_count: usize,
    /// One flag per parent slot; slot 0 is inactive
    pub active: ActiveFlags,
}

/// Graph flood fill engine
#[derive(Debug, Clone)]
pub struct GroupingEngine<'a> {
    graph: &'a AdjacencyGraph,
    non_contiguous: Option<&'a AdjacencyGraph>,
    patch_grouping: bool,
    cancel: Option<&'a CancelToken>,
}

impl<'a> GroupingEngine<'a> {
    pub fn new(graph: &'a AdjacencyGraph) -> Self {
        Self {
            graph,
            non_contiguous: None,
            patch_grouping: false,
            cancel: None,
        }
    }

    /// Also offer non-contiguous neighbors to the first pass
    pub fn with_non_contiguous(mut self, graph: &'a AdjacencyGraph) -> Self {
        self.non_contiguous = Some(graph);
        self
    }

    /// Enable the two-pass patch growth mode
    pub fn with_patch_grouping(mut self, patch_grouping: bool) -> Self {
        self.patch_grouping = patch_grouping;
        self
    }

    /// Poll `token` before each new parent group
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    fn check_graph(&self, graph: &AdjacencyGraph, name: &str, len: usize) -> GroupResult<()> {
        if graph.len() != len {
            return Err(Error::TupleCountMismatch {
                name: name.to_string(),
                expected: len,
                actual: graph.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Assign a parent id to every ungrouped feature
    ///
    /// `parent_ids` holds one entry per feature slot. Entries equal to
    /// [`UNGROUPED`] are placed; any other value is left alone, so callers
    /// pre-assign features that must not take part (phase 0, slot 0).
    ///
    /// # Errors
    ///
    /// - the graphs and `parent_ids` disagree on the feature count
    /// - [`GroupError::NoGroupsFound`] if a completed pass created no group
    pub fn run<S, P>(
        &self,
        strategy: &mut S,
        seeds: &mut P,
        parent_ids: &mut DataArray<i32>,
    ) -> GroupResult<Outcome<Grouping>>
    where
        S: GroupingStrategy + ?Sized,
        P: GroupSeedPolicy + ?Sized,
    {
        parent_ids.check_components(1)?;
        let num_features = parent_ids.num_tuples();
        self.check_graph(self.graph, "NeighborList", num_features)?;
        if let Some(graph) = self.non_contiguous {
            self.check_graph(graph, "NonContiguousNeighborList", num_features)?;
        }
        let parent_ids = parent_ids.as_mut_slice();

        info!(
            num_features,
            patch_grouping = self.patch_grouping,
            non_contiguous = self.non_contiguous.is_some(),
            "grouping features"
        );

        let mut active = ActiveFlags::with_len(1);
        let mut members: Vec<usize> = Vec::with_capacity(INITIAL_GROUP_CAPACITY);
        let mut queued = vec![false; num_features];
        let mut parent_id: i32 = 1;
        let mut cancelled = false;

        loop {
            if self.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(seed) = seeds.next_seed(parent_ids) else {
                break;
            };
            parent_ids[seed] = parent_id;
            active.set(parent_id as usize, true);
            debug!(parent_id, seed, "parent table grown to {}", active.len());

            members.clear();
            members.push(seed);
            queued[seed] = true;

            let mut j = 0;
            while j < members.len() {
                let reference = members[j];
                let contiguous = self.graph.neighbors(reference);
                let distant = self
                    .non_contiguous
                    .map_or(&[][..], |g| g.neighbors(reference));
                for &neighbor in contiguous.iter().chain(distant) {
                    if neighbor == reference || parent_ids[neighbor] != UNGROUPED {
                        continue;
                    }
                    if strategy.determine_grouping(reference, neighbor, parent_id) {
                        parent_ids[neighbor] = parent_id;
                        if !self.patch_grouping {
                            members.push(neighbor);
                            queued[neighbor] = true;
                        }
                    }
                }
                j += 1;
            }

            if self.patch_grouping && strategy.grow_patch(parent_id) {
                let mut j = 0;
                while j < members.len() {
                    let reference = members[j];
                    for &neighbor in self.graph.neighbors(reference) {
                        let parent = parent_ids[neighbor];
                        if neighbor == reference
                            || queued[neighbor]
                            || (parent != UNGROUPED && parent != parent_id)
                        {
                            continue;
                        }
                        if strategy.grow_grouping(reference, neighbor, parent_id) {
                            parent_ids[neighbor] = parent_id;
                            members.push(neighbor);
                            queued[neighbor] = true;
                        }
                    }
                    j += 1;
                }
            }

            for &member in &members {
                queued[member] = false;
            }
            if parent_id % PROGRESS_INTERVAL == 0 {
                info!("{parent_id} parent groups created");
            }
            parent_id += 1;
        }

        let parent_count = (parent_id - 1) as usize;
        if cancelled {
            info!(parent_count, "grouping cancelled");
        } else {
            info!(parent_count, "grouping complete");
            if parent_count == 0 {
                return Err(GroupError::NoGroupsFound);
            }
        }

        Ok(Outcome::new(Grouping {
            parent_count,
            active,
        })
        .with_cancelled(cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;

    struct Always(bool);

    impl GroupingStrategy for Always {
        fn determine_grouping(&self, _reference: usize, _neighbor: usize, _parent_id: i32) -> bool {
            self.0
        }
    }

    fn parents(n: usize) -> DataArray<i32> {
        let mut ids = DataArray::with_value("ParentIds", n, 1, UNGROUPED).unwrap();
        ids.set_value(0, 0);
        ids
    }

    fn chain() -> AdjacencyGraph {
        // 1 - 2 - 3, with 1 and 3 not adjacent
        AdjacencyGraph::from_lists(vec![vec![], vec![2], vec![1, 3], vec![2]]).unwrap()
    }

    #[test]
    fn test_chain_forms_one_group() {
        let graph = chain();
        let mut ids = parents(4);
        let mut rng = StdRng::seed_from_u64(17);
        let out = GroupingEngine::new(&graph)
            .run(&mut Always(true), &mut RandomStartSeeds::new(&mut rng), &mut ids)
            .unwrap();
        assert_eq!(out.value.parent_count, 1);
        assert_eq!(ids.as_slice(), &[0, 1, 1, 1]);
        assert_eq!(out.value.active.as_slice(), &[false, true]);
    }

    #[test]
    fn test_never_grouping_gives_singletons() {
        let graph = chain();
        let mut ids = parents(4);
        let out = GroupingEngine::new(&graph)
            .run(&mut Always(false), &mut LinearGroupSeeds, &mut ids)
            .unwrap();
        assert_eq!(out.value.parent_count, 3);
        assert_eq!(ids.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_non_contiguous_neighbors_join() {
        let graph = AdjacencyGraph::from_lists(vec![vec![], vec![], vec![]]).unwrap();
        let distant = AdjacencyGraph::from_lists(vec![vec![], vec![2], vec![1]]).unwrap();
        let mut ids = parents(3);
        let out = GroupingEngine::new(&graph)
            .with_non_contiguous(&distant)
            .run(&mut Always(true), &mut LinearGroupSeeds, &mut ids)
            .unwrap();
        assert_eq!(out.value.parent_count, 1);

        let mut ids = parents(3);
        let out = GroupingEngine::new(&graph)
            .run(&mut Always(true), &mut LinearGroupSeeds, &mut ids)
            .unwrap();
        assert_eq!(out.value.parent_count, 2);
    }

    #[test]
    fn test_no_ungrouped_features() {
        let graph = AdjacencyGraph::new(2);
        let mut ids = DataArray::from_vec("ParentIds", 1, vec![0, 0]).unwrap();
        let err = GroupingEngine::new(&graph)
            .run(&mut Always(true), &mut LinearGroupSeeds, &mut ids)
            .unwrap_err();
        assert!(matches!(err, GroupError::NoGroupsFound));
    }

    #[test]
    fn test_graph_size_mismatch() {
        let graph = chain();
        let mut ids = parents(3);
        let err = GroupingEngine::new(&graph)
            .run(&mut Always(true), &mut LinearGroupSeeds, &mut ids)
            .unwrap_err();
        assert_eq!(err.code(), -1002);
    }

    #[test]
    fn test_random_seeds_wrap() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut seeds = RandomStartSeeds::new(&mut rng);
        for _ in 0..20 {
            assert_eq!(seeds.next_seed(&[0, 4, -1, 4]), Some(2));
        }
        assert_eq!(seeds.next_seed(&[0, 1]), None);
    }

    #[test]
    fn test_cancelled() {
        let graph = chain();
        let token = CancelToken::new();
        token.cancel();
        let mut ids = parents(4);
        let out = GroupingEngine::new(&graph)
            .with_cancel(&token)
            .run(&mut Always(true), &mut LinearGroupSeeds, &mut ids)
            .unwrap();
        assert!(out.cancelled);
        assert_eq!(out.value.parent_count, 0);
        assert_eq!(ids.as_slice(), &[0, -1, -1, -1]);
    }

    /// Marks everything in the first pass, grows only from even features
    struct EvenPatch {
        patches: RefCell<Vec<i32>>,
    }

    impl GroupingStrategy for EvenPatch {
        fn determine_grouping(&self, _reference: usize, _neighbor: usize, _parent_id: i32) -> bool {
            true
        }

        fn grow_patch(&mut self, parent_id: i32) -> bool {
            self.patches.borrow_mut().push(parent_id);
            true
        }

        fn grow_grouping(&self, _reference: usize, neighbor: usize, _parent_id: i32) -> bool {
            neighbor % 2 == 0
        }
    }

    #[test]
    fn test_patch_mode_grows_only_through_second_pass() {
        // 1 - 2 - 3 - 4 - 5
        let graph = AdjacencyGraph::from_lists(vec![
            vec![],
            vec![2],
            vec![1, 3],
            vec![2, 4],
            vec![3, 5],
            vec![4],
        ])
        .unwrap();
        let mut ids = parents(6);
        let mut strategy = EvenPatch {
            patches: RefCell::new(Vec::new()),
        };
        let out = GroupingEngine::new(&graph)
            .with_patch_grouping(true)
            .run(&mut strategy, &mut LinearGroupSeeds, &mut ids)
            .unwrap();
        // Seed 1 marks 2; the second pass adds 2 as a member, which cannot
        // add 3 (odd). Seed 3 marks 4, then grows through 4 and stops at 5.
        assert_eq!(ids.as_slice(), &[0, 1, 1, 2, 2, 3]);
        assert_eq!(out.value.parent_count, 3);
        assert_eq!(*strategy.patches.borrow(), vec![1, 2, 3]);
    }
}
