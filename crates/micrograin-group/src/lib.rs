//! micrograin-group - Grouping features into parents
//!
//! This crate merges segmented features into parent groups by walking the
//! feature adjacency graph:
//!
//! - **Grouping engine** - Seeded graph flood fill with a pluggable pairwise
//!   strategy, random-start seed selection and optional patch growth
//! - **Colonies** - Alpha variant relationships and the Burgers relation
//!   between cubic and hexagonal features
//! - **Twins** - Σ3 relationships between cubic features
//! - **Parent id shuffling** - Seedable relabeling of parent ids fixing 0
//!
//! # Example
//!
//! ```
//! use micrograin_core::AdjacencyGraph;
//! use micrograin_core::DataArray;
//! use micrograin_group::{GroupingEngine, GroupingStrategy, LinearGroupSeeds};
//!
//! struct Everything;
//!
//! impl GroupingStrategy for Everything {
//!     fn determine_grouping(&self, _reference: usize, _neighbor: usize, _parent: i32) -> bool {
//!         true
//!     }
//! }
//!
//! let graph = AdjacencyGraph::from_lists(vec![vec![], vec![2], vec![1, 3], vec![2]]).unwrap();
//! let mut parent_ids = DataArray::from_vec("ParentIds", 1, vec![0, -1, -1, -1]).unwrap();
//! let out = GroupingEngine::new(&graph)
//!     .run(&mut Everything, &mut LinearGroupSeeds, &mut parent_ids)
//!     .unwrap();
//! assert_eq!(out.value.parent_count, 1);
//! assert_eq!(parent_ids.as_slice(), &[0, 1, 1, 1]);
//! ```

pub mod colony;
pub mod engine;
pub mod error;
pub mod features;
pub mod merge;
pub mod shuffle;
pub mod twins;

pub use micrograin_core;

pub use error::{GroupError, GroupResult};

pub use engine::{
    GroupSeedPolicy, Grouping, GroupingEngine, GroupingStrategy, LinearGroupSeeds,
    RandomStartSeeds,
};

pub use features::FeatureData;

pub use merge::{MergeInputs, ParentGrouping};

pub use colony::{
    ALPHA_VARIANTS, ColonyOptions, ColonyStrategy, UNSUPPORTED_COLONY_PHASE, VariantRelationship,
    burgers_correspondences, check_for_burgers, merge_colonies,
};

pub use twins::{TwinOptions, TwinStrategy, UNSUPPORTED_TWIN_PHASE, merge_twins};

pub use shuffle::{parent_id_permutation, randomize_parent_ids};
