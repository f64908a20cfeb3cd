//! Feature adjacency graphs
//!
//! An [`AdjacencyGraph`] maps each feature id to an ordered list of
//! neighboring feature ids. Duplicates are allowed; self references are
//! dropped on insertion. Slot 0 (background) normally has no neighbors.

use crate::error::{Error, Result};

/// Neighbor lists indexed by feature id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyGraph {
    lists: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    /// Create a graph with `num_features` slots and no edges
    pub fn new(num_features: usize) -> Self {
        Self {
            lists: vec![Vec::new(); num_features],
        }
    }

    /// Build from explicit neighbor lists
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if any neighbor id has no slot.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Result<Self> {
        let len = lists.len();
        let mut graph = Self::new(len);
        for (feature, list) in lists.into_iter().enumerate() {
            for neighbor in list {
                if neighbor >= len {
                    return Err(Error::IndexOutOfBounds {
                        index: neighbor,
                        len,
                    });
                }
                graph.push_neighbor(feature, neighbor);
            }
        }
        Ok(graph)
    }

    /// Number of feature slots (including slot 0)
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Neighbors of `feature`, empty for ids without a slot
    pub fn neighbors(&self, feature: usize) -> &[usize] {
        self.lists.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append `neighbor` to the list of `feature`, growing the graph if needed
    pub fn push_neighbor(&mut self, feature: usize, neighbor: usize) {
        if feature == neighbor {
            return;
        }
        let needed = feature.max(neighbor) + 1;
        if self.lists.len() < needed {
            self.lists.resize(needed, Vec::new());
        }
        self.lists[feature].push(neighbor);
    }

    /// Record a symmetric contact between two features
    pub fn add_edge(&mut self, a: usize, b: usize) {
        self.push_neighbor(a, b);
        self.push_neighbor(b, a);
    }

    /// Total number of stored (directed) neighbor entries
    pub fn num_entries(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}
