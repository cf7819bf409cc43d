//! Entry-point for partition-aware pre-processing.
//!
//! The balanced partitioning decision itself is made elsewhere (METIS or any
//! tool producing one part index per node). This module validates that
//! decision as a [`PartitionMap`], splits the global graph into per-part
//! [`Subgraph`]s, detects the [`BoundarySet`], and reports partition quality.

pub mod boundary;
pub mod error;
pub mod graph_traits;
#[cfg(feature = "metis-support")]
pub mod metis_partition;
pub mod metrics;
pub mod subgraph;

#[cfg(test)]
mod tests;

pub use self::boundary::{BoundarySet, find_boundary_nodes};
pub use self::error::PartitionError;
pub use self::metrics::*;
pub use self::subgraph::{Subgraph, build_partitioned_subgraphs};

use crate::graph::{AdjacencyList, NodeId};

pub type PartitionId = usize;

/// Total, immutable node -> part assignment over nodes `0..len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMap {
    parts: Vec<PartitionId>,
    num_parts: usize,
}

impl PartitionMap {
    /// Validate `parts[v]` as the part of node `v`, with parts in `0..num_parts`.
    pub fn new(parts: Vec<PartitionId>, num_parts: usize) -> Result<Self, PartitionError> {
        if num_parts == 0 {
            return Err(PartitionError::NoParts);
        }
        if let Some((v, &part)) = parts.iter().enumerate().find(|&(_, &p)| p >= num_parts) {
            return Err(PartitionError::PartOutOfRange {
                vertex: v as NodeId,
                part,
                num_parts,
            });
        }
        Ok(Self { parts, num_parts })
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, v: NodeId) -> Option<PartitionId> {
        self.parts.get(v as usize).copied()
    }

    /// Part owning `v`; a missing entry is a configuration error, never skipped.
    pub fn part_of(&self, v: NodeId) -> Result<PartitionId, PartitionError> {
        self.get(v).ok_or(PartitionError::MissingPartition(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, PartitionId)> + '_ {
        self.parts
            .iter()
            .enumerate()
            .map(|(v, &p)| (v as NodeId, p))
    }

    pub fn as_slice(&self) -> &[PartitionId] {
        &self.parts
    }

    /// Number of nodes assigned to each part.
    pub fn part_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_parts];
        for &p in &self.parts {
            sizes[p] += 1;
        }
        sizes
    }

    /// Checks that every node of `graph` (and every edge endpoint) is assigned
    /// and that the assignment names no node the graph lacks.
    pub fn check_covers(&self, graph: &AdjacencyList) -> Result<(), PartitionError> {
        let n = graph.num_nodes();
        if self.parts.len() < n {
            return Err(PartitionError::MissingPartition(self.parts.len() as NodeId));
        }
        if self.parts.len() > n {
            return Err(PartitionError::LengthMismatch {
                assigned: self.parts.len(),
                expected: n,
            });
        }
        Ok(())
    }
}
