//! Partitioning metrics utilities.
//!
//! This module provides functions for evaluating the quality of a partition
//! assignment: edge cut, replication factor and per-part load. The preparation
//! pipeline logs them so a bad external partitioning is visible before any
//! worker starts exchanging boundary updates.

use super::graph_traits::PartitionableGraph;
use super::{PartitionError, PartitionMap};
use crate::graph::NodeId;
use rayon::prelude::*;
use hashbrown::HashSet;
use parking_lot::Mutex;
use serde::Serialize;

/// Computes the edge cut of a partitioning (O(E)).
///
/// The edge cut is the number of undirected edges whose endpoints lie in
/// different parts.
///
/// # Errors
/// Fails if an edge endpoint has no part.
pub fn edge_cut<G>(g: &G, pm: &PartitionMap) -> Result<usize, PartitionError>
where
    G: PartitionableGraph<VertexId = NodeId>,
{
    g.edges()
        .map(|(u, v, _)| -> Result<usize, PartitionError> {
            Ok(usize::from(pm.part_of(u)? != pm.part_of(v)?))
        })
        .sum()
}

/// Total weight of the undirected edges that cross a part boundary.
///
/// Every relaxation over one of these edges becomes an exchanged update, so
/// this is a rough measure of the traffic a partitioning induces.
pub fn cut_weight<G>(g: &G, pm: &PartitionMap) -> Result<u64, PartitionError>
where
    G: PartitionableGraph<VertexId = NodeId>,
{
    g.edges()
        .map(|(u, v, w)| -> Result<u64, PartitionError> {
            Ok(if pm.part_of(u)? != pm.part_of(v)? { w } else { 0 })
        })
        .sum()
}

/// Computes the replication factor of a partitioning (O(E)).
///
/// The replication factor is the average number of parts that hold a copy of
/// each vertex: its owner, plus every part owning one of its in-neighbours.
/// For SSSP this is the average number of distance-map copies per node.
pub fn replication_factor<G>(g: &G, pm: &PartitionMap) -> Result<f64, PartitionError>
where
    G: PartitionableGraph<VertexId = NodeId>,
{
    let n = g.vertices().len();
    if n == 0 {
        return Ok(0.0);
    }

    // One owner set per vertex; vertex ids are dense 0..n.
    let owners: Vec<Mutex<HashSet<usize>>> = (0..n).map(|_| Mutex::new(HashSet::new())).collect();
    let record = |v: NodeId, part: usize| -> Result<(), PartitionError> {
        let slot = owners
            .get(v as usize)
            .ok_or(PartitionError::MissingPartition(v))?;
        slot.lock().insert(part);
        Ok(())
    };

    g.vertices().try_for_each(|u| -> Result<(), PartitionError> {
        let pu = pm.part_of(u)?;
        record(u, pu)?;
        g.neighbors(u).try_for_each(|v| record(v, pu))
    })?;

    let total_owned: usize = owners
        .into_iter()
        .map(|s| s.into_inner().len())
        .sum();
    Ok(total_owned as f64 / n as f64)
}

/// Summary of an assignment, logged by the preparation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartitionStats {
    pub num_parts: usize,
    pub part_sizes: Vec<usize>,
    pub edge_cut: usize,
    pub cut_weight: u64,
    pub replication_factor: f64,
    pub boundary_nodes: usize,
}

impl PartitionStats {
    pub fn compute<G>(g: &G, pm: &PartitionMap, boundary_nodes: usize) -> Result<Self, PartitionError>
    where
        G: PartitionableGraph<VertexId = NodeId>,
    {
        Ok(Self {
            num_parts: pm.num_parts(),
            part_sizes: pm.part_sizes(),
            edge_cut: edge_cut(g, pm)?,
            cut_weight: cut_weight(g, pm)?,
            replication_factor: replication_factor(g, pm)?,
            boundary_nodes,
        })
    }

    /// Largest part size over mean part size (1.0 is perfectly balanced).
    pub fn imbalance(&self) -> f64 {
        let total: usize = self.part_sizes.iter().sum();
        if total == 0 || self.num_parts == 0 {
            return 1.0;
        }
        let max = self.part_sizes.iter().copied().max().unwrap_or(0);
        max as f64 * self.num_parts as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyList;

    fn path(n: u64) -> AdjacencyList {
        let edges: Vec<_> = (0..n - 1).map(|u| (u, u + 1, 1)).collect();
        AdjacencyList::from_undirected(n as usize, &edges)
    }

    #[test]
    fn edge_cut_cycle() {
        // 4-cycle: 0-1-2-3-0
        let g = AdjacencyList::from_undirected(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)]);
        let same = PartitionMap::new(vec![0; 4], 1).unwrap();
        assert_eq!(edge_cut(&g, &same).unwrap(), 0);

        let halves = PartitionMap::new(vec![0, 0, 1, 1], 2).unwrap();
        assert_eq!(edge_cut(&g, &halves).unwrap(), 2);
    }

    #[test]
    fn cut_weight_counts_crossing_edges_once() {
        let g = AdjacencyList::from_undirected(3, &[(0, 1, 4), (1, 2, 7), (0, 2, 10)]);
        let pm = PartitionMap::new(vec![0, 0, 1], 2).unwrap();
        assert_eq!(cut_weight(&g, &pm).unwrap(), 17);
        let one = PartitionMap::new(vec![0; 3], 1).unwrap();
        assert_eq!(cut_weight(&g, &one).unwrap(), 0);
    }

    #[test]
    fn edge_cut_path() {
        let g = path(4);
        let pm = PartitionMap::new(vec![0, 0, 0, 1], 2).unwrap();
        assert_eq!(edge_cut(&g, &pm).unwrap(), 1);
    }

    #[test]
    fn replication_factor_trivial() {
        // Path: 0-1-2 with all in same part → RF == 1.0
        let g = path(3);
        let pm = PartitionMap::new(vec![0; 3], 1).unwrap();
        let rf = replication_factor(&g, &pm).unwrap();
        assert!((rf - 1.0).abs() < 1e-6);
    }

    #[test]
    fn replication_factor_path() {
        // Path: 0-1-2, (0,1)->0, (2)->1 → expected RF ≈ (1 + 2 + 2)/3 = 5/3
        let g = path(3);
        let pm = PartitionMap::new(vec![0, 0, 1], 2).unwrap();
        let rf = replication_factor(&g, &pm).unwrap();
        assert!(
            (rf - 1.6667).abs() < 2e-3,
            "replication_factor was {} (expected ~1.6667)",
            rf
        );
    }

    #[test]
    fn missing_assignment_is_reported() {
        let g = path(3);
        let pm = PartitionMap::new(vec![0, 0], 1).unwrap();
        assert_eq!(edge_cut(&g, &pm), Err(PartitionError::MissingPartition(2)));
    }

    #[test]
    fn stats_summarize_the_assignment() {
        let g = path(4);
        let pm = PartitionMap::new(vec![0, 0, 0, 1], 2).unwrap();
        let stats = PartitionStats::compute(&g, &pm, 2).unwrap();
        assert_eq!(stats.part_sizes, vec![3, 1]);
        assert_eq!(stats.edge_cut, 1);
        assert_eq!(stats.cut_weight, 1);
        assert!((stats.imbalance() - 1.5).abs() < 1e-9);
    }
}
