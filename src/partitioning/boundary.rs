//! Boundary node detection.
//!
//! A node is a boundary node iff it has at least one outgoing edge to a node
//! owned by a different part. Only outgoing edges are inspected, so both
//! endpoints of a cross-partition edge are found only when the graph stores
//! the edge in both directions; asymmetric graphs are rejected rather than
//! producing a set that disagrees between the two endpoints.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{PartitionError, PartitionMap};
use crate::graph::{AdjacencyList, NodeId};

/// Global, sorted set of boundary nodes; read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundarySet(BTreeSet<NodeId>);

impl BoundarySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ascending node ids.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<NodeId> for BoundarySet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compute the boundary set of `graph` under `pm`.
///
/// Deterministic: every worker that recomputes it from the same inputs gets
/// the same set. Isolated nodes are never boundary nodes.
pub fn find_boundary_nodes(
    graph: &AdjacencyList,
    pm: &PartitionMap,
) -> Result<BoundarySet, PartitionError> {
    pm.check_covers(graph)?;
    if let Some((u, v)) = graph.find_asymmetric_edge() {
        return Err(PartitionError::AsymmetricGraph { u, v });
    }
    let flagged: Vec<Option<NodeId>> = (0..graph.num_nodes() as NodeId)
        .into_par_iter()
        .map(|u| -> Result<Option<NodeId>, PartitionError> {
            let pu = pm.part_of(u)?;
            for &(v, _) in graph.neighbors(u) {
                if pm.part_of(v)? != pu {
                    return Ok(Some(u));
                }
            }
            Ok(None)
        })
        .collect::<Result<_, PartitionError>>()?;
    let boundary: BoundarySet = flagged.into_iter().flatten().collect();
    log::debug!(
        "boundary detection: {} of {} nodes cross a part boundary",
        boundary.len(),
        graph.num_nodes()
    );
    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_split_marks_both_endpoints() {
        // edges (0,1),(1,2); parts {0:A, 1:A, 2:B}
        let g = AdjacencyList::from_undirected(3, &[(0, 1, 3), (1, 2, 4)]);
        let pm = PartitionMap::new(vec![0, 0, 1], 2).unwrap();
        let b = find_boundary_nodes(&g, &pm).unwrap();
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(!b.contains(0));
    }

    #[test]
    fn isolated_node_is_never_boundary() {
        let g = AdjacencyList::from_undirected(3, &[(0, 1, 1)]);
        let pm = PartitionMap::new(vec![0, 1, 1], 2).unwrap();
        let b = find_boundary_nodes(&g, &pm).unwrap();
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!b.contains(2));
    }

    #[test]
    fn single_part_has_no_boundary() {
        let g = AdjacencyList::from_undirected(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        let pm = PartitionMap::new(vec![0; 4], 1).unwrap();
        assert!(find_boundary_nodes(&g, &pm).unwrap().is_empty());
    }

    #[test]
    fn asymmetric_graph_is_rejected() {
        let g = AdjacencyList::from_directed(2, &[(0, 1, 1)]);
        let pm = PartitionMap::new(vec![0, 1], 2).unwrap();
        assert_eq!(
            find_boundary_nodes(&g, &pm),
            Err(PartitionError::AsymmetricGraph { u: 0, v: 1 })
        );
        let b = find_boundary_nodes(&g.symmetrized(), &pm).unwrap();
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn serializes_as_sorted_list() {
        let b: BoundarySet = [9, 2, 5].into_iter().collect();
        assert_eq!(serde_json::to_string(&b).unwrap(), "[2,5,9]");
    }
}
