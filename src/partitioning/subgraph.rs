//! Per-partition subgraph extraction.
//!
//! A [`Subgraph`] holds the outgoing edges of the nodes one part owns. Edges
//! are never copied into the part of their target: a cross-partition edge
//! `u -> v` lives only in `part(u)`, and the worker that owns `u` is the one
//! that relaxes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PartitionError, PartitionMap};
use crate::graph::{AdjacencyList, NodeId, Weight};

/// Adjacency of the nodes owned by one partition.
///
/// Every owned node is a key, including nodes without outgoing edges, so the
/// keys of all subgraphs of one assignment partition the node set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subgraph {
    adjacency: BTreeMap<NodeId, Vec<(NodeId, Weight)>>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `u` as owned (no-op if already present).
    pub fn insert_node(&mut self, u: NodeId) {
        self.adjacency.entry(u).or_default();
    }

    /// Append `u -> v`, registering `u` as owned.
    pub fn push_edge(&mut self, u: NodeId, v: NodeId, w: Weight) {
        self.adjacency.entry(u).or_default().push((v, w));
    }

    pub fn owns(&self, u: NodeId) -> bool {
        self.adjacency.contains_key(&u)
    }

    pub fn owned_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn edges_of(&self, u: NodeId) -> &[(NodeId, Weight)] {
        self.adjacency.get(&u).map_or(&[], Vec::as_slice)
    }

    /// `(owned node, outgoing edges)` in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[(NodeId, Weight)])> + '_ {
        self.adjacency.iter().map(|(&u, es)| (u, es.as_slice()))
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Edge targets not owned by this subgraph (sorted, deduplicated).
    pub fn remote_targets(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .adjacency
            .values()
            .flatten()
            .map(|&(v, _)| v)
            .filter(|v| !self.owns(*v))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Split `graph` into `pm.num_parts()` subgraphs, one per part.
///
/// Edge order within each node's list is preserved. Fails if the assignment
/// does not cover every node and edge endpoint of the graph.
pub fn build_partitioned_subgraphs(
    graph: &AdjacencyList,
    pm: &PartitionMap,
) -> Result<Vec<Subgraph>, PartitionError> {
    pm.check_covers(graph)?;
    let mut subgraphs = vec![Subgraph::new(); pm.num_parts()];
    for u in graph.nodes() {
        let p = pm.part_of(u)?;
        let sub = &mut subgraphs[p];
        sub.insert_node(u);
        for &(v, w) in graph.neighbors(u) {
            pm.part_of(v)?;
            sub.push_edge(u, v, w);
        }
    }
    log::debug!(
        "built {} subgraphs: {:?} nodes, {:?} edges",
        subgraphs.len(),
        subgraphs.iter().map(Subgraph::num_nodes).collect::<Vec<_>>(),
        subgraphs.iter().map(Subgraph::num_edges).collect::<Vec<_>>()
    );
    Ok(subgraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (AdjacencyList, PartitionMap) {
        let g = AdjacencyList::from_undirected(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 5)]);
        let pm = PartitionMap::new(vec![0, 0, 1], 2).unwrap();
        (g, pm)
    }

    #[test]
    fn edges_stay_with_their_source_part() {
        let (g, pm) = triangle();
        let subs = build_partitioned_subgraphs(&g, &pm).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].edges_of(0), &[(1, 1), (2, 5)]);
        assert_eq!(subs[0].edges_of(1), &[(0, 1), (2, 1)]);
        assert!(!subs[0].owns(2));
        assert_eq!(subs[1].edges_of(2), &[(1, 1), (0, 5)]);
        assert_eq!(subs[0].remote_targets(), vec![2]);
        assert_eq!(subs[1].remote_targets(), vec![0, 1]);
        let total: usize = subs.iter().map(Subgraph::num_edges).sum();
        assert_eq!(total, g.num_directed_edges());
    }

    #[test]
    fn isolated_and_empty_parts_are_kept() {
        let g = AdjacencyList::from_undirected(4, &[(0, 1, 1)]);
        let pm = PartitionMap::new(vec![0, 0, 0, 2], 3).unwrap();
        let subs = build_partitioned_subgraphs(&g, &pm).unwrap();
        assert_eq!(subs[0].owned_nodes().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(subs[1].num_nodes(), 0);
        assert!(subs[2].owns(3));
        assert!(subs[2].edges_of(3).is_empty());
    }

    #[test]
    fn short_assignment_is_a_configuration_error() {
        let (g, _) = triangle();
        let pm = PartitionMap::new(vec![0, 1], 2).unwrap();
        assert_eq!(
            build_partitioned_subgraphs(&g, &pm),
            Err(PartitionError::MissingPartition(2))
        );
    }

    #[test]
    fn serializes_as_string_keyed_object() {
        let (g, pm) = triangle();
        let subs = build_partitioned_subgraphs(&g, &pm).unwrap();
        let json = serde_json::to_string(&subs[1]).unwrap();
        assert_eq!(json, r#"{"2":[[1,1],[0,5]]}"#);
        let back: Subgraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subs[1]);
    }
}
