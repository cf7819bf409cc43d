//! Global weighted adjacency list.
//!
//! Nodes are dense 0-based ids `0..num_nodes`. Edges are directed `(u, v, w)`
//! entries; an undirected edge is stored as two directed entries. The node set
//! grows only while the list is being built and is fixed afterwards.

use hashbrown::HashSet;
use rayon::iter::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelIterator,
};
use serde::{Deserialize, Serialize};

use crate::partitioning::graph_traits::PartitionableGraph;

/// Global node identifier (0-based).
pub type NodeId = u64;
/// Positive integer edge weight.
pub type Weight = u64;

/// Directed adjacency list indexed by node id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyList {
    nbrs: Vec<Vec<(NodeId, Weight)>>,
}

impl AdjacencyList {
    /// `num_nodes` isolated nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            nbrs: vec![Vec::new(); num_nodes],
        }
    }

    /// Build from directed `(u, v, w)` triples.
    pub fn from_directed(num_nodes: usize, edges: &[(NodeId, NodeId, Weight)]) -> Self {
        let mut g = Self::new(num_nodes);
        for &(u, v, w) in edges {
            g.add_edge(u, v, w);
        }
        g
    }

    /// Build from undirected `(u, v, w)` triples; each edge is stored in both directions.
    pub fn from_undirected(num_nodes: usize, edges: &[(NodeId, NodeId, Weight)]) -> Self {
        let mut g = Self::new(num_nodes);
        for &(u, v, w) in edges {
            g.add_undirected_edge(u, v, w);
        }
        g
    }

    /// Append the directed entry `u -> v`, growing the node set to cover both ends.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, w: Weight) {
        self.ensure_node(u.max(v));
        self.nbrs[u as usize].push((v, w));
    }

    pub fn add_undirected_edge(&mut self, u: NodeId, v: NodeId, w: Weight) {
        self.add_edge(u, v, w);
        self.add_edge(v, u, w);
    }

    /// Build from one row of outgoing entries per node. Every neighbor id must
    /// be below `rows.len()`.
    pub fn from_rows(rows: Vec<Vec<(NodeId, Weight)>>) -> Self {
        Self { nbrs: rows }
    }

    /// Make sure `node` exists (as an isolated node if it is new).
    ///
    /// # Panics
    /// If `node` is not addressable or its rows cannot be allocated. Readers of
    /// untrusted input go through [`try_ensure_node`](Self::try_ensure_node).
    pub fn ensure_node(&mut self, node: NodeId) {
        if let Err(msg) = self.try_ensure_node(node) {
            panic!("{msg}");
        }
    }

    /// Fallible [`ensure_node`](Self::ensure_node).
    pub fn try_ensure_node(&mut self, node: NodeId) -> Result<(), String> {
        let needed = usize::try_from(node)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| format!("node id {node} is not addressable"))?;
        let extra = needed.saturating_sub(self.nbrs.len());
        if extra > 0 {
            self.nbrs
                .try_reserve(extra)
                .map_err(|e| format!("node id {node}: {e}"))?;
            self.nbrs.resize_with(needed, Vec::new);
        }
        Ok(())
    }

    pub fn num_nodes(&self) -> usize {
        self.nbrs.len()
    }

    /// Number of directed entries.
    pub fn num_directed_edges(&self) -> usize {
        self.nbrs.iter().map(Vec::len).sum()
    }

    /// Number of undirected edges, assuming every edge is stored twice.
    pub fn num_undirected_edges(&self) -> usize {
        self.num_directed_edges() / 2
    }

    /// Outgoing `(neighbor, weight)` entries of `u`; empty for unknown nodes.
    pub fn neighbors(&self, u: NodeId) -> &[(NodeId, Weight)] {
        self.nbrs.get(u as usize).map_or(&[], Vec::as_slice)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.nbrs.len() as NodeId
    }

    /// All directed entries in node order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        self.nbrs
            .iter()
            .enumerate()
            .flat_map(|(u, ns)| ns.iter().map(move |&(v, w)| (u as NodeId, v, w)))
    }

    /// Returns the first directed entry `(u, v)` with no reverse entry `(v, u)`.
    pub fn find_asymmetric_edge(&self) -> Option<(NodeId, NodeId)> {
        let present: HashSet<(NodeId, NodeId)> = self
            .nbrs
            .par_iter()
            .enumerate()
            .flat_map_iter(|(u, ns)| ns.iter().map(move |&(v, _)| (u as NodeId, v)))
            .collect();
        self.iter_edges()
            .map(|(u, v, _)| (u, v))
            .find(|&(u, v)| !present.contains(&(v, u)))
    }

    pub fn is_symmetric(&self) -> bool {
        self.find_asymmetric_edge().is_none()
    }

    /// Copy of the graph with every missing reverse entry added (same weight).
    pub fn symmetrized(&self) -> Self {
        let mut out = self.clone();
        let present: HashSet<(NodeId, NodeId)> =
            self.iter_edges().map(|(u, v, _)| (u, v)).collect();
        for (u, v, w) in self.iter_edges() {
            if !present.contains(&(v, u)) {
                out.add_edge(v, u, w);
            }
        }
        out
    }
}

impl PartitionableGraph for AdjacencyList {
    type VertexId = NodeId;
    type VertexParIter<'a> = rayon::iter::Map<rayon::range::Iter<usize>, fn(usize) -> NodeId>;
    type ArcParIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, (NodeId, Weight)>>;

    fn vertices(&self) -> Self::VertexParIter<'_> {
        // u64 ranges are not indexed in rayon
        (0..self.nbrs.len())
            .into_par_iter()
            .map(to_node as fn(usize) -> NodeId)
    }

    fn arcs(&self, v: NodeId) -> Self::ArcParIter<'_> {
        AdjacencyList::neighbors(self, v).par_iter().copied()
    }

    fn degree(&self, v: NodeId) -> usize {
        AdjacencyList::neighbors(self, v).len()
    }
}

fn to_node(i: usize) -> NodeId {
    i as NodeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_grows_node_set() {
        let mut g = AdjacencyList::new(1);
        g.add_edge(0, 4, 7);
        assert_eq!(g.num_nodes(), 5);
        assert_eq!(g.neighbors(0), &[(4, 7)]);
        assert!(g.neighbors(4).is_empty());
        assert!(g.neighbors(99).is_empty());
    }

    #[test]
    fn unaddressable_node_is_an_error() {
        let mut g = AdjacencyList::new(2);
        assert!(g.try_ensure_node(NodeId::MAX).is_err());
        assert_eq!(g.num_nodes(), 2);
        g.try_ensure_node(3).unwrap();
        assert_eq!(g.num_nodes(), 4);
    }

    #[test]
    fn undirected_edges_are_stored_twice() {
        let g = AdjacencyList::from_undirected(3, &[(0, 1, 2), (1, 2, 3)]);
        assert_eq!(g.num_directed_edges(), 4);
        assert_eq!(g.num_undirected_edges(), 2);
        assert!(g.is_symmetric());
    }

    #[test]
    fn symmetrize_adds_missing_reverse_entries() {
        let g = AdjacencyList::from_directed(3, &[(0, 1, 5), (1, 2, 1), (2, 1, 1)]);
        assert_eq!(g.find_asymmetric_edge(), Some((0, 1)));
        let s = g.symmetrized();
        assert!(s.is_symmetric());
        assert_eq!(s.neighbors(1), &[(2, 1), (0, 5)]);
        assert_eq!(s.num_directed_edges(), 4);
    }

    #[test]
    fn partitionable_view_matches_adjacency() {
        let g = AdjacencyList::from_undirected(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        let mut vs: Vec<_> = g.vertices().collect();
        vs.sort_unstable();
        assert_eq!(vs, vec![0, 1, 2, 3]);
        let mut ns: Vec<_> = PartitionableGraph::neighbors(&g, 1).collect();
        ns.sort_unstable();
        assert_eq!(ns, vec![0, 2]);
        let mut edges: Vec<_> = g.edges().collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        assert_eq!(g.total_weight(), 3);
    }
}
