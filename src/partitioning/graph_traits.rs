//! Read-only weighted graph view used by the partition quality metrics.

use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use std::hash::Hash;

use crate::graph::Weight;

/// Weighted directed graph whose partitioning can be analyzed in parallel.
///
/// An undirected edge is stored once per direction with the same weight.
pub trait PartitionableGraph: Sync {
    type VertexId: Copy + Hash + Ord + Send + Sync;
    type VertexParIter<'a>: IndexedParallelIterator<Item = Self::VertexId> + 'a
    where
        Self: 'a;
    /// Outgoing `(target, weight)` entries of one vertex.
    type ArcParIter<'a>: ParallelIterator<Item = (Self::VertexId, Weight)> + 'a
    where
        Self: 'a;

    fn vertices(&self) -> Self::VertexParIter<'_>;

    fn arcs(&self, v: Self::VertexId) -> Self::ArcParIter<'_>;

    /// Number of outgoing entries of `v`.
    fn degree(&self, v: Self::VertexId) -> usize;

    /// Targets of the outgoing entries of `v`.
    fn neighbors(&self, v: Self::VertexId) -> impl ParallelIterator<Item = Self::VertexId> + '_ {
        self.arcs(v).map(|(t, _)| t)
    }

    /// Every undirected edge once, as `(u, v, w)` with `u < v`.
    fn edges(
        &self,
    ) -> impl ParallelIterator<Item = (Self::VertexId, Self::VertexId, Weight)> + '_ {
        self.vertices().flat_map(move |u| {
            self.arcs(u)
                .filter(move |&(v, _)| u < v)
                .map(move |(v, w)| (u, v, w))
        })
    }

    /// Sum of the weights of [`edges`](Self::edges).
    fn total_weight(&self) -> u64 {
        self.edges().map(|(_, _, w)| w).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator};

    /// Rows of `(target, weight)`, vertex ids are row indices.
    struct Rows(Vec<Vec<(u32, Weight)>>);

    impl PartitionableGraph for Rows {
        type VertexId = u32;
        type VertexParIter<'a> = rayon::range::Iter<u32>;
        type ArcParIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, (u32, Weight)>>;

        fn vertices(&self) -> Self::VertexParIter<'_> {
            (0..self.0.len() as u32).into_par_iter()
        }
        fn arcs(&self, v: u32) -> Self::ArcParIter<'_> {
            self.0[v as usize].par_iter().copied()
        }
        fn degree(&self, v: u32) -> usize {
            self.0.get(v as usize).map_or(0, Vec::len)
        }
    }

    fn weighted_triangle() -> Rows {
        Rows(vec![
            vec![(1, 4), (2, 9)],
            vec![(0, 4), (2, 1)],
            vec![(1, 1), (0, 9)],
        ])
    }

    #[test]
    fn neighbors_drop_weights() {
        let g = weighted_triangle();
        let mut ns: Vec<_> = g.neighbors(2).collect();
        ns.sort_unstable();
        assert_eq!(ns, vec![0, 1]);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(7), 0);
    }

    #[test]
    fn edges_see_each_pair_once_with_weight() {
        let g = weighted_triangle();
        let mut edges: Vec<_> = g.edges().collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![(0, 1, 4), (0, 2, 9), (1, 2, 1)]);
        assert_eq!(g.total_weight(), 14);
    }
}
