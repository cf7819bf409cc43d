#![allow(dead_code)]
use partition_sssp::graph::{AdjacencyList, NodeId, Weight};
use partition_sssp::partitioning::{
    BoundarySet, PartitionMap, Subgraph, build_partitioned_subgraphs, find_boundary_nodes,
};
use partition_sssp::sssp::Distance;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Undirected path 0-1-...-(n-1) with unit weights.
pub fn path(n: usize) -> AdjacencyList {
    let edges: Vec<_> = (1..n as NodeId).map(|v| (v - 1, v, 1)).collect();
    AdjacencyList::from_undirected(n, &edges)
}

/// Random undirected graph: each pair is an edge with probability `p`.
pub fn random_graph(n: usize, p: f64, max_w: Weight, seed: u64) -> AdjacencyList {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut g = AdjacencyList::new(n);
    for u in 0..n as NodeId {
        for v in (u + 1)..n as NodeId {
            if rng.gen_bool(p) {
                g.add_undirected_edge(u, v, rng.gen_range(1..=max_w));
            }
        }
    }
    g
}

/// Random assignment of `n` nodes to `k` parts.
pub fn random_parts(n: usize, k: usize, seed: u64) -> PartitionMap {
    let mut rng = SmallRng::seed_from_u64(seed);
    PartitionMap::new((0..n).map(|_| rng.gen_range(0..k)).collect(), k).unwrap()
}

/// Contiguous blocks: node `v` goes to part `v * k / n`.
pub fn block_parts(n: usize, k: usize) -> PartitionMap {
    PartitionMap::new((0..n).map(|v| v * k / n.max(1)).collect(), k).unwrap()
}

pub fn split(g: &AdjacencyList, pm: &PartitionMap) -> (Vec<Subgraph>, BoundarySet) {
    (
        build_partitioned_subgraphs(g, pm).unwrap(),
        find_boundary_nodes(g, pm).unwrap(),
    )
}

/// Serial Bellman-Ford over the whole graph.
pub fn reference_sssp(g: &AdjacencyList, source: NodeId) -> Vec<Distance> {
    let mut dist = vec![Distance::Unreached; g.num_nodes()];
    if let Some(d) = dist.get_mut(source as usize) {
        *d = Distance::ZERO;
    }
    loop {
        let mut changed = false;
        for (u, v, w) in g.iter_edges() {
            let cand = dist[u as usize].plus(w);
            if cand < dist[v as usize] {
                dist[v as usize] = cand;
                changed = true;
            }
        }
        if !changed {
            return dist;
        }
    }
}

/// Fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "partition-sssp-{label}-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
