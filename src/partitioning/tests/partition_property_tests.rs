use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::graph::{AdjacencyList, NodeId};
use crate::partitioning::{
    PartitionMap, build_partitioned_subgraphs, find_boundary_nodes, metrics::edge_cut,
};

/// Random symmetric graph plus a random assignment, reproducible from the parameters.
fn random_instance(n: usize, k: usize, edge_prob: f64) -> (AdjacencyList, PartitionMap) {
    let seed = {
        let mut h = DefaultHasher::new();
        n.hash(&mut h);
        k.hash(&mut h);
        edge_prob.to_bits().hash(&mut h);
        h.finish()
    };
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..n as NodeId {
        for v in (u + 1)..n as NodeId {
            if rng.r#gen::<f64>() < edge_prob {
                edges.push((u, v, rng.gen_range(1..20)));
            }
        }
    }
    let g = AdjacencyList::from_undirected(n, &edges);
    let parts = (0..n).map(|_| rng.gen_range(0..k)).collect();
    (g, PartitionMap::new(parts, k).unwrap())
}

#[test]
fn e2e_two_cliques_k2() {
    // two triangles joined by the bridge 2-3
    let g = AdjacencyList::from_undirected(
        6,
        &[(0, 1, 1), (1, 2, 1), (0, 2, 1), (3, 4, 1), (4, 5, 1), (3, 5, 1), (2, 3, 1)],
    );
    let pm = PartitionMap::new(vec![0, 0, 0, 1, 1, 1], 2).unwrap();
    assert_eq!(edge_cut(&g, &pm).unwrap(), 1);
    let b = find_boundary_nodes(&g, &pm).unwrap();
    assert_eq!(b.iter().collect::<Vec<_>>(), vec![2, 3]);
    let subs = build_partitioned_subgraphs(&g, &pm).unwrap();
    assert_eq!(subs[0].remote_targets(), vec![3]);
    assert_eq!(subs[1].remote_targets(), vec![2]);
}

proptest! {
    #[test]
    fn prop_subgraph_keys_partition_node_set(
        n in 1usize..40,
        k in 1usize..6,
        edge_prob in 0.0f64..0.6f64,
    ) {
        let (g, pm) = random_instance(n, k, edge_prob);
        let subs = build_partitioned_subgraphs(&g, &pm).unwrap();
        prop_assert_eq!(subs.len(), k);

        // every node appears as a key exactly once, in its own part
        let mut seen = vec![0usize; n];
        for (p, sub) in subs.iter().enumerate() {
            for u in sub.owned_nodes() {
                seen[u as usize] += 1;
                prop_assert_eq!(pm.part_of(u).unwrap(), p);
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1), "key multiplicities {:?}", seen);

        // no edge lost or duplicated
        let total: usize = subs.iter().map(|s| s.num_edges()).sum();
        prop_assert_eq!(total, g.num_directed_edges());
    }

    #[test]
    fn prop_boundary_iff_cross_edge(
        n in 1usize..40,
        k in 1usize..6,
        edge_prob in 0.0f64..0.6f64,
    ) {
        let (g, pm) = random_instance(n, k, edge_prob);
        let b = find_boundary_nodes(&g, &pm).unwrap();
        let expected: BTreeSet<NodeId> = g
            .iter_edges()
            .filter(|&(u, v, _)| pm.part_of(u).unwrap() != pm.part_of(v).unwrap())
            .flat_map(|(u, v, _)| [u, v])
            .collect();
        prop_assert_eq!(b.iter().collect::<BTreeSet<_>>(), expected);
        // cut edges touch exactly the boundary nodes
        prop_assert_eq!(edge_cut(&g, &pm).unwrap() == 0, b.is_empty());
    }
}
