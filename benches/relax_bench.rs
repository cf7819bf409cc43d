use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use partition_sssp::algs::communicator::NoComm;
use partition_sssp::graph::AdjacencyList;
use partition_sssp::partitioning::{PartitionMap, build_partitioned_subgraphs, find_boundary_nodes};
use partition_sssp::pipeline::run_local_cluster;
use partition_sssp::sssp::{SsspConfig, run_sssp};

// Synthetic Erdos-Renyi graph with integer weights
fn random_graph(n: usize, p: f64, seed: u64) -> AdjacencyList {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut g = AdjacencyList::new(n);
    for u in 0..n as u64 {
        for v in (u + 1)..n as u64 {
            if rng.r#gen::<f64>() < p {
                g.add_undirected_edge(u, v, rng.gen_range(1..100));
            }
        }
    }
    g
}

fn bench_relax(c: &mut Criterion) {
    let mut group = c.benchmark_group("sssp");
    group.sample_size(20);

    for &(n, p) in &[(1_000, 0.01), (5_000, 0.002)] {
        let graph = random_graph(n, p, 42);
        let cfg = SsspConfig::default().with_max_rounds(10_000);

        let single = PartitionMap::new(vec![0; n], 1).unwrap();
        let sub = build_partitioned_subgraphs(&graph, &single).unwrap().remove(0);
        let empty = find_boundary_nodes(&graph, &single).unwrap();
        group.bench_with_input(BenchmarkId::new("single_worker", n), &n, |b, _| {
            b.iter(|| run_sssp(&NoComm, &sub, &empty, &cfg).unwrap())
        });

        for &k in &[2usize, 4] {
            let pm = PartitionMap::new((0..n).map(|v| v * k / n).collect(), k).unwrap();
            let subs = build_partitioned_subgraphs(&graph, &pm).unwrap();
            let boundary = find_boundary_nodes(&graph, &pm).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("threads_{k}"), n),
                &n,
                |b, _| b.iter(|| run_local_cluster(&subs, &boundary, &cfg).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_relax);
criterion_main!(benches);
