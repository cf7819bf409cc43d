//! End-to-end phases: convert, prepare, run.
//!
//! Each phase is a plain function over files or in-memory values; the
//! binaries in `src/bin` are thin wrappers around them.

use std::path::{Path, PathBuf};
use std::thread;

use crate::algs::communicator::{Communicator, ThreadComm};
use crate::graph::AdjacencyList;
use crate::io::{
    self, ConvertConfig, EdgeListStats, PartitionDir, read_edge_list, read_metis_graph,
    read_partition_vector, write_metis_graph,
};
use crate::partitioning::{
    BoundarySet, PartitionError, PartitionMap, PartitionStats, Subgraph,
    build_partitioned_subgraphs, find_boundary_nodes,
};
use crate::sssp::{DistanceReport, GlobalDistances, SsspConfig, merge_reports, run_sssp};
use crate::sssp_error::SsspError;

/// Convert an edge list file into a weighted METIS graph file.
pub fn convert_edges_to_metis(
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<EdgeListStats, SsspError> {
    let (graph, stats) = read_edge_list(io::open_buffered(input)?, config)?;
    write_metis_graph(io::create_buffered(output)?, &graph)?;
    if stats.skipped + stats.self_loops > 0 {
        log::warn!(
            "{}: skipped {} malformed lines and {} self-loops",
            input.display(),
            stats.skipped,
            stats.self_loops
        );
    }
    log::info!(
        "conversion complete: {} nodes, {} edges written to {}",
        graph.num_nodes(),
        graph.num_undirected_edges(),
        output.display()
    );
    Ok(stats)
}

/// Subgraphs, boundary set and quality metrics of one assignment.
#[derive(Clone, Debug)]
pub struct PreparedPartitions {
    pub subgraphs: Vec<Subgraph>,
    pub boundary: BoundarySet,
    pub stats: PartitionStats,
}

/// Build subgraphs and detect the boundary for `pm` (in memory).
pub fn prepare_partitions(
    graph: &AdjacencyList,
    pm: &PartitionMap,
) -> Result<PreparedPartitions, SsspError> {
    let boundary = find_boundary_nodes(graph, pm)?;
    let subgraphs = build_partitioned_subgraphs(graph, pm)?;
    let stats = PartitionStats::compute(graph, pm, boundary.len())?;
    log::info!(
        "{} parts, sizes {:?}, edge cut {} (weight {}), replication {:.3}, imbalance {:.3}, {} boundary nodes",
        stats.num_parts,
        stats.part_sizes,
        stats.edge_cut,
        stats.cut_weight,
        stats.replication_factor,
        stats.imbalance(),
        stats.boundary_nodes
    );
    Ok(PreparedPartitions {
        subgraphs,
        boundary,
        stats,
    })
}

/// Where the node -> part assignment comes from.
#[derive(Clone, Debug)]
pub enum PartitionSource {
    /// A partition vector file (`gpmetis` output); `num_parts` defaults to
    /// one more than the largest index in the file.
    File {
        path: PathBuf,
        num_parts: Option<usize>,
    },
    /// Partition in-process with METIS.
    #[cfg(feature = "metis-support")]
    Metis { num_parts: usize },
}

impl PartitionSource {
    fn resolve(&self, graph: &AdjacencyList) -> Result<PartitionMap, SsspError> {
        let pm = match self {
            PartitionSource::File { path, num_parts } => read_partition_vector(
                io::open_buffered(path)?,
                *num_parts,
                &path.display().to_string(),
            )?,
            #[cfg(feature = "metis-support")]
            PartitionSource::Metis { num_parts } => {
                crate::partitioning::metis_partition::partition_kway(graph, *num_parts)?
            }
        };
        pm.check_covers(graph)?;
        Ok(pm)
    }
}

/// Read a METIS graph and an assignment, then write one subgraph file per
/// part and the boundary file into `out`.
///
/// With `symmetrize`, missing reverse edges are added before boundary
/// detection; otherwise an asymmetric graph is a configuration error.
pub fn prepare_partition_files(
    graph_path: &Path,
    source: &PartitionSource,
    out: &PartitionDir,
    symmetrize: bool,
) -> Result<PreparedPartitions, SsspError> {
    let mut graph = read_metis_graph(
        io::open_buffered(graph_path)?,
        &graph_path.display().to_string(),
    )?;
    log::info!(
        "loaded {}: {} nodes, {} directed edges",
        graph_path.display(),
        graph.num_nodes(),
        graph.num_directed_edges()
    );
    if symmetrize && !graph.is_symmetric() {
        graph = graph.symmetrized();
        log::info!("symmetrized graph: {} directed edges", graph.num_directed_edges());
    }
    let pm = source.resolve(&graph)?;

    log::info!("building subgraphs and detecting boundary nodes");
    let prepared = prepare_partitions(&graph, &pm)?;

    out.create()?;
    out.write_subgraphs(&prepared.subgraphs)?;
    log::info!(
        "saved {} subgraph files to {}",
        prepared.subgraphs.len(),
        out.root().display()
    );
    out.write_boundary(&prepared.boundary)?;
    log::info!("saved boundary node info to {}", out.boundary_path().display());
    Ok(prepared)
}

/// Run one worker to termination. On error the communicator is aborted so
/// peers stop waiting on this rank.
pub fn run_worker<C>(
    comm: &C,
    subgraph: &Subgraph,
    boundary: &BoundarySet,
    config: &SsspConfig,
) -> Result<DistanceReport, SsspError>
where
    C: Communicator + ?Sized,
{
    match run_sssp(comm, subgraph, boundary, config) {
        Ok(outcome) => Ok(DistanceReport::from(outcome)),
        Err(e) => {
            log::error!("rank {}: {e}", comm.rank());
            comm.abort();
            Err(e)
        }
    }
}

/// Load this rank's files from `dir`, run, and write its report.
pub fn run_worker_from_dir<C>(
    comm: &C,
    dir: &PartitionDir,
    config: &SsspConfig,
) -> Result<DistanceReport, SsspError>
where
    C: Communicator + ?Sized,
{
    let loaded = load_worker_files(comm, dir);
    let (subgraph, boundary) = match loaded {
        Ok(v) => v,
        Err(e) => {
            log::error!("rank {}: {e}", comm.rank());
            comm.abort();
            return Err(e);
        }
    };
    let report = run_worker(comm, &subgraph, &boundary, config)?;
    dir.write_report(&report)?;
    log::info!(
        "rank {}: {:?} after {} rounds, saved {}",
        report.rank,
        report.status,
        report.rounds,
        dir.report_path(report.rank).display()
    );
    Ok(report)
}

fn load_worker_files<C>(comm: &C, dir: &PartitionDir) -> Result<(Subgraph, BoundarySet), SsspError>
where
    C: Communicator + ?Sized,
{
    let found = dir.count_subgraph_files();
    if found != comm.size() {
        return Err(PartitionError::WorkerCount {
            expected: comm.size(),
            found,
        }
        .into());
    }
    Ok((dir.read_subgraph(comm.rank())?, dir.read_boundary()?))
}

/// Run one thread per subgraph over an in-process [`ThreadComm`] group.
///
/// Reports come back in rank order. If any worker fails, the first error that
/// is not a consequence of the abort (a local input or configuration error) is
/// returned in preference to the communication errors of its peers.
pub fn run_local_cluster(
    subgraphs: &[Subgraph],
    boundary: &BoundarySet,
    config: &SsspConfig,
) -> Result<Vec<DistanceReport>, SsspError> {
    if subgraphs.is_empty() {
        return Err(PartitionError::NoParts.into());
    }
    let world: Vec<ThreadComm> = ThreadComm::world(subgraphs.len())
        .into_iter()
        .map(|c| c.with_recv_timeout(config.recv_timeout()))
        .collect();

    let results: Vec<Result<DistanceReport, SsspError>> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(world.len());
        for (comm, sub) in world.iter().zip(subgraphs) {
            let spawned = thread::Builder::new()
                .name(format!("sssp-worker-{}", comm.rank()))
                .spawn_scoped(s, move || run_worker(comm, sub, boundary, config));
            if spawned.is_err() {
                comm.abort();
            }
            handles.push(spawned);
        }
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| match h {
                Ok(h) => h
                    .join()
                    .unwrap_or_else(|_| Err(SsspError::WorkerPanicked { rank })),
                Err(e) => Err(SsspError::Io(e)),
            })
            .collect()
    });

    let mut reports = Vec::with_capacity(results.len());
    let mut root_cause: Option<SsspError> = None;
    for res in results {
        match res {
            Ok(r) => reports.push(r),
            Err(e) => {
                let replace = match &root_cause {
                    None => true,
                    Some(prev) => prev.is_comm() && !e.is_comm(),
                };
                if replace {
                    root_cause = Some(e);
                }
            }
        }
    }
    match root_cause {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

/// In-process run over the files in `dir`: one thread per subgraph file.
/// Writes every worker's report and the merged distances.
pub fn run_local_cluster_from_dir(
    dir: &PartitionDir,
    config: &SsspConfig,
) -> Result<GlobalDistances, SsspError> {
    let n = dir.count_subgraph_files();
    if n == 0 {
        return Err(PartitionError::NoParts.into());
    }
    let subgraphs = (0..n)
        .map(|i| dir.read_subgraph(i))
        .collect::<Result<Vec<_>, _>>()?;
    let boundary = dir.read_boundary()?;
    log::info!(
        "running {n} workers from {} (source {}, cap {})",
        dir.root().display(),
        config.source,
        config.max_rounds
    );

    let reports = run_local_cluster(&subgraphs, &boundary, config)?;
    for r in &reports {
        dir.write_report(r)?;
    }
    let merged = merge_reports(&reports);
    dir.write_merged(&merged)?;
    log::info!(
        "saved {} worker reports and {} ({} nodes, final = {})",
        reports.len(),
        dir.merged_path().display(),
        merged.distances.len(),
        merged.is_final
    );
    Ok(merged)
}
