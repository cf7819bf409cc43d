//! # partition-sssp
//!
//! Single-source shortest paths over a graph split across P workers, each
//! owning one partition of the nodes. No worker ever sees the whole graph.
//!
//! ## Pipeline
//! 1. **convert**: a whitespace edge list becomes a weighted METIS graph
//!    ([`io::edge_list`], [`io::metis`]).
//! 2. **partition**: an external tool (`gpmetis`) or, with the
//!    `metis-support` feature, [`partitioning::metis_partition`] assigns every
//!    node to a part.
//! 3. **prepare**: [`partitioning::build_partitioned_subgraphs`] and
//!    [`partitioning::find_boundary_nodes`] produce one subgraph per part and
//!    the global boundary set ([`pipeline::prepare_partition_files`]).
//! 4. **run**: every worker drives a [`sssp::RelaxationEngine`] over its
//!    subgraph; rounds of local Bellman-Ford relaxation alternate with an
//!    all-to-all exchange of improved distances and a global OR vote, until a
//!    round changes nothing anywhere or the iteration cap is hit.
//!
//! ## Communication backends
//! The engine is generic over [`algs::communicator::Communicator`]:
//! - [`NoComm`](algs::communicator::NoComm) for a single worker,
//! - [`ThreadComm`](algs::communicator::ThreadComm) for one thread per part
//!   inside one process,
//! - `MpiComm` for one MPI rank per part (feature `mpi-support`).
//!
//! ## Determinism
//! Merging keeps the minimum per node, so converged distances do not depend on
//! message arrival order or on the partitioning.

pub mod algs;
pub mod cli;
pub mod graph;
pub mod io;
pub mod partitioning;
pub mod pipeline;
pub mod sssp;
pub mod sssp_error;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::graph::{AdjacencyList, NodeId, Weight};
    pub use crate::io::PartitionDir;
    pub use crate::partitioning::{
        BoundarySet, PartitionError, PartitionMap, Subgraph, build_partitioned_subgraphs,
        find_boundary_nodes,
    };
    pub use crate::pipeline::{prepare_partitions, run_local_cluster, run_worker};
    pub use crate::sssp::{
        Distance, DistanceReport, GlobalDistances, RelaxationEngine, RunStatus, SsspConfig,
        merge_reports, run_sssp,
    };
    pub use crate::sssp_error::SsspError;
}
