//! Partitioning errors for partition-sssp

use crate::graph::NodeId;
use thiserror::Error;

/// Errors from partition assignment validation and subgraph/boundary construction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// Partition count must be at least one
    #[error("Partition count must be positive")]
    NoParts,
    /// Partition map did not contain an entry for a vertex
    #[error("PartitionMap missing part for vertex {0}")]
    MissingPartition(NodeId),
    /// A vertex was assigned to a part index outside `0..num_parts`
    #[error("Vertex {vertex} assigned to part {part}, but only {num_parts} parts exist")]
    PartOutOfRange {
        vertex: NodeId,
        part: usize,
        num_parts: usize,
    },
    /// The assignment lists more vertices than the graph has
    #[error("Partition map covers {assigned} vertices, graph has {expected}")]
    LengthMismatch { assigned: usize, expected: usize },
    /// Boundary detection inspects outgoing edges only and needs both directions present
    #[error("Graph is not symmetric: edge ({u}, {v}) has no reverse edge; symmetrize before boundary detection")]
    AsymmetricGraph { u: NodeId, v: NodeId },
    /// No worker holds the requested source vertex
    #[error("Source vertex {0} is not known to any worker")]
    UnknownSource(NodeId),
    /// Worker set does not match the number of partitions
    #[error("Expected {expected} workers, found {found}")]
    WorkerCount { expected: usize, found: usize },
    /// Other errors (e.g. METIS wrapper failures)
    #[error("Partitioner error: {0}")]
    Other(String),
}
