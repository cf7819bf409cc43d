//! In-process k-way partitioning through the METIS bindings.
//!
//! The usual flow runs `gpmetis` on the file written by the edge-list
//! converter and reads back the `.part.K` file. With the `metis-support`
//! feature the same decision can be made in-process from an [`AdjacencyList`],
//! using edge weights as METIS `adjwgt`.

use super::{PartitionError, PartitionMap};
use crate::graph::AdjacencyList;
use metis::Idx;

fn to_idx(value: u64, what: &str) -> Result<Idx, PartitionError> {
    Idx::try_from(value)
        .map_err(|_| PartitionError::Other(format!("{what} {value} does not fit METIS idx_t")))
}

/// Partition `graph` into `num_parts` parts with `METIS_PartGraphKway`.
///
/// The graph must be symmetric without self-loops (METIS requirement).
pub fn partition_kway(graph: &AdjacencyList, num_parts: usize) -> Result<PartitionMap, PartitionError> {
    if num_parts == 0 {
        return Err(PartitionError::NoParts);
    }
    let n = graph.num_nodes();
    if num_parts == 1 || n == 0 {
        return PartitionMap::new(vec![0; n], num_parts);
    }

    // CSR arrays
    let mut xadj: Vec<Idx> = Vec::with_capacity(n + 1);
    let mut adjncy: Vec<Idx> = Vec::with_capacity(graph.num_directed_edges());
    let mut adjwgt: Vec<Idx> = Vec::with_capacity(graph.num_directed_edges());
    xadj.push(0);
    for u in graph.nodes() {
        for &(v, w) in graph.neighbors(u) {
            adjncy.push(to_idx(v, "node")?);
            adjwgt.push(to_idx(w, "weight")?);
        }
        xadj.push(to_idx(adjncy.len() as u64, "edge offset")?);
    }

    let nparts = to_idx(num_parts as u64, "part count")?;
    let mut part: Vec<Idx> = vec![0; n];
    let cut = metis::Graph::new(1, nparts, &xadj, &adjncy)
        .map_err(|e| PartitionError::Other(e.to_string()))?
        .set_adjwgt(&adjwgt)
        .part_kway(&mut part)
        .map_err(|e| PartitionError::Other(e.to_string()))?;
    log::info!("METIS k-way partition into {num_parts} parts, weighted edge cut {cut}");

    let parts = part
        .into_iter()
        .map(|p| usize::try_from(p).map_err(|_| PartitionError::Other(format!("negative part {p}"))))
        .collect::<Result<Vec<_>, _>>()?;
    PartitionMap::new(parts, num_parts)
}
