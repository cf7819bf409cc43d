//! Whitespace-separated edge list input.
//!
//! Each data line is `<u> <v> <weight>` with 0-based integer node ids and a
//! real weight. Edges are undirected. Weights are scaled to positive integers
//! with [`scale_weight`] so they can be written to a weighted METIS file.
//!
//! Bad lines are skipped with a warning rather than failing the conversion.

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::graph::{AdjacencyList, NodeId, Weight};
use crate::partitioning::PartitionError;
use crate::sssp_error::SsspError;

/// Parameters of the edge-list conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Real weights are multiplied by this before truncation.
    pub scale: f64,
    /// Lines naming a larger node id are skipped; the node set is dense, so
    /// every id up to the largest one costs an adjacency row.
    pub max_node_id: NodeId,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            scale: 100.0,
            max_node_id: 100_000_000,
        }
    }
}

/// `max(1, floor(w * scale))`.
pub fn scale_weight(w: f64, scale: f64) -> Weight {
    ((w * scale) as Weight).max(1)
}

/// Counters of one conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EdgeListStats {
    pub lines: usize,
    /// Undirected edges kept (duplicates included).
    pub edges: usize,
    pub skipped: usize,
    pub self_loops: usize,
}

fn parse_line(line: &str, max_node_id: NodeId) -> Result<(NodeId, NodeId, f64), String> {
    let toks: Vec<&str> = line.split_whitespace().collect();
    let [u, v, w] = toks.as_slice() else {
        return Err(format!("expected 3 fields, found {}", toks.len()));
    };
    let u = u.parse::<NodeId>().map_err(|_| format!("invalid node id {u:?}"))?;
    let v = v.parse::<NodeId>().map_err(|_| format!("invalid node id {v:?}"))?;
    if let Some(big) = [u, v].into_iter().find(|&id| id > max_node_id) {
        return Err(format!("node id {big} above the limit {max_node_id}"));
    }
    let w = w.parse::<f64>().map_err(|_| format!("invalid weight {w:?}"))?;
    if !w.is_finite() {
        return Err(format!("non-finite weight {w}"));
    }
    Ok((u, v, w))
}

/// Read an edge list into a symmetric adjacency list with scaled weights.
///
/// The node set is `0..=max id`. Blank lines are ignored silently; lines that
/// do not parse and self-loops are skipped with a warning.
pub fn read_edge_list<R: BufRead>(
    reader: R,
    config: &ConvertConfig,
) -> Result<(AdjacencyList, EdgeListStats), SsspError> {
    if !(config.scale.is_finite() && config.scale > 0.0) {
        return Err(PartitionError::Other(format!(
            "weight scale must be positive and finite, got {}",
            config.scale
        ))
        .into());
    }
    let mut graph = AdjacencyList::default();
    let mut stats = EdgeListStats::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        stats.lines += 1;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = parse_line(&line, config.max_node_id);
        let kept = match parsed {
            Ok((u, v, _)) if u == v => {
                log::warn!("edge list line {}: self-loop on node {u} skipped", idx + 1);
                stats.self_loops += 1;
                continue;
            }
            Ok((u, v, w)) => graph.try_ensure_node(u.max(v)).map(|()| (u, v, w)),
            Err(msg) => Err(msg),
        };
        match kept {
            Ok((u, v, w)) => {
                graph.add_undirected_edge(u, v, scale_weight(w, config.scale));
                stats.edges += 1;
            }
            Err(msg) => {
                log::warn!("edge list line {}: {msg}; skipped", idx + 1);
                stats.skipped += 1;
            }
        }
    }
    log::debug!("edge list: {stats:?}, {} nodes", graph.num_nodes());
    Ok((graph, stats))
}
