//! METIS graph files and partition vectors.
//!
//! Graph file layout:
//!
//! ```text
//! % comment lines are ignored
//! <num_nodes> <num_edges> [fmt [ncon]]
//! <line for node 1: neighbor [weight] neighbor [weight] ...>
//! ...
//! ```
//!
//! Node ids are 1-based in the file and 0-based in memory. `fmt` is up to three
//! digits: vertex sizes, vertex weights, edge weights (`1` = `001` = edge
//! weights only). Vertex sizes and weights are read past and ignored.
//!
//! A partition vector has one part index per line, line `i` being node `i`.

use itertools::Itertools;
use std::io::{BufRead, Write};

use crate::graph::{AdjacencyList, NodeId, Weight};
use crate::partitioning::PartitionMap;
use crate::sssp_error::SsspError;

/// Write `graph` with edge weights (`fmt = 1`). `graph` must be symmetric
/// for the edge count in the header to be meaningful.
pub fn write_metis_graph<W: Write>(mut w: W, graph: &AdjacencyList) -> Result<(), SsspError> {
    writeln!(w, "{} {} 1", graph.num_nodes(), graph.num_undirected_edges())?;
    for u in graph.nodes() {
        let line = graph
            .neighbors(u)
            .iter()
            .map(|&(v, wt)| format!("{} {wt}", v + 1))
            .join(" ");
        writeln!(w, "{line}")?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Format {
    vertex_sizes: bool,
    vertex_weights: usize,
    edge_weights: bool,
}

fn parse_format(fmt: Option<&str>, ncon: Option<&str>, ctx: &str) -> Result<Format, SsspError> {
    let fmt = fmt.unwrap_or("0");
    if fmt.len() > 3 || !fmt.chars().all(|c| c == '0' || c == '1') {
        return Err(SsspError::input(ctx, format!("invalid format code {fmt:?}")));
    }
    let digits = format!("{fmt:0>3}");
    let bit = |i: usize| digits.as_bytes()[i] == b'1';
    let ncon = match ncon {
        Some(s) => s
            .parse::<usize>()
            .map_err(|_| SsspError::input(ctx, format!("invalid ncon {s:?}")))?,
        None => 1,
    };
    Ok(Format {
        vertex_sizes: bit(0),
        vertex_weights: if bit(1) { ncon } else { 0 },
        edge_weights: bit(2),
    })
}

fn parse_int(tok: &str, ctx: &str, line: usize, what: &str) -> Result<u64, SsspError> {
    tok.parse::<u64>()
        .map_err(|_| SsspError::input(ctx, format!("line {line}: invalid {what} {tok:?}")))
}

/// Read a METIS graph file into a 0-based adjacency list.
///
/// The header and one line per node are required; a mismatch between the
/// header's node count and the node lines is fatal. A wrong edge count in the
/// header only produces a warning.
pub fn read_metis_graph<R: BufRead>(reader: R, ctx: &str) -> Result<AdjacencyList, SsspError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, l)| l.map(|l| (i + 1, l)))
        .filter(|r| !matches!(r, Ok((_, l)) if l.trim_start().starts_with('%')));

    let (hdr_no, header) = loop {
        match lines.next() {
            Some(Ok((_, l))) if l.trim().is_empty() => continue,
            Some(res) => break res?,
            None => return Err(SsspError::input(ctx, "missing header")),
        }
    };
    let toks: Vec<&str> = header.split_whitespace().collect();
    if toks.len() < 2 || toks.len() > 4 {
        return Err(SsspError::input(
            ctx,
            format!("line {hdr_no}: header must be `n m [fmt [ncon]]`"),
        ));
    }
    let n = parse_int(toks[0], ctx, hdr_no, "node count")? as usize;
    let m = parse_int(toks[1], ctx, hdr_no, "edge count")? as usize;
    let fmt = parse_format(toks.get(2).copied(), toks.get(3).copied(), ctx)?;

    // Rows are pushed per node line read, never sized from the header.
    let mut rows: Vec<Vec<(NodeId, Weight)>> = Vec::new();
    for u in 0..n {
        let (line_no, line) = match lines.next() {
            Some(res) => res?,
            None => {
                return Err(SsspError::input(
                    ctx,
                    format!("header declares {n} nodes, found {u} node lines"),
                ));
            }
        };
        let mut toks = line.split_whitespace();
        let skip = usize::from(fmt.vertex_sizes) + fmt.vertex_weights;
        for _ in 0..skip {
            toks.next().ok_or_else(|| {
                SsspError::input(ctx, format!("line {line_no}: missing vertex size/weight"))
            })?;
        }
        let toks: Vec<&str> = toks.collect();
        let stride = if fmt.edge_weights { 2 } else { 1 };
        let mut row = Vec::with_capacity(toks.len() / stride);
        if toks.len() % stride != 0 {
            return Err(SsspError::input(
                ctx,
                format!("line {line_no}: neighbor without weight"),
            ));
        }
        for chunk in toks.chunks(stride) {
            let v = parse_int(chunk[0], ctx, line_no, "neighbor")?;
            if v == 0 || v > n as u64 {
                return Err(SsspError::input(
                    ctx,
                    format!("line {line_no}: neighbor {v} outside 1..={n}"),
                ));
            }
            let w: Weight = match chunk.get(1) {
                Some(tok) => parse_int(tok, ctx, line_no, "edge weight")?,
                None => 1,
            };
            if w == 0 {
                return Err(SsspError::input(
                    ctx,
                    format!("line {line_no}: edge weight must be positive"),
                ));
            }
            row.push((v - 1, w));
        }
        rows.push(row);
    }
    for rest in lines {
        let (line_no, line) = rest?;
        if !line.trim().is_empty() {
            return Err(SsspError::input(
                ctx,
                format!("line {line_no}: more node lines than the {n} declared"),
            ));
        }
    }
    let graph = AdjacencyList::from_rows(rows);
    if Some(graph.num_directed_edges()) != m.checked_mul(2) {
        log::warn!(
            "{ctx}: header declares {m} edges, adjacency holds {} directed entries",
            graph.num_directed_edges()
        );
    }
    Ok(graph)
}

/// Read a partition vector (`gpmetis` `.part.K` output).
///
/// `num_parts` defaults to one more than the largest index. Trailing blank
/// lines are allowed.
pub fn read_partition_vector<R: BufRead>(
    reader: R,
    num_parts: Option<usize>,
    ctx: &str,
) -> Result<PartitionMap, SsspError> {
    let mut parts = Vec::new();
    let mut trailing_blank = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let tok = line.trim();
        if tok.is_empty() {
            trailing_blank.get_or_insert(i + 1);
            continue;
        }
        if let Some(blank) = trailing_blank {
            return Err(SsspError::input(
                ctx,
                format!("line {blank}: blank line inside the partition vector"),
            ));
        }
        let p = parse_int(tok, ctx, i + 1, "part index")? as usize;
        parts.push(p);
    }
    let k = num_parts.unwrap_or_else(|| parts.iter().copied().max().map_or(1, |m| m + 1));
    Ok(PartitionMap::new(parts, k)?)
}

pub fn write_partition_vector<W: Write>(mut w: W, pm: &PartitionMap) -> Result<(), SsspError> {
    for &p in pm.as_slice() {
        writeln!(w, "{p}")?;
    }
    w.flush()?;
    Ok(())
}
