//! On-disk layout of a partitioned run.
//!
//! ```text
//! <dir>/subgraph_part_{i}.json   one per partition, written by `prepare`
//! <dir>/boundary_nodes.json      global sorted boundary set
//! <dir>/distances_rank_{r}.json  one per worker, written by `run`
//! <dir>/distances.json           merged result of an in-process run
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::{read_json, write_json};
use crate::partitioning::{BoundarySet, Subgraph};
use crate::sssp::{DistanceReport, GlobalDistances};
use crate::sssp_error::SsspError;

pub const BOUNDARY_FILE: &str = "boundary_nodes.json";
pub const MERGED_FILE: &str = "distances.json";

/// Directory holding the artifacts of one partitioned run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionDir {
    root: PathBuf,
}

impl PartitionDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if missing.
    pub fn create(&self) -> Result<(), SsspError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn subgraph_path(&self, part: usize) -> PathBuf {
        self.root.join(format!("subgraph_part_{part}.json"))
    }

    pub fn boundary_path(&self) -> PathBuf {
        self.root.join(BOUNDARY_FILE)
    }

    pub fn report_path(&self, rank: usize) -> PathBuf {
        self.root.join(format!("distances_rank_{rank}.json"))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.root.join(MERGED_FILE)
    }

    pub fn write_subgraphs(&self, subgraphs: &[Subgraph]) -> Result<(), SsspError> {
        for (i, sub) in subgraphs.iter().enumerate() {
            write_json(&self.subgraph_path(i), sub)?;
        }
        Ok(())
    }

    pub fn read_subgraph(&self, part: usize) -> Result<Subgraph, SsspError> {
        read_json(&self.subgraph_path(part))
    }

    /// Number of subgraph files `subgraph_part_0..k` present without gaps.
    pub fn count_subgraph_files(&self) -> usize {
        (0..).take_while(|&i| self.subgraph_path(i).is_file()).count()
    }

    pub fn write_boundary(&self, boundary: &BoundarySet) -> Result<(), SsspError> {
        write_json(&self.boundary_path(), boundary)
    }

    pub fn read_boundary(&self) -> Result<BoundarySet, SsspError> {
        read_json(&self.boundary_path())
    }

    pub fn write_report(&self, report: &DistanceReport) -> Result<(), SsspError> {
        write_json(&self.report_path(report.rank), report)
    }

    pub fn read_report(&self, rank: usize) -> Result<DistanceReport, SsspError> {
        read_json(&self.report_path(rank))
    }

    /// Reports of ranks `0..num_workers`, in rank order.
    pub fn read_reports(&self, num_workers: usize) -> Result<Vec<DistanceReport>, SsspError> {
        (0..num_workers).map(|r| self.read_report(r)).collect()
    }

    pub fn write_merged(&self, merged: &GlobalDistances) -> Result<(), SsspError> {
        write_json(&self.merged_path(), merged)
    }
}
