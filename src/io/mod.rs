//! Readers and writers for the files exchanged between pipeline phases.
//!
//! Text formats (edge list, METIS graph, partition vector) are parsed from any
//! `BufRead` and written to any `Write`; the JSON artifacts of a partitioned
//! run live in one directory under fixed names (see [`partitioned`]).

pub mod edge_list;
pub mod metis;
pub mod partitioned;

pub use edge_list::{ConvertConfig, EdgeListStats, read_edge_list, scale_weight};
pub use metis::{read_metis_graph, read_partition_vector, write_metis_graph, write_partition_vector};
pub use partitioned::PartitionDir;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::sssp_error::SsspError;

/// Open `path` for buffered reading.
pub fn open_buffered(path: &Path) -> Result<BufReader<File>, SsspError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Create (or truncate) `path` for buffered writing.
pub fn create_buffered(path: &Path) -> Result<BufWriter<File>, SsspError> {
    Ok(BufWriter::new(File::create(path)?))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SsspError> {
    let reader = open_buffered(path)?;
    serde_json::from_reader(reader).map_err(|e| SsspError::json(path, e))
}

/// Pretty-printed JSON, newline terminated.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SsspError> {
    let mut w = create_buffered(path)?;
    serde_json::to_writer_pretty(&mut w, value).map_err(|e| SsspError::json(path, e))?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}
