//! Split a METIS graph into per-partition subgraph files plus the boundary set.

use clap::Parser;
use partition_sssp::cli;
use partition_sssp::io::PartitionDir;
use partition_sssp::partitioning::PartitionError;
use partition_sssp::pipeline::{PartitionSource, prepare_partition_files};
use partition_sssp::sssp_error::SsspError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// METIS graph file (as written by sssp-convert)
    #[arg(short, long)]
    graph: PathBuf,

    /// Partition vector, one part index per line (`gpmetis` .part.K output)
    #[arg(short, long)]
    parts: Option<PathBuf>,

    /// Number of parts; defaults to the largest index in the partition file + 1
    #[arg(short = 'k', long)]
    num_parts: Option<usize>,

    /// Partition in-process with METIS into this many parts
    #[cfg(feature = "metis-support")]
    #[arg(long, conflicts_with = "parts")]
    metis: Option<usize>,

    /// Output directory for subgraph_part_{i}.json and boundary_nodes.json
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Add missing reverse edges instead of rejecting an asymmetric graph
    #[arg(long)]
    symmetrize: bool,
}

impl Cli {
    fn source(&self) -> Result<PartitionSource, SsspError> {
        #[cfg(feature = "metis-support")]
        if let Some(num_parts) = self.metis {
            return Ok(PartitionSource::Metis { num_parts });
        }
        match &self.parts {
            Some(path) => Ok(PartitionSource::File {
                path: path.clone(),
                num_parts: self.num_parts,
            }),
            None => Err(PartitionError::Other("a partition file (--parts) is required".into()).into()),
        }
    }
}

fn main() -> ExitCode {
    cli::init_logging();
    let args = Cli::parse();
    let out = PartitionDir::new(&args.out);
    let result = args.source().and_then(|source| {
        prepare_partition_files(&args.graph, &source, &out, args.symmetrize)?;
        log::info!("all done; subgraphs and boundary info saved");
        Ok(())
    });
    cli::finish(result)
}
