//! Convert a whitespace edge list into a weighted METIS graph file.

use clap::Parser;
use partition_sssp::cli;
use partition_sssp::io::ConvertConfig;
use partition_sssp::pipeline::convert_edges_to_metis;
use partition_sssp::sssp_error::SsspError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Edge list: one `<u> <v> <weight>` per line, 0-based ids
    input: PathBuf,

    /// METIS graph file to write
    output: PathBuf,

    /// JSON conversion settings (`scale`, `max_node_id`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Real weights are multiplied by this and truncated, minimum 1 (default 100)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Lines naming a larger node id are skipped
    #[arg(long)]
    max_node_id: Option<u64>,
}

impl Cli {
    fn config(&self) -> Result<ConvertConfig, SsspError> {
        let mut cfg: ConvertConfig = cli::load_config(self.config.as_deref())?;
        if let Some(scale) = self.scale {
            cfg.scale = scale;
        }
        if let Some(max) = self.max_node_id {
            cfg.max_node_id = max;
        }
        Ok(cfg)
    }
}

fn main() -> ExitCode {
    cli::init_logging();
    let args = Cli::parse();
    cli::finish(
        args.config()
            .and_then(|cfg| convert_edges_to_metis(&args.input, &args.output, &cfg))
            .map(|_| ()),
    )
}
