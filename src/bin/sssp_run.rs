//! Run distributed SSSP over the files written by sssp-prepare.
//!
//! By default every partition runs on its own thread in this process. With
//! `--mpi` (feature `mpi-support`) this process is one MPI rank and handles
//! the partition matching its rank.

use clap::Parser;
use partition_sssp::cli;
use partition_sssp::io::PartitionDir;
use partition_sssp::pipeline::run_local_cluster_from_dir;
use partition_sssp::sssp::{RunStatus, SsspConfig};
use partition_sssp::sssp_error::{EXIT_TRUNCATED, SsspError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding subgraph_part_{i}.json and boundary_nodes.json
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// JSON run configuration (`source`, `max_rounds`, `recv_timeout_ms`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source node (overrides the config file)
    #[arg(short, long)]
    source: Option<u64>,

    /// Iteration cap (overrides the config file)
    #[arg(short, long)]
    max_rounds: Option<u32>,

    /// Expected number of workers; must match the subgraph files (and the
    /// MPI world size with `--mpi`)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Exit with a distinct code if the run was truncated by the cap
    #[arg(long)]
    strict: bool,

    /// Run as one MPI rank instead of in-process threads
    #[cfg(feature = "mpi-support")]
    #[arg(long)]
    mpi: bool,
}

impl Cli {
    fn config(&self) -> Result<SsspConfig, SsspError> {
        let mut cfg: SsspConfig = cli::load_config(self.config.as_deref())?;
        if let Some(s) = self.source {
            cfg.source = s;
        }
        if let Some(m) = self.max_rounds {
            cfg.max_rounds = m;
        }
        Ok(cfg)
    }
}

fn status_code(status: RunStatus, strict: bool) -> ExitCode {
    match status {
        RunStatus::Truncated if strict => {
            log::error!("run truncated by the iteration cap (--strict)");
            ExitCode::from(EXIT_TRUNCATED)
        }
        _ => ExitCode::SUCCESS,
    }
}

#[cfg(feature = "mpi-support")]
fn run_mpi(
    dir: &PartitionDir,
    cfg: &SsspConfig,
    workers: Option<usize>,
    strict: bool,
) -> Result<ExitCode, SsspError> {
    use partition_sssp::algs::communicator::{Communicator, MpiComm};
    use partition_sssp::pipeline::run_worker_from_dir;

    let comm = MpiComm::new().ok_or_else(|| SsspError::CommError {
        neighbor: 0,
        message: "MPI initialization failed".into(),
    })?;
    log::info!("rank {} of {}", comm.rank(), comm.size());
    cli::check_worker_count(workers, comm.size())?;
    let report = run_worker_from_dir(&comm, dir, cfg)?;
    Ok(status_code(report.status, strict))
}

fn run(args: &Cli) -> Result<ExitCode, SsspError> {
    let cfg = args.config()?;
    let dir = PartitionDir::new(&args.dir);

    #[cfg(feature = "mpi-support")]
    if args.mpi {
        return run_mpi(&dir, &cfg, args.workers, args.strict);
    }

    cli::check_worker_count(args.workers, dir.count_subgraph_files())?;
    let merged = run_local_cluster_from_dir(&dir, &cfg)?;
    let status = if merged.is_final {
        RunStatus::Converged
    } else {
        RunStatus::Truncated
    };
    Ok(status_code(status, args.strict))
}

fn main() -> ExitCode {
    cli::init_logging();
    let args = Cli::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => cli::exit_with(&e),
    }
}
