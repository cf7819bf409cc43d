//! Shared plumbing of the command-line tools.

use serde::de::DeserializeOwned;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::io::read_json;
use crate::partitioning::PartitionError;
use crate::sssp_error::SsspError;

/// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`).
/// `log` records from the library are forwarded to it.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log `err` and map it to its exit code.
pub fn exit_with(err: &SsspError) -> ExitCode {
    log::error!("{err}");
    ExitCode::from(err.exit_code())
}

/// Final exit code of a phase.
pub fn finish(result: Result<(), SsspError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit_with(&e),
    }
}

/// A JSON config file if one was given, the defaults otherwise. Missing
/// fields take their default values.
pub fn load_config<T>(path: Option<&Path>) -> Result<T, SsspError>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}

/// `--workers` has to match the number of workers actually taking part.
pub fn check_worker_count(expected: Option<usize>, found: usize) -> Result<(), SsspError> {
    match expected {
        Some(expected) if expected != found => {
            Err(PartitionError::WorkerCount { expected, found }.into())
        }
        _ => Ok(()),
    }
}
