//! SsspError: unified error type for partition-sssp public APIs
//!
//! Every fallible operation in the crate returns this type. Variants follow the
//! failure classes of a distributed run: malformed input files, inconsistent
//! configuration, and a peer that never delivered its part of an exchange.
//! An iteration cap being reached is *not* an error; see
//! [`RunStatus::Truncated`](crate::sssp::RunStatus::Truncated).

use crate::partitioning::error::PartitionError;
use std::path::Path;
use thiserror::Error;

/// Exit code for a structurally malformed input file (`EX_DATAERR`).
pub const EXIT_INPUT_FORMAT: u8 = 65;
/// Exit code for a peer that failed during an exchange (`EX_UNAVAILABLE`).
pub const EXIT_COMM: u8 = 69;
/// Exit code for file system failures (`EX_IOERR`).
pub const EXIT_IO: u8 = 74;
/// Exit code for a truncated run when the caller asked for strict convergence (`EX_TEMPFAIL`).
pub const EXIT_TRUNCATED: u8 = 75;
/// Exit code for an inconsistent partition or run configuration (`EX_CONFIG`).
pub const EXIT_CONFIG: u8 = 78;

/// Unified error type for partition-sssp operations.
#[derive(Debug, Error)]
pub enum SsspError {
    /// A structural field of an input file is missing or malformed.
    #[error("Input format error in {context}: {message}")]
    InputFormat { context: String, message: String },
    /// Partition assignment or run parameters are inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(#[from] PartitionError),
    /// A peer did not deliver (or delivered a malformed) exchange message.
    #[error("Communication error with rank {neighbor}: {message}")]
    CommError { neighbor: usize, message: String },
    /// A worker thread died before reporting.
    #[error("Worker {rank} panicked")]
    WorkerPanicked { rank: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON artifact could not be encoded or decoded.
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SsspError {
    pub(crate) fn input(context: impl Into<String>, message: impl Into<String>) -> Self {
        SsspError::InputFormat {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        SsspError::Json {
            context: path.display().to_string(),
            source,
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            SsspError::InputFormat { .. } | SsspError::Json { .. } => EXIT_INPUT_FORMAT,
            SsspError::Configuration(_) => EXIT_CONFIG,
            SsspError::CommError { .. } | SsspError::WorkerPanicked { .. } => EXIT_COMM,
            SsspError::Io(_) => EXIT_IO,
        }
    }

    /// True for failures caused by the message layer rather than by local input.
    pub fn is_comm(&self) -> bool {
        matches!(
            self,
            SsspError::CommError { .. } | SsspError::WorkerPanicked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let input = SsspError::input("graph.metis", "missing header");
        assert_eq!(input.exit_code(), EXIT_INPUT_FORMAT);
        let cfg = SsspError::from(PartitionError::NoParts);
        assert_eq!(cfg.exit_code(), EXIT_CONFIG);
        let comm = SsspError::CommError {
            neighbor: 3,
            message: "timed out".into(),
        };
        assert_eq!(comm.exit_code(), EXIT_COMM);
        assert!(comm.is_comm());
        assert!(!cfg.is_comm());
    }

    #[test]
    fn display_names_the_peer() {
        let comm = SsspError::CommError {
            neighbor: 2,
            message: "no update batch".into(),
        };
        assert_eq!(
            comm.to_string(),
            "Communication error with rank 2: no update batch"
        );
    }
}
