//! Distributed single-source shortest paths.
//!
//! Each worker owns one [`Subgraph`](crate::partitioning::Subgraph) and runs a
//! [`RelaxationEngine`]: synchronous Bellman-Ford rounds, each followed by an
//! all-to-all exchange of improved distances and a global OR vote on whether
//! anything changed anywhere.

pub mod distance;
pub mod engine;
pub mod report;

pub use distance::Distance;
pub use engine::{EngineState, RelaxationEngine, RoundStats, run_sssp};
pub use report::{DistanceReport, GlobalDistances, merge_reports};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::graph::NodeId;

/// Run parameters shared by every worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SsspConfig {
    /// Global id of the source node.
    pub source: NodeId,
    /// Iteration cap; reaching it ends the run as [`RunStatus::Truncated`].
    pub max_rounds: u32,
    /// Receive timeout of the in-process backend, in milliseconds. `None`
    /// waits forever.
    pub recv_timeout_ms: Option<u64>,
}

impl Default for SsspConfig {
    fn default() -> Self {
        Self {
            source: 0,
            max_rounds: 100,
            recv_timeout_ms: Some(30_000),
        }
    }
}

impl SsspConfig {
    pub fn with_source(mut self, source: NodeId) -> Self {
        self.source = source;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }
}

/// How a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// A round passed with no update on any worker.
    Converged,
    /// The iteration cap was reached first; distances are upper bounds.
    Truncated,
}

impl RunStatus {
    pub fn is_converged(self) -> bool {
        self == RunStatus::Converged
    }
}

/// Final state of one worker.
#[derive(Clone, Debug)]
pub struct SsspOutcome {
    pub rank: usize,
    pub num_workers: usize,
    pub status: RunStatus,
    /// Relaxation rounds executed.
    pub rounds: u32,
    /// Every node this worker holds: owned nodes, their neighbors, and all
    /// boundary nodes.
    pub distances: HashMap<NodeId, Distance>,
    pub history: Vec<RoundStats>,
}
