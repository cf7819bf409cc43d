//! Per-worker relaxation state machine.
//!
//! ```text
//! Initializing -> Relaxing -> Exchanging -> ConvergenceCheck -+-> Relaxing
//!                                                             +-> Terminated
//! ```
//!
//! Relaxation reads the distance map as it was at the start of the round and
//! only writes the round's update batch; the map itself changes only when
//! batches (the worker's own included) are merged after the exchange. Every
//! round therefore advances reachability by exactly one hop, on every worker
//! alike, and the merge is an order-independent minimum.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use serde::Serialize;

use super::{Distance, RunStatus, SsspConfig, SsspOutcome};
use crate::algs::communicator::Communicator;
use crate::algs::exchange::{CONVERGENCE_TAG, SOURCE_TAG, exchange_updates, reduce_any};
use crate::graph::NodeId;
use crate::partitioning::{BoundarySet, PartitionError, Subgraph};
use crate::sssp_error::SsspError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Relaxing,
    Exchanging,
    ConvergenceCheck,
    Terminated(RunStatus),
}

/// Counters of one completed round on one worker.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    pub round: u32,
    /// Entries in this worker's outgoing batch.
    pub relaxed: usize,
    /// Entries received from all workers, own batch included.
    pub received: usize,
    /// Held distances lowered by the merge.
    pub applied: usize,
}

impl RoundStats {
    pub fn updated(&self) -> bool {
        self.relaxed > 0 || self.applied > 0
    }
}

pub struct RelaxationEngine<'a, C: Communicator + ?Sized> {
    comm: &'a C,
    subgraph: &'a Subgraph,
    config: SsspConfig,
    dist: HashMap<NodeId, Distance>,
    state: EngineState,
    round: u32,
    batch: Vec<(NodeId, u64)>,
    local_updated: bool,
    history: Vec<RoundStats>,
}

impl<'a, C: Communicator + ?Sized> RelaxationEngine<'a, C> {
    /// Engine for one worker. The distance map holds every owned node, every
    /// edge target of the subgraph, and every global boundary node.
    pub fn new(
        comm: &'a C,
        subgraph: &'a Subgraph,
        boundary: &BoundarySet,
        config: &SsspConfig,
    ) -> Self {
        let mut dist = HashMap::with_capacity(subgraph.num_nodes() + boundary.len());
        for (u, edges) in subgraph.iter() {
            dist.insert(u, Distance::Unreached);
            for &(v, _) in edges {
                dist.insert(v, Distance::Unreached);
            }
        }
        for b in boundary.iter() {
            dist.insert(b, Distance::Unreached);
        }
        Self {
            comm,
            subgraph,
            config: config.clone(),
            dist,
            state: EngineState::Initializing,
            round: 0,
            batch: Vec::new(),
            local_updated: false,
            history: Vec::new(),
        }
    }

    /// Warm start from previously computed distances. Entries for nodes this
    /// worker does not hold are ignored.
    pub fn with_distances<I>(
        comm: &'a C,
        subgraph: &'a Subgraph,
        boundary: &BoundarySet,
        config: &SsspConfig,
        initial: I,
    ) -> Self
    where
        I: IntoIterator<Item = (NodeId, Distance)>,
    {
        let mut engine = Self::new(comm, subgraph, boundary, config);
        for (node, d) in initial {
            if let Some(cur) = engine.dist.get_mut(&node) {
                *cur = (*cur).min(d);
            }
        }
        engine
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Completed rounds.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn distances(&self) -> &HashMap<NodeId, Distance> {
        &self.dist
    }

    pub fn distance(&self, node: NodeId) -> Option<Distance> {
        self.dist.get(&node).copied()
    }

    pub fn history(&self) -> &[RoundStats] {
        &self.history
    }

    pub fn knows_source(&self) -> bool {
        self.dist.contains_key(&self.config.source)
    }

    /// Perform one state transition and return the new state.
    ///
    /// Collective: all workers must step in lockstep. Stepping a terminated
    /// engine is a no-op.
    pub fn step(&mut self) -> Result<EngineState, SsspError> {
        self.state = match self.state {
            EngineState::Initializing => self.initialize()?,
            EngineState::Relaxing => self.relax(),
            EngineState::Exchanging => self.exchange()?,
            EngineState::ConvergenceCheck => self.check_convergence()?,
            done @ EngineState::Terminated(_) => done,
        };
        Ok(self.state)
    }

    /// Step until terminated.
    pub fn run(mut self) -> Result<SsspOutcome, SsspError> {
        let status = loop {
            if let EngineState::Terminated(status) = self.step()? {
                break status;
            }
        };
        Ok(SsspOutcome {
            rank: self.comm.rank(),
            num_workers: self.comm.size(),
            status,
            rounds: self.round,
            distances: self.dist,
            history: self.history,
        })
    }

    fn initialize(&mut self) -> Result<EngineState, SsspError> {
        let source = self.config.source;
        let known = self.knows_source();
        if !reduce_any(self.comm, SOURCE_TAG, known)? {
            return Err(PartitionError::UnknownSource(source).into());
        }
        if let Some(d) = self.dist.get_mut(&source) {
            *d = Distance::ZERO;
        }
        log::debug!(
            "rank {}: holding {} nodes ({} owned), source {source} {}",
            self.comm.rank(),
            self.dist.len(),
            self.subgraph.num_nodes(),
            if known { "held" } else { "remote" }
        );
        if self.config.max_rounds == 0 {
            log::warn!("rank {}: max_rounds is 0, nothing relaxed", self.comm.rank());
            return Ok(EngineState::Terminated(RunStatus::Truncated));
        }
        Ok(EngineState::Relaxing)
    }

    fn relax(&mut self) -> EngineState {
        let mut best: HashMap<NodeId, u64> = HashMap::new();
        for (u, edges) in self.subgraph.iter() {
            let Some(du) = self.dist.get(&u).and_then(|d| d.finite()) else {
                continue;
            };
            for &(v, w) in edges {
                let cand = du.saturating_add(w);
                let held = self.dist.get(&v).copied().unwrap_or_default();
                if Distance::Finite(cand) >= held {
                    continue;
                }
                match best.entry(v) {
                    Entry::Occupied(mut e) => {
                        if cand < *e.get() {
                            e.insert(cand);
                        }
                    }
                    Entry::Vacant(e) => {
                        e.insert(cand);
                    }
                }
            }
        }
        let mut batch: Vec<(NodeId, u64)> = best.into_iter().collect();
        batch.sort_unstable();
        self.local_updated = !batch.is_empty();
        self.batch = batch;
        EngineState::Exchanging
    }

    fn exchange(&mut self) -> Result<EngineState, SsspError> {
        let batch = std::mem::take(&mut self.batch);
        let received = exchange_updates(self.comm, self.round, &batch)?;
        let mut applied = 0;
        for &(node, d) in &received {
            if let Some(cur) = self.dist.get_mut(&node) {
                let d = Distance::Finite(d);
                if d < *cur {
                    *cur = d;
                    applied += 1;
                }
            }
        }
        let stats = RoundStats {
            round: self.round,
            relaxed: batch.len(),
            received: received.len(),
            applied,
        };
        self.local_updated |= stats.updated();
        log::debug!(
            "rank {} round {}: relaxed {}, received {}, applied {}",
            self.comm.rank(),
            stats.round,
            stats.relaxed,
            stats.received,
            stats.applied
        );
        self.history.push(stats);
        Ok(EngineState::ConvergenceCheck)
    }

    fn check_convergence(&mut self) -> Result<EngineState, SsspError> {
        let any = reduce_any(self.comm, CONVERGENCE_TAG, self.local_updated)?;
        self.round += 1;
        self.local_updated = false;
        if !any {
            log::info!(
                "rank {}: converged after {} rounds",
                self.comm.rank(),
                self.round
            );
            return Ok(EngineState::Terminated(RunStatus::Converged));
        }
        if self.round >= self.config.max_rounds {
            log::warn!(
                "rank {}: iteration cap {} reached before convergence; distances are upper bounds",
                self.comm.rank(),
                self.config.max_rounds
            );
            return Ok(EngineState::Terminated(RunStatus::Truncated));
        }
        Ok(EngineState::Relaxing)
    }
}

/// Build an engine for this worker and run it to termination.
pub fn run_sssp<C>(
    comm: &C,
    subgraph: &Subgraph,
    boundary: &BoundarySet,
    config: &SsspConfig,
) -> Result<SsspOutcome, SsspError>
where
    C: Communicator + ?Sized,
{
    RelaxationEngine::new(comm, subgraph, boundary, config).run()
}
