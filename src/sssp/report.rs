//! Per-worker distance reports and their global merge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Distance, RunStatus, SsspOutcome};
use crate::graph::NodeId;

/// What one worker writes to `distances_rank_{r}.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceReport {
    pub rank: usize,
    pub num_workers: usize,
    pub status: RunStatus,
    pub rounds: u32,
    /// Node id (string key in JSON) -> number or `"unreached"`.
    pub distances: BTreeMap<NodeId, Distance>,
}

impl From<SsspOutcome> for DistanceReport {
    fn from(outcome: SsspOutcome) -> Self {
        Self {
            rank: outcome.rank,
            num_workers: outcome.num_workers,
            status: outcome.status,
            rounds: outcome.rounds,
            distances: outcome.distances.into_iter().collect(),
        }
    }
}

/// Union of all worker reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDistances {
    /// True only if every report converged naturally.
    #[serde(rename = "final")]
    pub is_final: bool,
    /// Largest round count over the reports.
    pub rounds: u32,
    pub distances: BTreeMap<NodeId, Distance>,
}

impl GlobalDistances {
    pub fn get(&self, node: NodeId) -> Distance {
        self.distances.get(&node).copied().unwrap_or_default()
    }

    /// Distances of nodes `0..n` in order; nodes absent from every report are unreached.
    pub fn to_vec(&self, n: usize) -> Vec<Distance> {
        (0..n as NodeId).map(|v| self.get(v)).collect()
    }
}

/// Merge reports by taking the minimum per node.
///
/// Converged workers agree on every shared node, so the minimum only matters
/// for truncated runs.
pub fn merge_reports<'r, I>(reports: I) -> GlobalDistances
where
    I: IntoIterator<Item = &'r DistanceReport>,
{
    let mut out = GlobalDistances {
        is_final: true,
        ..Default::default()
    };
    let mut seen = 0usize;
    for r in reports {
        seen += 1;
        out.is_final &= r.status.is_converged();
        out.rounds = out.rounds.max(r.rounds);
        for (&node, &d) in &r.distances {
            out.distances
                .entry(node)
                .and_modify(|cur| *cur = (*cur).min(d))
                .or_insert(d);
        }
    }
    if seen == 0 {
        out.is_final = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rank: usize, status: RunStatus, ds: &[(NodeId, Distance)]) -> DistanceReport {
        DistanceReport {
            rank,
            num_workers: 2,
            status,
            rounds: 3 + rank as u32,
            distances: ds.iter().copied().collect(),
        }
    }

    #[test]
    fn merge_keeps_minimum_and_union() {
        use Distance::*;
        let a = report(0, RunStatus::Converged, &[(0, Finite(0)), (1, Finite(4)), (2, Unreached)]);
        let b = report(1, RunStatus::Converged, &[(1, Finite(3)), (2, Finite(7)), (3, Unreached)]);
        let g = merge_reports([&a, &b]);
        assert!(g.is_final);
        assert_eq!(g.rounds, 4);
        assert_eq!(
            g.to_vec(5),
            vec![Finite(0), Finite(3), Finite(7), Unreached, Unreached]
        );
    }

    #[test]
    fn one_truncated_worker_makes_result_non_final() {
        let a = report(0, RunStatus::Converged, &[]);
        let b = report(1, RunStatus::Truncated, &[]);
        assert!(!merge_reports([&a, &b]).is_final);
        assert!(!merge_reports(std::iter::empty::<&DistanceReport>()).is_final);
    }

    #[test]
    fn report_json_shape() {
        let r = report(1, RunStatus::Truncated, &[(2, Distance::Finite(5)), (10, Distance::Unreached)]);
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "truncated");
        assert_eq!(v["distances"]["2"], 5);
        assert_eq!(v["distances"]["10"], "unreached");
        let back: DistanceReport = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}
