//! Per-round collectives of the relaxation engine.
//!
//! [`exchange_updates`] is the all-to-all broadcast of update batches;
//! [`reduce_any`] is the global OR used for termination. Both are collective:
//! every rank must call them the same number of times in the same order.

use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::wire::{decode_updates, encode_updates};
use crate::graph::NodeId;
use crate::sssp_error::SsspError;

/// Tag pair (`+0` counts, `+1` payloads) of the update all-gather.
pub const UPDATE_TAG: CommTag = CommTag(0x5350);
/// Tag pair of the per-round convergence vote.
pub const CONVERGENCE_TAG: CommTag = CommTag(0x5360);
/// Tag pair of the one-off "who knows the source" vote.
pub const SOURCE_TAG: CommTag = CommTag(0x5370);

/// Send `local` to every rank and return every rank's batch (own included),
/// concatenated in rank order.
///
/// A batch that is missing, malformed, or stamped with another round is a
/// [`SsspError::CommError`] naming the sending rank.
pub fn exchange_updates<C>(
    comm: &C,
    round: u32,
    local: &[(NodeId, u64)],
) -> Result<Vec<(NodeId, u64)>, SsspError>
where
    C: Communicator + ?Sized,
{
    let payload = encode_updates(round, local);
    let batches = comm.all_gather_bytes(UPDATE_TAG, &payload)?;
    let mut merged = Vec::new();
    for (peer, bytes) in batches.iter().enumerate() {
        let ups = decode_updates(round, bytes).map_err(|message| SsspError::CommError {
            neighbor: peer,
            message,
        })?;
        merged.extend(ups);
    }
    log::trace!(
        "rank {} round {round}: sent {} updates, received {} in total",
        comm.rank(),
        local.len(),
        merged.len()
    );
    Ok(merged)
}

/// Global OR of `flag` over all ranks.
pub fn reduce_any<C>(comm: &C, tag: CommTag, flag: bool) -> Result<bool, SsspError>
where
    C: Communicator + ?Sized,
{
    let mut v = [u64::from(flag)];
    comm.allreduce_sum(tag, &mut v)?;
    Ok(v[0] > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, ThreadComm};
    use std::thread;

    #[test]
    fn single_rank_exchange_echoes_own_batch() {
        let got = exchange_updates(&NoComm, 0, &[(4, 9)]).unwrap();
        assert_eq!(got, vec![(4, 9)]);
        assert!(reduce_any(&NoComm, CONVERGENCE_TAG, true).unwrap());
        assert!(!reduce_any(&NoComm, CONVERGENCE_TAG, false).unwrap());
    }

    #[test]
    fn three_ranks_see_all_batches_in_rank_order() {
        let world = ThreadComm::world(3);
        let results: Vec<_> = thread::scope(|s| {
            let hs: Vec<_> = world
                .iter()
                .map(|c| {
                    s.spawn(move || {
                        let r = c.rank() as u64;
                        let mut out = Vec::new();
                        for round in 0..3u32 {
                            let local: Vec<_> = (0..r).map(|i| (r * 10 + i, round as u64)).collect();
                            out.push(exchange_updates(c, round, &local).unwrap());
                            let any = reduce_any(c, CONVERGENCE_TAG, r == 2 && round == 1).unwrap();
                            assert_eq!(any, round == 1);
                        }
                        out
                    })
                })
                .collect();
            hs.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for per_rank in &results {
            assert_eq!(per_rank[1], vec![(10, 1), (20, 1), (21, 1)]);
        }
        assert_eq!(results[0], results[2]);
    }
}
