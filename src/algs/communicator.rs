//! Thin façade over intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! All handles are **waitable** but non-blocking; exchange code calls
//! `.wait()` before it trusts that the buffer is ready.
//!
//! The two collectives the relaxation engine needs, an all-gather of byte
//! payloads and a sum all-reduce, have default implementations built from
//! point-to-point messages. Backends with native collectives override them.

use bytes::Bytes;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::algs::wire::{WireCount, cast_slice, cast_slice_mut};
use crate::sssp_error::SsspError;

/// How long a thread-backed receive waits before declaring the peer stalled.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed message tag. Multi-stage protocols derive their stage tags with
/// [`CommTag::offset`] so the stages never share a mailbox slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(base: u16) -> Self {
        Self(base)
    }
    pub const fn base(self) -> u16 {
        self.0
    }
    pub const fn offset(self, k: u16) -> Self {
        Self(self.0.wrapping_add(k))
    }
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Non-blocking communication interface.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This worker's rank in `0..size()`.
    fn rank(&self) -> usize;
    /// Number of workers in the group.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive of at most `buf.len()` bytes from `peer`.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// True for the single-process stand-in.
    fn is_no_comm(&self) -> bool {
        false
    }

    /// Tear down the whole group after a fatal local error so peers stop
    /// waiting on this rank. No-op by default.
    fn abort(&self) {}

    /// Every rank contributes `local`; every rank gets all contributions,
    /// indexed by source rank.
    ///
    /// Two stages: byte counts on `tag`, payloads on `tag.offset(1)`. All
    /// handles are drained before returning, even on error.
    fn all_gather_bytes(&self, tag: CommTag, local: &[u8]) -> Result<Vec<Vec<u8>>, SsspError> {
        let (me, size) = (self.rank(), self.size());
        if size <= 1 {
            return Ok(vec![local.to_vec()]);
        }
        let peers: Vec<usize> = (0..size).filter(|&p| p != me).collect();

        // 1) counts
        let mut recv_cnt = Vec::with_capacity(peers.len());
        for &p in &peers {
            let mut cnt = WireCount::new(0);
            let h = self.irecv(p, tag.as_u16(), cast_slice_mut(std::slice::from_mut(&mut cnt)));
            recv_cnt.push((p, h, std::mem::size_of::<WireCount>()));
        }
        let count = WireCount::new(local.len());
        let sends: Vec<_> = peers
            .iter()
            .map(|&p| self.isend(p, tag.as_u16(), cast_slice(std::slice::from_ref(&count))))
            .collect();
        let counts = wait_all(recv_cnt, sends);
        let counts = counts?
            .into_iter()
            .map(|(p, data)| {
                let mut cnt = WireCount::new(0);
                cast_slice_mut(std::slice::from_mut(&mut cnt)).copy_from_slice(&data);
                (p, cnt.get())
            })
            .collect::<Vec<_>>();

        // 2) payloads
        let payload_tag = tag.offset(1).as_u16();
        let mut recv_data = Vec::with_capacity(peers.len());
        for &(p, n) in &counts {
            let mut buf = vec![0u8; n];
            let h = self.irecv(p, payload_tag, &mut buf);
            recv_data.push((p, h, n));
        }
        let sends: Vec<_> = peers
            .iter()
            .map(|&p| self.isend(p, payload_tag, local))
            .collect();

        let mut out = vec![Vec::new(); size];
        out[me] = local.to_vec();
        for (p, data) in wait_all(recv_data, sends)? {
            out[p] = data;
        }
        Ok(out)
    }

    /// Element-wise sum of `values` over all ranks, written back in place.
    fn allreduce_sum(&self, tag: CommTag, values: &mut [u64]) -> Result<(), SsspError> {
        let local: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let all = self.all_gather_bytes(tag, &local)?;
        values.iter_mut().for_each(|v| *v = 0);
        for (peer, bytes) in all.iter().enumerate() {
            if bytes.len() != local.len() {
                return Err(SsspError::CommError {
                    neighbor: peer,
                    message: format!(
                        "reduction payload of {} bytes, expected {}",
                        bytes.len(),
                        local.len()
                    ),
                });
            }
            for (v, chunk) in values.iter_mut().zip(bytes.chunks_exact(8)) {
                let mut le = [0u8; 8];
                le.copy_from_slice(chunk);
                *v = v.saturating_add(u64::from_le_bytes(le));
            }
        }
        Ok(())
    }
}

/// Wait on every receive (checking its exact length), then drain the sends.
/// The first failure wins; later handles are still waited on.
fn wait_all<R: Wait, S: Wait>(
    recvs: Vec<(usize, R, usize)>,
    sends: Vec<S>,
) -> Result<Vec<(usize, Vec<u8>)>, SsspError> {
    let mut got = Vec::with_capacity(recvs.len());
    let mut maybe_err = None;
    for (peer, h, expected) in recvs {
        match h.wait() {
            Some(data) if data.len() == expected => {
                if maybe_err.is_none() {
                    got.push((peer, data));
                }
            }
            Some(data) if maybe_err.is_none() => {
                maybe_err = Some(SsspError::CommError {
                    neighbor: peer,
                    message: format!("expected {expected} bytes, got {}", data.len()),
                });
            }
            None if maybe_err.is_none() => {
                maybe_err = Some(SsspError::CommError {
                    neighbor: peer,
                    message: format!("no message from rank {peer} (timed out or aborted)"),
                });
            }
            _ => {} // already have an error; just drain
        }
    }
    for s in sends {
        let _ = s.wait();
    }
    match maybe_err {
        Some(err) => Err(err),
        None => Ok(got),
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Single-process stand-in: rank 0 of a group of one.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- ThreadComm: intra-process / one thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)

/// Mailbox shared by all ranks of one thread world. Each slot is FIFO so a
/// fast rank may run a round ahead of a slow one without overwriting.
#[derive(Debug, Default)]
struct Mailbox {
    slots: DashMap<Key, VecDeque<Bytes>>,
    aborted: AtomicBool,
}

impl Mailbox {
    fn pop(&self, key: &Key) -> Option<Bytes> {
        self.slots.get_mut(key).and_then(|mut q| q.pop_front())
    }
}

/// One rank of an in-process group; ranks run on separate threads.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    recv_timeout: Option<Duration>,
}

impl ThreadComm {
    /// Create all `size` ranks of a fresh, isolated group.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                recv_timeout: Some(DEFAULT_RECV_TIMEOUT),
            })
            .collect()
    }

    /// `None` waits forever.
    pub fn with_recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }

    /// Whether any rank of this group has called [`Communicator::abort`].
    pub fn is_aborted(&self) -> bool {
        self.mailbox.aborted.load(Ordering::Acquire)
    }
}

pub struct ThreadRecv {
    mailbox: Arc<Mailbox>,
    key: Key,
    max_len: usize,
    timeout: Option<Duration>,
}

impl Wait for ThreadRecv {
    fn wait(self) -> Option<Vec<u8>> {
        let start = Instant::now();
        let mut spins = 0u32;
        loop {
            if let Some(bytes) = self.mailbox.pop(&self.key) {
                let n = bytes.len().min(self.max_len);
                return Some(bytes[..n].to_vec());
            }
            if self.mailbox.aborted.load(Ordering::Acquire) {
                return None;
            }
            if self.timeout.is_some_and(|t| start.elapsed() >= t) {
                log::warn!(
                    "rank {} gave up waiting for rank {} (tag {:#06x})",
                    self.key.1,
                    self.key.0,
                    self.key.2
                );
                return None;
            }
            if spins < 64 {
                spins += 1;
                std::thread::yield_now();
            } else {
                std::thread::sleep(Duration::from_micros(50));
            }
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = ThreadRecv;

    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
        self.mailbox
            .slots
            .entry((self.rank, peer, tag))
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> ThreadRecv {
        ThreadRecv {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            max_len: buf.len(),
            timeout: self.recv_timeout,
        }
    }

    fn abort(&self) {
        log::warn!("rank {} aborting its thread group", self.rank);
        self.mailbox.aborted.store(true, Ordering::Release);
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use crate::sssp_error::EXIT_COMM;
    use mpi::Count;
    use mpi::collective::SystemOperation;
    use mpi::datatype::PartitionMut;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, CommunicatorCollectives, Destination, Source};

    /// One MPI process. Point-to-point calls are blocking underneath; the
    /// collectives map to native MPI collectives.
    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialize MPI; `None` if it was already initialized.
        pub fn new() -> Option<Self> {
            let universe = mpi::initialize()?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Some(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// Already-completed operation.
    pub struct MpiDone(Option<Vec<u8>>);

    impl Wait for MpiDone {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    fn too_large(len: usize) -> SsspError {
        SsspError::CommError {
            neighbor: 0,
            message: format!("payload of {len} bytes exceeds MPI count range"),
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiDone;
        type RecvHandle = MpiDone;

        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiDone {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
            MpiDone(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiDone {
            let (mut data, _status) = self
                .world
                .process_at_rank(peer as i32)
                .receive_vec_with_tag::<u8>(i32::from(tag));
            data.truncate(buf.len());
            MpiDone(Some(data))
        }

        fn abort(&self) {
            log::error!("rank {} calling MPI_Abort", self.rank);
            self.world.abort(i32::from(EXIT_COMM))
        }

        fn all_gather_bytes(&self, _tag: CommTag, local: &[u8]) -> Result<Vec<Vec<u8>>, SsspError> {
            let len = Count::try_from(local.len()).map_err(|_| too_large(local.len()))?;
            let mut counts: Vec<Count> = vec![0; self.size];
            self.world.all_gather_into(&len, &mut counts[..]);

            let mut displs: Vec<Count> = Vec::with_capacity(self.size);
            let mut total: Count = 0;
            for &c in &counts {
                displs.push(total);
                total = total.checked_add(c).ok_or_else(|| too_large(total as usize))?;
            }
            let mut buf = vec![0u8; total as usize];
            {
                let mut partition = PartitionMut::new(&mut buf[..], &counts[..], &displs[..]);
                self.world.all_gather_varcount_into(local, &mut partition);
            }
            Ok(counts
                .iter()
                .zip(&displs)
                .map(|(&c, &d)| buf[d as usize..(d + c) as usize].to_vec())
                .collect())
        }

        fn allreduce_sum(&self, _tag: CommTag, values: &mut [u64]) -> Result<(), SsspError> {
            let send = values.to_vec();
            self.world
                .all_reduce_into(&send[..], values, SystemOperation::sum());
            Ok(())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
