//! Fixed, versioned, little-endian wire types for the boundary exchange.
//!
//! An update batch is `WireHdr | WireCount | WireDistUpdate * n`. Receivers
//! copy the payload into zeroed typed buffers, so no alignment is assumed for
//! the byte slice handed back by the communicator.

use bytemuck::{Pod, Zeroable};
use std::mem::{align_of, size_of};

use crate::graph::NodeId;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// Record kind of a relaxation update batch.
pub const KIND_DIST_UPDATES: u16 = 1;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireHdr {
    pub version_le: u16, // = WIRE_VERSION.to_le()
    pub kind_le: u16,
    pub round_le: u32, // relaxation round the batch belongs to
}

impl WireHdr {
    pub fn new(kind: u16, round: u32) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            kind_le: kind.to_le(),
            round_le: round.to_le(),
        }
    }
    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }
    pub fn round(&self) -> u32 {
        u32::from_le(self.round_le)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireCount {
    pub n_le: u32, // count of following records
}
impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            n_le: (n as u32).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u32::from_le(self.n_le) as usize
    }
}

/// One improved tentative distance `(node, dist)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireDistUpdate {
    pub node_le: u64,
    pub dist_le: u64,
}
impl WireDistUpdate {
    pub fn new(node: NodeId, dist: u64) -> Self {
        Self {
            node_le: node.to_le(),
            dist_le: dist.to_le(),
        }
    }
    pub fn node(&self) -> NodeId {
        u64::from_le(self.node_le)
    }
    pub fn dist(&self) -> u64 {
        u64::from_le(self.dist_le)
    }
}

const PREFIX_LEN: usize = size_of::<WireHdr>() + size_of::<WireCount>();

/// Serialize one round's update batch.
pub fn encode_updates(round: u32, updates: &[(NodeId, u64)]) -> Vec<u8> {
    let recs: Vec<WireDistUpdate> = updates
        .iter()
        .map(|&(node, dist)| WireDistUpdate::new(node, dist))
        .collect();
    let mut out = Vec::with_capacity(PREFIX_LEN + recs.len() * size_of::<WireDistUpdate>());
    out.extend_from_slice(cast_slice(&[WireHdr::new(KIND_DIST_UPDATES, round)]));
    out.extend_from_slice(cast_slice(&[WireCount::new(recs.len())]));
    out.extend_from_slice(cast_slice(&recs));
    out
}

/// Parse an update batch, checking version, kind, round and exact length.
pub fn decode_updates(expected_round: u32, bytes: &[u8]) -> Result<Vec<(NodeId, u64)>, String> {
    if bytes.len() < PREFIX_LEN {
        return Err(format!(
            "update batch of {} bytes is shorter than its {PREFIX_LEN}-byte header",
            bytes.len()
        ));
    }
    let hdr: WireHdr = bytemuck::pod_read_unaligned(&bytes[..size_of::<WireHdr>()]);
    if hdr.version() != WIRE_VERSION {
        return Err(format!(
            "wire version {} (expected {WIRE_VERSION})",
            hdr.version()
        ));
    }
    if hdr.kind() != KIND_DIST_UPDATES {
        return Err(format!("unexpected record kind {}", hdr.kind()));
    }
    if hdr.round() != expected_round {
        return Err(format!(
            "batch for round {} arrived during round {expected_round}",
            hdr.round()
        ));
    }
    let count: WireCount = bytemuck::pod_read_unaligned(&bytes[size_of::<WireHdr>()..PREFIX_LEN]);
    let body = &bytes[PREFIX_LEN..];
    expect_exact_len(body.len(), count.get() * size_of::<WireDistUpdate>())?;

    let mut recs = vec![WireDistUpdate::zeroed(); count.get()];
    cast_slice_mut(&mut recs).copy_from_slice(body);
    Ok(recs.iter().map(|r| (r.node(), r.dist())).collect())
}

// ===== Compile-time sanity checks =========================================

const _: () = {
    assert!(size_of::<WireHdr>() == 8);
    assert!(size_of::<WireCount>() == 4);
    assert!(size_of::<WireDistUpdate>() == 16);
    assert!(align_of::<WireDistUpdate>() == 8);
};
