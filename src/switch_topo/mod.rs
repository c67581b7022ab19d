//! Redistribution of a 3D distributed array between two pencil
//! decompositions.
//!
//! A `SwitchTopo` precomputes, from pure index arithmetic, the set of
//! memory chunks every rank exchanges with every other rank, and executes
//! the remap through a [`Communicator`]: pack the outgoing chunks in the
//! source topology's axis order, exchange, zero the destination extent and
//! unpack each incoming chunk with the fast-axis permutation applied. The
//! zero-fill guarantees that regions not covered by any chunk (zero
//! padding of the next transform stage) are clean after every remap.

mod chunk;
pub use chunk::*;

use crate::comm::{Communicator, Progress, RecvPart, SendPart};
use crate::par_slice;
use crate::topology::Topology;
use crate::util::Coord3;

/// Direction of a remap relative to how the `SwitchTopo` was built.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

const CLEAR_CHUNK: usize = 1 << 16;

pub struct SwitchTopo {
    topo_in: Topology,
    topo_out: Topology,
    send: Vec<MemChunk>,
    recv: Vec<MemChunk>,
    send_total: usize,
    recv_total: usize,
}

impl SwitchTopo {
    /// Builds the remap `topo_in -> topo_out`, where global index `g` of
    /// the input maps to `g + shift` in the output. Both topologies must
    /// agree on the real/complex interpretation.
    pub fn new(topo_in: &Topology, topo_out: &Topology, shift: [i64; 3]) -> Self {
        assert_eq!(
            topo_in.nf(),
            topo_out.nf(),
            "remapped topologies must both be real or both complex"
        );
        let shift = Coord3::from(shift);
        let send = send_chunks(topo_in, topo_out, shift);
        let recv = recv_chunks(topo_in, topo_out, shift);
        let send_total = send.iter().map(|c| c.len).sum();
        let recv_total = recv.iter().map(|c| c.len).sum();
        log::debug!(
            "switch axis {} -> {}: {} send / {} recv chunks",
            topo_in.axis(),
            topo_out.axis(),
            send.len(),
            recv.len()
        );
        SwitchTopo {
            topo_in: topo_in.clone(),
            topo_out: topo_out.clone(),
            send,
            recv,
            send_total,
            recv_total,
        }
    }

    /// Number of doubles each staging buffer must hold, in either
    /// direction.
    pub fn staging_size(&self) -> usize {
        self.send_total.max(self.recv_total)
    }

    pub fn topo_in(&self) -> &Topology {
        &self.topo_in
    }

    pub fn topo_out(&self) -> &Topology {
        &self.topo_out
    }

    /// Executes the remap in place on `data`. The backward direction swaps
    /// the roles of the send and receive chunk lists.
    pub fn execute<C: Communicator>(
        &self,
        comm: &C,
        data: &mut [f64],
        direction: Direction,
        progress: Progress,
        send_buf: &mut [f64],
        recv_buf: &mut [f64],
    ) {
        let (pack_list, pack_topo, unpack_list, unpack_topo) = match direction {
            Direction::Forward => (&self.send, &self.topo_in, &self.recv, &self.topo_out),
            Direction::Backward => (&self.recv, &self.topo_out, &self.send, &self.topo_in),
        };

        for chunk in pack_list {
            pack_chunk(pack_topo, chunk, data, &mut send_buf[chunk.offset..chunk.offset + chunk.len]);
        }

        let sends: Vec<SendPart<'_>> = pack_list
            .iter()
            .map(|c| SendPart {
                peer: c.peer,
                tag: c.tag,
                data: &send_buf[c.offset..c.offset + c.len],
            })
            .collect();

        let mut recvs = Vec::with_capacity(unpack_list.len());
        let mut rest = &mut recv_buf[..];
        for c in unpack_list {
            debug_assert!(rest.len() >= c.len);
            let (head, tail) = rest.split_at_mut(c.len);
            recvs.push(RecvPart {
                peer: c.peer,
                tag: c.tag,
                data: head,
            });
            rest = tail;
        }

        // everything to keep is packed by now; chunks never cover the
        // padded regions, so the destination extent is cleared first
        par_slice::set_value(&mut data[..unpack_topo.locmemsize()], 0.0, CLEAR_CHUNK);

        let src_axis = pack_topo.axis();
        comm.exchange(&sends, &mut recvs, progress, &mut |i, payload| {
            unpack_chunk(unpack_topo, src_axis, &unpack_list[i], payload, data);
        });
    }
}

/// Serializes a chunk into `buf`, iterating the block in the owning
/// topology's axis order so runs along the fast axis stay contiguous.
fn pack_chunk(topo: &Topology, chunk: &MemChunk, data: &[f64], buf: &mut [f64]) {
    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    let ax2 = (ax0 + 2) % 3;
    let row = chunk.shape[ax0] * topo.nf();
    let mut idx = 0;
    for i2 in 0..chunk.shape[ax2] {
        for i1 in 0..chunk.shape[ax1] {
            let src = topo.local_index_ao(
                chunk.start[ax0],
                chunk.start[ax1] + i1,
                chunk.start[ax2] + i2,
            );
            buf[idx..idx + row].copy_from_slice(&data[src..src + row]);
            idx += row;
        }
    }
}

/// Writes a received payload (serialized in the sender's axis order) into
/// the local array, permuting the fast axis when the two pencils differ.
fn unpack_chunk(
    topo: &Topology,
    src_axis: usize,
    chunk: &MemChunk,
    payload: &[f64],
    data: &mut [f64],
) {
    let s0 = src_axis;
    let s1 = (src_axis + 1) % 3;
    let s2 = (src_axis + 2) % 3;
    let nf = topo.nf();
    let mut idx = 0;
    if s0 == topo.axis() {
        // fast axes agree, rows stay contiguous
        let row = chunk.shape[s0] * nf;
        for i2 in 0..chunk.shape[s2] {
            for i1 in 0..chunk.shape[s1] {
                let dst = topo.local_index_ao(
                    chunk.start[s0],
                    chunk.start[s1] + i1,
                    chunk.start[s2] + i2,
                );
                data[dst..dst + row].copy_from_slice(&payload[idx..idx + row]);
                idx += row;
            }
        }
    } else {
        for i2 in 0..chunk.shape[s2] {
            for i1 in 0..chunk.shape[s1] {
                for i0 in 0..chunk.shape[s0] {
                    let mut c = chunk.start;
                    c[s0] += i0;
                    c[s1] += i1;
                    c[s2] += i2;
                    let dst = topo.local_index_dim(&c);
                    data[dst..dst + nf].copy_from_slice(&payload[idx..idx + nf]);
                    idx += nf;
                }
            }
        }
    }
}
