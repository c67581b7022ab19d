use crate::topology::Topology;
use crate::util::Coord3;

/// A contiguous 3D block exchanged between two pencil decompositions:
/// the intersection of one rank's region in the source topology with one
/// rank's region in the destination topology.
///
/// `start` and `shape` are local element coordinates in the topology the
/// chunk belongs to (natural dimension order); `offset` and `len` locate
/// the chunk's payload inside the staging buffer, in doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemChunk {
    pub peer: usize,
    pub tag: u16,
    pub start: [usize; 3],
    pub shape: [usize; 3],
    pub offset: usize,
    pub len: usize,
}

impl MemChunk {
    pub fn volume(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }
}

/// Chunks this rank must send when remapping `topo_in` to `topo_out`,
/// where global index `g` of the input lands at `g + shift` in the output.
/// Coordinates are local to `topo_in`; messages are tagged with the
/// sender's rank.
pub fn send_chunks(topo_in: &Topology, topo_out: &Topology, shift: Coord3) -> Vec<MemChunk> {
    debug_assert_eq!(topo_in.nf(), topo_out.nf());
    let my_box = topo_in.owned_box().shifted(shift);
    let istart = topo_in.istart_glob();
    let nf = topo_in.nf();
    let tag = topo_in.rank() as u16;

    let mut chunks = Vec::new();
    let mut offset = 0;
    for peer in 0..topo_out.comm_size() {
        let inter = my_box.intersection(&topo_out.rank_box(peer));
        if inter.is_empty() {
            continue;
        }
        let lo = inter.lo();
        let ext = inter.extent();
        let mut start = [0; 3];
        let mut shape = [0; 3];
        for d in 0..3 {
            start[d] = (lo[d] - shift[d]) as usize - istart[d];
            shape[d] = ext[d] as usize;
        }
        let len = inter.volume() * nf;
        chunks.push(MemChunk {
            peer,
            tag,
            start,
            shape,
            offset,
            len,
        });
        offset += len;
    }
    chunks
}

/// The mirror of [`send_chunks`]: chunks this rank receives, in `topo_out`
/// local coordinates, tagged with the sending rank.
pub fn recv_chunks(topo_in: &Topology, topo_out: &Topology, shift: Coord3) -> Vec<MemChunk> {
    debug_assert_eq!(topo_in.nf(), topo_out.nf());
    let my_box = topo_out.owned_box();
    let istart = topo_out.istart_glob();
    let nf = topo_out.nf();

    let mut chunks = Vec::new();
    let mut offset = 0;
    for peer in 0..topo_in.comm_size() {
        let inter = topo_in.rank_box(peer).shifted(shift).intersection(&my_box);
        if inter.is_empty() {
            continue;
        }
        let lo = inter.lo();
        let ext = inter.extent();
        let mut start = [0; 3];
        let mut shape = [0; 3];
        for d in 0..3 {
            start[d] = lo[d] as usize - istart[d];
            shape[d] = ext[d] as usize;
        }
        let len = inter.volume() * nf;
        chunks.push(MemChunk {
            peer,
            tag: peer as u16,
            start,
            shape,
            offset,
            len,
        });
        offset += len;
    }
    chunks
}
