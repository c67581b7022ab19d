use crate::error::{Result, SolverError};
use crate::util::indexing::{local_index_ao, local_index_dim, memory_size};
use crate::util::{pad_to_alignment, Coord3, IndexBox};

/// One pencil decomposition of a 3D Cartesian grid.
///
/// `axis` is the fast (memory-contiguous) direction. `nf` distinguishes a
/// real interpretation (1 double per element) from an interleaved complex
/// one (2 doubles per element); switching between the two reinterprets the
/// byte extent along the fast axis without moving data. The struct carries
/// no communicator handle: the owning rank and the communicator size are
/// frozen in at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    axis: usize,
    nglob: [usize; 3],
    nproc: [usize; 3],
    axproc: [usize; 3],
    nf: usize,
    alignment: usize,
    rank: usize,
    comm_size: usize,
    rankd: [usize; 3],
    nbyproc: [usize; 3],
    nloc: [usize; 3],
    nmem: [usize; 3],
}

impl Topology {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        axis: usize,
        nglob: [usize; 3],
        nproc: [usize; 3],
        is_complex: bool,
        axproc: Option<[usize; 3]>,
        alignment: usize,
        rank: usize,
        comm_size: usize,
    ) -> Result<Self> {
        if nproc[0] * nproc[1] * nproc[2] != comm_size {
            return Err(SolverError::ProcGrid { nproc, comm_size });
        }
        let nf = if is_complex { 2 } else { 1 };
        let unit = nf * std::mem::size_of::<f64>();
        if alignment % unit != 0 {
            return Err(SolverError::Alignment { alignment, unit });
        }
        let axproc = axproc.unwrap_or([0, 1, 2]);
        let rankd = rank_split(rank, &axproc, &nproc);

        let mut topo = Topology {
            axis,
            nglob,
            nproc,
            axproc,
            nf,
            alignment,
            rank,
            comm_size,
            rankd,
            nbyproc: [0; 3],
            nloc: [0; 3],
            nmem: [0; 3],
        };
        topo.fill_sizes();
        log::debug!(
            "topology axis={} nf={} nglob={:?} nloc={:?} nmem={:?}",
            topo.axis,
            topo.nf,
            topo.nglob,
            topo.nloc,
            topo.nmem
        );
        Ok(topo)
    }

    fn fill_sizes(&mut self) {
        for d in 0..3 {
            self.nbyproc[d] = self.nglob[d] / self.nproc[d];
            self.nloc[d] = local_extent(self.nglob[d], self.nproc[d], self.rankd[d]);
            self.nmem[d] = self.nloc[d];
            if d == self.axis {
                // every pencil must start on an alignment boundary
                self.nmem[d] = pad_to_alignment(self.nloc[d], self.nf);
            }
        }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn nglob(&self) -> &[usize; 3] {
        &self.nglob
    }

    pub fn nproc(&self) -> &[usize; 3] {
        &self.nproc
    }

    pub fn nloc(&self) -> &[usize; 3] {
        &self.nloc
    }

    pub fn nmem(&self) -> &[usize; 3] {
        &self.nmem
    }

    pub fn nf(&self) -> usize {
        self.nf
    }

    pub fn is_complex(&self) -> bool {
        self.nf == 2
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn comm_size(&self) -> usize {
        self.comm_size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Global index of this rank's first element, per direction.
    pub fn istart_glob(&self) -> [usize; 3] {
        let mut istart = [0; 3];
        for d in 0..3 {
            istart[d] = self.rankd[d] * self.nbyproc[d];
        }
        istart
    }

    /// Number of locally owned elements.
    pub fn locsize(&self) -> usize {
        self.nloc[0] * self.nloc[1] * self.nloc[2]
    }

    /// Number of doubles of local storage, padding included.
    pub fn locmemsize(&self) -> usize {
        memory_size(&self.nmem, self.nf)
    }

    /// Reinterprets pairs of doubles along the fast axis as complex
    /// elements. The byte extent of the topology is unchanged.
    pub fn switch_to_complex(&mut self) {
        if self.nf == 2 {
            return;
        }
        debug_assert!(self.nglob[self.axis] % 2 == 0);
        debug_assert!(self.nloc[self.axis] % 2 == 0 && self.nmem[self.axis] % 2 == 0);
        self.nf = 2;
        let ax = self.axis;
        self.nglob[ax] /= 2;
        self.nbyproc[ax] /= 2;
        self.nloc[ax] /= 2;
        self.nmem[ax] /= 2;
    }

    /// Reinterprets complex elements along the fast axis as pairs of
    /// doubles. The byte extent of the topology is unchanged.
    pub fn switch_to_real(&mut self) {
        if self.nf == 1 {
            return;
        }
        self.nf = 1;
        let ax = self.axis;
        self.nglob[ax] *= 2;
        self.nbyproc[ax] *= 2;
        self.nloc[ax] *= 2;
        self.nmem[ax] *= 2;
    }

    /// The half-open global index box owned by this rank.
    pub fn owned_box(&self) -> IndexBox {
        self.rank_box(self.rank)
    }

    /// The half-open global index box owned by an arbitrary rank.
    pub fn rank_box(&self, rank: usize) -> IndexBox {
        debug_assert!(rank < self.comm_size);
        let rankd = rank_split(rank, &self.axproc, &self.nproc);
        let mut lo = Coord3::zeros();
        let mut hi = Coord3::zeros();
        for d in 0..3 {
            lo[d] = (rankd[d] * self.nbyproc[d]) as i64;
            hi[d] = lo[d] + local_extent(self.nglob[d], self.nproc[d], rankd[d]) as i64;
        }
        IndexBox::new(lo, hi)
    }

    /// Memory index (in doubles) of the element `(i0, i1, i2)` given in
    /// axis order.
    #[inline]
    pub fn local_index_ao(&self, i0: usize, i1: usize, i2: usize) -> usize {
        local_index_ao(i0, i1, i2, self.axis, &self.nmem, self.nf)
    }

    /// Memory index (in doubles) of an element addressed in natural
    /// dimension order.
    #[inline]
    pub fn local_index_dim(&self, i: &[usize; 3]) -> usize {
        local_index_dim(i, self.axis, &self.nmem, self.nf)
    }
}

/// Extent owned along one direction by the rank at coordinate `rd`: the
/// floor split everywhere, with the last rank absorbing the remainder.
fn local_extent(nglob: usize, nproc: usize, rd: usize) -> usize {
    let nbyproc = nglob / nproc;
    if rd < nproc - 1 {
        nbyproc
    } else {
        nbyproc.max(nglob - nbyproc * rd)
    }
}

/// Splits a linear rank into grid coordinates, consuming directions in the
/// order given by `axproc`.
pub fn rank_split(rank: usize, axproc: &[usize; 3], nproc: &[usize; 3]) -> [usize; 3] {
    let mut r = rank;
    let mut rankd = [0; 3];
    for &d in axproc {
        rankd[d] = r % nproc[d];
        r /= nproc[d];
    }
    rankd
}

/// Inverse of [`rank_split`].
pub fn rank_index(rankd: &[usize; 3], axproc: &[usize; 3], nproc: &[usize; 3]) -> usize {
    let mut rank = 0;
    for &d in axproc.iter().rev() {
        rank = rank * nproc[d] + rankd[d];
    }
    rank
}
