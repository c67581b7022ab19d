//! Axis-ordered indexing into padded pencil buffers.
//!
//! A pencil buffer stores its fast axis (`axis`) with stride 1; the two
//! remaining directions follow in cyclic order `axis + 1`, `axis + 2`
//! (mod 3). Memory extents `nmem` may exceed the local extents `nloc`
//! because the fast axis is padded for alignment.

/// Linear index of the element `(i0, i1, i2)` given in axis order: `i0`
/// runs along the fast axis, `i1` along `axis + 1`, `i2` along `axis + 2`.
/// The result is in doubles, `nf` doubles per element.
#[inline]
pub fn local_index_ao(
    i0: usize,
    i1: usize,
    i2: usize,
    axis: usize,
    nmem: &[usize; 3],
    nf: usize,
) -> usize {
    debug_assert!(axis < 3);
    let ax1 = (axis + 1) % 3;
    nf * (i0 + nmem[axis] * (i1 + nmem[ax1] * i2))
}

/// Linear index of an element addressed in natural dimension order.
#[inline]
pub fn local_index_dim(i: &[usize; 3], axis: usize, nmem: &[usize; 3], nf: usize) -> usize {
    let ax1 = (axis + 1) % 3;
    let ax2 = (axis + 2) % 3;
    nf * (i[axis] + nmem[axis] * (i[ax1] + nmem[ax1] * i[ax2]))
}

/// Total number of doubles covered by a padded extent.
#[inline]
pub fn memory_size(nmem: &[usize; 3], nf: usize) -> usize {
    nmem[0] * nmem[1] * nmem[2] * nf
}
