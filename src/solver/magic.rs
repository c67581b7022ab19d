//! The spectral convolution: element-wise product of the transformed
//! right-hand side with the transformed kernel, scaled by the
//! normalization factor and by the residual factor of `i` accumulated by
//! the sine transforms of the pipeline.
//!
//! The field and the kernel live in distinct topologies (the kernel may
//! carry an extra ignored mode along the fast axis and pads differently),
//! so rows are paired through their own index arithmetic and the product
//! runs row by row, parallelized over the outermost direction.

use rayon::prelude::*;

use crate::topology::Topology;
use crate::util::sym_wavenumber;

/// Wave-number description of the final spectral representation, per
/// direction: `k_d = (fold(i_d) + koffset_d) * kfact_d`.
#[derive(Debug, Clone, Default)]
pub struct SpectralInfo {
    pub kfact: [f64; 3],
    pub koffset: [f64; 3],
    pub symstart: [f64; 3],
}

impl SpectralInfo {
    #[inline]
    fn k(&self, ie: &[i64; 3]) -> [f64; 3] {
        let mut k = [0.0; 3];
        for d in 0..3 {
            k[d] = (sym_wavenumber(ie[d], self.symstart[d]) + self.koffset[d]) * self.kfact[d];
        }
        k
    }
}

#[inline]
fn slab_len(topo: &Topology) -> usize {
    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    topo.nmem()[ax0] * topo.nmem()[ax1] * topo.nf()
}

/// Real-real convolution, only reachable when every direction stays real.
pub fn convolve_real(
    data: &mut [f64],
    green: &[f64],
    topo: &Topology,
    topo_green: &Topology,
    normfact: f64,
) {
    debug_assert_eq!(topo.axis(), topo_green.axis());
    debug_assert!(!topo.is_complex() && !topo_green.is_complex());
    let ax0 = topo.axis();
    let n0 = topo.nloc()[ax0];
    let n1 = topo.nloc()[(ax0 + 1) % 3];
    let n2 = topo.nloc()[(ax0 + 2) % 3];
    data.par_chunks_mut(slab_len(topo))
        .take(n2)
        .enumerate()
        .for_each(|(i2, slab)| {
            for i1 in 0..n1 {
                let row = topo.local_index_ao(0, i1, 0);
                let grow = topo_green.local_index_ao(0, i1, i2);
                let g = &green[grow..grow + n0];
                for (d, gv) in slab[row..row + n0].iter_mut().zip(g) {
                    *d *= normfact * gv;
                }
            }
        });
}

/// Complex-complex convolution with the residual `i` factor folded in:
/// `nbr_imult mod 4` selects a multiplication by `1`, `-i`, `-1` or `+i`.
pub fn convolve_complex(
    data: &mut [f64],
    green: &[f64],
    topo: &Topology,
    topo_green: &Topology,
    normfact: f64,
    nbr_imult: i32,
) {
    debug_assert_eq!(topo.axis(), topo_green.axis());
    debug_assert!(topo.is_complex() && topo_green.is_complex());
    let ax0 = topo.axis();
    let n0 = topo.nloc()[ax0];
    let n1 = topo.nloc()[(ax0 + 1) % 3];
    let n2 = topo.nloc()[(ax0 + 2) % 3];
    let nmult = nbr_imult.rem_euclid(4);
    data.par_chunks_mut(slab_len(topo))
        .take(n2)
        .enumerate()
        .for_each(|(i2, slab)| {
            for i1 in 0..n1 {
                let row = topo.local_index_ao(0, i1, 0);
                let grow = topo_green.local_index_ao(0, i1, i2);
                let d = &mut slab[row..row + 2 * n0];
                let g = &green[grow..grow + 2 * n0];
                match nmult {
                    0 => row_nmult0(d, g, normfact),
                    1 => row_nmult1(d, g, normfact),
                    2 => row_nmult2(d, g, normfact),
                    3 => row_nmult3(d, g, normfact),
                    _ => unreachable!(),
                }
            }
        });
}

#[inline]
fn product(d: &[f64], g: &[f64]) -> (f64, f64) {
    let (a, b) = (d[0], d[1]);
    let (c, e) = (g[0], g[1]);
    (a * c - b * e, a * e + b * c)
}

fn row_nmult0(d: &mut [f64], g: &[f64], normfact: f64) {
    for (dv, gv) in d.chunks_exact_mut(2).zip(g.chunks_exact(2)) {
        let (re, im) = product(dv, gv);
        dv[0] = normfact * re;
        dv[1] = normfact * im;
    }
}

/// Multiply by `-i`: `(re + i im)(-i) = im - i re`.
fn row_nmult1(d: &mut [f64], g: &[f64], normfact: f64) {
    for (dv, gv) in d.chunks_exact_mut(2).zip(g.chunks_exact(2)) {
        let (re, im) = product(dv, gv);
        dv[0] = normfact * im;
        dv[1] = -normfact * re;
    }
}

/// Multiply by `-1`.
fn row_nmult2(d: &mut [f64], g: &[f64], normfact: f64) {
    for (dv, gv) in d.chunks_exact_mut(2).zip(g.chunks_exact(2)) {
        let (re, im) = product(dv, gv);
        dv[0] = -normfact * re;
        dv[1] = -normfact * im;
    }
}

/// Multiply by `+i`: `(re + i im)(i) = -im + i re`.
fn row_nmult3(d: &mut [f64], g: &[f64], normfact: f64) {
    for (dv, gv) in d.chunks_exact_mut(2).zip(g.chunks_exact(2)) {
        let (re, im) = product(dv, gv);
        dv[0] = -normfact * im;
        dv[1] = normfact * re;
    }
}

/// Spectral divergence: component 0 receives
/// `normfact * G(k) * i k . (f0, f1, f2)`.
pub fn convolve_div(
    data: &mut [f64],
    stride: usize,
    green: &[f64],
    topo: &Topology,
    topo_green: &Topology,
    normfact: f64,
    info: &SpectralInfo,
) {
    debug_assert!(topo.is_complex() && topo_green.is_complex());
    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    let ax2 = (ax0 + 2) % 3;
    let n0 = topo.nloc()[ax0];
    let n1 = topo.nloc()[ax1];
    let n2 = topo.nloc()[ax2];
    let istart = topo.istart_glob();

    let (b0, rest) = data.split_at_mut(stride);
    // components 1 and 2 are only read
    let b1 = &rest[..stride];
    let b2 = &rest[stride..2 * stride];
    let slab = slab_len(topo);
    b0.par_chunks_mut(slab)
        .take(n2)
        .enumerate()
        .for_each(|(i2, s0)| {
            for i1 in 0..n1 {
                let row = topo.local_index_ao(0, i1, 0);
                let abs_row = topo.local_index_ao(0, i1, i2);
                let grow = topo_green.local_index_ao(0, i1, i2);
                for i0 in 0..n0 {
                    let mut ie = [0i64; 3];
                    ie[ax0] = (istart[ax0] + i0) as i64;
                    ie[ax1] = (istart[ax1] + i1) as i64;
                    ie[ax2] = (istart[ax2] + i2) as i64;
                    let k = info.k(&ie);
                    let f = [
                        (s0[row + 2 * i0], s0[row + 2 * i0 + 1]),
                        (b1[abs_row + 2 * i0], b1[abs_row + 2 * i0 + 1]),
                        (b2[abs_row + 2 * i0], b2[abs_row + 2 * i0 + 1]),
                    ];
                    // i k . f
                    let mut div = (0.0, 0.0);
                    for d in 0..3 {
                        div.0 -= k[d] * f[d].1;
                        div.1 += k[d] * f[d].0;
                    }
                    let g = (green[grow + 2 * i0], green[grow + 2 * i0 + 1]);
                    s0[row + 2 * i0] = normfact * (div.0 * g.0 - div.1 * g.1);
                    s0[row + 2 * i0 + 1] = normfact * (div.0 * g.1 + div.1 * g.0);
                }
            }
        });
}

/// Spectral curl: each component receives
/// `normfact * G(k) * (i k x (f0, f1, f2))_c`.
pub fn convolve_rot(
    data: &mut [f64],
    stride: usize,
    green: &[f64],
    topo: &Topology,
    topo_green: &Topology,
    normfact: f64,
    info: &SpectralInfo,
) {
    debug_assert!(topo.is_complex() && topo_green.is_complex());
    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    let ax2 = (ax0 + 2) % 3;
    let n0 = topo.nloc()[ax0];
    let n1 = topo.nloc()[ax1];
    let n2 = topo.nloc()[ax2];
    let istart = topo.istart_glob();

    let (b0, rest) = data.split_at_mut(stride);
    let (b1, b2) = rest.split_at_mut(stride);
    let slab = slab_len(topo);
    b0.par_chunks_mut(slab)
        .zip(b1.par_chunks_mut(slab))
        .zip(b2.par_chunks_mut(slab))
        .take(n2)
        .enumerate()
        .for_each(|(i2, ((s0, s1), s2))| {
            for i1 in 0..n1 {
                let row = topo.local_index_ao(0, i1, 0);
                let grow = topo_green.local_index_ao(0, i1, i2);
                for i0 in 0..n0 {
                    let mut ie = [0i64; 3];
                    ie[ax0] = (istart[ax0] + i0) as i64;
                    ie[ax1] = (istart[ax1] + i1) as i64;
                    ie[ax2] = (istart[ax2] + i2) as i64;
                    let k = info.k(&ie);
                    let f = [
                        (s0[row + 2 * i0], s0[row + 2 * i0 + 1]),
                        (s1[row + 2 * i0], s1[row + 2 * i0 + 1]),
                        (s2[row + 2 * i0], s2[row + 2 * i0 + 1]),
                    ];
                    let g = (green[grow + 2 * i0], green[grow + 2 * i0 + 1]);
                    let slabs = [&mut *s0, &mut *s1, &mut *s2];
                    for (c, slab_c) in slabs.into_iter().enumerate() {
                        let cu = (c + 1) % 3;
                        let cv = (c + 2) % 3;
                        // (i k x f)_c = i k_cu f_cv - i k_cv f_cu
                        let curl = (
                            -k[cu] * f[cv].1 + k[cv] * f[cu].1,
                            k[cu] * f[cv].0 - k[cv] * f[cu].0,
                        );
                        slab_c[row + 2 * i0] = normfact * (curl.0 * g.0 - curl.1 * g.1);
                        slab_c[row + 2 * i0 + 1] = normfact * (curl.0 * g.1 + curl.1 * g.0);
                    }
                }
            }
        });
}
