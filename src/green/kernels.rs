//! The four kernel fills.
//!
//! Reflection convention: a global index past the reflection center folds
//! back as `|2 symstart - i|` on a spatial direction (clamped away from
//! zero so the real-to-complex slack cells never divide by zero) and as
//! `-2 symstart + i` on a spectral direction, which keeps the sign of the
//! wave number. The true origin is overwritten with the analytic limit
//! afterwards.

use crate::error::{Result, SolverError};
use crate::green::{lgf_fill, GreenParams, GreenType, C_1O2PI, C_1O4PI, C_1OPI, C_1OSQRT2, C_1OSQRTPI};
use crate::topology::Topology;
use crate::util::special::{bessel_k0, bessel_k1};
use crate::util::{sym_coordinate, sym_wavenumber};

use statrs::function::erf::erf;
use std::f64::consts::{PI, SQRT_2};

/// Symmetrized position and wave number of one grid point. Every
/// direction contributes to exactly one of the two radii.
#[inline]
pub(crate) fn point_radii(
    ie: &[i64; 3],
    params: &GreenParams,
) -> (f64, f64) {
    let mut r2 = 0.0;
    let mut k2 = 0.0;
    for d in 0..3 {
        if params.kfact[d] != 0.0 {
            let k = (sym_wavenumber(ie[d], params.symstart[d]) + params.koffset[d])
                * params.kfact[d];
            k2 += k * k;
        } else {
            let x = sym_coordinate(ie[d], params.symstart[d]) * params.hfact[d];
            r2 += x * x;
        }
    }
    (r2.sqrt(), k2.sqrt())
}

fn for_each_point(
    topo: &Topology,
    mut f: impl FnMut(&[i64; 3]) -> f64,
    green: &mut [f64],
) {
    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    let ax2 = (ax0 + 2) % 3;
    let nloc = *topo.nloc();
    let istart = topo.istart_glob();
    let nf = topo.nf();
    for i2 in 0..nloc[ax2] {
        for i1 in 0..nloc[ax1] {
            for i0 in 0..nloc[ax0] {
                let mut ie = [0i64; 3];
                ie[ax0] = (istart[ax0] + i0) as i64;
                ie[ax1] = (istart[ax1] + i1) as i64;
                ie[ax2] = (istart[ax2] + i2) as i64;
                let id = topo.local_index_ao(i0, i1, i2);
                green[id] = f(&ie);
                if nf == 2 {
                    green[id + 1] = 0.0;
                }
            }
        }
    }
}

/// Three unbounded directions: the kernel is filled in physical space.
pub fn three_dir_unbounded(
    topo: &Topology,
    params: &GreenParams,
    green_type: GreenType,
    alpha: f64,
    h: &[f64; 3],
    green: &mut [f64],
) -> Result<()> {
    debug_assert!(!topo.is_complex());
    if green_type == GreenType::Lgf2 {
        return lgf_fill(topo, params, h, green);
    }

    let eps = alpha * h[0];
    // closed-form value at the origin, where the kernel itself is singular
    let g0 = match green_type {
        GreenType::Chat2 => 0.5 * (1.5 * C_1O2PI * h[0] * h[1] * h[2]).powf(2.0 / 3.0),
        GreenType::Hej2 => SQRT_2 / (4.0 * eps * (PI * PI * PI).sqrt()),
        GreenType::Hej4 => 3.0 * SQRT_2 / (8.0 * eps * (PI * PI * PI).sqrt()),
        GreenType::Hej6 => 15.0 * SQRT_2 / (32.0 * eps * (PI * PI * PI).sqrt()),
        GreenType::Lgf2 => unreachable!(),
    };
    let kernel = |r: f64| -> f64 {
        match green_type {
            GreenType::Chat2 => C_1O4PI / r,
            GreenType::Hej2 => C_1O4PI / r * erf(r / eps * C_1OSQRT2),
            GreenType::Hej4 => {
                let rho = r / eps;
                C_1O4PI / r
                    * (C_1OSQRT2 * C_1OSQRTPI * rho * (-rho * rho * 0.5).exp()
                        + erf(rho * C_1OSQRT2))
            }
            GreenType::Hej6 => {
                let rho = r / eps;
                C_1O4PI / r
                    * (C_1OSQRT2
                        * C_1OSQRTPI
                        * (1.75 * rho - 0.25 * rho.powi(3))
                        * (-rho * rho * 0.5).exp()
                        + erf(rho * C_1OSQRT2))
            }
            GreenType::Lgf2 => unreachable!(),
        }
    };

    for_each_point(
        topo,
        |ie| {
            let (r, _) = point_radii(ie, params);
            -kernel(r)
        },
        green,
    );

    if topo.istart_glob() == [0, 0, 0] {
        green[0] = -g0;
    }
    Ok(())
}

/// Two unbounded directions, one spectral: per spectral mode `k`, a 2D
/// free-space kernel `-K0(k r)/(2 pi)`, with the logarithmic kernel on the
/// zero mode and an equivalent-radius regularization on the `r = 0` line.
pub fn two_dir_unbounded(
    topo: &Topology,
    params: &GreenParams,
    green_type: GreenType,
    green: &mut [f64],
) -> Result<()> {
    if green_type != GreenType::Chat2 {
        return Err(SolverError::Unsupported(format!(
            "{green_type:?} kernel with one spectral direction"
        )));
    }
    let h2: f64 = params.hfact.iter().filter(|&&h| h != 0.0).product();
    let r_eq = C_1OSQRTPI * h2.sqrt();

    for_each_point(
        topo,
        |ie| {
            let (r, k) = point_radii(ie, params);
            if r == 0.0 {
                if k == 0.0 {
                    0.25 * C_1O2PI * (PI - 6.0 + 2.0 * (0.5 * PI * r_eq).ln())
                } else {
                    let kr = k * r_eq;
                    -(1.0 - kr * bessel_k1(kr)) * C_1OPI / (kr * kr)
                }
            } else if k == 0.0 {
                C_1O2PI * r.ln()
            } else {
                -C_1O2PI * bessel_k0(k * r)
            }
        },
        green,
    );
    Ok(())
}

/// One unbounded direction, two spectral: `-exp(-k |x|) / (2k)`, with the
/// tent kernel `|x| / 2` on the zero mode.
pub fn one_dir_unbounded(
    topo: &Topology,
    params: &GreenParams,
    green_type: GreenType,
    green: &mut [f64],
) -> Result<()> {
    if green_type != GreenType::Chat2 {
        return Err(SolverError::Unsupported(format!(
            "{green_type:?} kernel with two spectral directions"
        )));
    }
    for_each_point(
        topo,
        |ie| {
            let (x, k) = point_radii(ie, params);
            if k == 0.0 {
                0.5 * x
            } else {
                -0.5 * (-k * x).exp() / k
            }
        },
        green,
    );
    Ok(())
}

/// Fully spectral: `-1/k^2`, with the zero mode killed by convention.
pub fn zero_dir_unbounded(topo: &Topology, params: &GreenParams, green: &mut [f64]) -> Result<()> {
    for_each_point(
        topo,
        |ie| {
            let (_, k) = point_radii(ie, params);
            let ksqr = k * k;
            if ksqr == 0.0 {
                0.0
            } else {
                -1.0 / ksqr
            }
        },
        green,
    );
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::util::ALIGNMENT;

    fn topo(axis: usize, nglob: [usize; 3], is_complex: bool) -> Topology {
        Topology::new(axis, nglob, [1, 1, 1], is_complex, None, ALIGNMENT, 0, 1).unwrap()
    }

    #[test]
    fn fully_spectral_kernel_values() {
        let t = topo(0, [4, 4, 4], false);
        let params = GreenParams {
            kfact: [1.0, 1.0, 1.0],
            symstart: [2.0, 2.0, 2.0],
            ..Default::default()
        };
        let mut green = vec![0.0; t.locmemsize()];
        zero_dir_unbounded(&t, &params, &mut green).unwrap();
        // zero mode is killed
        assert_eq!(green[t.local_index_ao(0, 0, 0)], 0.0);
        // plain mode
        assert_approx_eq!(f64, green[t.local_index_ao(1, 0, 0)], -1.0, epsilon = 1e-15);
        // mode 3 reflects to -1
        assert_approx_eq!(f64, green[t.local_index_ao(3, 0, 0)], -1.0, epsilon = 1e-15);
        assert_approx_eq!(
            f64,
            green[t.local_index_ao(1, 2, 0)],
            -1.0 / 5.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn unbounded_kernel_reflects_around_the_mirror() {
        // doubled 8-point domain: the kernel at index 5 matches index 3
        let t = topo(0, [8, 8, 8], false);
        let h = [0.1; 3];
        let params = GreenParams {
            hfact: h,
            symstart: [4.0, 4.0, 4.0],
            ..Default::default()
        };
        let mut green = vec![0.0; t.locmemsize()];
        three_dir_unbounded(&t, &params, GreenType::Chat2, 2.0, &h, &mut green).unwrap();
        assert_eq!(
            green[t.local_index_ao(5, 1, 2)],
            green[t.local_index_ao(3, 1, 2)]
        );
        // plain 1/(4 pi r) away from the origin
        let r = 0.1 * ((1 + 4 + 4) as f64).sqrt();
        assert_approx_eq!(
            f64,
            green[t.local_index_ao(1, 2, 2)],
            -C_1O4PI / r,
            epsilon = 1e-15
        );
        // origin carries the quadrature limit
        let g0 = 0.5 * (1.5 * C_1O2PI * 0.001).powf(2.0 / 3.0);
        assert_approx_eq!(f64, green[0], -g0, epsilon = 1e-15);
    }

    #[test]
    fn regularized_kernel_matches_chat2_far_away() {
        let t = topo(0, [16, 16, 16], false);
        let h = [0.05; 3];
        let params = GreenParams {
            hfact: h,
            symstart: [8.0, 8.0, 8.0],
            ..Default::default()
        };
        let mut chat = vec![0.0; t.locmemsize()];
        let mut hej = vec![0.0; t.locmemsize()];
        three_dir_unbounded(&t, &params, GreenType::Chat2, 2.0, &h, &mut chat).unwrap();
        three_dir_unbounded(&t, &params, GreenType::Hej2, 2.0, &h, &mut hej).unwrap();
        // erf saturates a few regularization lengths out
        let id = t.local_index_ao(7, 7, 7);
        assert_approx_eq!(f64, chat[id], hej[id], epsilon = 1e-9);
    }

    #[test]
    fn two_dir_kernel_zero_mode_is_logarithmic() {
        // axis 0 spectral, directions 1 and 2 unbounded
        let t = topo(0, [4, 8, 8], false);
        let params = GreenParams {
            hfact: [0.0, 0.1, 0.1],
            kfact: [1.0, 0.0, 0.0],
            symstart: [2.0, 4.0, 4.0],
            ..Default::default()
        };
        let mut green = vec![0.0; t.locmemsize()];
        two_dir_unbounded(&t, &params, GreenType::Chat2, &mut green).unwrap();
        let r = 0.1 * ((9 + 4) as f64).sqrt();
        assert_approx_eq!(
            f64,
            green[t.local_index_ao(0, 3, 2)],
            C_1O2PI * r.ln(),
            epsilon = 1e-15
        );
        assert_approx_eq!(
            f64,
            green[t.local_index_ao(1, 3, 2)],
            -C_1O2PI * bessel_k0(r),
            epsilon = 1e-15
        );
    }

    #[test]
    fn spectral_configurations_reject_regularized_kernels() {
        let t = topo(0, [4, 8, 8], false);
        let params = GreenParams {
            hfact: [0.0, 0.1, 0.1],
            kfact: [1.0, 0.0, 0.0],
            symstart: [2.0, 4.0, 4.0],
            ..Default::default()
        };
        let mut green = vec![0.0; t.locmemsize()];
        assert!(crate::green::fill_green(
            &t,
            &params,
            GreenType::Hej4,
            2.0,
            &[0.1; 3],
            &mut green
        )
        .is_err());
    }
}
