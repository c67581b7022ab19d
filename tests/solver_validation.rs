use fftw::array::AlignedVec;
use std::f64::consts::PI;

use pups::comm::LocalComm;
use pups::fft_plan::BoundaryType::{self, *};
use pups::solver::{Solver, SolverType};
use pups::topology::Topology;
use pups::util::special::expint_e1;
use pups::util::ALIGNMENT;
use pups::{GreenType, PlanFlag};

fn build_solver(bc: [[BoundaryType; 2]; 3], n: usize, lda: usize) -> (Solver<LocalComm>, Topology) {
    let h = 1.0 / n as f64;
    let topo = Topology::new(0, [n; 3], [1; 3], false, None, ALIGNMENT, 0, 1).unwrap();
    let mut s = Solver::new(&topo, bc, [h; 3], [1.0; 3], lda, LocalComm).unwrap();
    s.set_plan_flag(PlanFlag::Estimate).unwrap();
    s.setup(false).unwrap();
    (s, topo)
}

fn fill(topo: &Topology, buf: &mut [f64], f: impl Fn(usize, usize, usize) -> f64) {
    let n = topo.nloc();
    for i2 in 0..n[2] {
        for i1 in 0..n[1] {
            for i0 in 0..n[0] {
                buf[topo.local_index_ao(i0, i1, i2)] = f(i0, i1, i2);
            }
        }
    }
}

fn max_abs_diff(topo: &Topology, a: &[f64], b: impl Fn(usize, usize, usize) -> f64) -> (f64, f64) {
    let n = topo.nloc();
    let mut max_err: f64 = 0.0;
    let mut max_ref: f64 = 0.0;
    for i2 in 0..n[2] {
        for i1 in 0..n[1] {
            for i0 in 0..n[0] {
                let r = b(i0, i1, i2);
                max_ref = max_ref.max(r.abs());
                max_err = max_err.max((a[topo.local_index_ao(i0, i1, i2)] - r).abs());
            }
        }
    }
    (max_err, max_ref)
}

#[test]
fn periodic_sine_is_solved_to_machine_precision() {
    let n = 32;
    let m = 2.0;
    let (mut s, topo) = build_solver([[Per, Per], [Per, Per], [Per, Per]], n, 1);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(len);
    let mut field = AlignedVec::new(len);
    fill(&topo, &mut rhs, |i0, _, _| {
        (2.0 * PI * m * i0 as f64 / n as f64).sin()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

    let k = 2.0 * PI * m;
    let (max_err, _) = max_abs_diff(&topo, &field, |i0, _, _| {
        -(2.0 * PI * m * i0 as f64 / n as f64).sin() / (k * k)
    });
    assert!(max_err < 1e-12, "max error {max_err}");
}

/// Free-space solve of a normalized Gaussian against
/// `-erf(r / (sigma sqrt(2))) / (4 pi r)`, at two resolutions.
#[test]
fn unbounded_gaussian_converges_to_the_erf_solution() {
    let sigma: f64 = 0.06;
    let center = 0.5;
    let mut errors = Vec::new();
    for n in [32usize, 64] {
        let h = 1.0 / n as f64;
        let (mut s, topo) = build_solver([[Unb, Unb], [Unb, Unb], [Unb, Unb]], n, 1);
        let len = s.field_memsize();
        let mut rhs = AlignedVec::new(len);
        let mut field = AlignedVec::new(len);
        let norm = 1.0 / (sigma.powi(3) * (2.0 * PI).powf(1.5));
        fill(&topo, &mut rhs, |i0, i1, i2| {
            let r2 = [i0, i1, i2]
                .iter()
                .map(|&i| (i as f64 * h - center).powi(2))
                .sum::<f64>();
            norm * (-r2 / (2.0 * sigma * sigma)).exp()
        });
        s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

        let reference = |i0: usize, i1: usize, i2: usize| {
            let r = [i0, i1, i2]
                .iter()
                .map(|&i| (i as f64 * h - center).powi(2))
                .sum::<f64>()
                .sqrt();
            if r < 1e-12 {
                // limit of erf(x)/x at zero
                -(2.0 / PI.sqrt()) / (sigma * 2.0f64.sqrt()) / (4.0 * PI)
            } else {
                -statrs_erf(r / (sigma * 2.0f64.sqrt())) / (4.0 * PI * r)
            }
        };
        let (max_err, max_ref) = max_abs_diff(&topo, &field, reference);
        errors.push(max_err / max_ref);
    }
    assert!(
        errors[1] < 0.05,
        "relative error at the finer resolution: {}",
        errors[1]
    );
    assert!(
        errors[1] < 0.6 * errors[0],
        "no convergence: {} -> {}",
        errors[0],
        errors[1]
    );
}

fn statrs_erf(x: f64) -> f64 {
    statrs::function::erf::erf(x)
}

/// The discrete free-space convolution is exact: the transform pipeline
/// must reproduce the direct summation with the same kernel samples.
#[test]
fn unbounded_solve_matches_direct_summation() {
    let n = 8usize;
    let h = 1.0 / n as f64;
    let sigma = 0.2;
    let (mut s, topo) = build_solver([[Unb, Unb], [Unb, Unb], [Unb, Unb]], n, 1);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(len);
    let mut field = AlignedVec::new(len);
    fill(&topo, &mut rhs, |i0, i1, i2| {
        let r2 = [i0, i1, i2]
            .iter()
            .map(|&i| (i as f64 * h - 0.5).powi(2))
            .sum::<f64>();
        (-r2 / (2.0 * sigma * sigma)).exp()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

    // -1/(4 pi r) kernel, quadrature value at the origin, volume weight h^3
    let g0 = 0.5 * (1.5 * h * h * h / (2.0 * PI)).powf(2.0 / 3.0);
    let kernel = |d: [i64; 3]| -> f64 {
        if d == [0, 0, 0] {
            -g0
        } else {
            let r = d.iter().map(|&v| (v as f64 * h).powi(2)).sum::<f64>().sqrt();
            -1.0 / (4.0 * PI * r)
        }
    };
    let mut max_err: f64 = 0.0;
    let mut max_ref: f64 = 0.0;
    for j2 in 0..n {
        for j1 in 0..n {
            for j0 in 0..n {
                let mut u = 0.0;
                for l2 in 0..n {
                    for l1 in 0..n {
                        for l0 in 0..n {
                            let w = rhs[topo.local_index_ao(l0, l1, l2)];
                            let d = [
                                j0 as i64 - l0 as i64,
                                j1 as i64 - l1 as i64,
                                j2 as i64 - l2 as i64,
                            ];
                            u += w * kernel(d);
                        }
                    }
                }
                u *= h * h * h;
                max_ref = max_ref.max(u.abs());
                max_err = max_err.max((field[topo.local_index_ao(j0, j1, j2)] - u).abs());
            }
        }
    }
    assert!(max_err / max_ref < 1e-10, "relative error {}", max_err / max_ref);
}

/// Even symmetry walls on the lower side of every direction: the solution
/// is the direct summation over the source and its mirror images across
/// the half-sample walls.
#[test]
fn half_space_solve_matches_direct_summation() {
    let n = 8usize;
    let h = 1.0 / n as f64;
    let sigma = 2.0 * h;
    let center = 0.25;
    let (mut s, topo) = build_solver([[Even, Unb], [Even, Unb], [Even, Unb]], n, 1);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(len);
    let mut field = AlignedVec::new(len);
    fill(&topo, &mut rhs, |i0, i1, i2| {
        let r2 = [i0, i1, i2]
            .iter()
            .map(|&i| (i as f64 * h - center).powi(2))
            .sum::<f64>();
        (-r2 / (2.0 * sigma * sigma)).exp()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

    let g0 = 0.5 * (1.5 * h * h * h / (2.0 * PI)).powf(2.0 / 3.0);
    let kernel = |d: [i64; 3]| -> f64 {
        if d == [0, 0, 0] {
            -g0
        } else {
            let r = d.iter().map(|&v| (v as f64 * h).powi(2)).sum::<f64>().sqrt();
            -1.0 / (4.0 * PI * r)
        }
    };
    let mut max_err: f64 = 0.0;
    let mut max_ref: f64 = 0.0;
    for j2 in 0..n {
        for j1 in 0..n {
            for j0 in 0..n {
                let j = [j0 as i64, j1 as i64, j2 as i64];
                let mut u = 0.0;
                for l2 in 0..n {
                    for l1 in 0..n {
                        for l0 in 0..n {
                            let w = rhs[topo.local_index_ao(l0, l1, l2)];
                            let l = [l0 as i64, l1 as i64, l2 as i64];
                            // mirrors across the cell-centered walls at -h/2
                            for m in 0..8u32 {
                                let mut d = [0i64; 3];
                                for dd in 0..3 {
                                    d[dd] = if m & (1 << dd) == 0 {
                                        j[dd] - l[dd]
                                    } else {
                                        j[dd] + l[dd] + 1
                                    };
                                }
                                u += w * kernel(d);
                            }
                        }
                    }
                }
                u *= h * h * h;
                max_ref = max_ref.max(u.abs());
                max_err = max_err.max((field[topo.local_index_ao(j0, j1, j2)] - u).abs());
            }
        }
    }
    assert!(max_err / max_ref < 1e-10, "relative error {}", max_err / max_ref);
}

/// Gaussian vortex tube, periodic along its axis: the stream function of
/// `lap(psi) = -omega` matches `-(ln r + E1(r^2/2s^2)/2) / (2 pi)`.
#[test]
fn vortex_tube_stream_function() {
    let n = 64usize;
    let h = 1.0 / n as f64;
    let sigma = 0.05;
    // tube centered between grid points, away from the singular formula
    let (cx, cy) = (0.5 + 0.5 * h, 0.5 + 0.5 * h);
    let (mut s, topo) = build_solver([[Unb, Unb], [Unb, Unb], [Per, Per]], n, 1);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(len);
    let mut field = AlignedVec::new(len);
    fill(&topo, &mut rhs, |i0, i1, _| {
        let dx = i0 as f64 * h - cx;
        let dy = i1 as f64 * h - cy;
        let r2 = dx * dx + dy * dy;
        -(1.0 / (2.0 * PI * sigma * sigma)) * (-r2 / (2.0 * sigma * sigma)).exp()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

    let mut l2_err = 0.0;
    let mut l2_ref = 0.0;
    let nl = topo.nloc();
    for i2 in 0..nl[2] {
        for i1 in 0..nl[1] {
            for i0 in 0..nl[0] {
                let dx = i0 as f64 * h - cx;
                let dy = i1 as f64 * h - cy;
                let r = (dx * dx + dy * dy).sqrt();
                let q = r * r / (2.0 * sigma * sigma);
                let psi = -(r.ln() + 0.5 * expint_e1(q)) / (2.0 * PI);
                let v = field[topo.local_index_ao(i0, i1, i2)];
                l2_err += (v - psi) * (v - psi);
                l2_ref += psi * psi;
            }
        }
    }
    let rel = (l2_err / l2_ref).sqrt();
    assert!(rel < 5e-3, "relative L2 error {rel}");
}

/// The solver must not know a preferred axis: relabeling the directions
/// relabels the solution.
#[test]
fn isotropy_under_axis_relabeling() {
    let n = 32usize;
    let h = 1.0 / n as f64;
    let sigma = 0.08;
    let gauss = |a: usize, b: usize, c: usize| {
        let r2 = [a, b, c]
            .iter()
            .map(|&i| (i as f64 * h - 0.5).powi(2))
            .sum::<f64>();
        (-r2 / (2.0 * sigma * sigma)).exp()
    };
    let configs = [
        [[Per, Per], [Unb, Unb], [Unb, Unb]],
        [[Unb, Unb], [Per, Per], [Unb, Unb]],
        [[Unb, Unb], [Unb, Unb], [Per, Per]],
    ];
    let mut fields = Vec::new();
    let mut topo0 = None;
    for bc in configs {
        let (mut s, topo) = build_solver(bc, n, 1);
        let len = s.field_memsize();
        let mut rhs = AlignedVec::new(len);
        let mut field = AlignedVec::new(len);
        fill(&topo, &mut rhs, gauss);
        s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();
        fields.push(field);
        topo0.get_or_insert(topo);
    }
    let topo = topo0.unwrap();
    let mut max_ref: f64 = 0.0;
    let mut max_err: f64 = 0.0;
    for i2 in 0..n {
        for i1 in 0..n {
            for i0 in 0..n {
                let u0 = fields[0][topo.local_index_ao(i0, i1, i2)];
                // swap directions 0 and 1, then 0 and 2
                let u1 = fields[1][topo.local_index_ao(i1, i0, i2)];
                let u2 = fields[2][topo.local_index_ao(i2, i1, i0)];
                max_ref = max_ref.max(u0.abs());
                max_err = max_err.max((u1 - u0).abs()).max((u2 - u0).abs());
            }
        }
    }
    assert!(
        max_err / max_ref < 1e-12,
        "relative anisotropy {}",
        max_err / max_ref
    );
}

/// `lap(u) = curl(f)` for `f = (0, 0, sin(2 pi x))`:
/// `u = (0, cos(2 pi x) / (2 pi), 0)`.
#[test]
fn spectral_curl_of_a_plane_wave() {
    let n = 32usize;
    let (mut s, topo) = build_solver([[Per, Per], [Per, Per], [Per, Per]], n, 3);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(3 * len);
    let mut field = AlignedVec::new(3 * len);
    fill(&topo, &mut rhs[2 * len..3 * len], |i0, _, _| {
        (2.0 * PI * i0 as f64 / n as f64).sin()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Rot).unwrap();

    let mut max_err: f64 = 0.0;
    for i2 in 0..n {
        for i1 in 0..n {
            for i0 in 0..n {
                let id = topo.local_index_ao(i0, i1, i2);
                let uy = (2.0 * PI * i0 as f64 / n as f64).cos() / (2.0 * PI);
                max_err = max_err.max(field[id].abs());
                max_err = max_err.max((field[len + id] - uy).abs());
                max_err = max_err.max(field[2 * len + id].abs());
            }
        }
    }
    assert!(max_err < 1e-12, "max error {max_err}");
}

/// `lap(u) = div(f)` for `f = (sin(2 pi x), 0, 0)`:
/// `u = -cos(2 pi x) / (2 pi)`.
#[test]
fn spectral_divergence_of_a_plane_wave() {
    let n = 32usize;
    let (mut s, topo) = build_solver([[Per, Per], [Per, Per], [Per, Per]], n, 3);
    let len = s.field_memsize();
    let mut rhs = AlignedVec::new(3 * len);
    let mut field = AlignedVec::new(len);
    fill(&topo, &mut rhs[..len], |i0, _, _| {
        (2.0 * PI * i0 as f64 / n as f64).sin()
    });
    s.solve(&mut field[..], &rhs[..], SolverType::Div).unwrap();

    let (max_err, _) = max_abs_diff(&topo, &field, |i0, _, _| {
        -(2.0 * PI * i0 as f64 / n as f64).cos() / (2.0 * PI)
    });
    assert!(max_err < 1e-12, "max error {max_err}");
}

/// A Hejlesen kernel on an anisotropic grid is a configuration error.
#[test]
fn regularized_kernel_rejects_anisotropic_spacing() {
    let n = 16;
    let topo = Topology::new(0, [n; 3], [1; 3], false, None, ALIGNMENT, 0, 1).unwrap();
    let h = [1.0 / n as f64, 2.0 / n as f64, 1.0 / n as f64];
    let mut s = Solver::new(
        &topo,
        [[Unb, Unb], [Unb, Unb], [Unb, Unb]],
        h,
        [1.0, 2.0, 1.0],
        1,
        LocalComm,
    )
    .unwrap();
    s.set_plan_flag(PlanFlag::Estimate).unwrap();
    s.set_green_type(GreenType::Hej4).unwrap();
    assert!(s.setup(false).is_err());
}
