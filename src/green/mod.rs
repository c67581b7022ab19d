//! Assembly of the discrete Green kernel for the four spectral
//! configurations: three, two, one or zero unbounded directions.

mod kernels;
mod lgf;

pub use kernels::*;
pub use lgf::*;

use crate::error::{Result, SolverError};
use crate::topology::Topology;

use std::f64::consts::PI;

pub(crate) const C_1OPI: f64 = 1.0 / PI;
pub(crate) const C_1O2PI: f64 = 1.0 / (2.0 * PI);
pub(crate) const C_1O4PI: f64 = 1.0 / (4.0 * PI);
pub(crate) const C_1OSQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;
pub(crate) const C_1OSQRTPI: f64 = 0.564_189_583_547_756_3;

/// The analytic kernel convolved with the right-hand side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum GreenType {
    /// Second-order quadrature of the singular kernel, Chatelain et al.
    Chat2 = 0,
    /// Lattice Green function, tabulated.
    Lgf2 = 1,
    /// Gaussian-regularized kernel, order 2, Hejlesen et al.
    Hej2 = 2,
    /// Gaussian-regularized kernel, order 4.
    Hej4 = 3,
    /// Gaussian-regularized kernel, order 6.
    Hej6 = 4,
}

impl GreenType {
    pub fn is_regularized(&self) -> bool {
        matches!(self, GreenType::Hej2 | GreenType::Hej4 | GreenType::Hej6)
    }
}

/// Per-direction factors of the kernel assembly. Exactly one of
/// `hfact[d]` and `kfact[d]` is nonzero: spatial directions carry the grid
/// spacing, spectral directions the wave-number slope and offset.
/// `symstart[d]` is the reflection center of direction `d`.
#[derive(Debug, Clone, Default)]
pub struct GreenParams {
    pub hfact: [f64; 3],
    pub kfact: [f64; 3],
    pub koffset: [f64; 3],
    pub symstart: [f64; 3],
}

impl GreenParams {
    pub fn nbr_spectral(&self) -> usize {
        self.kfact.iter().filter(|&&k| k != 0.0).count()
    }
}

/// Fills the kernel array in the first Green topology, in physical space
/// along unbounded directions and in spectral space along the others.
///
/// `alpha` is the regularization length in grid spacings (used by the HEJ
/// kernels), `h` the grid spacing.
pub fn fill_green(
    topo: &Topology,
    params: &GreenParams,
    green_type: GreenType,
    alpha: f64,
    h: &[f64; 3],
    green: &mut [f64],
) -> Result<()> {
    let nbr_spectral = params.nbr_spectral();
    if green_type.is_regularized() {
        if nbr_spectral > 0 {
            return Err(SolverError::Unsupported(format!(
                "{green_type:?} kernel with {nbr_spectral} spectral directions"
            )));
        }
        if h[0] != h[1] || h[1] != h[2] {
            return Err(SolverError::Config(format!(
                "regularized kernel {green_type:?} requires an isotropic grid, got {h:?}"
            )));
        }
    }
    if green_type == GreenType::Lgf2 {
        if nbr_spectral > 0 {
            return Err(SolverError::Unsupported(
                "lattice Green function with spectral directions".into(),
            ));
        }
        if h[0] != h[1] || h[1] != h[2] {
            return Err(SolverError::Config(format!(
                "lattice Green function requires an isotropic grid, got {h:?}"
            )));
        }
    }
    log::info!(
        "assembling {:?} kernel with {} spectral direction(s)",
        green_type,
        nbr_spectral
    );
    match nbr_spectral {
        0 => three_dir_unbounded(topo, params, green_type, alpha, h, green),
        1 => two_dir_unbounded(topo, params, green_type, green),
        2 => one_dir_unbounded(topo, params, green_type, green),
        3 => zero_dir_unbounded(topo, params, green),
        _ => unreachable!(),
    }
}
