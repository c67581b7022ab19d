use crate::error::{Result, SolverError};
use crate::green::{GreenParams, C_1O4PI};
use crate::topology::Topology;
use crate::util::sym_coordinate;

/// Tabulated lattice Green function, `n^3` native-endian doubles read from
/// `<KERNEL_PATH>/LGF_<dim>d_sym_acc12_<n>.ker`.
pub struct LgfTable {
    n: usize,
    data: Vec<f64>,
}

impl LgfTable {
    pub fn load(green_dim: usize) -> Result<Self> {
        let n = match green_dim {
            3 => 64,
            2 => 32,
            _ => {
                return Err(SolverError::Config(format!(
                    "no lattice Green function for dimension {green_dim}"
                )))
            }
        };
        let dir = std::env::var("KERNEL_PATH").unwrap_or_else(|_| ".".to_string());
        let path = format!("{dir}/LGF_{green_dim}d_sym_acc12_{n}.ker");
        log::info!("loading the LGF kernel file {path}");
        let bytes = std::fs::read(&path).map_err(|source| SolverError::KernelFile {
            path: path.clone(),
            source,
        })?;
        let needed = n * n * n * std::mem::size_of::<f64>();
        if bytes.len() < needed {
            return Err(SolverError::Config(format!(
                "kernel file {path} holds {} bytes, expected {needed}",
                bytes.len()
            )));
        }
        let data = bytes
            .chunks_exact(8)
            .take(n * n * n)
            .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        Ok(LgfTable { n, data })
    }

    /// Cutoff of the tabulated region.
    pub fn cutoff(&self) -> usize {
        self.n
    }

    /// Table value at a non-negative offset triple, `None` outside the
    /// tabulated cube.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        if i < self.n && j < self.n && k < self.n {
            Some(self.data[i + self.n * (j + self.n * k)])
        } else {
            None
        }
    }
}

/// Fills the kernel for the fully unbounded configuration from the
/// tabulated lattice values, switching to the free-space asymptote beyond
/// the cutoff. The lattice value at the origin replaces the analytic
/// limit, which is what makes the scheme exact for the discrete Laplacian.
pub fn lgf_fill(
    topo: &Topology,
    params: &GreenParams,
    h: &[f64; 3],
    green: &mut [f64],
) -> Result<()> {
    debug_assert!(!topo.is_complex());
    let table = LgfTable::load(3)?;
    let h0 = h[0];

    let ax0 = topo.axis();
    let ax1 = (ax0 + 1) % 3;
    let ax2 = (ax0 + 2) % 3;
    let nloc = *topo.nloc();
    let istart = topo.istart_glob();
    for i2 in 0..nloc[ax2] {
        for i1 in 0..nloc[ax1] {
            for i0 in 0..nloc[ax0] {
                let mut is = [0usize; 3];
                for (local, ax) in [(i0, ax0), (i1, ax1), (i2, ax2)] {
                    let ie = (istart[ax] + local) as i64;
                    is[ax] = sym_coordinate(ie, params.symstart[ax]).round() as usize;
                }
                let id = topo.local_index_ao(i0, i1, i2);
                green[id] = match table.get(is[0], is[1], is[2]) {
                    Some(v) => -v / h0,
                    None => {
                        let r2 = is.iter().map(|&i| (i as f64 * h0).powi(2)).sum::<f64>();
                        -C_1O4PI / r2.sqrt()
                    }
                };
            }
        }
    }
    Ok(())
}
