//! Solver orchestration: plan ordering, the dry run sizing the pencil
//! stages, buffer allocation, kernel assembly and the solve pipeline.

mod magic;
pub use magic::SpectralInfo;

use fftw::array::AlignedVec;

use crate::comm::{Communicator, Progress};
use crate::error::{Result, SolverError};
use crate::fft_plan::{sort_plans, BoundaryType, PlanCategory, PlanDim, PlanFlag, TransformSign};
use crate::green::{fill_green, GreenParams, GreenType};
use crate::par_slice;
use crate::switch_topo::{Direction, SwitchTopo};
use crate::topology::Topology;
use crate::util::{is_aligned, ALIGNMENT};

/// Which Poisson problem a [`Solver::solve`] call runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolverType {
    /// Scalar right-hand side.
    Srhs,
    /// Three independent scalar solves on the vector components.
    Vrhs,
    /// `lap(u) = curl(f)`, applied in spectral space.
    Rot,
    /// `lap(u) = div(f)`, applied in spectral space.
    Div,
}

impl SolverType {
    fn lda(&self) -> (usize, usize) {
        match self {
            SolverType::Srhs => (1, 1),
            SolverType::Vrhs => (3, 3),
            SolverType::Rot => (3, 3),
            SolverType::Div => (3, 1),
        }
    }
}

const CHUNK: usize = 1 << 16;

/// The Poisson solver: three directional plans per orientation, the four
/// topologies of the pipeline, the remaps between them and the kernel.
///
/// Construction performs the dry run and freezes the decomposition;
/// [`Solver::setup`] allocates buffers and transforms and assembles the
/// kernel; [`Solver::solve`] may then run any number of times.
pub struct Solver<C: Communicator> {
    comm: C,
    lda: usize,
    h: [f64; 3],
    green_type: GreenType,
    alpha: f64,
    plan_flag: PlanFlag,
    strategy: Progress,

    topo_phys: Topology,
    plan_fwd: [PlanDim; 3],
    plan_bwd: [PlanDim; 3],
    plan_green: [PlanDim; 3],
    topo_hat: [Topology; 3],
    topo_green: [Topology; 3],
    switch: [SwitchTopo; 3],
    switch_green: [Option<SwitchTopo>; 3],

    data: Option<AlignedVec<f64>>,
    green: Option<AlignedVec<f64>>,
    send_buf: Vec<f64>,
    recv_buf: Vec<f64>,
    stride: usize,

    normfact: f64,
    volfact: f64,
    nbr_imult: i32,
}

impl<C: Communicator> Solver<C> {
    /// Builds the solver for the physical-space topology `topo`, one
    /// boundary pair per direction, grid spacing `h` and domain length
    /// `length`. `lda` is 1 for scalar problems and 3 for vector ones.
    pub fn new(
        topo: &Topology,
        bc: [[BoundaryType; 2]; 3],
        h: [f64; 3],
        length: [f64; 3],
        lda: usize,
        comm: C,
    ) -> Result<Self> {
        if lda != 1 && lda != 3 {
            return Err(SolverError::Config(format!("lda must be 1 or 3, got {lda}")));
        }
        if topo.is_complex() {
            return Err(SolverError::Config(
                "the physical-space topology must be real".into(),
            ));
        }
        if topo.comm_size() != comm.size() || topo.rank() != comm.rank() {
            return Err(SolverError::Config(
                "topology and communicator disagree on rank or size".into(),
            ));
        }

        let mk =
            |dim: usize, sign, is_green| PlanDim::new(dim, &h, &length, bc[dim], sign, is_green);
        let mut plan_fwd = [
            mk(0, TransformSign::Forward, false)?,
            mk(1, TransformSign::Forward, false)?,
            mk(2, TransformSign::Forward, false)?,
        ];
        let mut plan_bwd = [
            mk(0, TransformSign::Backward, false)?,
            mk(1, TransformSign::Backward, false)?,
            mk(2, TransformSign::Backward, false)?,
        ];
        let mut plan_green = [
            mk(0, TransformSign::Forward, true)?,
            mk(1, TransformSign::Forward, true)?,
            mk(2, TransformSign::Forward, true)?,
        ];
        sort_plans(&mut plan_fwd);
        sort_plans(&mut plan_bwd);
        sort_plans(&mut plan_green);
        log::info!(
            "transform order: directions {}, {}, {}",
            plan_fwd[0].dim(),
            plan_fwd[1].dim(),
            plan_fwd[2].dim()
        );

        let (topo_hat, switch) = build_field_stages(topo, &mut plan_fwd)?;
        dry_run_sizes(topo, &mut plan_bwd)?;
        let (topo_green, switch_green) = build_green_stages(topo, &mut plan_green)?;

        let mut normfact = 1.0;
        let mut volfact = 1.0;
        let mut nbr_imult = 0;
        for ip in 0..3 {
            normfact *= plan_fwd[ip].normfact();
            volfact *= plan_fwd[ip].volfact();
            if plan_fwd[ip].imult() {
                nbr_imult += 1;
            }
            if plan_bwd[ip].imult() {
                nbr_imult -= 1;
            }
            if plan_green[ip].imult() {
                nbr_imult += 1;
            }
        }

        Ok(Solver {
            comm,
            lda,
            h,
            green_type: GreenType::Chat2,
            alpha: 2.0,
            plan_flag: PlanFlag::default(),
            strategy: Progress::default(),
            topo_phys: topo.clone(),
            plan_fwd,
            plan_bwd,
            plan_green,
            topo_hat,
            topo_green,
            switch,
            switch_green,
            data: None,
            green: None,
            send_buf: Vec::new(),
            recv_buf: Vec::new(),
            stride: 0,
            normfact,
            volfact,
            nbr_imult,
        })
    }

    /// Selects the analytic kernel. Must be called before [`Solver::setup`].
    pub fn set_green_type(&mut self, green_type: GreenType) -> Result<()> {
        self.ensure_not_setup()?;
        self.green_type = green_type;
        Ok(())
    }

    /// Regularization length of the HEJ kernels, in grid spacings.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        self.ensure_not_setup()?;
        self.alpha = alpha;
        Ok(())
    }

    /// FFTW planning rigor. Must be called before [`Solver::setup`].
    pub fn set_plan_flag(&mut self, flag: PlanFlag) -> Result<()> {
        self.ensure_not_setup()?;
        self.plan_flag = flag;
        Ok(())
    }

    /// Progression strategy of the remaps; may be changed at any time.
    pub fn set_strategy(&mut self, strategy: Progress) {
        self.strategy = strategy;
    }

    fn ensure_not_setup(&self) -> Result<()> {
        if self.data.is_some() {
            return Err(SolverError::Config("the solver is already set up".into()));
        }
        Ok(())
    }

    pub fn normfact(&self) -> f64 {
        self.normfact
    }

    pub fn volfact(&self) -> f64 {
        self.volfact
    }

    pub fn nbr_imult(&self) -> i32 {
        self.nbr_imult
    }

    /// Directions in forward execution order.
    pub fn forward_dims(&self) -> [usize; 3] {
        [
            self.plan_fwd[0].dim(),
            self.plan_fwd[1].dim(),
            self.plan_fwd[2].dim(),
        ]
    }

    /// Doubles per component in the user-facing physical layout.
    pub fn field_memsize(&self) -> usize {
        self.topo_phys.locmemsize()
    }

    /// Allocates the data and kernel buffers, creates the FFTW plans and
    /// assembles the spectral kernel. After this call the solver
    /// configuration is frozen.
    ///
    /// `change_topo_comm` requests a rank reordering matched to the remap
    /// pattern; reordering is delegated to the communicator layer and the
    /// provided backends keep the ranks as they are.
    pub fn setup(&mut self, change_topo_comm: bool) -> Result<()> {
        self.ensure_not_setup()?;
        if change_topo_comm {
            log::warn!("rank reordering requested but not applied by this communicator");
        }

        // a single scratch sized for the largest stage, per component
        let mut stride = self.topo_phys.locmemsize();
        for t in &self.topo_hat {
            stride = stride.max(t.locmemsize());
        }
        self.stride = stride;
        let mut data = AlignedVec::new(self.lda * stride);
        par_slice::set_value(&mut data[..], 0.0, CHUNK);

        let mut green_len = 0;
        for t in &self.topo_green {
            green_len = green_len.max(t.locmemsize());
        }
        let mut green = AlignedVec::new(green_len);
        par_slice::set_value(&mut green[..], 0.0, CHUNK);

        let mut staging = 0;
        for sw in &self.switch {
            staging = staging.max(sw.staging_size());
        }
        for sw in self.switch_green.iter().flatten() {
            staging = staging.max(sw.staging_size());
        }
        self.send_buf = vec![0.0; staging];
        self.recv_buf = vec![0.0; staging];

        for ip in 0..3 {
            self.plan_fwd[ip].allocate(&self.topo_hat[ip], self.plan_flag)?;
            self.plan_bwd[ip].allocate(&self.topo_hat[ip], self.plan_flag)?;
            self.plan_green[ip].allocate(&self.topo_green[ip], self.plan_flag)?;
        }

        self.compute_green(&mut green)?;

        self.data = Some(data);
        self.green = Some(green);
        // the kernel remaps are not needed anymore
        self.switch_green = [None, None, None];
        Ok(())
    }

    /// Fills the kernel in the first Green topology, pushes it through the
    /// forward Green pipeline and scales it by the volume factor.
    fn compute_green(&mut self, green: &mut AlignedVec<f64>) -> Result<()> {
        let mut params = GreenParams::default();
        for ip in 0..3 {
            let d = self.plan_green[ip].dim();
            params.symstart[d] = self.plan_green[ip].symstart();
            if self.plan_green[ip].is_spectral() {
                params.kfact[d] = self.plan_green[ip].kfact();
                params.koffset[d] = self.plan_green[ip].koffset();
            } else {
                params.hfact[d] = self.h[d];
            }
        }
        fill_green(
            &self.topo_green[0],
            &params,
            self.green_type,
            self.alpha,
            &self.h,
            &mut green[..],
        )?;

        for ip in 0..3 {
            if ip > 0 {
                self.switch_green[ip].as_ref().unwrap().execute(
                    &self.comm,
                    &mut green[..],
                    Direction::Forward,
                    self.strategy,
                    &mut self.send_buf,
                    &mut self.recv_buf,
                );
            }
            if !self.plan_green[ip].is_spectral() {
                self.plan_green[ip].execute(&mut green[..], &self.topo_green[ip])?;
            }
            if self.plan_green[ip].is_r2c_by_fft() {
                self.topo_green[ip].switch_to_complex();
            }
        }

        par_slice::scale(&mut green[..], self.volfact, CHUNK);
        Ok(())
    }

    /// Solves the Poisson problem: `rhs` in, `field` out, both in the
    /// physical topology's padded layout, one `field_memsize()` block per
    /// component, aligned.
    pub fn solve(&mut self, field: &mut [f64], rhs: &[f64], solver_type: SolverType) -> Result<()> {
        let (lda_in, lda_out) = solver_type.lda();
        if lda_in > self.lda {
            return Err(SolverError::Unsupported(format!(
                "{solver_type:?} needs lda {lda_in}, solver was built with {}",
                self.lda
            )));
        }
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| SolverError::Config("solve called before setup".into()))?;
        let green = self.green.as_ref().unwrap();
        let phys_mem = self.topo_phys.locmemsize();
        if rhs.len() < lda_in * phys_mem || field.len() < lda_out * phys_mem {
            return Err(SolverError::Config(format!(
                "field/rhs buffers too small for {lda_in} x {phys_mem} doubles"
            )));
        }
        debug_assert!(is_aligned(rhs.as_ptr()));
        debug_assert!(is_aligned(field.as_ptr()));
        let stride = self.stride;

        par_slice::set_value(&mut data[..], 0.0, CHUNK);
        for c in 0..lda_in {
            copy_rows(
                &self.topo_phys,
                &rhs[c * phys_mem..(c + 1) * phys_mem],
                &mut data[c * stride..c * stride + phys_mem],
            );
        }

        // forward pipeline
        for ip in 0..3 {
            for c in 0..lda_in {
                let block = &mut data[c * stride..(c + 1) * stride];
                self.switch[ip].execute(
                    &self.comm,
                    block,
                    Direction::Forward,
                    self.strategy,
                    &mut self.send_buf,
                    &mut self.recv_buf,
                );
                self.plan_fwd[ip].execute(block, &self.topo_hat[ip])?;
            }
            if self.plan_fwd[ip].is_r2c() {
                self.topo_hat[ip].switch_to_complex();
            }
        }

        // convolution
        let hat = &self.topo_hat[2];
        let ghat = &self.topo_green[2];
        match solver_type {
            SolverType::Srhs | SolverType::Vrhs => {
                for c in 0..lda_in {
                    let block = &mut data[c * stride..(c + 1) * stride];
                    if hat.is_complex() {
                        magic::convolve_complex(
                            block,
                            &green[..],
                            hat,
                            ghat,
                            self.normfact,
                            self.nbr_imult,
                        );
                    } else if self.nbr_imult.rem_euclid(4) == 0 {
                        magic::convolve_real(block, &green[..], hat, ghat, self.normfact);
                    } else {
                        return Err(SolverError::Unsupported(format!(
                            "real convolution with nbr_imult = {}",
                            self.nbr_imult
                        )));
                    }
                }
            }
            SolverType::Div | SolverType::Rot => {
                if !hat.is_complex() {
                    return Err(SolverError::Unsupported(
                        "spectral curl/divergence on a fully real configuration".into(),
                    ));
                }
                // cosine/sine directions carry their gradient in a different
                // basis, which the i k factor cannot express
                if self.plan_fwd.iter().any(|p| {
                    matches!(p.category(), PlanCategory::SymSym | PlanCategory::MixUnb)
                }) {
                    return Err(SolverError::Unsupported(
                        "spectral curl/divergence with symmetry boundary conditions".into(),
                    ));
                }
                let mut info = SpectralInfo::default();
                for p in &self.plan_fwd {
                    let d = p.dim();
                    info.kfact[d] = p.kfact();
                    info.koffset[d] = p.koffset();
                    info.symstart[d] = p.symstart();
                }
                if solver_type == SolverType::Div {
                    magic::convolve_div(
                        &mut data[..],
                        stride,
                        &green[..],
                        hat,
                        ghat,
                        self.normfact,
                        &info,
                    );
                } else {
                    magic::convolve_rot(
                        &mut data[..],
                        stride,
                        &green[..],
                        hat,
                        ghat,
                        self.normfact,
                        &info,
                    );
                }
            }
        }

        // backward pipeline
        for ip in (0..3).rev() {
            for c in 0..lda_out {
                let block = &mut data[c * stride..(c + 1) * stride];
                self.plan_bwd[ip].execute(block, &self.topo_hat[ip])?;
            }
            if self.plan_bwd[ip].is_r2c() {
                self.topo_hat[ip].switch_to_real();
            }
            for c in 0..lda_out {
                let block = &mut data[c * stride..(c + 1) * stride];
                self.switch[ip].execute(
                    &self.comm,
                    block,
                    Direction::Backward,
                    self.strategy,
                    &mut self.send_buf,
                    &mut self.recv_buf,
                );
            }
        }

        for c in 0..lda_out {
            copy_rows(
                &self.topo_phys,
                &data[c * stride..c * stride + phys_mem],
                &mut field[c * phys_mem..(c + 1) * phys_mem],
            );
        }
        Ok(())
    }

    /// Replaces the spectral kernel with the unit kernel. With it the
    /// pipeline is the plain forward-backward identity, which is the
    /// reference point of the round-trip property.
    #[cfg(test)]
    fn set_identity_green(&mut self) {
        let green = self.green.as_mut().unwrap();
        let nf = self.topo_green[2].nf();
        for (i, v) in green.iter_mut().enumerate() {
            *v = if nf == 2 && i % 2 == 1 { 0.0 } else { 1.0 };
        }
    }
}

/// Copies the data rows of the physical layout, leaving padding alone.
fn copy_rows(topo: &Topology, src: &[f64], dst: &mut [f64]) {
    let ax0 = topo.axis();
    let n1 = topo.nloc()[(ax0 + 1) % 3];
    let n2 = topo.nloc()[(ax0 + 2) % 3];
    let row = topo.nloc()[ax0] * topo.nf();
    for i2 in 0..n2 {
        for i1 in 0..n1 {
            let id = topo.local_index_ao(0, i1, i2);
            dst[id..id + row].copy_from_slice(&src[id..id + row]);
        }
    }
}

/// Runs the sizing rules of a sorted plan triple without building stages.
fn dry_run_sizes(topo_phys: &Topology, plans: &mut [PlanDim; 3]) -> Result<()> {
    let mut size = *topo_phys.nglob();
    let mut is_complex = false;
    for p in plans.iter_mut() {
        p.init(&size, is_complex)?;
        size[p.dim()] = p.n_out();
        is_complex |= p.is_r2c();
    }
    Ok(())
}

/// The forward dry run: initializes the sorted plans against the evolving
/// sizes and builds one pencil topology and one remap per stage. Stage
/// topologies are returned in their pre-transform representation.
fn build_field_stages(
    topo_phys: &Topology,
    plans: &mut [PlanDim; 3],
) -> Result<([Topology; 3], [SwitchTopo; 3])> {
    let rank = topo_phys.rank();
    let csize = topo_phys.comm_size();
    let mut size = *topo_phys.nglob();
    let mut is_complex = false;
    let mut cur = topo_phys.clone();
    let mut topos = Vec::with_capacity(3);
    let mut switches = Vec::with_capacity(3);

    for p in plans.iter_mut() {
        p.init(&size, is_complex)?;
        let dim = p.dim();
        size[dim] = p.n_out();
        is_complex |= p.is_r2c();
        let nproc = pencil_nproc(dim, csize);
        let mut t = Topology::new(dim, size, nproc, is_complex, None, ALIGNMENT, rank, csize)?;
        let mut shift = [0i64; 3];
        shift[dim] = p.fieldstart() as i64;
        // the remap happens before the transform, on data that is still in
        // the previous representation
        let sw = if p.is_r2c() {
            t.switch_to_real();
            let sw = SwitchTopo::new(&cur, &t, shift);
            t.switch_to_complex();
            sw
        } else {
            SwitchTopo::new(&cur, &t, shift)
        };
        cur = t.clone();
        topos.push(t);
        switches.push(sw);
    }

    // solve() walks the representation switches itself
    let mut topos: [Topology; 3] = topos.try_into().unwrap();
    let switches: [SwitchTopo; 3] = match switches.try_into() {
        Ok(s) => s,
        Err(_) => unreachable!("three stages are always built"),
    };
    for (t, p) in topos.iter_mut().zip(plans.iter()) {
        if p.is_r2c() {
            t.switch_to_real();
        }
    }
    Ok((topos, switches))
}

/// The Green dry run: forward to learn the final spectral extents (minus
/// the ignored modes), then backward to size the stages on the full
/// symmetric domain, re-adding each ignored mode in the stage that owns
/// it. The remap towards the next stage drops it again.
fn build_green_stages(
    topo_phys: &Topology,
    plans: &mut [PlanDim; 3],
) -> Result<([Topology; 3], [Option<SwitchTopo>; 3])> {
    let rank = topo_phys.rank();
    let csize = topo_phys.comm_size();
    let mut size = *topo_phys.nglob();
    let mut is_complex = false;
    for p in plans.iter_mut() {
        p.init(&size, is_complex)?;
        size[p.dim()] = p.n_out();
        is_complex |= p.is_r2c();
        if p.ignore_mode() {
            size[p.dim()] -= 1;
        }
    }

    let mut topos: [Option<Topology>; 3] = [None, None, None];
    let mut switches: [Option<SwitchTopo>; 3] = [None, None, None];
    let mut cur: Option<Topology> = None;
    for ip in (0..3).rev() {
        let dim = plans[ip].dim();
        if plans[ip].ignore_mode() {
            size[dim] += 1;
        }
        let nproc = pencil_nproc(dim, csize);
        let mut t = Topology::new(dim, size, nproc, is_complex, None, ALIGNMENT, rank, csize)?;
        if let Some(next) = &cur {
            switches[ip + 1] = Some(SwitchTopo::new(&t, next, [0, 0, 0]));
        }
        if plans[ip].is_r2c_by_fft() {
            // the kernel is assembled in real space for this direction
            t.switch_to_real();
            size[dim] = t.nglob()[dim];
            is_complex = false;
        }
        cur = Some(t.clone());
        topos[ip] = Some(t);
    }
    let topos = topos.map(Option::unwrap);
    Ok((topos, switches))
}

/// Process grid of the pencil stage along `dim`: nothing along the pencil
/// itself, the communicator split as evenly as possible over the other
/// two directions.
fn pencil_nproc(dim: usize, comm_size: usize) -> [usize; 3] {
    let mut a = (comm_size as f64).sqrt().floor() as usize;
    a = a.max(1);
    while comm_size % a != 0 {
        a -= 1;
    }
    let mut nproc = [1; 3];
    nproc[(dim + 1) % 3] = a;
    nproc[(dim + 2) % 3] = comm_size / a;
    nproc
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::comm::LocalComm;
    use BoundaryType::*;

    fn solver(bc: [[BoundaryType; 2]; 3], n: usize) -> Solver<LocalComm> {
        let h = 1.0 / n as f64;
        let topo = Topology::new(0, [n, n, n], [1, 1, 1], false, None, ALIGNMENT, 0, 1).unwrap();
        let mut s = Solver::new(&topo, bc, [h; 3], [1.0; 3], 1, LocalComm).unwrap();
        s.set_plan_flag(PlanFlag::Estimate).unwrap();
        s
    }

    #[test]
    fn pencil_nproc_factors_the_communicator() {
        assert_eq!(pencil_nproc(0, 6), [1, 2, 3]);
        assert_eq!(pencil_nproc(1, 4), [2, 1, 2]);
        assert_eq!(pencil_nproc(2, 7), [1, 7, 1]);
        assert_eq!(pencil_nproc(2, 1), [1, 1, 1]);
    }

    #[test]
    fn stage_sizes_fully_unbounded() {
        let s = solver([[Unb, Unb], [Unb, Unb], [Unb, Unb]], 8);
        // first stage holds the r2c output, stored real for the remap
        assert_eq!(s.topo_hat[0].nglob(), &[18, 8, 8]);
        assert!(s.topo_hat[1].is_complex());
        assert_eq!(s.topo_hat[1].nglob(), &[9, 16, 8]);
        assert_eq!(s.topo_hat[2].nglob(), &[9, 16, 16]);
        // the kernel pipeline sees the full doubled box everywhere
        assert_eq!(s.topo_green[0].nglob(), &[18, 16, 16]);
        assert_eq!(s.topo_green[2].nglob(), &[9, 16, 16]);
        assert_eq!(s.nbr_imult(), 0);
    }

    #[test]
    fn roundtrip_identity_with_unit_kernel() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut s = solver([[Per, Per], [Per, Per], [Per, Per]], 16);
        s.setup(false).unwrap();
        s.set_identity_green();

        let len = s.field_memsize();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let rhs = {
            let mut v = AlignedVec::new(len);
            for x in v.iter_mut() {
                *x = rng.gen_range(-1.0..1.0);
            }
            v
        };
        let mut field = AlignedVec::new(len);
        s.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();

        let t = &s.topo_phys;
        let mut max_err: f64 = 0.0;
        for i2 in 0..t.nloc()[2] {
            for i1 in 0..t.nloc()[1] {
                for i0 in 0..t.nloc()[0] {
                    let id = t.local_index_ao(i0, i1, i2);
                    max_err = max_err.max((field[id] - rhs[id]).abs());
                }
            }
        }
        assert!(max_err < 1e-13, "roundtrip error {max_err}");
    }

    #[test]
    fn solver_is_reusable_across_calls() {
        let mut s = solver([[Per, Per], [Per, Per], [Per, Per]], 8);
        s.setup(false).unwrap();
        let len = s.field_memsize();
        let mut rhs = AlignedVec::new(len);
        let t = s.topo_phys.clone();
        for i0 in 0..8 {
            let x = i0 as f64 / 8.0;
            let v = (2.0 * std::f64::consts::PI * x).sin();
            for i1 in 0..8 {
                for i2 in 0..8 {
                    rhs[t.local_index_ao(i0, i1, i2)] = v;
                }
            }
        }
        let mut f1 = AlignedVec::new(len);
        let mut f2 = AlignedVec::new(len);
        s.solve(&mut f1[..], &rhs[..], SolverType::Srhs).unwrap();
        s.solve(&mut f2[..], &rhs[..], SolverType::Srhs).unwrap();
        for i2 in 0..8 {
            for i1 in 0..8 {
                for i0 in 0..8 {
                    let id = t.local_index_ao(i0, i1, i2);
                    assert_eq!(f1[id].to_bits(), f2[id].to_bits());
                }
            }
        }
    }

    #[test]
    fn setup_is_required_and_unrepeatable() {
        let mut s = solver([[Per, Per], [Per, Per], [Per, Per]], 8);
        let mut buf = vec![0.0; s.field_memsize()];
        let rhs = vec![0.0; s.field_memsize()];
        assert!(s.solve(&mut buf, &rhs, SolverType::Srhs).is_err());
        s.setup(false).unwrap();
        assert!(s.set_green_type(GreenType::Hej2).is_err());
        assert!(s.setup(false).is_err());
    }

    #[test]
    fn vector_types_need_a_vector_solver() {
        let mut s = solver([[Per, Per], [Per, Per], [Per, Per]], 8);
        s.setup(false).unwrap();
        let len = s.field_memsize();
        let mut field = vec![0.0; 3 * len];
        let rhs = vec![0.0; 3 * len];
        assert!(s.solve(&mut field, &rhs, SolverType::Vrhs).is_err());
        assert!(s.solve(&mut field, &rhs, SolverType::Rot).is_err());
    }
}
