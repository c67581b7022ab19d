use std::f64::consts::PI;

use fftw::array::AlignedVec;
use fftw::plan::*;
use fftw::types::{c64, Flag, R2RKind, Sign};

use crate::error::Result;
use crate::fft_plan::{bc_sum, BoundaryType, PlanCategory, PlanFlag};
use crate::topology::Topology;

/// Transform orientation. Forward maps physical data to the spectral
/// representation, backward undoes it up to the normalization factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransformSign {
    Forward,
    Backward,
}

/// Post-transform fix-up of a real-to-real direction, decided once at plan
/// construction so the transform loop stays branch-free.
///
/// - `Dct`: zero the Nyquist slot on the way forward.
/// - `Dst`: shift the forward output up by one slot and zero slot 0, so
///   slot `k` holds mode `k`; undone before the backward transform.
/// - `Ndst`: as `Dst` with an additional sign flip, for sine conventions
///   mirrored at the upper boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Correction {
    #[default]
    None,
    Dct,
    Dst,
    Ndst,
}

/// The allocated transform backend of one direction.
enum Transform {
    R2r {
        plan: Plan<f64, f64, Plan64>,
        buf_in: AlignedVec<f64>,
        buf_out: AlignedVec<f64>,
    },
    R2c {
        plan: Plan<f64, c64, Plan64>,
        buf_in: AlignedVec<f64>,
        buf_out: AlignedVec<c64>,
    },
    C2r {
        plan: Plan<c64, f64, Plan64>,
        buf_in: AlignedVec<c64>,
        buf_out: AlignedVec<f64>,
    },
    C2c {
        plan: Plan<c64, c64, Plan64>,
        buf_in: AlignedVec<c64>,
        buf_out: AlignedVec<c64>,
    },
}

/// The plan descriptor of a single direction: boundary pair, transform
/// family, sizing, normalization and wave-number factors, and the
/// correction applied around the raw transform.
///
/// Construction stores the static choices; [`PlanDim::init`] runs the
/// sizing rules against the evolving dry-run state; [`PlanDim::allocate`]
/// creates the FFTW plan; [`PlanDim::execute`] runs it pencil by pencil.
pub struct PlanDim {
    dim: usize,
    sign: TransformSign,
    is_green: bool,
    bc: [BoundaryType; 2],
    category: PlanCategory,
    h: f64,
    length: f64,

    n_in: usize,
    n_out: usize,
    fieldstart: usize,
    symstart: f64,
    normfact: f64,
    volfact: f64,
    kfact: f64,
    koffset: f64,
    imult: bool,
    corrtype: Correction,
    is_r2c: bool,
    is_spectral: bool,
    ignore_mode: bool,
    kind: Option<R2RKind>,

    transform: Option<Transform>,
}

impl PlanDim {
    pub fn new(
        dim: usize,
        h: &[f64; 3],
        length: &[f64; 3],
        bc: [BoundaryType; 2],
        sign: TransformSign,
        is_green: bool,
    ) -> Result<Self> {
        let category = PlanCategory::from_pair(dim, bc[0], bc[1])?;
        Ok(PlanDim {
            dim,
            sign,
            is_green,
            bc,
            category,
            h: h[dim],
            length: length[dim],
            n_in: 1,
            n_out: 1,
            fieldstart: 0,
            symstart: 0.0,
            normfact: 1.0,
            volfact: 1.0,
            kfact: 0.0,
            koffset: 0.0,
            imult: false,
            corrtype: Correction::None,
            is_r2c: false,
            is_spectral: false,
            ignore_mode: false,
            kind: None,
            transform: None,
        })
    }

    /// Runs the sizing rules against the dry-run state: `size[dim]` is the
    /// tentative extent of this direction before the transform and
    /// `is_complex` tells whether an earlier direction already switched the
    /// data to complex.
    pub fn init(&mut self, size: &[usize; 3], is_complex: bool) -> Result<()> {
        match self.category {
            PlanCategory::SymSym => self.init_real2real(size[self.dim], is_complex),
            PlanCategory::MixUnb => self.init_mixunbounded(size[self.dim], is_complex),
            PlanCategory::PerPer => self.init_periodic(size[self.dim], is_complex),
            PlanCategory::UnbUnb => self.init_unbounded(size[self.dim], is_complex),
            PlanCategory::Empty => {
                self.n_in = size[self.dim];
                self.n_out = size[self.dim];
                Ok(())
            }
        }?;
        log::debug!(
            "plan dim {} {:?} {:?}: n {} -> {} (r2c {}, spectral {}, corr {:?})",
            self.dim,
            self.sign,
            self.category,
            self.n_in,
            self.n_out,
            self.is_r2c,
            self.is_spectral,
            self.corrtype,
        );
        Ok(())
    }

    fn init_real2real(&mut self, n: usize, is_complex: bool) -> Result<()> {
        debug_assert!(!is_complex || self.is_green);
        use BoundaryType::*;
        self.n_in = n;
        self.n_out = n;
        self.normfact = 0.5 / n as f64;
        self.kfact = PI / self.length;
        let (fwd, bwd, corr, koffset, imult) = match (self.bc[0], self.bc[1]) {
            (Even, Even) => (
                R2RKind::FFTW_REDFT10,
                R2RKind::FFTW_REDFT01,
                Correction::Dct,
                0.0,
                false,
            ),
            (Odd, Odd) => (
                R2RKind::FFTW_RODFT10,
                R2RKind::FFTW_RODFT01,
                Correction::Dst,
                0.0,
                true,
            ),
            // the half-sample kinds carry the asymmetric pairs natively and
            // are their own inverse
            (Even, Odd) => (
                R2RKind::FFTW_REDFT11,
                R2RKind::FFTW_REDFT11,
                Correction::None,
                0.5,
                false,
            ),
            (Odd, Even) => (
                R2RKind::FFTW_RODFT11,
                R2RKind::FFTW_RODFT11,
                Correction::None,
                0.5,
                true,
            ),
            _ => unreachable!("filtered by PlanCategory::from_pair"),
        };
        self.koffset = koffset;
        self.imult = imult && !self.is_green;
        if self.is_green {
            // the kernel along a symmetric direction is assembled directly
            // in its spectral representation
            self.is_spectral = true;
        } else {
            self.kind = Some(if self.sign == TransformSign::Forward { fwd } else { bwd });
            self.corrtype = corr;
        }
        Ok(())
    }

    fn init_mixunbounded(&mut self, n: usize, is_complex: bool) -> Result<()> {
        debug_assert!(!is_complex || self.is_green);
        use BoundaryType::*;
        self.volfact = self.h;
        self.normfact = 0.25 / n as f64;
        self.kfact = PI / (2.0 * self.length);
        // every node offset of the doubled domain is stored directly, so
        // neither the kernel fill nor the wave numbers ever fold
        self.symstart = 0.0;
        if self.is_green {
            // the kernel is even about the mirror plane whatever the field
            // symmetry is, so it rides a node-centered DCT-I; its Nyquist
            // slot pairs with no field mode and is dropped by the dry run
            self.n_in = 2 * n + 1;
            self.n_out = 2 * n + 1;
            self.kind = Some(R2RKind::FFTW_REDFT00);
            self.ignore_mode = true;
            return Ok(());
        }
        self.n_in = 2 * n;
        self.n_out = 2 * n;
        // the data sits in the second half when the unbounded side is the
        // lower one, so its symmetry plane coincides with the upper mirror
        self.fieldstart = if self.bc[0] == Unb { n } else { 0 };
        let sym = if self.bc[0] == Unb { self.bc[1] } else { self.bc[0] };
        // cosine slots pair with the node-centered kernel modes one to one;
        // sine slots sit one mode low and take the alignment shift
        let (fwd, bwd, corr, imult) = match sym {
            Even => (
                R2RKind::FFTW_REDFT10,
                R2RKind::FFTW_REDFT01,
                Correction::None,
                false,
            ),
            Odd => (
                R2RKind::FFTW_RODFT10,
                R2RKind::FFTW_RODFT01,
                Correction::Dst,
                true,
            ),
            _ => unreachable!("filtered by PlanCategory::from_pair"),
        };
        self.kind = Some(if self.sign == TransformSign::Forward { fwd } else { bwd });
        self.corrtype = corr;
        self.imult = imult;
        Ok(())
    }

    fn init_periodic(&mut self, n: usize, is_complex: bool) -> Result<()> {
        self.normfact = 1.0 / n as f64;
        self.kfact = 2.0 * PI / self.length;
        self.symstart = n as f64 / 2.0;
        if is_complex {
            self.n_in = n;
            self.n_out = n;
        } else {
            self.n_in = n;
            self.n_out = n / 2 + 1;
            self.is_r2c = true;
        }
        if self.is_green {
            self.is_spectral = true;
        }
        Ok(())
    }

    fn init_unbounded(&mut self, n: usize, is_complex: bool) -> Result<()> {
        self.volfact = self.h;
        self.normfact = 0.5 / n as f64;
        self.kfact = PI / self.length;
        self.symstart = n as f64;
        if is_complex {
            self.n_in = 2 * n;
            self.n_out = 2 * n;
        } else {
            self.n_in = 2 * n;
            self.n_out = n + 1;
            self.is_r2c = true;
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn sign(&self) -> TransformSign {
        self.sign
    }

    pub fn category(&self) -> PlanCategory {
        self.category
    }

    pub fn bc_sum(&self) -> usize {
        bc_sum(&self.bc)
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    pub fn fieldstart(&self) -> usize {
        self.fieldstart
    }

    pub fn symstart(&self) -> f64 {
        self.symstart
    }

    pub fn normfact(&self) -> f64 {
        self.normfact
    }

    pub fn volfact(&self) -> f64 {
        self.volfact
    }

    pub fn kfact(&self) -> f64 {
        self.kfact
    }

    pub fn koffset(&self) -> f64 {
        self.koffset
    }

    pub fn imult(&self) -> bool {
        self.imult
    }

    pub fn corrtype(&self) -> Correction {
        self.corrtype
    }

    pub fn is_r2c(&self) -> bool {
        self.is_r2c
    }

    pub fn is_spectral(&self) -> bool {
        self.is_spectral
    }

    /// True when this plan actually executes the real-to-complex transform
    /// (a spectral Green direction switches the sizing to complex without
    /// touching the data).
    pub fn is_r2c_by_fft(&self) -> bool {
        self.is_r2c && !self.is_spectral
    }

    pub fn ignore_mode(&self) -> bool {
        self.ignore_mode
    }

    /// Creates the FFTW plan for this direction. `topo` is the pencil
    /// topology the transform will run in, in its pre-transform (real,
    /// for an r2c direction) representation.
    pub fn allocate(&mut self, topo: &Topology, flag: PlanFlag) -> Result<()> {
        debug_assert_eq!(topo.axis(), self.dim);
        if self.is_spectral || self.category == PlanCategory::Empty {
            self.transform = None;
            return Ok(());
        }
        let flag = Flag::from(flag);
        let transform = if let Some(kind) = self.kind {
            Transform::R2r {
                plan: R2RPlan64::aligned(&[self.n_in], kind, flag)?,
                buf_in: AlignedVec::new(self.n_in),
                buf_out: AlignedVec::new(self.n_in),
            }
        } else if self.is_r2c && self.sign == TransformSign::Forward {
            Transform::R2c {
                plan: R2CPlan64::aligned(&[self.n_in], flag)?,
                buf_in: AlignedVec::new(self.n_in),
                buf_out: AlignedVec::new(self.n_in / 2 + 1),
            }
        } else if self.is_r2c {
            Transform::C2r {
                plan: C2RPlan64::aligned(&[self.n_in], flag)?,
                buf_in: AlignedVec::new(self.n_in / 2 + 1),
                buf_out: AlignedVec::new(self.n_in),
            }
        } else {
            let sign = match self.sign {
                TransformSign::Forward => Sign::Forward,
                TransformSign::Backward => Sign::Backward,
            };
            Transform::C2c {
                plan: C2CPlan64::aligned(&[self.n_in], sign, flag)?,
                buf_in: AlignedVec::new(self.n_in),
                buf_out: AlignedVec::new(self.n_in),
            }
        };
        self.transform = Some(transform);
        Ok(())
    }

    /// Runs the transform on every pencil of `data`, through a per-pencil
    /// aligned scratch, and applies the correction step. `topo` must be in
    /// the representation the data currently has (real before a forward
    /// r2c, complex before a backward c2r).
    pub fn execute(&mut self, data: &mut [f64], topo: &Topology) -> Result<()> {
        let transform = match &mut self.transform {
            Some(t) => t,
            None => return Ok(()),
        };
        debug_assert_eq!(topo.axis(), self.dim);
        let ax0 = topo.axis();
        let n1 = topo.nloc()[(ax0 + 1) % 3];
        let n2 = topo.nloc()[(ax0 + 2) % 3];
        let backward = self.sign == TransformSign::Backward;

        for i2 in 0..n2 {
            for i1 in 0..n1 {
                let row = topo.local_index_ao(0, i1, i2);
                match transform {
                    Transform::R2r { plan, buf_in, buf_out } => {
                        let nf = topo.nf();
                        if backward {
                            backward_correction(
                                self.corrtype,
                                &mut data[row..row + self.n_in * nf],
                                nf,
                            );
                        }
                        // complex pencils run the real and imaginary
                        // sequences through the same real plan
                        for part in 0..nf {
                            for j in 0..self.n_in {
                                buf_in[j] = data[row + nf * j + part];
                            }
                            plan.r2r(&mut buf_in[..], &mut buf_out[..])?;
                            for j in 0..self.n_out {
                                data[row + nf * j + part] = buf_out[j];
                            }
                        }
                        if !backward {
                            forward_correction(
                                self.corrtype,
                                &mut data[row..row + self.n_out * nf],
                                nf,
                            );
                        }
                    }
                    Transform::R2c { plan, buf_in, buf_out } => {
                        debug_assert_eq!(topo.nf(), 1);
                        buf_in[..self.n_in].copy_from_slice(&data[row..row + self.n_in]);
                        plan.r2c(&mut buf_in[..], &mut buf_out[..])?;
                        for (j, v) in buf_out.iter().enumerate().take(self.n_out) {
                            data[row + 2 * j] = v.re;
                            data[row + 2 * j + 1] = v.im;
                        }
                    }
                    Transform::C2r { plan, buf_in, buf_out } => {
                        debug_assert_eq!(topo.nf(), 2);
                        for j in 0..self.n_out {
                            buf_in[j] = c64::new(data[row + 2 * j], data[row + 2 * j + 1]);
                        }
                        plan.c2r(&mut buf_in[..], &mut buf_out[..])?;
                        data[row..row + self.n_in].copy_from_slice(&buf_out[..self.n_in]);
                    }
                    Transform::C2c { plan, buf_in, buf_out } => {
                        debug_assert_eq!(topo.nf(), 2);
                        for j in 0..self.n_in {
                            buf_in[j] = c64::new(data[row + 2 * j], data[row + 2 * j + 1]);
                        }
                        plan.c2c(&mut buf_in[..], &mut buf_out[..])?;
                        for (j, v) in buf_out.iter().enumerate().take(self.n_out) {
                            data[row + 2 * j] = v.re;
                            data[row + 2 * j + 1] = v.im;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Applies the correction after a forward transform. `row` holds
/// `n` slots of `nf` doubles each.
fn forward_correction(corr: Correction, row: &mut [f64], nf: usize) {
    let len = row.len();
    match corr {
        Correction::None => {}
        Correction::Dct => {
            row[len - nf..].fill(0.0);
        }
        Correction::Dst => {
            row.copy_within(0..len - nf, nf);
            row[..nf].fill(0.0);
        }
        Correction::Ndst => {
            row.copy_within(0..len - nf, nf);
            row[..nf].fill(0.0);
            for v in row.iter_mut() {
                *v = -*v;
            }
        }
    }
}

/// Undoes the forward correction, before the backward transform runs.
fn backward_correction(corr: Correction, row: &mut [f64], nf: usize) {
    let len = row.len();
    match corr {
        Correction::None => {}
        Correction::Dct => {
            row[len - nf..].fill(0.0);
        }
        Correction::Dst => {
            row.copy_within(nf.., 0);
            row[len - nf..].fill(0.0);
        }
        Correction::Ndst => {
            for v in row.iter_mut() {
                *v = -*v;
            }
            row.copy_within(nf.., 0);
            row[len - nf..].fill(0.0);
        }
    }
}
