//! # `pups`: pencil-decomposed unbounded Poisson solver
//!
//! Solves the scalar or vector Poisson equation on a regular 3D Cartesian
//! grid, where each direction independently carries even, odd, periodic or
//! unbounded (free-space) boundary conditions. The right-hand side is
//! convolved with a discrete Green kernel through FFT-family transforms
//! applied direction by direction, over a distributed pencil
//! decomposition.
//!
//! The 1D transforms come from FFTW through the `fftw` crate; the
//! message-passing substrate sits behind the [`comm::Communicator`] trait
//! (a single-process backend is built in, an MPI one is available behind
//! the `mpi-comm` feature).
//!
//! # Example
//! ```no_run
//! use pups::comm::LocalComm;
//! use pups::fft_plan::BoundaryType::*;
//! use pups::solver::{Solver, SolverType};
//! use pups::topology::Topology;
//! use pups::util::ALIGNMENT;
//!
//! let n = 64;
//! let h = 1.0 / n as f64;
//! let topo = Topology::new(0, [n; 3], [1; 3], false, None, ALIGNMENT, 0, 1).unwrap();
//! let bc = [[Unb, Unb], [Unb, Unb], [Per, Per]];
//! let mut solver = Solver::new(&topo, bc, [h; 3], [1.0; 3], 1, LocalComm).unwrap();
//! solver.setup(false).unwrap();
//!
//! let mut rhs = fftw::array::AlignedVec::new(solver.field_memsize());
//! let mut field = fftw::array::AlignedVec::new(solver.field_memsize());
//! // ... fill rhs ...
//! solver.solve(&mut field[..], &rhs[..], SolverType::Srhs).unwrap();
//! ```

pub mod comm;
pub mod error;
pub mod fft_plan;
pub mod green;
pub mod par_slice;
pub mod solver;
pub mod switch_topo;
pub mod topology;
pub mod util;

pub use comm::{Communicator, LocalComm, Progress};
pub use error::{Result, SolverError};
pub use fft_plan::{BoundaryType, PlanFlag};
pub use green::GreenType;
pub use solver::{Solver, SolverType};
pub use topology::Topology;
