use thiserror::Error;

/// Failures surfaced by solver construction and setup. In a distributed
/// run every rank either succeeds or fails identically on configuration
/// errors, so the caller can abort the communicator on `Err`.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("process grid {nproc:?} does not match the communicator size {comm_size}")]
    ProcGrid { nproc: [usize; 3], comm_size: usize },

    #[error("alignment of {alignment} bytes is not a multiple of the {unit}-byte element size")]
    Alignment { alignment: usize, unit: usize },

    #[error("boundary conditions ({left:?}, {right:?}) on direction {dim} are not a supported pair")]
    BoundaryPair {
        dim: usize,
        left: crate::fft_plan::BoundaryType,
        right: crate::fft_plan::BoundaryType,
    },

    #[error("solver type {0} is not supported by this configuration")]
    Unsupported(String),

    #[error("unable to read the kernel file {path}")]
    KernelFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transform planner failure: {0}")]
    Fftw(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

impl From<fftw::error::Error> for SolverError {
    fn from(e: fftw::error::Error) -> Self {
        SolverError::Fftw(format!("{e:?}"))
    }
}
