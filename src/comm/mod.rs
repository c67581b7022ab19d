//! Communication seam of the transposition engine.
//!
//! The solver only ever needs one collective shape: every rank posts a set
//! of outgoing chunks and a set of incoming chunks, and wants to know when
//! each incoming chunk has landed so it can be shuffled into place. The
//! `Communicator` trait captures exactly that, which keeps the rest of the
//! crate independent of the message-passing substrate. `LocalComm` is the
//! always-available single-process backend; an MPI-backed implementation
//! lives behind the `mpi-comm` feature.

mod local;
pub use local::*;

#[cfg(feature = "mpi-comm")]
mod mpi;
#[cfg(feature = "mpi-comm")]
pub use self::mpi::*;

/// How an exchange makes progress. The three variants produce byte-identical
/// results and differ only in how communication overlaps the local shuffle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Progress {
    /// Post every request, wait for all of them, then deliver.
    #[default]
    Persistent,
    /// Deliver each receive as it completes, overlapping the shuffle with
    /// the remaining traffic.
    WaitAny,
    /// Partition peers over `n` independent progress lanes. Falls back to
    /// `WaitAny` semantics on substrates without stream support.
    Streams(usize),
}

/// An outgoing message: `data` is sent to `peer` under `tag`.
pub struct SendPart<'a> {
    pub peer: usize,
    pub tag: u16,
    pub data: &'a [f64],
}

/// An incoming message slot: `data` is filled from `peer`'s message
/// carrying `tag`.
pub struct RecvPart<'a> {
    pub peer: usize,
    pub tag: u16,
    pub data: &'a mut [f64],
}

pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn barrier(&self) {}

    /// Runs one chunk exchange to completion. `on_recv(i, payload)` is
    /// invoked exactly once for every receive slot, after `recvs[i]` has
    /// been filled; with `Progress::WaitAny` the invocations happen in
    /// completion order while other messages are still in flight.
    fn exchange(
        &self,
        sends: &[SendPart<'_>],
        recvs: &mut [RecvPart<'_>],
        progress: Progress,
        on_recv: &mut dyn FnMut(usize, &[f64]),
    );
}
