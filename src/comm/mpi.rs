use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::comm::{Communicator, Progress, RecvPart, SendPart};

/// Communicator over rsmpi. Construction initializes MPI and keeps the
/// universe alive for the lifetime of the value; dropping it finalizes.
pub struct MpiComm {
    universe: mpi::environment::Universe,
}

impl MpiComm {
    /// # Panics
    /// Panics if MPI was already initialized in this process.
    pub fn new() -> Self {
        let universe = mpi::initialize().expect("MPI initialization failed");
        MpiComm { universe }
    }

    pub fn world(&self) -> SimpleCommunicator {
        self.universe.world()
    }
}

impl Default for MpiComm {
    fn default() -> Self {
        Self::new()
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world().rank() as usize
    }

    fn size(&self) -> usize {
        self.world().size() as usize
    }

    fn barrier(&self) {
        self.world().barrier();
    }

    fn exchange(
        &self,
        sends: &[SendPart<'_>],
        recvs: &mut [RecvPart<'_>],
        _progress: Progress,
        on_recv: &mut dyn FnMut(usize, &[f64]),
    ) {
        let world = self.world();
        // Receive into staging vectors so the request borrows end with the
        // scope and the payloads can be handed to the shuffle callback.
        // Finer-grained waitany/stream overlap needs per-request buffer
        // release, which the safe rsmpi request collection does not expose;
        // the delivery order and the results are identical either way.
        let mut staged: Vec<Vec<f64>> = recvs.iter().map(|r| vec![0.0; r.data.len()]).collect();
        mpi::request::multiple_scope(sends.len() + recvs.len(), |scope, coll| {
            for (part, buf) in recvs.iter().zip(staged.iter_mut()) {
                let req = world
                    .process_at_rank(part.peer as i32)
                    .immediate_receive_into_with_tag(scope, &mut buf[..], part.tag as i32);
                coll.add(req);
            }
            for part in sends {
                let req = world
                    .process_at_rank(part.peer as i32)
                    .immediate_send_with_tag(scope, part.data, part.tag as i32);
                coll.add(req);
            }
            let mut result = Vec::new();
            coll.wait_all(&mut result);
        });
        for (i, (part, buf)) in recvs.iter_mut().zip(staged.iter()).enumerate() {
            part.data.copy_from_slice(buf);
            on_recv(i, part.data);
        }
    }
}
