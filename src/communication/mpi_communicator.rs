use mpi::collective::CommunicatorCollectives;
use mpi::point_to_point::{Destination, Source};
use mpi::topology::{Communicator, SimpleCommunicator};
use mpi::Rank;
use tracing::{instrument, trace};

use crate::communication::{check_rank, ProcessGroup};
use crate::error::Result;

pub struct MpiProcessGroup {
    pub mpi_communicator: SimpleCommunicator,
}

impl MpiProcessGroup {
    pub(crate) fn new(mpi_communicator: SimpleCommunicator) -> Self {
        MpiProcessGroup { mpi_communicator }
    }

    /// Terminates every process of the group. MPI offers no way to fail a single rank cleanly.
    pub fn abort(&self, error_code: i32) -> ! {
        self.mpi_communicator.abort(error_code)
    }
}

impl ProcessGroup for MpiProcessGroup {
    fn rank(&self) -> u32 {
        self.mpi_communicator.rank() as u32
    }

    fn size(&self) -> u32 {
        self.mpi_communicator.size() as u32
    }

    // Blocking MPI_Send. Only the coordinator ever receives, so there is no cycle of senders
    // waiting on each other.
    #[instrument(level = "trace", skip(self, payload), fields(rank = self.rank()))]
    fn send(&self, to: u32, tag: i32, payload: &[u8]) -> Result<()> {
        check_rank(to, self.size())?;
        self.mpi_communicator
            .process_at_rank(to as Rank)
            .send_with_tag(payload, tag);
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(rank = self.rank()))]
    fn receive(&self, from: u32, tag: i32) -> Result<Vec<u8>> {
        check_rank(from, self.size())?;
        // receive_vec probes the message size first, so an over-long greeting arrives in full
        // and is rejected when decoding instead of overflowing a buffer.
        let (payload, status) = self
            .mpi_communicator
            .process_at_rank(from as Rank)
            .receive_vec_with_tag::<u8>(tag);
        trace!(
            "Received {} bytes from #{} with tag {}",
            payload.len(),
            status.source_rank(),
            status.tag()
        );
        Ok(payload)
    }

    fn barrier(&self) {
        self.mpi_communicator.barrier();
    }
}
