use crate::error::{GreeterError, Result};

pub mod local_communicator;

#[cfg(feature = "mpi")]
pub mod mpi_communicator;

/// Handle to the group of cooperating processes of one run. Ranks are in `0..size()`; rank 0 is
/// the coordinator. Send and receive block until the transport accepts or delivers the message.
pub trait ProcessGroup {
    fn rank(&self) -> u32;

    fn size(&self) -> u32;

    fn send(&self, to: u32, tag: i32, payload: &[u8]) -> Result<()>;

    /// Blocks until a message with `tag` from exactly the process `from` is available.
    fn receive(&self, from: u32, tag: i32) -> Result<Vec<u8>>;

    fn barrier(&self);

    fn is_coordinator(&self) -> bool {
        self.rank() == 0
    }
}

pub(crate) fn check_rank(rank: u32, size: u32) -> Result<()> {
    if rank >= size {
        return Err(GreeterError::RankOutOfRange { rank, size });
    }
    Ok(())
}
