pub mod local_controller;
#[cfg(feature = "mpi")]
pub mod mpi_controller;

use std::io::Write;
use std::thread::{sleep, JoinHandle};
use std::time::Duration;

use nohash_hasher::IntMap;
use tracing::info;

use crate::communication::ProcessGroup;
use crate::error::Result;
use crate::greeter;

pub fn execute_process<G, W>(group: &G, out: &mut W) -> Result<()>
where
    G: ProcessGroup + ?Sized,
    W: Write + ?Sized,
{
    let rank = group.rank();
    let size = group.size();
    info!("Process #{rank} of {size} has started.");

    greeter::run(group, out)?;

    info!("Process #{rank} of {size} is done.");
    Ok(())
}

/// Have this more complicated join logic, so that threads in the back of the handle vec can also
/// cause the main thread to panic. If ranks failed, the error of the lowest failed rank is
/// returned.
pub fn try_join(mut handles: IntMap<u32, JoinHandle<Result<()>>>) -> Result<()> {
    let mut errors = Vec::new();
    while !handles.is_empty() {
        sleep(Duration::from_millis(10)); // test for finished threads regularly
        let mut finished = Vec::new();
        for (rank, handle) in handles.iter() {
            if handle.is_finished() {
                finished.push(*rank);
            }
        }
        for rank in finished {
            if let Some(handle) = handles.remove(&rank) {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| panic!("Error in thread of process #{rank}"));
                if let Err(e) = result {
                    errors.push((rank, e));
                }
            }
        }
    }

    errors.sort_by_key(|(rank, _)| *rank);
    match errors.into_iter().next() {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}
