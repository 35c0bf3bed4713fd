use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use tracing::{error, info};

use crate::communication::mpi_communicator::MpiProcessGroup;
use crate::communication::ProcessGroup;
use crate::config::{CommandLineArgs, Config};
use crate::controller;
use crate::error::{GreeterError, Result};
use crate::logging;

/// Runs this process as one rank of an MPI job (`mpiexec -n <N> mpi_greetings`). MPI is
/// finalized when `universe` goes out of scope. Any failure aborts the whole job.
pub fn run_mpi() -> Result<()> {
    let universe = mpi::initialize()
        .ok_or_else(|| GreeterError::Runtime("MPI has already been initialized".to_string()))?;
    let group = MpiProcessGroup::new(universe.world());
    let rank = group.rank();

    let mut args = CommandLineArgs::parse();
    // override the num part argument, with the number of processes mpi has started.
    args.num_parts = Some(group.size());
    let config = Config::from_args(&args).unwrap_or_else(|e| fail(&group, e));
    if let Err(e) = fs::create_dir_all(Path::new(&config.output.output_dir)) {
        fail(&group, e.into());
    }

    let _guards = logging::init_logging(&config, rank);

    info!(
        "Starting MPI greetings with {} processes",
        config.partitioning.num_parts
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = controller::execute_process(&group, &mut out) {
        fail(&group, e);
    }

    info!("#{} at barrier.", rank);
    group.barrier();
    info!("Process #{} finishing.", rank);
    Ok(())
}

fn fail(group: &MpiProcessGroup, e: GreeterError) -> ! {
    error!("Process #{} failed: {e}", group.rank());
    eprintln!("Process #{} failed: {e}", group.rank());
    group.abort(1)
}
