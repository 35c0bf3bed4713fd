#[cfg(feature = "mpi")]
use mpi_greetings::controller::mpi_controller;

#[cfg(feature = "mpi")]
fn main() -> mpi_greetings::Result<()> {
    mpi_controller::run_mpi()
}
