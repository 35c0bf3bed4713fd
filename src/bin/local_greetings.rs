use std::process::ExitCode;

use mpi_greetings::controller::local_controller;

fn main() -> ExitCode {
    match local_controller::run_channel_from_args() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
