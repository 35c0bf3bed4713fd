use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::thread::JoinHandle;

use clap::Parser;
use nohash_hasher::IntMap;
use tracing::{error, info};

use crate::communication::local_communicator::ChannelProcessGroup;
use crate::communication::ProcessGroup;
use crate::config::{CommandLineArgs, Config};
use crate::controller;
use crate::error::Result;
use crate::logging;

/// Starts one thread per rank, connected through channels. Rank 0 writes its greetings to `out`,
/// the other ranks never write anything.
pub fn run_channel<W>(config: &Config, out: W) -> Result<IntMap<u32, JoinHandle<Result<()>>>>
where
    W: Write + Send + 'static,
{
    info!(
        "Starting multithreaded greetings with {} processes.",
        config.partitioning.num_parts
    );
    let comms = ChannelProcessGroup::create_n_2_n(config.partitioning.num_parts);
    let mut out: Option<Box<dyn Write + Send>> = Some(Box::new(out));

    let mut handles = IntMap::default();
    for comm in comms {
        let rank = comm.rank();
        let mut writer: Box<dyn Write + Send> = if comm.is_coordinator() {
            out.take().unwrap_or_else(|| Box::new(io::sink()))
        } else {
            Box::new(io::sink())
        };
        let config = config.clone();

        let handle = thread::Builder::new()
            .name(rank.to_string())
            .spawn(move || {
                let _guards = logging::init_logging(&config, rank);
                controller::execute_process(&comm, &mut writer)
            })?;
        handles.insert(rank, handle);
    }

    Ok(handles)
}

pub fn run_channel_from_args() -> Result<()> {
    let _guard = logging::init_console_logging_thread_local();
    let args = CommandLineArgs::parse();

    let result = Config::from_args(&args).and_then(|config| {
        fs::create_dir_all(Path::new(&config.output.output_dir))?;
        let handles = run_channel(&config, io::stdout())?;
        controller::try_join(handles)
    });

    if let Err(e) = &result {
        error!("Greetings failed: {e}");
    }
    result
}
