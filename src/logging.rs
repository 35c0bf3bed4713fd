use std::io;
use std::path::Path;

use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, registry};

use crate::config::{Config, Logging};

// This is a helper struct to store the logger guards. When they are dropped, the log file is
// flushed and the previous subscriber is restored.
#[allow(dead_code)]
pub struct LogGuards {
    log_guard: Option<WorkerGuard>,
    default: DefaultGuard,
}

/// Console output only. Everything goes to stderr, stdout is reserved for the greetings.
pub fn init_console_logging_thread_local() -> DefaultGuard {
    let collector = registry().with(
        fmt::Layer::new()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::INFO),
    );
    tracing::subscriber::set_default(collector)
}

/// Sets up logging for the calling thread of process `rank`. With `Logging::Info` every process
/// writes `log_process_<rank>.txt` into the output directory; only rank 0 logs to the console.
pub fn init_logging(config: &Config, rank: u32) -> LogGuards {
    let dir = Path::new(&config.output.output_dir);

    let (log_layer, log_guard) = if Logging::Info == config.output.logging {
        let log_file_name = format!("log_process_{rank}.txt");
        let log_file_appender = rolling::never(dir, log_file_name);
        let (log_file, log_guard) = non_blocking(log_file_appender);
        let layer = fmt::Layer::new()
            .with_writer(log_file)
            .json()
            .with_ansi(false)
            .with_filter(LevelFilter::INFO);
        (Some(layer), Some(log_guard))
    } else {
        (None, None)
    };

    let console_layer = (rank == 0).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::INFO)
    });

    // Add `Optional`s. If None, then the corresponding layer is not added.
    let collector = registry().with(log_layer).with(console_layer);
    let default = tracing::subscriber::set_default(collector);

    LogGuards { log_guard, default }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tracing::info;

    use crate::config::{Config, Logging};
    use crate::logging::init_logging;

    fn config_in(dir: &std::path::Path, logging: Logging) -> Config {
        let mut config = Config::default();
        config.output.output_dir = dir.to_str().unwrap().to_string();
        config.output.logging = logging;
        config
    }

    #[test]
    #[serial]
    fn info_writes_file_per_process() {
        let dir = tempfile::tempdir().unwrap();
        let guards = init_logging(&config_in(dir.path(), Logging::Info), 3);
        info!("Process #3 says hello to the log file.");
        drop(guards);

        let content = fs::read_to_string(dir.path().join("log_process_3.txt")).unwrap();
        assert!(content.contains("Process #3 says hello to the log file."));
    }

    #[test]
    #[serial]
    fn none_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let guards = init_logging(&config_in(dir.path(), Logging::None), 0);
        info!("Only on the console.");
        drop(guards);

        assert!(!dir.path().join("log_process_0.txt").exists());
    }
}
