use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clap::Parser;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{GreeterError, Result};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// Optional yaml file with `partitioning` and `output` sections
    #[arg(long, short)]
    pub config_path: Option<String>,
    #[arg(long, short)]
    pub num_parts: Option<u32>,
    #[arg(long, short)]
    pub output_dir: Option<String>,
}

#[derive(Serialize, Deserialize, Builder, Debug, Clone, PartialEq, Default)]
#[builder(default)]
pub struct Config {
    #[serde(default)]
    pub partitioning: Partitioning,
    #[serde(default)]
    pub output: Output,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Partitioning {
    pub num_parts: u32,
}

impl Default for Partitioning {
    fn default() -> Self {
        Partitioning { num_parts: 1 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Output {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: default_output_dir(),
            logging: Logging::default(),
        }
    }
}

fn default_output_dir() -> String {
    "./".to_string()
}

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default. `Info` writes a log file per process.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Logging {
    #[default]
    None,
    Info,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            GreeterError::Config(format!(
                "Failed to open config file at {path:?}. Original error was {e}"
            ))
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| {
            GreeterError::Config(format!(
                "Failed to parse config at {path:?}. Original error was: {e}"
            ))
        })
    }

    /// Loads the config file if one is given and lets command line values take precedence.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self> {
        let mut config = match &args.config_path {
            Some(path) => Config::from_file(Path::new(path))?,
            None => Config::default(),
        };
        if let Some(num_parts) = args.num_parts {
            config.partitioning.num_parts = num_parts;
        }
        if let Some(output_dir) = &args.output_dir {
            config.output.output_dir = output_dir.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.partitioning.num_parts == 0 {
            return Err(GreeterError::Config(
                "partitioning.num_parts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
