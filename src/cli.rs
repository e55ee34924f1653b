//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Job Wrecker - Convert Jenkins job XML to Jenkins Job Builder YAML
#[derive(Parser, Debug)]
#[command(name = "job-wrecker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a job definition file or a directory of jobs
    Convert(commands::convert::ConvertArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .init();

        match self.command {
            Commands::Convert(args) => commands::convert::execute(args),
        }
    }
}
