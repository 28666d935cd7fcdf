// Command-line flags of the `hauler` worker

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use hauler_core::domain::{Concurrency, QueueSpec};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "hauler")]
#[command(about = "Runs background job processors for a host application", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Queue to process, repeated WEIGHT times (may be given many times)
    #[arg(short = 'q', long = "queue", value_name = "NAME[,WEIGHT]")]
    pub queues: Vec<QueueSpec>,

    /// Print more verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Queue store locator (e.g. sqlite://hauler.db)
    #[arg(short, long, value_name = "LOCATOR")]
    pub server: Option<String>,

    /// Host application environment
    #[arg(short, long, value_name = "ENV")]
    pub environment: Option<String>,

    /// Location of the host application root
    #[arg(short, long, value_name = "PATH")]
    pub rails: Option<PathBuf>,

    /// Processor threads to use
    #[arg(short, long, value_name = "INT", allow_negative_numbers = true)]
    pub concurrency: Option<Concurrency>,

    /// Seconds to wait for processors to halt (default: forever)
    #[arg(short = 't', long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Write the process id to this file
    #[arg(short = 'P', long, value_name = "PATH")]
    pub pidfile: Option<PathBuf>,

    /// Log to this file instead of stdout
    #[arg(short = 'L', long, value_name = "PATH")]
    pub logfile: Option<PathBuf>,

    /// TOML file with default settings
    #[arg(short = 'C', long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Exit status for a parse outcome that ends the process.
///
/// Help exits 1 so scripts treat `-h` like a usage error; `--version` exits 0.
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp => 1,
        _ => err.exit_code(),
    }
}

impl Cli {
    /// Parse process arguments, exiting on help, version and malformed input
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => {
                let _ = err.print();
                std::process::exit(exit_code(&err));
            }
        }
    }

    /// Full usage text
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
