//! Command-line interface definitions for wmictl.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `wmictl` binary.
#[derive(Parser, Debug)]
#[command(
    name = "wmictl",
    about = "Inspect WMI block directories and exercise hotkey schemes",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Which command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a `_WDG` directory blob and print its blocks as JSON.
    Decode(DecodeArgs),
    /// Load and validate a hotkey configuration file.
    Check(CheckArgs),
    /// Deliver notifications to a simulated device and print the resulting daemon messages.
    Simulate(SimulateArgs),
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// File holding the raw directory blob.
    #[arg(value_name = "BLOB")]
    pub path: PathBuf,

    /// Treat the file as hex text instead of raw bytes (whitespace ignored).
    #[arg(long)]
    pub hex: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Configuration file (RON).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the validated configuration as JSON.
    #[arg(long)]
    pub dump: bool,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Firmware image (RON) describing the simulated device.
    #[arg(long, value_name = "PATH")]
    pub firmware: PathBuf,

    /// Configuration file (RON).
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the configured bound on service lookups.
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub service_timeout: Option<Duration>,

    /// Print every firmware method call made during the run.
    #[arg(long)]
    pub calls: bool,

    /// Notify ids to deliver, in order (decimal or 0x-prefixed hex).
    #[arg(value_name = "NOTIFY_ID", num_args = 1..)]
    pub notify_ids: Vec<String>,
}
