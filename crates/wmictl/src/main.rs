#![warn(missing_docs)]

//! Entry point for the `wmictl` binary.

mod check;
mod cli;
mod decode;
mod error;
mod simulate;

use std::process;

use clap::Parser;
use tracing::error;

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log);

    match command {
        Commands::Decode(args) => decode::run(&args),
        Commands::Check(args) => check::run(&args),
        Commands::Simulate(args) => simulate::run(&args),
    }
}
