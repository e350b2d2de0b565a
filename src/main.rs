//! spivip - SPI read-memory peripheral emulator
//!
//! Emulates a SPI memory that answers READ (`0x03`) by streaming bytes of a
//! 256-byte image until chip select is released, for checking SPI bus
//! masters without real hardware.
//!
//! # Architecture
//!
//! - `spivip-core` holds the memory image, the simulated bus lines and the
//!   transaction state machine
//! - `spivip-master` is a bitbang master that drives the simulated bus
//!
//! The commands here wire the two together on a current-thread runtime.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG still overrides the verbosity flag
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Dump { image } => commands::run_dump(&image),
        Commands::Read { args } => commands::run_read(&args),
        Commands::Check { args } => commands::run_check(&args),
    }
}
