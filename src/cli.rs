//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "spivip")]
#[command(author, version, about = "SPI read-memory peripheral emulator", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Data-out behaviour during the command/address phase
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum HeaderIdleArg {
    /// Output disabled until data is streamed
    #[default]
    Released,
    /// Output enabled and driven low during the header
    Driven,
}

/// Transaction options shared by the simulating commands
#[derive(clap::Args, Debug, Clone)]
pub struct TransactionArgs {
    /// Memory image (address-annotated hex)
    pub image: PathBuf,

    /// Start address (hex with 0x prefix, or decimal), 24 bits
    #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
    pub address: u32,

    /// Number of bytes to read
    #[arg(short, long, default_value_t = 4)]
    pub count: usize,

    /// Data-out behaviour while the header is received
    #[arg(long, value_enum, default_value_t = HeaderIdleArg::Released)]
    pub header_idle: HeaderIdleArg,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a memory image and print it as a hex dump
    Dump {
        /// Memory image (address-annotated hex)
        image: PathBuf,
    },

    /// Run one READ transaction against the emulated peripheral
    Read {
        #[command(flatten)]
        args: TransactionArgs,
    },

    /// Read through the bus and compare with the image contents
    Check {
        #[command(flatten)]
        args: TransactionArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0xFF").unwrap(), 0xFF);
        assert_eq!(parse_hex_u32("0X10").unwrap(), 0x10);
        assert_eq!(parse_hex_u32("42").unwrap(), 42);
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("abc").is_err());
    }

    #[test]
    fn test_parse_read() {
        let cli = Cli::try_parse_from([
            "spivip",
            "read",
            "mem.hex",
            "--address",
            "0xFF",
            "--count",
            "2",
            "--header-idle",
            "driven",
        ])
        .unwrap();
        match cli.command {
            Commands::Read { args } => {
                assert_eq!(args.address, 0xFF);
                assert_eq!(args.count, 2);
                assert!(matches!(args.header_idle, HeaderIdleArg::Driven));
            }
            _ => panic!("expected read"),
        }
    }
}
