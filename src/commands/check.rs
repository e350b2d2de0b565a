//! Check command implementation
//!
//! Reads through the bus and compares every byte against a direct image
//! read of the address the stream should have reached, wraparound included.

use spivip_core::image::MemoryImage;
use std::sync::Arc;
use thiserror::Error;

use super::{create_progress_bar, peripheral_config, simulate_read};
use crate::cli::TransactionArgs;

/// Bytes read over the bus did not match the image
#[derive(Debug, Error)]
#[error("{mismatches} of {count} bytes differ from the image")]
pub struct CheckError {
    mismatches: usize,
    count: usize,
}

/// Run the check command
pub fn run_check(args: &TransactionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let image = MemoryImage::from_file(&args.image)?;
    let start = args.address as u8;
    let expected = (0..args.count)
        .map(|i| image.read(start.wrapping_add(i as u8)))
        .collect::<Result<Vec<u8>, _>>()?;

    let pb = create_progress_bar(args.count as u64)?;
    let actual = simulate_read(
        Arc::new(image),
        peripheral_config(args),
        args.address,
        args.count,
        &pb,
    );
    pb.finish_and_clear();
    let actual = actual?;

    let mismatches = compare(start, &expected, &actual);
    if mismatches > 0 {
        return Err(CheckError {
            mismatches,
            count: args.count,
        }
        .into());
    }

    println!(
        "OK: {} bytes from 0x{:06X} match the image",
        args.count, args.address
    );
    Ok(())
}

/// Print and count differing bytes
fn compare(start: u8, expected: &[u8], actual: &[u8]) -> usize {
    let mut mismatches = 0;
    for (i, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want != got {
            println!(
                "0x{:02X}: expected 0x{:02X}, got 0x{:02X}",
                start.wrapping_add(i as u8),
                want,
                got
            );
            mismatches += 1;
        }
    }
    mismatches + expected.len().abs_diff(actual.len())
}
