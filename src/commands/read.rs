//! Read command implementation

use spivip_core::image::MemoryImage;
use std::sync::Arc;

use super::{create_progress_bar, peripheral_config, print_bytes, simulate_read};
use crate::cli::TransactionArgs;

/// Run the read command
pub fn run_read(args: &TransactionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let image = Arc::new(MemoryImage::from_file(&args.image)?);
    let config = peripheral_config(args);

    let pb = create_progress_bar(args.count as u64)?;
    let data = simulate_read(image, config, args.address, args.count, &pb);
    pb.finish_and_clear();
    let data = data?;

    println!("Read {} bytes from 0x{:06X}", data.len(), args.address);
    print_bytes(args.address as u8, &data);
    Ok(())
}
