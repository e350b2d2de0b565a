//! Dump command implementation

use spivip_core::image::{MemoryImage, IMAGE_SIZE};
use std::path::Path;

/// Load an image and print its populated rows
pub fn run_dump(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = MemoryImage::from_file(path)?;
    print!("{}", image);
    println!(
        "{} of {} bytes populated from {:?}",
        image.populated(),
        IMAGE_SIZE,
        path
    );
    Ok(())
}
