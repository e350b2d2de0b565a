//! Streamed read from the memory image

use core::convert::Infallible;

use crate::bus::{self, DataLines};
use crate::error::Result;
use crate::image::MemoryImage;
use crate::transaction::DecodedHeader;

/// Stream image bytes from the header's address until cancelled
///
/// Waits half a clock after the header, then drives one bit per falling
/// edge, MSB first. Output enable is dropped after the eighth bit of each
/// byte and raised again with the first bit of the next, in the same step,
/// so the drop is deliberately zero-width and bytes follow each other every
/// 8 clocks. The address wraps from 0xFF to 0x00. Never returns except on
/// error.
pub async fn stream(
    header: &DecodedHeader,
    image: &MemoryImage,
    lines: &mut DataLines,
) -> Result<Infallible> {
    let mut cursor = header.start_address();
    bus::falling(&mut lines.sck).await?;

    loop {
        let byte = image.read(cursor)?;
        for bit in (0..8).rev() {
            let level = (byte >> bit) & 1 != 0;
            lines.miso.drive(level);
            log::trace!("MISO = {}", level as u8);
            bus::falling(&mut lines.sck).await?;
        }
        lines.miso.set_enable(false);

        log::debug!("finished reading address 0x{:02X} data = 0x{:02X}", cursor, byte);
        cursor = cursor.wrapping_add(1);
    }
}
