//! A single chip-select scoped transaction
//!
//! A transaction decodes the header and, for READ, streams the image. All
//! of its state lives in the future returned by [`run`]; the supervisor
//! cancels a transaction by dropping that future, so nothing carries over
//! into the next one.

mod decoder;
mod stream;

pub use decoder::{decode, DecodedHeader};
pub use stream::stream;

use tokio::sync::watch;

use crate::bus::DataLines;
use crate::config::PeripheralConfig;
use crate::error::Result;
use crate::image::MemoryImage;
use crate::spi::opcodes;

/// Transaction state as seen from outside
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Chip select released
    #[default]
    Idle,
    /// Receiving command and address, or parked on an unsupported command
    Decoding,
    /// Driving image bytes
    Streaming,
}

/// Run one transaction
///
/// Returns `Ok(())` only when the command is not READ: the transaction then
/// has nothing left to do and the caller waits for chip select release.
/// A READ transaction streams until the future is dropped.
pub async fn run(
    image: &MemoryImage,
    lines: &mut DataLines,
    config: &PeripheralConfig,
    phase: &watch::Sender<Phase>,
) -> Result<()> {
    let header = decode(lines, config.header_idle).await?;
    if !header.is_read() {
        log::info!(
            "unsupported command 0x{:02X} ({}), data-out stays idle",
            header.command,
            opcodes::name(header.command).unwrap_or("unknown")
        );
        return Ok(());
    }

    log::debug!("streaming from address 0x{:02X}", header.start_address());
    phase.send_replace(Phase::Streaming);
    match stream(&header, image, lines).await? {}
}
