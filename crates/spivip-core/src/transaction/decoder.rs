//! Command and address decoding
//!
//! Bits are sampled MSB first on clock rising edges. The first rising edge
//! of the transaction carries the first command bit, and the 24th address
//! bit is sampled on the same edge that delivered it without waiting for
//! another one: 8 edges are awaited for the command but only 23 for the
//! address. The streaming phase relies on that count to line its first
//! falling edge up with the end of the header.

use crate::bus::{self, DataLines};
use crate::config::HeaderIdle;
use crate::error::Result;
use crate::spi::opcodes;

/// Command and address received at the start of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeader {
    /// Opcode
    pub command: u8,
    /// 24-bit address as received
    pub address: u32,
}

impl DecodedHeader {
    /// Whether this is the one command the peripheral serves
    pub fn is_read(&self) -> bool {
        self.command == opcodes::READ
    }

    /// First image address to stream from
    ///
    /// The image has 256 cells; the upper 16 address bits are ignored.
    pub fn start_address(&self) -> u8 {
        (self.address & 0xFF) as u8
    }
}

/// Receive the command byte and the 24-bit address
pub async fn decode(lines: &mut DataLines, idle: HeaderIdle) -> Result<DecodedHeader> {
    bus::rising(&mut lines.sck).await?;
    lines.miso.set_enable(idle == HeaderIdle::Driven);
    lines.miso.set_data(false);

    let mut command = 0u8;
    for _ in 0..8 {
        command = command << 1 | bus::sample(&lines.mosi) as u8;
        bus::rising(&mut lines.sck).await?;
    }
    log::debug!("command = 0x{:02X}", command);

    let mut address = 0u32;
    for bit in 0..opcodes::ADDRESS_BITS {
        address = address << 1 | bus::sample(&lines.mosi) as u32;
        if bit != opcodes::ADDRESS_BITS - 1 {
            bus::rising(&mut lines.sck).await?;
        }
    }
    log::debug!("address = 0x{:06X}", address);

    Ok(DecodedHeader { command, address })
}
