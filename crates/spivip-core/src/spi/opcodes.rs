//! Standard JEDEC SPI memory opcodes
//!
//! Only [`READ`] is served; everything else decodes to a transaction that
//! never drives the data-out line.

/// Read Data - 3-byte address, streams until chip select is released
pub const READ: u8 = 0x03;

// ============================================================================
// Recognised but unsupported
// ============================================================================

/// Write Status Register 1
pub const WRSR: u8 = 0x01;
/// Page Program
pub const PP: u8 = 0x02;
/// Write Disable
pub const WRDI: u8 = 0x04;
/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Write Enable
pub const WREN: u8 = 0x06;
/// Fast Read (with dummy byte)
pub const FAST_READ: u8 = 0x0B;
/// Sector Erase 4 KiB
pub const SE_20: u8 = 0x20;
/// Chip Erase
pub const CE_C7: u8 = 0xC7;
/// Block Erase 64 KiB
pub const BE_D8: u8 = 0xD8;
/// Read JEDEC ID
pub const RDID: u8 = 0x9F;
/// Release from Deep Power Down
pub const RES: u8 = 0xAB;

/// Number of address bits following the opcode
pub const ADDRESS_BITS: u32 = 24;

/// Mnemonic for a known opcode, used in log messages
pub fn name(opcode: u8) -> Option<&'static str> {
    Some(match opcode {
        READ => "READ",
        WRSR => "WRSR",
        PP => "PP",
        WRDI => "WRDI",
        RDSR => "RDSR",
        WREN => "WREN",
        FAST_READ => "FAST_READ",
        SE_20 => "SE",
        CE_C7 => "CE",
        BE_D8 => "BE",
        RDID => "RDID",
        RES => "RES",
        _ => return None,
    })
}
