//! Flat 256-byte memory image served by the peripheral
//!
//! Images are described in the address-annotated hex format produced by
//! `objcopy -O verilog` and consumed by `$readmemh`:
//!
//! ```text
//! @0000
//! DE AD BE EF
//! @0080
//! 0102 0304   // comment
//! ```
//!
//! A `@` line moves the write cursor. Every other line is a run of hex digit
//! pairs, whitespace ignored, each pair stored at the cursor before it
//! advances by one. The cursor wraps from 0xFF back to 0x00.

use core::fmt;
use std::path::Path;

use crate::error::{Error, FormatError, Result};

/// Number of addressable bytes
pub const IMAGE_SIZE: usize = 256;

/// Byte-addressable memory image
///
/// Addresses are `u8`, so indexing can never leave the image. Cells the
/// loader never wrote stay unpopulated and reading them is an error.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryImage {
    cells: [Option<u8>; IMAGE_SIZE],
}

impl MemoryImage {
    /// Create an image with no populated addresses
    pub fn new() -> Self {
        Self {
            cells: [None; IMAGE_SIZE],
        }
    }

    /// Create an image holding `data` starting at `base`, wrapping at the top
    pub fn from_bytes(base: u8, data: &[u8]) -> Self {
        let mut image = Self::new();
        let mut cursor = base;
        for &byte in data {
            image.write(cursor, byte);
            cursor = cursor.wrapping_add(1);
        }
        image
    }

    /// Parse a memory-image description
    ///
    /// Fails on the first malformed line; no partial image is returned.
    pub fn load(description: &str) -> Result<Self> {
        let mut image = Self::new();
        let mut cursor = 0u8;

        for (idx, raw) in description.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            let at_line = |source| Error::Format {
                line: idx + 1,
                source,
            };

            if let Some(marker) = line.strip_prefix('@') {
                cursor = parse_marker(marker).map_err(at_line)?;
                log::trace!("line {}: cursor moved to 0x{:02X}", idx + 1, cursor);
                continue;
            }

            let digits: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if digits.len() % 2 != 0 {
                return Err(at_line(FormatError::OddDigitCount));
            }
            for pair in digits.chunks(2) {
                let byte = parse_pair(pair[0], pair[1]).map_err(at_line)?;
                image.write(cursor, byte);
                cursor = cursor.wrapping_add(1);
            }
        }

        log::debug!("loaded image with {} populated bytes", image.populated());
        Ok(image)
    }

    /// Read and parse a memory-image file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(&text)
    }

    /// Store a byte
    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[address as usize] = Some(value);
    }

    /// Read a byte, failing if the address was never written
    pub fn read(&self, address: u8) -> Result<u8> {
        self.get(address)
            .ok_or(Error::UninitializedAddress(address))
    }

    /// Read a byte if it is populated
    pub fn get(&self, address: u8) -> Option<u8> {
        self.cells[address as usize]
    }

    /// Number of populated addresses
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over populated `(address, byte)` pairs in address order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(addr, cell)| cell.map(|byte| (addr as u8, byte)))
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryImage")
            .field("populated", &self.populated())
            .finish()
    }
}

/// Hex dump, 16 bytes per row, `--` for unpopulated cells
impl fmt::Display for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(16).enumerate() {
            if cells.iter().all(Option::is_none) {
                continue;
            }
            write!(f, "{:02X}:", row * 16)?;
            for cell in cells {
                match cell {
                    Some(byte) => write!(f, " {:02X}", byte)?,
                    None => write!(f, " --")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Markers must address the 256-byte image directly; unlike a run of data
/// crossing 0xFF, they are not reduced modulo 256.
fn parse_marker(marker: &str) -> core::result::Result<u8, FormatError> {
    let marker = marker.trim();
    if marker.is_empty() || !marker.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FormatError::InvalidMarker(marker.to_string()));
    }
    let address = u32::from_str_radix(marker, 16)
        .map_err(|_| FormatError::InvalidMarker(marker.to_string()))?;
    u8::try_from(address).map_err(|_| FormatError::AddressOutOfRange(address))
}

fn parse_pair(hi: char, lo: char) -> core::result::Result<u8, FormatError> {
    match (hi.to_digit(16), lo.to_digit(16)) {
        (Some(h), Some(l)) => Ok((h << 4 | l) as u8),
        _ => Err(FormatError::InvalidByte(format!("{}{}", hi, lo))),
    }
}
