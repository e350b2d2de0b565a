//! Error types for spivip-core

use thiserror::Error;

/// Reasons a line of a memory-image description is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// `@` marker without a valid hexadecimal address
    #[error("invalid address marker '@{0}'")]
    InvalidMarker(String),

    /// Marker address does not fit in the 256-byte image
    ///
    /// Markers are rejected here, not wrapped like data running past 0xFF.
    #[error("address 0x{0:X} is outside the 256-byte image")]
    AddressOutOfRange(u32),

    /// A digit pair that is not hexadecimal
    #[error("invalid hex byte '{0}'")]
    InvalidByte(String),

    /// Data line ends with half a byte
    #[error("odd number of hex digits")]
    OddDigitCount,
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Memory-image description is malformed
    #[error("line {line}: {source}")]
    Format {
        /// 1-based line number in the description
        line: usize,
        /// What was wrong with it
        #[source]
        source: FormatError,
    },

    /// Read of an address the loader never populated
    #[error("read of uninitialized address 0x{0:02X}")]
    UninitializedAddress(u8),

    /// Every driver of the bus has gone away
    #[error("SPI bus closed")]
    BusClosed,

    /// Failed to read a memory-image file
    #[error("failed to read image '{path}': {source}")]
    Io {
        /// File that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
