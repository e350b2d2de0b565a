//! Error types for the simulated master

use thiserror::Error;

/// Simulated master errors
#[derive(Debug, Error)]
pub enum MasterError {
    /// Data-out was not enabled when a bit was sampled
    #[error("data-out not driven when sampling bit {bit}")]
    Floating {
        /// Bit position within the byte, 7 = MSB
        bit: u8,
    },

    /// Address does not fit the 3-byte address field
    #[error("address 0x{0:X} does not fit in 24 bits")]
    AddressTooWide(u32),
}

/// Result type for simulated master operations
pub type Result<T> = std::result::Result<T, MasterError>;
