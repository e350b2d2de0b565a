//! SPI command definitions
//!
//! The peripheral only implements READ, but the other common JEDEC opcodes
//! are named so an unsupported command can be reported by name.

pub mod opcodes;

pub use opcodes::*;
