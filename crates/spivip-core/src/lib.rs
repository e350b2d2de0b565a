//! spivip-core - SPI read-memory peripheral model
//!
//! This crate models a SPI peripheral that answers a single READ (`0x03`)
//! command by streaming bytes of a 256-byte memory image, clocked by an
//! external bus master. A transaction lives exactly as long as chip select
//! is asserted: releasing chip select cancels it at whatever bit it has
//! reached.
//!
//! # Layout
//!
//! - [`image`] - the flat memory image and its `@address` hex loader
//! - [`bus`] - simulated signal lines and edge waits
//! - [`transaction`] - header decoding and the streamed read
//! - [`supervisor`] - the chip-select driven transaction loop
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use spivip_core::{bus, image::MemoryImage, supervisor::Peripheral, PeripheralConfig};
//!
//! let image = Arc::new(MemoryImage::load("@0000\nDEAD BEEF")?);
//! let (master_port, slave_port) = bus::spi_bus();
//! let peripheral = Peripheral::new(image, slave_port, PeripheralConfig::default());
//! tokio::spawn(peripheral.run());
//! // drive `master_port` from a bus master
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod config;
pub mod error;
pub mod image;
pub mod spi;
pub mod supervisor;
pub mod transaction;

pub use config::{HeaderIdle, PeripheralConfig};
pub use error::{Error, FormatError, Result};
