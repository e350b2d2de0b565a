//! spivip-master - Simulated bitbang SPI master
//!
//! Drives a [`spivip_core::bus`] from the master side: chip select, clock
//! and data-in are set directly and data-out is sampled after each rising
//! edge (SPI mode 0). Every level change is followed by a settle so the
//! peripheral sees each edge.
//!
//! # Example
//!
//! ```ignore
//! use spivip_master::{SimMaster, SimMasterConfig};
//!
//! let (master_port, slave_port) = spivip_core::bus::spi_bus();
//! // attach a peripheral to `slave_port`
//! let mut master = SimMaster::new(master_port, SimMasterConfig::default());
//! let mut buf = [0u8; 4];
//! master.read(0x000000, &mut buf).await?;
//! ```

#![warn(missing_docs)]
// Bitbang traits are only used with concrete types, never as trait objects
#![allow(async_fn_in_trait)]

pub mod bitbang;
mod device;
mod error;

pub use bitbang::BitbangSpi;
pub use device::{SimMaster, SimMasterConfig};
pub use error::{MasterError, Result};
