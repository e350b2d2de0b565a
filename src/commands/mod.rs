//! CLI command implementations
//!
//! `dump` only parses the image. `read` and `check` build a simulated bus,
//! attach the emulated peripheral and drive one READ transaction through it
//! with the bitbang master, all on a current-thread runtime.

mod check;
mod dump;
mod read;

pub use check::run_check;
pub use dump::run_dump;
pub use read::run_read;

use indicatif::{ProgressBar, ProgressStyle};
use spivip_core::bus::{self, DELTA_CYCLES};
use spivip_core::image::MemoryImage;
use spivip_core::spi::opcodes;
use spivip_core::supervisor::Peripheral;
use spivip_core::PeripheralConfig;
use spivip_master::bitbang::single;
use spivip_master::{SimMaster, SimMasterConfig};
use std::sync::Arc;

use crate::cli::{HeaderIdleArg, TransactionArgs};

/// Build the peripheral configuration from command-line options
fn peripheral_config(args: &TransactionArgs) -> PeripheralConfig {
    let header_idle = match args.header_idle {
        HeaderIdleArg::Released => spivip_core::HeaderIdle::Released,
        HeaderIdleArg::Driven => spivip_core::HeaderIdle::Driven,
    };
    PeripheralConfig { header_idle }
}

/// Create a byte-count progress bar
fn create_progress_bar(total: u64) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Run one READ transaction of `count` bytes against a fresh peripheral
fn simulate_read(
    image: Arc<MemoryImage>,
    config: PeripheralConfig,
    address: u32,
    count: usize,
    pb: &ProgressBar,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (master_port, slave_port) = bus::spi_bus();
        let peripheral = Peripheral::new(image, slave_port, config).spawn();
        bus::settle(DELTA_CYCLES).await;
        let mut master = SimMaster::new(master_port, SimMasterConfig::default());

        master.begin().await;
        let res = read_stream(&mut master, address, count, pb).await;
        master.end().await;

        // Dropping the master closes the bus and stops the peripheral
        drop(master);
        peripheral.await??;
        res
    })
}

async fn read_stream(
    master: &mut SimMaster,
    address: u32,
    count: usize,
    pb: &ProgressBar,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    master.send_header(opcodes::READ, address).await?;
    let mut data = Vec::with_capacity(count);
    for _ in 0..count {
        data.push(single::read_byte(master).await?);
        pb.inc(1);
    }
    Ok(data)
}

/// Print bytes as a hex dump labelled with their image addresses
fn print_bytes(start: u8, data: &[u8]) {
    for (row, chunk) in data.chunks(16).enumerate() {
        let addr = start.wrapping_add((row * 16) as u8);
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:02X}: {}", addr, hex.join(" "));
    }
}
