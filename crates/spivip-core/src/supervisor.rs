//! Chip-select driven transaction loop
//!
//! The peripheral waits for chip select to fall, then races the
//! transaction against chip select rising again. The race is biased toward
//! chip select, so once it rises the transaction future is dropped before it
//! gets past another edge, whatever it was in the middle of. Output enable
//! is left exactly as the transaction last set it. With
//! [`HeaderIdle::Released`] it is cleared again when the next transaction
//! starts, so a stream cut off mid-byte cannot drive into the next header.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bus::{self, SlavePort};
use crate::config::{HeaderIdle, PeripheralConfig};
use crate::error::{Error, Result};
use crate::image::MemoryImage;
use crate::transaction::{self, Phase};

/// Emulated SPI memory peripheral
pub struct Peripheral {
    image: Arc<MemoryImage>,
    port: SlavePort,
    config: PeripheralConfig,
    phase: watch::Sender<Phase>,
}

impl Peripheral {
    /// Attach a peripheral serving `image` to the bus
    pub fn new(image: Arc<MemoryImage>, port: SlavePort, config: PeripheralConfig) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            image,
            port,
            config,
            phase,
        }
    }

    /// Subscribe to transaction phase changes
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Spawn [`Peripheral::run`] on the current runtime
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    /// Serve transactions until the bus master goes away
    ///
    /// Returns `Ok(())` once every bus driver has been dropped.
    pub async fn run(self) -> Result<()> {
        let Peripheral {
            image,
            port,
            config,
            phase,
        } = self;
        let SlavePort { mut cs, mut data } = port;

        loop {
            if !open(bus::falling(&mut cs).await)? {
                return Ok(());
            }
            log::info!("chip select asserted, transaction started");
            phase.send_replace(Phase::Decoding);
            if config.header_idle == HeaderIdle::Released {
                data.miso.set_enable(false);
            }

            let finished = tokio::select! {
                biased;
                edge = bus::rising(&mut cs) => {
                    if !open(edge)? {
                        return Ok(());
                    }
                    None
                }
                res = transaction::run(&image, &mut data, &config, &phase) => Some(res),
            };

            if let Some(res) = finished {
                match res {
                    Ok(()) => {}
                    Err(Error::BusClosed) => return Ok(()),
                    Err(e) => log::error!("transaction stopped: {}", e),
                }
                if !open(bus::rising(&mut cs).await)? {
                    return Ok(());
                }
            }

            phase.send_replace(Phase::Idle);
            log::info!("chip select released, transaction cancelled");
        }
    }
}

/// `Ok(false)` when the bus has been closed
fn open(res: Result<()>) -> Result<bool> {
    match res {
        Ok(()) => Ok(true),
        Err(Error::BusClosed) => Ok(false),
        Err(e) => Err(e),
    }
}
