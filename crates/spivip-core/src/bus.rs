//! Simulated SPI bus lines
//!
//! Every line is a `tokio::sync::watch` channel carrying its current level.
//! Waiting for an edge means waiting for the level to change to the target
//! value; sampling a line is a plain read of its current level.
//!
//! Watch channels only keep the latest value, so two level changes made
//! without the peripheral getting a chance to run collapse into one. A
//! driver must call [`settle`] after every change, the way an HDL simulator
//! runs delta cycles before advancing time. This only holds on a
//! current-thread runtime.
//!
//! Chip select is active low; the clock idles low (mode 0).

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Scheduler yields per [`settle`]
pub const DELTA_CYCLES: usize = 4;

/// State of the data-out line
///
/// `enabled` is the tri-state control: when it is false the line is not
/// driven and `data` carries no meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Miso {
    /// Output enable
    pub enabled: bool,
    /// Driven value
    pub data: bool,
}

impl Miso {
    /// The driven level, or `None` while high-impedance
    pub fn level(&self) -> Option<bool> {
        self.enabled.then_some(self.data)
    }
}

/// Peripheral side handle for the data-out line
#[derive(Debug)]
pub struct MisoDriver {
    tx: watch::Sender<Miso>,
}

impl MisoDriver {
    /// Set the output enable
    pub fn set_enable(&self, enabled: bool) {
        self.tx.send_modify(|miso| miso.enabled = enabled);
    }

    /// Set the driven value without touching the output enable
    pub fn set_data(&self, data: bool) {
        self.tx.send_modify(|miso| miso.data = data);
    }

    /// Enable the output and drive `data`
    pub fn drive(&self, data: bool) {
        self.set_enable(true);
        self.set_data(data);
    }
}

/// Lines used by a transaction: clock, data-in and data-out
#[derive(Debug)]
pub struct DataLines {
    /// Serial clock
    pub sck: watch::Receiver<bool>,
    /// Data in (master out)
    pub mosi: watch::Receiver<bool>,
    /// Data out (master in)
    pub miso: MisoDriver,
}

/// Peripheral side of the bus
#[derive(Debug)]
pub struct SlavePort {
    /// Chip select, active low
    pub cs: watch::Receiver<bool>,
    /// Transaction-scoped lines
    pub data: DataLines,
}

/// Bus-master side of the bus
#[derive(Debug)]
pub struct MasterPort {
    /// Chip select level (high = released)
    pub cs: watch::Sender<bool>,
    /// Serial clock level
    pub sck: watch::Sender<bool>,
    /// Data-in level
    pub mosi: watch::Sender<bool>,
    /// Data-out state as driven by the peripheral
    pub miso: watch::Receiver<Miso>,
}

/// Create a bus at its idle levels
///
/// Chip select released (high), clock low, data-in low, data-out disabled.
pub fn spi_bus() -> (MasterPort, SlavePort) {
    let (cs_tx, cs_rx) = watch::channel(true);
    let (sck_tx, sck_rx) = watch::channel(false);
    let (mosi_tx, mosi_rx) = watch::channel(false);
    let (miso_tx, miso_rx) = watch::channel(Miso::default());

    let master = MasterPort {
        cs: cs_tx,
        sck: sck_tx,
        mosi: mosi_tx,
        miso: miso_rx,
    };
    let slave = SlavePort {
        cs: cs_rx,
        data: DataLines {
            sck: sck_rx,
            mosi: mosi_rx,
            miso: MisoDriver { tx: miso_tx },
        },
    };
    (master, slave)
}

/// Drive a line to `level`, notifying waiters only on an actual change
pub fn drive(line: &watch::Sender<bool>, level: bool) {
    line.send_if_modified(|current| {
        if *current == level {
            false
        } else {
            *current = level;
            true
        }
    });
}

/// Wait for the line to go from `!level` to `level`
///
/// The level at the time of the call is the starting point; earlier
/// changes are not remembered.
async fn edge(line: &mut watch::Receiver<bool>, level: bool) -> Result<()> {
    let mut prev = *line.borrow_and_update();
    loop {
        line.changed().await.map_err(|_| Error::BusClosed)?;
        let now = *line.borrow_and_update();
        if now == level && prev != level {
            return Ok(());
        }
        prev = now;
    }
}

/// Wait for the next rising edge
pub async fn rising(line: &mut watch::Receiver<bool>) -> Result<()> {
    edge(line, true).await
}

/// Wait for the next falling edge
pub async fn falling(line: &mut watch::Receiver<bool>) -> Result<()> {
    edge(line, false).await
}

/// Sample the current level of a line
pub fn sample(line: &watch::Receiver<bool>) -> bool {
    *line.borrow()
}

/// Let every task woken by the last level change run to its next wait
pub async fn settle(cycles: usize) {
    for _ in 0..cycles {
        tokio::task::yield_now().await;
    }
}
