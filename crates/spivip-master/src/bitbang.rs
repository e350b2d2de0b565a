//! Bitbang SPI master trait and single-wire helpers
//!
//! The trait is the minimal set of pin operations needed to bitbang SPI
//! mode 0: the clock idles low, data-in is set while the clock is low and
//! data-out is sampled on the rising edge. The helpers in [`single`] build
//! byte transfers on top of it, MSB first.

/// Low-level bitbang SPI operations
pub trait BitbangSpi {
    /// Set chip select (CS is active low, so `active=true` means CS=0)
    fn set_cs(&mut self, active: bool);

    /// Set clock line value
    fn set_sck(&mut self, high: bool);

    /// Set MOSI line value
    fn set_mosi(&mut self, high: bool);

    /// Get MISO line value, `None` while the peripheral is not driving it
    fn get_miso(&self) -> Option<bool>;

    /// Wait half a clock period
    async fn half_period_delay(&mut self);

    /// Set SCK and MOSI together
    ///
    /// Default implementation calls `set_sck` then `set_mosi`.
    fn set_sck_set_mosi(&mut self, sck: bool, mosi: bool) {
        self.set_sck(sck);
        self.set_mosi(mosi);
    }

    /// Set SCK and sample MISO at the same instant
    ///
    /// Default implementation calls `set_sck` then `get_miso`.
    fn set_sck_get_miso(&mut self, sck: bool) -> Option<bool> {
        self.set_sck(sck);
        self.get_miso()
    }
}

/// Bitbang helper functions for single-wire I/O
pub mod single {
    use super::BitbangSpi;
    use crate::error::{MasterError, Result};

    /// Write the low `count` bits of `value`, MSB first
    ///
    /// Useful for stopping part-way through a byte.
    pub async fn write_bits<M: BitbangSpi + ?Sized>(master: &mut M, value: u32, count: u32) {
        for i in (0..count).rev() {
            let bit = (value >> i) & 1 != 0;
            master.set_sck_set_mosi(false, bit);
            master.half_period_delay().await;
            master.set_sck(true);
            master.half_period_delay().await;
        }
    }

    /// Write a byte (MSB first)
    pub async fn write_byte<M: BitbangSpi + ?Sized>(master: &mut M, byte: u8) {
        write_bits(master, byte as u32, 8).await;
    }

    /// Read a byte (MSB first)
    ///
    /// Fails as soon as a sampled bit finds MISO undriven.
    pub async fn read_byte<M: BitbangSpi + ?Sized>(master: &mut M) -> Result<u8> {
        let mut byte = 0u8;
        for bit in (0..8u8).rev() {
            master.set_sck(false);
            master.half_period_delay().await;
            byte <<= 1;
            match master.set_sck_get_miso(true) {
                Some(true) => byte |= 1,
                Some(false) => {}
                None => return Err(MasterError::Floating { bit }),
            }
            master.half_period_delay().await;
        }
        Ok(byte)
    }

    /// Run clock for a number of cycles without looking at MISO
    pub async fn run_clock<M: BitbangSpi + ?Sized>(master: &mut M, cycles: usize) {
        for _ in 0..cycles {
            master.set_sck(false);
            master.half_period_delay().await;
            master.set_sck(true);
            master.half_period_delay().await;
        }
    }

    /// Write multiple bytes
    pub async fn write_bytes<M: BitbangSpi + ?Sized>(master: &mut M, bytes: &[u8]) {
        for &byte in bytes {
            write_byte(master, byte).await;
        }
    }

    /// Read multiple bytes
    pub async fn read_bytes<M: BitbangSpi + ?Sized>(master: &mut M, buf: &mut [u8]) -> Result<()> {
        for byte in buf.iter_mut() {
            *byte = read_byte(master).await?;
        }
        Ok(())
    }
}
