//! Simulated bus master driving a [`MasterPort`]

use spivip_core::bus::{self, MasterPort, Miso, DELTA_CYCLES};
use spivip_core::spi::opcodes;

use crate::bitbang::{single, BitbangSpi};
use crate::error::{MasterError, Result};

/// Largest address the 3-byte address field can carry
const MAX_ADDRESS: u32 = 0xFF_FFFF;

/// Configuration for the simulated master
#[derive(Debug, Clone)]
pub struct SimMasterConfig {
    /// Scheduler yields per half clock period
    pub settle_cycles: usize,
}

impl Default for SimMasterConfig {
    fn default() -> Self {
        Self {
            settle_cycles: DELTA_CYCLES,
        }
    }
}

/// Bitbang SPI master on a simulated bus
pub struct SimMaster {
    port: MasterPort,
    config: SimMasterConfig,
}

impl SimMaster {
    /// Take the master side of a bus
    pub fn new(port: MasterPort, config: SimMasterConfig) -> Self {
        Self { port, config }
    }

    /// Current state of the data-out line
    pub fn miso(&self) -> Miso {
        *self.port.miso.borrow()
    }

    /// Assert chip select
    pub async fn begin(&mut self) {
        self.set_cs(true);
        self.half_period_delay().await;
    }

    /// Release chip select, then return the clock to idle
    ///
    /// Also the way to abort a transaction at whatever bit it has reached.
    pub async fn end(&mut self) {
        self.set_cs(false);
        self.half_period_delay().await;
        self.set_sck(false);
        self.half_period_delay().await;
    }

    /// Shift out an opcode and a 3-byte address
    pub async fn send_header(&mut self, command: u8, address: u32) -> Result<()> {
        if address > MAX_ADDRESS {
            return Err(MasterError::AddressTooWide(address));
        }
        log::trace!("header: command 0x{:02X} address 0x{:06X}", command, address);
        let [_, hi, mid, lo] = address.to_be_bytes();
        single::write_bytes(self, &[command, hi, mid, lo]).await;
        Ok(())
    }

    /// Complete READ transaction filling `buf`
    ///
    /// Chip select is released even if reading fails.
    pub async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if address > MAX_ADDRESS {
            return Err(MasterError::AddressTooWide(address));
        }
        self.begin().await;
        let res = match self.send_header(opcodes::READ, address).await {
            Ok(()) => single::read_bytes(self, buf).await,
            Err(e) => Err(e),
        };
        self.end().await;

        if res.is_ok() {
            log::debug!("read {} bytes from 0x{:06X}", buf.len(), address);
        }
        res
    }
}

impl BitbangSpi for SimMaster {
    fn set_cs(&mut self, active: bool) {
        bus::drive(&self.port.cs, !active);
    }

    fn set_sck(&mut self, high: bool) {
        bus::drive(&self.port.sck, high);
    }

    fn set_mosi(&mut self, high: bool) {
        bus::drive(&self.port.mosi, high);
    }

    fn get_miso(&self) -> Option<bool> {
        self.miso().level()
    }

    async fn half_period_delay(&mut self) {
        bus::settle(self.config.settle_cycles).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use spivip_core::bus::spi_bus;
    use spivip_core::image::MemoryImage;
    use spivip_core::supervisor::Peripheral;
    use spivip_core::transaction::Phase;
    use spivip_core::{HeaderIdle, PeripheralConfig};
    use tokio::sync::watch;

    async fn attach(
        image: MemoryImage,
        config: PeripheralConfig,
    ) -> (SimMaster, watch::Receiver<Phase>) {
        let (master_port, slave_port) = spi_bus();
        let peripheral = Peripheral::new(Arc::new(image), slave_port, config);
        let phase = peripheral.phase();
        peripheral.spawn();
        // Let the peripheral reach its first chip-select wait
        bus::settle(DELTA_CYCLES).await;
        (SimMaster::new(master_port, SimMasterConfig::default()), phase)
    }

    fn counting_image() -> MemoryImage {
        let data: Vec<u8> = (0..=255u8).map(|b| b.wrapping_mul(7) ^ 0x5A).collect();
        MemoryImage::from_bytes(0, &data)
    }

    async fn read_vec(master: &mut SimMaster, address: u32, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        master.read(address, &mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_read_dead_beef() {
        let image = MemoryImage::load("@0000\nDEAD BEEF").unwrap();
        let (mut master, _) = attach(image, PeripheralConfig::default()).await;
        assert_eq!(read_vec(&mut master, 0x00, 4).await, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[tokio::test]
    async fn test_read_wraps_at_top() {
        let image = MemoryImage::load("@00\n11\n@FF\nEE").unwrap();
        let (mut master, _) = attach(image, PeripheralConfig::default()).await;
        assert_eq!(read_vec(&mut master, 0xFF, 2).await, [0xEE, 0x11]);
    }

    #[tokio::test]
    async fn test_streaming_is_modular() {
        let image = counting_image();
        let (mut master, _) = attach(image.clone(), PeripheralConfig::default()).await;
        for start in [0x00u8, 0x7F, 0xF0] {
            let data = read_vec(&mut master, start as u32, 300).await;
            for (i, byte) in data.iter().enumerate() {
                let addr = start.wrapping_add(i as u8);
                assert_eq!(*byte, image.read(addr).unwrap(), "offset {}", i);
            }
        }
    }

    #[tokio::test]
    async fn test_upper_address_bits_ignored() {
        let (mut master, _) = attach(counting_image(), PeripheralConfig::default()).await;
        let expected = read_vec(&mut master, 0x000034, 3).await;
        assert_eq!(read_vec(&mut master, 0xAB_CD34, 3).await, expected);
    }

    #[tokio::test]
    async fn test_unsupported_command_never_drives() {
        let (mut master, phase) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        single::write_byte(&mut master, opcodes::RDSR).await;
        for i in (0..24).rev() {
            master.set_sck_set_mosi(false, (0x123456 >> i) & 1 != 0);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
            master.set_sck(true);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
        }
        for _ in 0..64 {
            master.set_sck(false);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
            master.set_sck(true);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
        }
        assert!(matches!(
            single::read_byte(&mut master).await,
            Err(MasterError::Floating { bit: 7 })
        ));
        assert_eq!(*phase.borrow(), Phase::Decoding);
        master.end().await;
        assert_eq!(*phase.borrow(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_cancel_after_three_command_bits() {
        let (mut master, phase) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        single::write_bits(&mut master, opcodes::READ as u32 >> 5, 3).await;
        master.end().await;
        assert_eq!(*phase.borrow(), Phase::Idle);
        assert!(!master.miso().enabled);

        assert_eq!(read_vec(&mut master, 0x10, 2).await, read_expected(0x10, 2));
    }

    #[tokio::test]
    async fn test_cancel_before_header_completes() {
        let (mut master, _) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        single::write_byte(&mut master, opcodes::READ).await;
        single::write_bits(&mut master, 0x80, 20).await;
        master.end().await;

        assert_eq!(read_vec(&mut master, 0x80, 4).await, read_expected(0x80, 4));
    }

    #[tokio::test]
    async fn test_cancel_mid_byte() {
        let (mut master, phase) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        master.send_header(opcodes::READ, 0x20).await.unwrap();
        single::read_byte(&mut master).await.unwrap();
        single::run_clock(&mut master, 3).await;
        assert_eq!(*phase.borrow(), Phase::Streaming);
        master.end().await;
        assert_eq!(*phase.borrow(), Phase::Idle);

        assert_eq!(read_vec(&mut master, 0x20, 3).await, read_expected(0x20, 3));
    }

    #[tokio::test]
    async fn test_no_output_carried_into_next_transaction() {
        let (mut master, phase) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        master.send_header(opcodes::READ, 0x30).await.unwrap();
        single::run_clock(&mut master, 3).await;
        master.set_sck(false);
        master.half_period_delay().await;
        master.end().await;
        assert!(master.miso().enabled);

        master.begin().await;
        assert_eq!(*phase.borrow(), Phase::Decoding);
        assert!(!master.miso().enabled);
        master.set_sck_set_mosi(false, false);
        master.half_period_delay().await;
        assert!(!master.miso().enabled);
        single::write_byte(&mut master, opcodes::RDSR).await;
        for i in (0..24).rev() {
            master.set_sck_set_mosi(false, (0x000030 >> i) & 1 != 0);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
            master.set_sck(true);
            master.half_period_delay().await;
            assert!(!master.miso().enabled);
        }
        master.end().await;

        assert_eq!(read_vec(&mut master, 0x30, 2).await, read_expected(0x30, 2));
    }

    #[tokio::test]
    async fn test_cancel_between_bytes() {
        let (mut master, _) = attach(counting_image(), PeripheralConfig::default()).await;
        master.begin().await;
        master.send_header(opcodes::READ, 0xFE).await.unwrap();
        let mut buf = [0u8; 2];
        single::read_bytes(&mut master, &mut buf).await.unwrap();
        assert_eq!(buf.to_vec(), read_expected(0xFE, 2));
        master.end().await;

        assert_eq!(read_vec(&mut master, 0x05, 2).await, read_expected(0x05, 2));
    }

    #[tokio::test]
    async fn test_repeated_transactions() {
        let (mut master, _) = attach(counting_image(), PeripheralConfig::default()).await;
        for start in 0..8u32 {
            let start = start * 33;
            assert_eq!(read_vec(&mut master, start, 5).await, read_expected(start as u8, 5));
        }
    }

    #[tokio::test]
    async fn test_header_idle_driven() {
        let config = PeripheralConfig {
            header_idle: HeaderIdle::Driven,
        };
        let (mut master, _) = attach(counting_image(), config).await;
        master.begin().await;
        single::write_byte(&mut master, opcodes::READ).await;
        assert_eq!(master.miso().level(), Some(false));
        single::write_bits(&mut master, 0x40, 24).await;
        assert_eq!(master.miso().level(), Some(false));
        assert_eq!(single::read_byte(&mut master).await.unwrap(), read_expected(0x40, 1)[0]);
        master.end().await;
    }

    #[tokio::test]
    async fn test_uninitialized_read_floats() {
        let image = MemoryImage::load("@10\n01 02").unwrap();
        let (mut master, phase) = attach(image, PeripheralConfig::default()).await;
        let mut buf = [0u8; 3];
        let err = master.read(0x10, &mut buf).await.unwrap_err();
        assert!(matches!(err, MasterError::Floating { bit: 7 }));
        assert_eq!(&buf[..2], &[0x01, 0x02]);
        assert_eq!(*phase.borrow(), Phase::Idle);

        // The peripheral is still usable afterwards
        assert_eq!(read_vec(&mut master, 0x11, 1).await, [0x02]);
    }

    #[tokio::test]
    async fn test_address_too_wide() {
        let (mut master, phase) = attach(MemoryImage::new(), PeripheralConfig::default()).await;
        let mut buf = [0u8; 1];
        assert!(matches!(
            master.read(0x100_0000, &mut buf).await,
            Err(MasterError::AddressTooWide(0x100_0000))
        ));
        assert_eq!(*phase.borrow(), Phase::Idle);
    }

    fn read_expected(start: u8, len: usize) -> Vec<u8> {
        let image = counting_image();
        (0..len)
            .map(|i| image.read(start.wrapping_add(i as u8)).unwrap())
            .collect()
    }
}
