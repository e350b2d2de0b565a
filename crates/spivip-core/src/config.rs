//! Peripheral configuration

/// What the peripheral does with data-out during the command/address phase
///
/// Either way the data value is pre-driven low on the first clock edge of
/// the transaction; the choice is only whether output enable goes with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderIdle {
    /// Leave the output disabled until streaming starts
    ///
    /// A transaction with an unsupported command never enables the output.
    #[default]
    Released,
    /// Enable the output (driving 0) for the whole header
    ///
    /// Matches bus models that expect the line to be actively driven low
    /// while the header is shifted in.
    Driven,
}

/// Configuration for the emulated peripheral
#[derive(Debug, Clone, Default)]
pub struct PeripheralConfig {
    /// Data-out behaviour while the header is being received
    pub header_idle: HeaderIdle,
}
