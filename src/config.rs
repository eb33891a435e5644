//! Build-time bring-up configuration.
//!
//! There is no runtime configuration source: the firmware runs
//! [`BringUpConfig::new`], and cargo features pick the build variant.

use crate::error::{Error, Setting};
use crate::peripherals::{Pll1Config, SpiConfig, SpiPins};
use crate::poll::Poll;

/// Frame sent by the start-up transmit test.
pub const TEST_FRAME: u8 = 0xFF;

/// Everything the bring-up sequence needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringUpConfig {
    pub pll1: Pll1Config,
    pub pins: SpiPins,
    pub spi: SpiConfig,
    /// Frame to push out once SPI1 is up, for a scope or logic analyser
    /// on SCK/MOSI. Set when built with the `transmit-test` feature.
    pub self_test: Option<u8>,
    pub poll: Poll,
}

impl BringUpConfig {
    /// The fixed board configuration: PLL1 at 200 MHz from CSI, SPI1 on
    /// PA5/PA7 at 6.25 MHz, spin forever on status flags.
    pub const fn new() -> Self {
        Self {
            pll1: Pll1Config::csi_200mhz(),
            pins: SpiPins::pa5_pa7(),
            spi: SpiConfig::simplex_tx_master(),
            self_test: if cfg!(feature = "transmit-test") {
                Some(TEST_FRAME)
            } else {
                None
            },
            poll: Poll::Forever,
        }
    }

    /// Same configuration with a bounded poll, for hosts that must not hang.
    pub const fn with_poll(mut self, poll: Poll) -> Self {
        self.poll = poll;
        self
    }

    pub const fn with_self_test(mut self, frame: Option<u8>) -> Self {
        self.self_test = frame;
        self
    }

    /// Check every part of the configuration.
    pub const fn validate(&self) -> Result<(), Error> {
        if !self.pll1.is_valid() {
            return Err(Error::InvalidConfig(Setting::Pll1));
        }
        if !self.pins.is_valid() {
            return Err(Error::InvalidConfig(Setting::SpiPins));
        }
        if !self.spi.is_valid() {
            return Err(Error::InvalidConfig(Setting::Spi));
        }
        Ok(())
    }
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self::new()
    }
}

const _: () = assert!(BringUpConfig::new().pll1.is_valid(), "PLL1 configuration out of range");
const _: () = assert!(BringUpConfig::new().pins.is_valid(), "SPI1 pin routing out of range");
const _: () = assert!(BringUpConfig::new().spi.is_valid(), "SPI1 configuration out of range");
