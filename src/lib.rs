//! Register-level clock and SPI bring-up for the STM32H743.
//!
//! Runs once at reset, in this order:
//! 1. PLL1 from the 4 MHz CSI oscillator, locked at 200 MHz
//! 2. GPIOA and SPI1 bus clocks, PA5/PA7 muxed to SPI1 (AF5)
//! 3. SPI1 as a transmit-only master at 200 MHz / 32, optionally followed by a
//!    one-frame transmit test
//!
//! All register traffic goes through [`RegisterBus`], implemented for real
//! hardware by [`Mmio`] and, with the `sim` feature or in tests, by the
//! simulated register file in [`sim`].

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod config;
pub mod error;
pub mod peripherals;
pub mod poll;
pub mod registers;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod time;

pub use config::BringUpConfig;
pub use error::{Error, Flag, Setting};
pub use poll::Poll;
pub use registers::{Mmio, RegisterBus};

use peripherals::{init_pll1, init_spi1, init_spi_pins, Pll1Clocks};
use time::Hertz;

/// What the bring-up sequence produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringUpReport {
    /// PLL1 outputs as read back from the RCC after lock
    pub pll1: Pll1Clocks,
    /// SPI1 SCK, from the pll1_q kernel clock and the prescaler
    pub spi_sck: Hertz,
    /// Frames sent by the transmit test
    pub test_frames_sent: usize,
}

/// Run the complete bring-up sequence.
///
/// Each step only starts once the previous one has completed; the first
/// error stops the sequence and nothing after it is touched. The whole
/// configuration is checked up front, so an invalid one never reaches the
/// registers.
pub fn bring_up<B: RegisterBus>(bus: &mut B, config: &BringUpConfig) -> Result<BringUpReport, Error> {
    config.validate()?;

    init_pll1(bus, &config.pll1, config.poll)?;

    // All zero if the reference has no fixed frequency (HSE)
    let pll1 = Pll1Clocks::read_back(bus).unwrap_or_default();
    #[cfg(feature = "defmt")]
    defmt::info!("PLL1 locked: vco={=u32} q={=u32}", pll1.vco.0, pll1.q.0);

    init_spi_pins(bus, &config.pins)?;

    let test_frame = config.self_test.map(|frame| [frame]);
    let test_frames_sent = init_spi1(bus, &config.spi, test_frame.as_ref().map(|f| &f[..]), config.poll)?;

    let spi_sck = config.spi.sck_frequency(pll1.q);
    #[cfg(feature = "defmt")]
    defmt::info!("SPI1 up: sck={=u32} test frames={=usize}", spi_sck.0, test_frames_sent);

    Ok(BringUpReport {
        pll1,
        spi_sck,
        test_frames_sent,
    })
}
