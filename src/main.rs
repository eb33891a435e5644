//! Firmware entry point.
//!
//! Runs the bring-up sequence once against the real RCC, GPIOA and SPI1
//! register blocks, logs the result and parks the core.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info};
use embassy_stm32::pac;
use h7_spi_bringup::{bring_up, BringUpConfig, Mmio};

use defmt_rtt as _;
// Import panic handler
#[cfg(not(feature = "debug"))]
use panic_halt as _;
#[cfg(feature = "debug")]
use panic_probe as _;

#[entry]
fn main() -> ! {
    info!("Starting h7-spi-bringup v{}", env!("CARGO_PKG_VERSION"));

    // SAFETY: the PAC base addresses are the RM0433 register blocks, and this
    // is the only code touching them.
    let mut bus = unsafe { Mmio::new(pac::RCC.as_ptr(), pac::GPIOA.as_ptr(), pac::SPI1.as_ptr()) };

    match bring_up(&mut bus, &BringUpConfig::new()) {
        Ok(report) => info!("Bring-up complete: {}", report),
        Err(e) => error!("Bring-up failed: {}", e),
    }

    loop {
        cortex_m::asm::wfi();
    }
}
