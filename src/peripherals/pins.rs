//! Bus clocks and pin muxing for SPI1.
//!
//! SPI1 is driven transmit-only, so only SCK and MOSI are routed:
//! - PA5 = SCK
//! - PA7 = MOSI
//!
//! Both are AF5 on the STM32H743.

use crate::error::{Error, Setting};
use crate::registers::{gpio, rcc, RegisterBus};

/// Pin routing for the SPI1 transmit path on port A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPins {
    /// SCK pin number on port A (PA5)
    pub sck: u8,
    /// MOSI pin number on port A (PA7)
    pub mosi: u8,
    /// Alternate function number shared by both pins
    pub af: u8,
}

impl SpiPins {
    pub const fn pa5_pa7() -> Self {
        Self { sck: 5, mosi: 7, af: 5 }
    }

    pub const fn pins(&self) -> [u8; 2] {
        [self.sck, self.mosi]
    }

    /// Both pins exist on the port and are distinct, and the AF number fits
    /// its 4-bit selector.
    pub const fn is_valid(&self) -> bool {
        self.sck < 16 && self.mosi < 16 && self.sck != self.mosi && self.af < 16
    }
}

impl Default for SpiPins {
    fn default() -> Self {
        Self::pa5_pa7()
    }
}

/// Enable the GPIOA and SPI1 bus clocks and hand both pins to SPI1.
///
/// Clock gate bits are only ever set, so running this twice is harmless. The
/// mux takes effect immediately; nothing is polled.
///
/// # Errors
///
/// [`Error::InvalidConfig`] if `pins` fails [`SpiPins::is_valid`], before any
/// register is touched.
pub fn init_spi_pins<B: RegisterBus>(bus: &mut B, pins: &SpiPins) -> Result<(), Error> {
    if !pins.is_valid() {
        return Err(Error::InvalidConfig(Setting::SpiPins));
    }

    bus.set_bits(rcc::AHB4ENR, rcc::AHB4ENR_GPIOAEN);
    bus.set_bits(rcc::APB2ENR, rcc::APB2ENR_SPI1EN);

    for pin in pins.pins() {
        route_alternate(bus, pin, pins.af);
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("PA{} (SCK) and PA{} (MOSI) on AF{}", pins.sck, pins.mosi, pins.af);

    Ok(())
}

/// Put `pin` in alternate-function mode and select `af`.
fn route_alternate<B: RegisterBus>(bus: &mut B, pin: u8, af: u8) {
    bus.write_field(gpio::MODER, gpio::mode(pin), gpio::MODE_ALTERNATE);

    let (reg, field) = gpio::afsel(pin);
    bus.write_field(reg, field, af as u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;

    #[test]
    fn test_clock_gates_enabled() {
        let mut sim = SimBus::new();
        init_spi_pins(&mut sim, &SpiPins::pa5_pa7()).unwrap();

        assert_ne!(sim.peek(rcc::AHB4ENR) & rcc::AHB4ENR_GPIOAEN, 0);
        assert_ne!(sim.peek(rcc::APB2ENR) & rcc::APB2ENR_SPI1EN, 0);
    }

    #[test]
    fn test_pins_read_back_as_af5() {
        let mut sim = SimBus::new();
        init_spi_pins(&mut sim, &SpiPins::pa5_pa7()).unwrap();

        let moder = sim.peek(gpio::MODER);
        for pin in [5, 7] {
            assert_eq!(gpio::mode(pin).get(moder), 0b10);
            let (reg, field) = gpio::afsel(pin);
            assert_eq!(reg, gpio::AFRL);
            assert_eq!(field.get(sim.peek(reg)), 5);
        }
        assert_eq!(sim.peek(gpio::AFRL), 0x5050_0000);

        // Every other pin keeps its reset mode
        let others = !(gpio::mode(5).mask() | gpio::mode(7).mask());
        assert_eq!(moder & others, gpio::reset::MODER_A & others);
    }

    #[test]
    fn test_stale_af_selection_is_replaced() {
        let mut sim = SimBus::new();
        sim.seed(gpio::AFRL, 0xFFFF_FFFF);
        sim.seed(gpio::MODER, 0);
        init_spi_pins(&mut sim, &SpiPins::pa5_pa7()).unwrap();

        assert_eq!(sim.peek(gpio::AFRL), 0x5F5F_FFFF);
        assert_eq!(sim.peek(gpio::MODER), 0x0000_8800);
    }

    #[test]
    fn test_high_pins_use_afrh() {
        let mut sim = SimBus::new();
        init_spi_pins(&mut sim, &SpiPins { sck: 9, mosi: 15, af: 5 }).unwrap();

        assert_eq!(sim.peek(gpio::AFRH), 0x5000_0050);
        assert_eq!(sim.peek(gpio::AFRL), 0);
    }

    #[test]
    fn test_rejects_pins_outside_the_port() {
        let mut sim = SimBus::new();
        for pins in [
            SpiPins { sck: 16, ..SpiPins::pa5_pa7() },
            SpiPins { mosi: 40, ..SpiPins::pa5_pa7() },
            SpiPins { af: 16, ..SpiPins::pa5_pa7() },
            SpiPins { sck: 7, ..SpiPins::pa5_pa7() },
        ] {
            assert_eq!(init_spi_pins(&mut sim, &pins), Err(Error::InvalidConfig(Setting::SpiPins)));
        }
        assert!(sim.log().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mut sim = SimBus::new();
        init_spi_pins(&mut sim, &SpiPins::pa5_pa7()).unwrap();
        let once = (sim.peek(gpio::MODER), sim.peek(gpio::AFRL), sim.peek(rcc::APB2ENR));
        init_spi_pins(&mut sim, &SpiPins::pa5_pa7()).unwrap();
        let twice = (sim.peek(gpio::MODER), sim.peek(gpio::AFRL), sim.peek(rcc::APB2ENR));
        assert_eq!(once, twice);
    }
}
