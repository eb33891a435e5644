//! SPI1 register configuration and the start-up transmit test.
//!
//! The peripheral goes through three states:
//!
//! - **Disabled**: reset state, every configuration field is writable
//! - **Enabled**: SPE set, configuration is locked
//! - **Transmitting**: CSTART set, returns to Enabled once EOT is raised
//!
//! [`Spi`] tracks the first two as type states so configuration can only be
//! written while SPE is clear. The transmit test goes through all three and
//! hands back an enabled handle.

use core::marker::PhantomData;

use crate::error::{Error, Flag, Setting};
use crate::poll::Poll;
use crate::registers::{spi, RegisterBus};
use crate::time::Hertz;

/// Master baud rate divider (CFG1.MBR).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div2 = 0b000,
    Div4 = 0b001,
    Div8 = 0b010,
    Div16 = 0b011,
    Div32 = 0b100,
    Div64 = 0b101,
    Div128 = 0b110,
    Div256 = 0b111,
}

impl Prescaler {
    pub const fn divisor(self) -> u32 {
        2 << (self as u32)
    }
}

/// Data lines in use (CFG2.COMM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    FullDuplex = 0b00,
    SimplexTransmit = 0b01,
    SimplexReceive = 0b10,
    HalfDuplex = 0b11,
}

/// Slave-select handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveSelect {
    /// SS input taken from the NSS pin
    Hardware,
    /// SS input taken from CR1.SSI; `internal_high` keeps a master from
    /// seeing a mode fault when no NSS pin is wired
    Software { internal_high: bool },
}

/// SPI1 configuration written while the peripheral is disabled.
///
/// CRC and DMA are always left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    pub prescaler: Prescaler,
    /// Frame size in bits (4..=32)
    pub frame_bits: u8,
    /// Frames per FIFO packet (1..=16)
    pub fifo_threshold: u8,
    pub direction: Direction,
    pub master: bool,
    pub slave_select: SlaveSelect,
}

impl SpiConfig {
    /// 8-bit frames, transmit-only master, kernel clock / 32, software SS held high
    pub const fn simplex_tx_master() -> Self {
        Self {
            prescaler: Prescaler::Div32,
            frame_bits: 8,
            fifo_threshold: 1,
            direction: Direction::SimplexTransmit,
            master: true,
            slave_select: SlaveSelect::Software { internal_high: true },
        }
    }

    /// SCK frequency for a given kernel clock.
    pub const fn sck_frequency(&self, kernel: Hertz) -> Hertz {
        Hertz(kernel.0 / self.prescaler.divisor())
    }

    pub const fn is_valid(&self) -> bool {
        self.frame_bits >= 4 && self.frame_bits <= 32 && self.fifo_threshold >= 1 && self.fifo_threshold <= 16
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::simplex_tx_master()
    }
}

/// Type state: SPE clear, configuration writable.
pub struct Disabled;
/// Type state: SPE set, configuration locked.
pub struct Enabled;

/// Handle on the SPI1 register block.
pub struct Spi<'a, B: RegisterBus, S> {
    bus: &'a mut B,
    _state: PhantomData<S>,
}

impl<'a, B: RegisterBus> Spi<'a, B, Disabled> {
    /// Take the peripheral in its disabled reset state.
    pub fn new(bus: &'a mut B) -> Self {
        Self {
            bus,
            _state: PhantomData,
        }
    }

    /// Write the configuration registers.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if `config` fails [`SpiConfig::is_valid`];
    /// nothing is written in that case.
    pub fn configure(&mut self, config: &SpiConfig) -> Result<(), Error> {
        if !config.is_valid() {
            return Err(Error::InvalidConfig(Setting::Spi));
        }

        let bus = &mut *self.bus;

        // CRC init pattern all zeros, 17-bit polynomial (CRC unused anyway)
        bus.clear_bits(spi::CR1, spi::CR1_TCRCINI | spi::CR1_CRC33_17);

        bus.write_field(spi::CFG1, spi::CFG1_MBR, config.prescaler as u32);
        bus.clear_bits(
            spi::CFG1,
            spi::CFG1_CRCEN | spi::CFG1_CRCSIZE.mask() | spi::CFG1_TXDMAEN | spi::CFG1_RXDMAEN,
        );
        bus.write_field(spi::CFG1, spi::CFG1_FTHLV, config.fifo_threshold as u32 - 1);
        bus.write_field(spi::CFG1, spi::CFG1_DSIZE, config.frame_bits as u32 - 1);

        match config.slave_select {
            SlaveSelect::Hardware => bus.clear_bits(spi::CFG2, spi::CFG2_SSM),
            SlaveSelect::Software { internal_high } => {
                bus.set_bits(spi::CFG2, spi::CFG2_SSM);
                if internal_high {
                    bus.set_bits(spi::CR1, spi::CR1_SSI);
                } else {
                    bus.clear_bits(spi::CR1, spi::CR1_SSI);
                }
            }
        }

        if config.master {
            bus.set_bits(spi::CFG2, spi::CFG2_MASTER);
        } else {
            bus.clear_bits(spi::CFG2, spi::CFG2_MASTER);
        }
        bus.write_field(spi::CFG2, spi::CFG2_COMM, config.direction as u32);
        Ok(())
    }

    /// Set SPE. Configuration is locked from here on.
    pub fn enable(self) -> Spi<'a, B, Enabled> {
        self.bus.set_bits(spi::CR1, spi::CR1_SPE);
        #[cfg(feature = "defmt")]
        defmt::debug!("SPI1 enabled");
        Spi {
            bus: self.bus,
            _state: PhantomData,
        }
    }

    /// Enable the peripheral and push `frames` out as one sized transfer.
    ///
    /// 1. CR2.TSIZE = number of frames (only writable while SPE is clear)
    /// 2. Set SPE, then CSTART
    /// 3. For each frame wait for TXP, then write it to TXDR
    /// 4. Wait for EOT
    /// 5. Write SPE again (erratum workaround to reset the peripheral state)
    ///
    /// If the SPI interrupt were used it would have to be unmasked after SPE
    /// and before CSTART; it is not used here.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransferLength`] for an empty payload or one TSIZE
    /// cannot describe, before any register is touched. [`Error::NotReady`] if
    /// a bounded `poll` expires.
    pub fn transmit_once(self, frames: &[u8], poll: Poll) -> Result<Spi<'a, B, Enabled>, Error> {
        if frames.is_empty() || frames.len() > spi::TSIZE_MAX {
            return Err(Error::InvalidTransferLength(frames.len()));
        }

        self.bus.write_field(spi::CR2, spi::CR2_TSIZE, frames.len() as u32);

        let mut enabled = self.enable();
        enabled.run_transfer(frames, poll)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("SPI1 test transfer of {} frame(s) complete", frames.len());

        Ok(enabled)
    }
}

impl<'a, B: RegisterBus> Spi<'a, B, Enabled> {
    /// CSTART through the erratum re-enable; TSIZE must already match `frames`.
    fn run_transfer(&mut self, frames: &[u8], poll: Poll) -> Result<(), Error> {
        let bus = &mut *self.bus;
        bus.set_bits(spi::CR1, spi::CR1_CSTART);

        for &frame in frames {
            poll.wait_set(bus, spi::SR, spi::SR_TXP, Flag::TxPacketSpace)?;
            bus.write_byte(spi::TXDR, frame);
        }

        poll.wait_set(bus, spi::SR, spi::SR_EOT, Flag::EndOfTransfer)?;

        // Erratum: write SPE again once EOT is seen
        bus.set_bits(spi::CR1, spi::CR1_SPE);
        Ok(())
    }
}

/// Configure SPI1, then either enable it or run the transmit test.
///
/// Returns the number of frames sent.
pub fn init_spi1<B: RegisterBus>(
    bus: &mut B,
    config: &SpiConfig,
    self_test: Option<&[u8]>,
    poll: Poll,
) -> Result<usize, Error> {
    let mut spi = Spi::new(bus);
    spi.configure(config)?;

    match self_test {
        Some(frames) => {
            spi.transmit_once(frames, poll)?;
            Ok(frames.len())
        }
        None => {
            spi.enable();
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Response, SimBus};

    const POLL: Poll = Poll::Bounded(100);

    #[test]
    fn test_prescaler_divisor() {
        assert_eq!(Prescaler::Div2.divisor(), 2);
        assert_eq!(Prescaler::Div32.divisor(), 32);
        assert_eq!(Prescaler::Div256.divisor(), 256);
    }

    #[test]
    fn test_sck_from_200mhz_kernel() {
        let config = SpiConfig::simplex_tx_master();
        assert_eq!(config.sck_frequency(Hertz::mhz(200)), Hertz::khz(6_250));
    }

    #[test]
    fn test_configure_fields() {
        let mut sim = SimBus::new();
        Spi::new(&mut sim).configure(&SpiConfig::simplex_tx_master()).unwrap();

        let cfg1 = sim.peek(spi::CFG1);
        assert_eq!(spi::CFG1_MBR.get(cfg1), 0b100);
        assert_eq!(spi::CFG1_DSIZE.get(cfg1), 7);
        assert_eq!(spi::CFG1_FTHLV.get(cfg1), 0);
        assert_eq!(spi::CFG1_CRCSIZE.get(cfg1), 0);
        assert_eq!(cfg1 & (spi::CFG1_CRCEN | spi::CFG1_TXDMAEN | spi::CFG1_RXDMAEN), 0);

        let cfg2 = sim.peek(spi::CFG2);
        assert_ne!(cfg2 & spi::CFG2_SSM, 0);
        assert_ne!(cfg2 & spi::CFG2_MASTER, 0);
        assert_eq!(spi::CFG2_COMM.get(cfg2), 0b01);

        let cr1 = sim.peek(spi::CR1);
        assert_ne!(cr1 & spi::CR1_SSI, 0);
        assert_eq!(cr1 & spi::CR1_SPE, 0);
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let mut sim = SimBus::new();
        let base = SpiConfig::simplex_tx_master();

        for config in [
            SpiConfig { frame_bits: 0, ..base },
            SpiConfig { frame_bits: 33, ..base },
            SpiConfig { fifo_threshold: 0, ..base },
        ] {
            assert_eq!(
                init_spi1(&mut sim, &config, Some(&[0xFF]), POLL),
                Err(Error::InvalidConfig(Setting::Spi))
            );
        }
        assert!(sim.log().is_empty());
    }

    #[test]
    fn test_enable_without_transfer() {
        let mut sim = SimBus::new();
        assert_eq!(init_spi1(&mut sim, &SpiConfig::default(), None, POLL), Ok(0));

        assert_ne!(sim.peek(spi::CR1) & spi::CR1_SPE, 0);
        assert_eq!(sim.assertions_of(spi::CR1, spi::CR1_SPE), 1);
        assert_eq!(sim.writes_to(spi::CR2), 0);
        assert!(sim.transmitted().is_empty());
        assert!(sim.config_writes_after_enable().is_empty());
    }

    #[test]
    fn test_transmit_test_byte() {
        let mut sim = SimBus::new();
        assert_eq!(init_spi1(&mut sim, &SpiConfig::default(), Some(&[0xFF]), POLL), Ok(1));

        assert_eq!(sim.transmitted(), &[0xFF]);
        assert_eq!(spi::CR2_TSIZE.get(sim.peek(spi::CR2)), 1);
        assert_eq!(sim.assertions_of(spi::CR1, spi::CR1_SPE), 2);
        assert_eq!(sim.assertions_of(spi::CR1, spi::CR1_CSTART), 1);
        assert!(sim.config_writes_after_enable().is_empty());
    }

    #[test]
    fn test_tsize_written_before_enable() {
        let mut sim = SimBus::new();
        init_spi1(&mut sim, &SpiConfig::default(), Some(&[0xA5, 0x5A]), POLL).unwrap();

        let log = sim.log();
        let tsize = log.iter().position(|a| a.is_write() && a.register() == spi::CR2).unwrap();
        let enable = log
            .iter()
            .position(|a| a.register() == spi::CR1 && a.sets() & spi::CR1_SPE != 0)
            .unwrap();
        let start = log
            .iter()
            .position(|a| a.register() == spi::CR1 && a.sets() & spi::CR1_CSTART != 0)
            .unwrap();
        assert!(tsize < enable && enable < start);
        assert_eq!(sim.transmitted(), &[0xA5, 0x5A]);
    }

    #[test]
    fn test_rejects_bad_lengths_untouched() {
        let mut sim = SimBus::new();
        assert_eq!(
            Spi::new(&mut sim).transmit_once(&[], POLL).err(),
            Some(Error::InvalidTransferLength(0))
        );

        let long = [0u8; spi::TSIZE_MAX + 1];
        assert_eq!(
            Spi::new(&mut sim).transmit_once(&long, POLL).err(),
            Some(Error::InvalidTransferLength(spi::TSIZE_MAX + 1))
        );
        assert!(sim.log().is_empty());
    }

    #[test]
    fn test_missing_eot_times_out() {
        let mut sim = SimBus::new().with_response(Flag::EndOfTransfer, Response::StuckLow);
        assert_eq!(
            init_spi1(&mut sim, &SpiConfig::default(), Some(&[0xFF]), POLL),
            Err(Error::NotReady(Flag::EndOfTransfer))
        );
        // The byte went out, but the erratum re-enable never happened
        assert_eq!(sim.transmitted(), &[0xFF]);
        assert_eq!(sim.assertions_of(spi::CR1, spi::CR1_SPE), 1);
    }

    #[test]
    fn test_no_tx_space_never_writes_data() {
        let mut sim = SimBus::new().with_response(Flag::TxPacketSpace, Response::StuckLow);
        assert_eq!(
            init_spi1(&mut sim, &SpiConfig::default(), Some(&[0xFF]), POLL),
            Err(Error::NotReady(Flag::TxPacketSpace))
        );
        assert_eq!(sim.writes_to(spi::TXDR), 0);
    }
}
