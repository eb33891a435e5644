//! System clock bring-up: PLL1 fed by the internal CSI oscillator.
//!
//! This module handles the register sequence that takes PLL1 from its reset
//! state to a locked 200 MHz output, which also becomes the SPI123 kernel clock
//! through the reset selection of `pll1_q_ck`.

use crate::error::{Error, Flag, Setting};
use crate::poll::Poll;
use crate::registers::{rcc, RegisterBus};
use crate::time::Hertz;

/// Nominal CSI frequency.
pub const CSI_FREQUENCY: Hertz = Hertz::mhz(4);
/// Nominal HSI frequency with the reset HSIDIV of /1.
pub const HSI_FREQUENCY: Hertz = Hertz::mhz(64);

/// PLL reference clock selection (RCC_PLLCKSELR.PLLSRC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSource {
    Hsi = 0b00,
    Csi = 0b01,
    Hse = 0b10,
    Disabled = 0b11,
}

/// PLL1 VCO range (RCC_PLLCFGR.PLL1VCOSEL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VcoRange {
    /// 192 to 836 MHz
    Wide,
    /// 150 to 420 MHz
    Medium,
}

impl VcoRange {
    pub const fn limits(self) -> (Hertz, Hertz) {
        match self {
            VcoRange::Wide => (Hertz::mhz(192), Hertz::mhz(836)),
            VcoRange::Medium => (Hertz::mhz(150), Hertz::mhz(420)),
        }
    }
}

/// PLL1 reference input range (RCC_PLLCFGR.PLL1RGE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputRange {
    /// 1 to 2 MHz
    Range1 = 0b00,
    /// 2 to 4 MHz
    Range2 = 0b01,
    /// 4 to 8 MHz
    Range4 = 0b10,
    /// 8 to 16 MHz
    Range8 = 0b11,
}

impl InputRange {
    pub const fn limits(self) -> (Hertz, Hertz) {
        match self {
            InputRange::Range1 => (Hertz::mhz(1), Hertz::mhz(2)),
            InputRange::Range2 => (Hertz::mhz(2), Hertz::mhz(4)),
            InputRange::Range4 => (Hertz::mhz(4), Hertz::mhz(8)),
            InputRange::Range8 => (Hertz::mhz(8), Hertz::mhz(16)),
        }
    }
}

/// PLL1 configuration.
///
/// Divider and multiplier values are the real ratios; the register encodings
/// (N − 1, P − 1, ...) are applied when programming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pll1Config {
    pub source: PllSource,
    /// DIVM1, reference prescaler (1..=63)
    pub prediv: u8,
    /// DIVN1 multiplication factor (4..=512)
    pub mul: u16,
    pub vco_range: VcoRange,
    pub input_range: InputRange,
    /// DIVP1, even or 1 (1..=128)
    pub divp: u8,
    /// DIVQ1 (1..=128)
    pub divq: u8,
    /// DIVR1 (1..=128)
    pub divr: u8,
}

impl Pll1Config {
    /// CSI(4 MHz) / DIVM1(1) * DIVN1(50) = 200 MHz VCO
    ///
    /// All three output taps are enabled. Q and R run undivided (200 MHz);
    /// P uses the smallest divider PLL1 accepts (/2, 100 MHz).
    pub const fn csi_200mhz() -> Self {
        Self {
            source: PllSource::Csi,
            prediv: 1,
            mul: 50,
            vco_range: VcoRange::Medium,
            input_range: InputRange::Range4,
            divp: 2,
            divq: 1,
            divr: 1,
        }
    }

    /// Frequency of the selected reference oscillator, if it is fixed.
    pub const fn source_frequency(&self) -> Option<Hertz> {
        source_frequency(self.source)
    }

    /// True when every field is encodable and the reference and VCO frequencies
    /// sit inside the selected ranges.
    pub const fn is_valid(&self) -> bool {
        let Some(src) = self.source_frequency() else {
            return false;
        };
        if self.prediv == 0 || self.prediv > 63 {
            return false;
        }
        if self.mul < 4 || self.mul > 512 {
            return false;
        }
        if self.divp == 0 || self.divp > 128 || (self.divp != 1 && self.divp % 2 != 0) {
            return false;
        }
        if self.divq == 0 || self.divq > 128 || self.divr == 0 || self.divr > 128 {
            return false;
        }

        let reference = src.0 / self.prediv as u32;
        let (ref_min, ref_max) = self.input_range.limits();
        if reference < ref_min.0 || reference > ref_max.0 {
            return false;
        }

        let vco = reference * self.mul as u32;
        let (vco_min, vco_max) = self.vco_range.limits();
        vco >= vco_min.0 && vco <= vco_max.0
    }
}

impl Default for Pll1Config {
    fn default() -> Self {
        Self::csi_200mhz()
    }
}

const fn source_frequency(source: PllSource) -> Option<Hertz> {
    match source {
        PllSource::Csi => Some(CSI_FREQUENCY),
        PllSource::Hsi => Some(HSI_FREQUENCY),
        PllSource::Hse | PllSource::Disabled => None,
    }
}

/// PLL1 output frequencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pll1Clocks {
    pub vco: Hertz,
    pub p: Hertz,
    pub q: Hertz,
    pub r: Hertz,
}

impl Pll1Clocks {
    /// Frequencies a configuration will produce once locked.
    pub const fn from_config(config: &Pll1Config) -> Option<Self> {
        let Some(src) = config.source_frequency() else {
            return None;
        };
        if config.prediv == 0 {
            return None;
        }
        let vco = src.0 / config.prediv as u32 * config.mul as u32;
        Some(Self {
            vco: Hertz(vco),
            p: Hertz(vco / config.divp as u32),
            q: Hertz(vco / config.divq as u32),
            r: Hertz(vco / config.divr as u32),
        })
    }

    /// Frequencies derived from what is currently programmed in the RCC.
    ///
    /// Returns `None` when the source has no fixed frequency or the
    /// prescaler is 0 (PLL1 reference disabled).
    pub fn read_back<B: RegisterBus>(bus: &mut B) -> Option<Self> {
        let selr = bus.read(rcc::PLLCKSELR);
        let divr = bus.read(rcc::PLL1DIVR);

        let source = match rcc::PLLCKSELR_PLLSRC.get(selr) {
            0b00 => PllSource::Hsi,
            0b01 => PllSource::Csi,
            0b10 => PllSource::Hse,
            _ => PllSource::Disabled,
        };
        let src = source_frequency(source)?;
        let prediv = rcc::PLLCKSELR_DIVM1.get(selr);
        if prediv == 0 {
            return None;
        }

        let vco = src.0 / prediv * (rcc::PLL1DIVR_N1.get(divr) + 1);
        Some(Self {
            vco: Hertz(vco),
            p: Hertz(vco / (rcc::PLL1DIVR_P1.get(divr) + 1)),
            q: Hertz(vco / (rcc::PLL1DIVR_Q1.get(divr) + 1)),
            r: Hertz(vco / (rcc::PLL1DIVR_R1.get(divr) + 1)),
        })
    }
}

/// Bring PLL1 up from CSI and wait for lock.
///
/// Sequence:
/// 1. CSI on, wait for CSIRDY
/// 2. If PLL1 is on or reports ready, switch it off and wait for PLL1RDY to drop
/// 3. Reference source and DIVM1
/// 4. VCO range, input range, integer mode
/// 5. P, Q and R output enables
/// 6. DIVN1 and the three output dividers
/// 7. PLL1 on, wait for PLL1RDY
///
/// Every source/divider/range write happens with PLL1 confirmed off.
///
/// # Errors
///
/// [`Error::InvalidConfig`] if `config` fails [`Pll1Config::is_valid`], before
/// any register is touched. [`Error::NotReady`] if a bounded `poll` expires;
/// with [`Poll::Forever`] an oscillator that never comes up hangs here instead.
pub fn init_pll1<B: RegisterBus>(bus: &mut B, config: &Pll1Config, poll: Poll) -> Result<(), Error> {
    if !config.is_valid() {
        return Err(Error::InvalidConfig(Setting::Pll1));
    }

    // Low-power internal RC oscillator (~4 MHz)
    bus.set_bits(rcc::CR, rcc::CR_CSION);
    poll.wait_set(bus, rcc::CR, rcc::CR_CSIRDY, Flag::CsiReady)?;
    #[cfg(feature = "defmt")]
    defmt::debug!("CSI ready");

    // Dividers and ranges are undefined if changed while PLL1 runs
    let cr = bus.read(rcc::CR);
    if cr & (rcc::CR_PLL1ON | rcc::CR_PLL1RDY) != 0 {
        #[cfg(feature = "defmt")]
        defmt::debug!("PLL1 already running, switching it off");
        bus.clear_bits(rcc::CR, rcc::CR_PLL1ON);
        poll.wait_clear(bus, rcc::CR, rcc::CR_PLL1RDY, Flag::Pll1Stopped)?;
    }

    bus.write_field(rcc::PLLCKSELR, rcc::PLLCKSELR_PLLSRC, config.source as u32);
    bus.write_field(rcc::PLLCKSELR, rcc::PLLCKSELR_DIVM1, config.prediv as u32);

    let vcosel = match config.vco_range {
        VcoRange::Wide => 0,
        VcoRange::Medium => rcc::PLLCFGR_PLL1VCOSEL,
    };
    bus.modify(
        rcc::PLLCFGR,
        rcc::PLLCFGR_PLL1VCOSEL | rcc::PLLCFGR_PLL1RGE.mask() | rcc::PLLCFGR_PLL1FRACEN,
        vcosel | rcc::PLLCFGR_PLL1RGE.bits(config.input_range as u32),
    );

    // Only Q feeds anything here (SPI123 kernel clock); P and R stay enabled as well
    bus.set_bits(
        rcc::PLLCFGR,
        rcc::PLLCFGR_DIVP1EN | rcc::PLLCFGR_DIVQ1EN | rcc::PLLCFGR_DIVR1EN,
    );

    bus.write_field(rcc::PLL1DIVR, rcc::PLL1DIVR_N1, config.mul as u32 - 1);
    bus.write_field(rcc::PLL1DIVR, rcc::PLL1DIVR_P1, config.divp as u32 - 1);
    bus.write_field(rcc::PLL1DIVR, rcc::PLL1DIVR_Q1, config.divq as u32 - 1);
    bus.write_field(rcc::PLL1DIVR, rcc::PLL1DIVR_R1, config.divr as u32 - 1);

    bus.set_bits(rcc::CR, rcc::CR_PLL1ON);
    poll.wait_set(bus, rcc::CR, rcc::CR_PLL1RDY, Flag::Pll1Ready)?;
    #[cfg(feature = "defmt")]
    defmt::debug!("PLL1 locked");

    Ok(())
}
