//! Bring-up errors.

use core::fmt;

/// Status bits the bring-up sequence waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    /// RCC_CR.CSIRDY set
    CsiReady,
    /// RCC_CR.PLL1RDY set
    Pll1Ready,
    /// RCC_CR.PLL1RDY clear after PLL1ON was dropped
    Pll1Stopped,
    /// SPI_SR.TXP set
    TxPacketSpace,
    /// SPI_SR.EOT set
    EndOfTransfer,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::CsiReady => "CSI ready",
            Flag::Pll1Ready => "PLL1 ready",
            Flag::Pll1Stopped => "PLL1 stopped",
            Flag::TxPacketSpace => "SPI TX packet space",
            Flag::EndOfTransfer => "SPI end of transfer",
        };
        f.write_str(name)
    }
}

/// Part of the bring-up configuration that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    Pll1,
    SpiPins,
    Spi,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Setting::Pll1 => "PLL1",
            Setting::SpiPins => "SPI1 pins",
            Setting::Spi => "SPI1",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A bounded poll ran out before the flag reached its expected state.
    ///
    /// Only produced with [`crate::poll::Poll::Bounded`]; with
    /// [`crate::poll::Poll::Forever`] an unresponsive flag hangs instead.
    NotReady(Flag),
    /// Self-test payload is empty or longer than CR2.TSIZE can describe.
    InvalidTransferLength(usize),
    /// A configuration value is out of range or not encodable. Reported
    /// before any register is accessed.
    InvalidConfig(Setting),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotReady(flag) => write!(f, "hardware not ready: {}", flag),
            Error::InvalidTransferLength(len) => {
                write!(f, "transfer length {} outside 1..=65535", len)
            }
            Error::InvalidConfig(setting) => write!(f, "invalid {} configuration", setting),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::NotReady(Flag::Pll1Ready).to_string(), "hardware not ready: PLL1 ready");
        assert_eq!(Error::InvalidConfig(Setting::SpiPins).to_string(), "invalid SPI1 pins configuration");
        assert_eq!(
            Error::InvalidTransferLength(0).to_string(),
            "transfer length 0 outside 1..=65535"
        );
    }
}
