//! SPI/I2S registers, RM0433 section 50.11.

use super::{bit, Block, Field, Register};

/// Control register 1
pub const CR1: Register = Register::new(Block::Spi1, 0x00);
pub const CR1_SPE: u32 = bit(0);
pub const CR1_CSTART: u32 = bit(9);
pub const CR1_SSI: u32 = bit(12);
pub const CR1_CRC33_17: u32 = bit(13);
pub const CR1_TCRCINI: u32 = bit(15);

/// Control register 2
pub const CR2: Register = Register::new(Block::Spi1, 0x04);
pub const CR2_TSIZE: Field = Field::new(0, 16);

/// Configuration register 1
pub const CFG1: Register = Register::new(Block::Spi1, 0x08);
pub const CFG1_DSIZE: Field = Field::new(0, 5);
pub const CFG1_FTHLV: Field = Field::new(5, 4);
pub const CFG1_RXDMAEN: u32 = bit(14);
pub const CFG1_TXDMAEN: u32 = bit(15);
pub const CFG1_CRCSIZE: Field = Field::new(16, 5);
pub const CFG1_CRCEN: u32 = bit(22);
pub const CFG1_MBR: Field = Field::new(28, 3);

/// Configuration register 2
pub const CFG2: Register = Register::new(Block::Spi1, 0x0C);
pub const CFG2_COMM: Field = Field::new(17, 2);
pub const CFG2_MASTER: u32 = bit(22);
pub const CFG2_SSM: u32 = bit(26);

/// Status register
pub const SR: Register = Register::new(Block::Spi1, 0x14);
pub const SR_TXP: u32 = bit(1);
pub const SR_EOT: u32 = bit(3);

/// Transmit data register
pub const TXDR: Register = Register::new(Block::Spi1, 0x20);

/// Largest transfer CR2.TSIZE can describe
pub const TSIZE_MAX: usize = 0xFFFF;

/// CR1 bits that are control rather than configuration.
pub const CR1_CONTROL: u32 = CR1_SPE | CR1_CSTART;

pub mod reset {
    pub const CFG1: u32 = 0x0007_0007;
    pub const SR: u32 = 0x0000_1002;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{pac_field_is, pac_offset};
    use stm32_metapac::spi::regs::{Cfg1, Cfg2, Cr1, Cr2, Sr};
    use stm32_metapac::SPI1;

    #[test]
    fn test_offsets_match_pac() {
        let base = SPI1.as_ptr();
        assert_eq!(CR1.offset, pac_offset(base, SPI1.cr1().as_ptr()));
        assert_eq!(CR2.offset, pac_offset(base, SPI1.cr2().as_ptr()));
        assert_eq!(CFG1.offset, pac_offset(base, SPI1.cfg1().as_ptr()));
        assert_eq!(CFG2.offset, pac_offset(base, SPI1.cfg2().as_ptr()));
        assert_eq!(SR.offset, pac_offset(base, SPI1.sr().as_ptr()));
    }

    #[test]
    fn test_fields_match_pac() {
        assert!(pac_field_is(|r| Cr1(r).spe(), CR1_SPE));
        assert!(pac_field_is(|r| Cr1(r).cstart(), CR1_CSTART));
        assert!(pac_field_is(|r| Cr1(r).ssi(), CR1_SSI));
        assert!(pac_field_is(|r| Cr1(r).crc33_17(), CR1_CRC33_17));
        assert!(pac_field_is(|r| Cr1(r).tcrcini(), CR1_TCRCINI));

        assert!(pac_field_is(|r| Cr2(r).tsize(), CR2_TSIZE.mask()));
        assert_eq!(CR2_TSIZE.mask() as usize, TSIZE_MAX);

        assert!(pac_field_is(|r| Cfg1(r).dsize(), CFG1_DSIZE.mask()));
        assert!(pac_field_is(|r| Cfg1(r).fthlv(), CFG1_FTHLV.mask()));
        assert!(pac_field_is(|r| Cfg1(r).rxdmaen(), CFG1_RXDMAEN));
        assert!(pac_field_is(|r| Cfg1(r).txdmaen(), CFG1_TXDMAEN));
        assert!(pac_field_is(|r| Cfg1(r).crcsize(), CFG1_CRCSIZE.mask()));
        assert!(pac_field_is(|r| Cfg1(r).crcen(), CFG1_CRCEN));
        assert!(pac_field_is(|r| Cfg1(r).mbr(), CFG1_MBR.mask()));

        assert!(pac_field_is(|r| Cfg2(r).comm(), CFG2_COMM.mask()));
        assert!(pac_field_is(|r| Cfg2(r).master(), CFG2_MASTER));
        assert!(pac_field_is(|r| Cfg2(r).ssm(), CFG2_SSM));

        assert!(pac_field_is(|r| Sr(r).txp(), SR_TXP));
        assert!(pac_field_is(|r| Sr(r).eot(), SR_EOT));
    }
}
