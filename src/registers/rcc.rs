//! RCC (reset and clock control) registers, RM0433 section 8.7.

use super::{bit, Block, Field, Register};

/// Clock control register
pub const CR: Register = Register::new(Block::Rcc, 0x00);
pub const CR_CSION: u32 = bit(7);
pub const CR_CSIRDY: u32 = bit(8);
pub const CR_PLL1ON: u32 = bit(24);
pub const CR_PLL1RDY: u32 = bit(25);

/// PLL clock source selection register
pub const PLLCKSELR: Register = Register::new(Block::Rcc, 0x28);
pub const PLLCKSELR_PLLSRC: Field = Field::new(0, 2);
pub const PLLCKSELR_DIVM1: Field = Field::new(4, 6);

/// PLL configuration register
pub const PLLCFGR: Register = Register::new(Block::Rcc, 0x2C);
pub const PLLCFGR_PLL1FRACEN: u32 = bit(0);
pub const PLLCFGR_PLL1VCOSEL: u32 = bit(1);
pub const PLLCFGR_PLL1RGE: Field = Field::new(2, 2);
pub const PLLCFGR_DIVP1EN: u32 = bit(16);
pub const PLLCFGR_DIVQ1EN: u32 = bit(17);
pub const PLLCFGR_DIVR1EN: u32 = bit(18);

/// PLL1 dividers register
pub const PLL1DIVR: Register = Register::new(Block::Rcc, 0x30);
pub const PLL1DIVR_N1: Field = Field::new(0, 9);
pub const PLL1DIVR_P1: Field = Field::new(9, 7);
pub const PLL1DIVR_Q1: Field = Field::new(16, 7);
pub const PLL1DIVR_R1: Field = Field::new(24, 7);

/// AHB4 peripheral clock enable register
pub const AHB4ENR: Register = Register::new(Block::Rcc, 0xE0);
pub const AHB4ENR_GPIOAEN: u32 = bit(0);

/// APB2 peripheral clock enable register
pub const APB2ENR: Register = Register::new(Block::Rcc, 0xF0);
pub const APB2ENR_SPI1EN: u32 = bit(12);

/// Reset values of the registers above.
pub mod reset {
    pub const CR: u32 = 0x0000_0025;
    pub const PLLCKSELR: u32 = 0x0202_0200;
    pub const PLLCFGR: u32 = 0x01FF_0000;
    pub const PLL1DIVR: u32 = 0x0101_0280;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{pac_field_is, pac_offset};
    use stm32_metapac::rcc::regs::{Ahb4enr, Apb2enr, Cr, Pllcfgr, Pllckselr, Plldivr};
    use stm32_metapac::RCC;

    #[test]
    fn test_offsets_match_pac() {
        let base = RCC.as_ptr();
        assert_eq!(CR.offset, pac_offset(base, RCC.cr().as_ptr()));
        assert_eq!(PLLCKSELR.offset, pac_offset(base, RCC.pllckselr().as_ptr()));
        assert_eq!(PLLCFGR.offset, pac_offset(base, RCC.pllcfgr().as_ptr()));
        assert_eq!(PLL1DIVR.offset, pac_offset(base, RCC.plldivr(0).as_ptr()));
        assert_eq!(AHB4ENR.offset, pac_offset(base, RCC.ahb4enr().as_ptr()));
        assert_eq!(APB2ENR.offset, pac_offset(base, RCC.apb2enr().as_ptr()));
    }

    #[test]
    fn test_fields_match_pac() {
        assert!(pac_field_is(|r| Cr(r).csion(), CR_CSION));
        assert!(pac_field_is(|r| Cr(r).csirdy(), CR_CSIRDY));
        assert!(pac_field_is(|r| Cr(r).pllon(0), CR_PLL1ON));
        assert!(pac_field_is(|r| Cr(r).pllrdy(0), CR_PLL1RDY));

        assert!(pac_field_is(|r| Pllckselr(r).pllsrc(), PLLCKSELR_PLLSRC.mask()));
        assert!(pac_field_is(|r| Pllckselr(r).divm(0), PLLCKSELR_DIVM1.mask()));

        assert!(pac_field_is(|r| Pllcfgr(r).pllfracen(0), PLLCFGR_PLL1FRACEN));
        assert!(pac_field_is(|r| Pllcfgr(r).pllvcosel(0), PLLCFGR_PLL1VCOSEL));
        assert!(pac_field_is(|r| Pllcfgr(r).pllrge(0), PLLCFGR_PLL1RGE.mask()));
        assert!(pac_field_is(|r| Pllcfgr(r).divpen(0), PLLCFGR_DIVP1EN));
        assert!(pac_field_is(|r| Pllcfgr(r).divqen(0), PLLCFGR_DIVQ1EN));
        assert!(pac_field_is(|r| Pllcfgr(r).divren(0), PLLCFGR_DIVR1EN));

        assert!(pac_field_is(|r| Plldivr(r).plln(), PLL1DIVR_N1.mask()));
        assert!(pac_field_is(|r| Plldivr(r).pllp(), PLL1DIVR_P1.mask()));
        assert!(pac_field_is(|r| Plldivr(r).pllq(), PLL1DIVR_Q1.mask()));
        assert!(pac_field_is(|r| Plldivr(r).pllr(), PLL1DIVR_R1.mask()));

        assert!(pac_field_is(|r| Ahb4enr(r).gpioaen(), AHB4ENR_GPIOAEN));
        assert!(pac_field_is(|r| Apb2enr(r).spi1en(), APB2ENR_SPI1EN));
    }
}
