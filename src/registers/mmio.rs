//! Volatile memory-mapped implementation of [`RegisterBus`].

use core::ptr::{read_volatile, write_volatile};

use super::{Block, Register, RegisterBus};

/// Direct access to the RCC, GPIOA and SPI1 register blocks.
pub struct Mmio {
    rcc: *mut u8,
    gpioa: *mut u8,
    spi1: *mut u8,
}

impl Mmio {
    /// Create the bus from the peripheral block base addresses.
    ///
    /// # Safety
    ///
    /// The pointers must be the base addresses of the RCC, GPIOA and SPI1
    /// blocks of the running chip, and no other code may access those blocks
    /// while this value is alive.
    pub const unsafe fn new(rcc: *mut (), gpioa: *mut (), spi1: *mut ()) -> Self {
        Self {
            rcc: rcc as *mut u8,
            gpioa: gpioa as *mut u8,
            spi1: spi1 as *mut u8,
        }
    }

    fn base(&self, block: Block) -> *mut u8 {
        match block {
            Block::Rcc => self.rcc,
            Block::GpioA => self.gpioa,
            Block::Spi1 => self.spi1,
        }
    }

    fn address(&self, reg: Register) -> *mut u8 {
        // SAFETY: every `Register` constant is an in-bounds offset of its block
        unsafe { self.base(reg.block).add(reg.offset as usize) }
    }
}

impl RegisterBus for Mmio {
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: aligned register address inside a block owned by this bus
        unsafe { read_volatile(self.address(reg) as *const u32) }
    }

    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: aligned register address inside a block owned by this bus
        unsafe { write_volatile(self.address(reg) as *mut u32, value) }
    }

    fn write_byte(&mut self, reg: Register, value: u8) {
        // SAFETY: byte access to the low byte of a data register
        unsafe { write_volatile(self.address(reg), value) }
    }
}
