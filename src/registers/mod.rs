//! Register map and access seam for the blocks touched during bring-up.
//!
//! Only the RCC, GPIOA and SPI1 registers the bring-up sequence reads or writes
//! are defined here, with offsets and bit layouts from RM0433. Everything that
//! touches hardware goes through [`RegisterBus`], so the same sequence runs
//! against real MMIO ([`Mmio`]) or the simulated register file in [`crate::sim`].

pub mod gpio;
pub mod mmio;
pub mod rcc;
pub mod spi;

pub use mmio::Mmio;

/// Peripheral block a register belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Block {
    Rcc,
    GpioA,
    Spi1,
}

/// A 32-bit register, addressed by block and byte offset from the block base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub block: Block,
    pub offset: u32,
}

impl Register {
    pub const fn new(block: Block, offset: u32) -> Self {
        Self { block, offset }
    }
}

/// A contiguous bit field inside a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub shift: u32,
    pub width: u32,
}

impl Field {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Mask covering the field in its register position.
    pub const fn mask(self) -> u32 {
        (((1u64 << self.width) - 1) as u32) << self.shift
    }

    /// `value` shifted into position; bits outside the field are dropped.
    pub const fn bits(self, value: u32) -> u32 {
        (value << self.shift) & self.mask()
    }

    /// Extract the field from a raw register value.
    pub const fn get(self, register: u32) -> u32 {
        (register & self.mask()) >> self.shift
    }
}

/// Single-bit mask.
pub const fn bit(n: u32) -> u32 {
    1 << n
}

/// Access to the memory-mapped register file.
///
/// Reads take `&mut self` because status registers may change (or be changed)
/// by the act of reading them. Implementations must not cache values.
pub trait RegisterBus {
    /// Read a full 32-bit register.
    fn read(&mut self, reg: Register) -> u32;

    /// Write a full 32-bit register.
    fn write(&mut self, reg: Register, value: u32);

    /// Write the low byte of a data register with an 8-bit access.
    ///
    /// The SPI data registers pack as many frames as the access width holds, so
    /// an 8-bit frame must be pushed with a byte-wide store.
    fn write_byte(&mut self, reg: Register, value: u8);

    /// Read-modify-write: clear `clear`, then set `set`.
    fn modify(&mut self, reg: Register, clear: u32, set: u32) {
        let value = self.read(reg);
        self.write(reg, (value & !clear) | set);
    }

    fn set_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, 0, bits);
    }

    fn clear_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, bits, 0);
    }

    /// Masked assignment of a multi-bit field.
    fn write_field(&mut self, reg: Register, field: Field, value: u32) {
        self.modify(reg, field.mask(), field.bits(value));
    }

    fn read_field(&mut self, reg: Register, field: Field) -> u32 {
        field.get(self.read(reg))
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }

    fn write_byte(&mut self, reg: Register, value: u8) {
        (**self).write_byte(reg, value)
    }

    fn modify(&mut self, reg: Register, clear: u32, set: u32) {
        (**self).modify(reg, clear, set)
    }
}

/// Byte offset of a PAC register accessor from its block base.
#[cfg(test)]
pub(crate) fn pac_offset<T>(block: *mut (), reg: *mut T) -> u32 {
    (reg as usize - block as usize) as u32
}

/// True when a PAC field getter reads exactly the bits in `mask`: each bit of
/// `mask` changes what it returns and no bit outside `mask` does.
#[cfg(test)]
pub(crate) fn pac_field_is<V: PartialEq>(getter: impl Fn(u32) -> V, mask: u32) -> bool {
    let zero = getter(0);
    getter(!mask) == zero
        && (0..32u32)
            .filter(|b| mask & (1 << b) != 0)
            .all(|b| getter(1 << b) != zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mask_and_bits() {
        let divn = Field::new(0, 9);
        assert_eq!(divn.mask(), 0x1FF);
        assert_eq!(divn.bits(49), 49);
        assert_eq!(divn.bits(0x3FF), 0x1FF);

        let afsel7 = Field::new(28, 4);
        assert_eq!(afsel7.mask(), 0xF000_0000);
        assert_eq!(afsel7.bits(5), 0x5000_0000);
        assert_eq!(afsel7.get(0x5050_0000), 5);
    }

    #[test]
    fn test_full_width_field() {
        let word = Field::new(0, 32);
        assert_eq!(word.mask(), u32::MAX);
        assert_eq!(word.get(0xDEAD_BEEF), 0xDEAD_BEEF);
    }
}
