//! GPIO port registers, RM0433 section 11.4.

use super::{Block, Field, Register};

pub const MODER: Register = Register::new(Block::GpioA, 0x00);
/// Alternate function low register, pins 0..=7
pub const AFRL: Register = Register::new(Block::GpioA, 0x20);
/// Alternate function high register, pins 8..=15
pub const AFRH: Register = Register::new(Block::GpioA, 0x24);

pub const MODE_ALTERNATE: u32 = 0b10;

/// MODER field for `pin`.
pub const fn mode(pin: u8) -> Field {
    Field::new(pin as u32 * 2, 2)
}

/// Alternate-function register and selector field for `pin`.
pub const fn afsel(pin: u8) -> (Register, Field) {
    let reg = if pin < 8 { AFRL } else { AFRH };
    (reg, Field::new((pin as u32 % 8) * 4, 4))
}

pub mod reset {
    /// Port A comes out of reset with the debug pins (PA13..PA15) in AF mode
    pub const MODER_A: u32 = 0xABFF_FFFF;
}
