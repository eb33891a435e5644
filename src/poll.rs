//! Status-flag polling.
//!
//! On the target the sequence spins on a flag with no timeout: an oscillator or
//! PLL that never comes up is fatal and there is nobody to report to. Hosts that
//! drive the same sequence (simulation, a supervisor) use a bounded poll and get
//! [`Error::NotReady`] back instead of hanging.

use crate::error::{Error, Flag};
use crate::registers::{Register, RegisterBus};

/// How long to wait for a status flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// Spin until the flag changes, however long that takes.
    #[default]
    Forever,
    /// Give up after this many reads of the status register.
    Bounded(u32),
}

/// Expected state of the polled bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Set,
    Clear,
}

impl Poll {
    /// Read `reg` until every bit in `mask` is at `level`.
    pub fn wait<B: RegisterBus>(
        self,
        bus: &mut B,
        reg: Register,
        mask: u32,
        level: Level,
        flag: Flag,
    ) -> Result<(), Error> {
        let reached = |value: u32| match level {
            Level::Set => value & mask == mask,
            Level::Clear => value & mask == 0,
        };

        match self {
            Poll::Forever => {
                while !reached(bus.read(reg)) {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            Poll::Bounded(reads) => {
                for _ in 0..reads {
                    if reached(bus.read(reg)) {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                #[cfg(feature = "defmt")]
                defmt::warn!("gave up waiting for {} after {} reads", flag, reads);
                Err(Error::NotReady(flag))
            }
        }
    }

    pub fn wait_set<B: RegisterBus>(
        self,
        bus: &mut B,
        reg: Register,
        mask: u32,
        flag: Flag,
    ) -> Result<(), Error> {
        self.wait(bus, reg, mask, Level::Set, flag)
    }

    pub fn wait_clear<B: RegisterBus>(
        self,
        bus: &mut B,
        reg: Register,
        mask: u32,
        flag: Flag,
    ) -> Result<(), Error> {
        self.wait(bus, reg, mask, Level::Clear, flag)
    }
}
