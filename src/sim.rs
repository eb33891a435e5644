//! Simulated register file for running the bring-up sequence on a host.
//!
//! [`SimBus`] holds the RCC, GPIOA and SPI1 registers at their reset values and
//! models the handful of status bits the sequence waits on: CSIRDY follows
//! CSION, PLL1RDY follows PLL1ON, TXP follows SPE and EOT rises once a started
//! transfer has pushed CR2.TSIZE frames. Each status line can be delayed or
//! forced high/low with [`Response`]. Every access is logged, and two detectors
//! record writes the hardware would not tolerate:
//!
//! - SPI configuration written while SPE is set
//! - PLL1 source/divider/range registers written while PLL1 is running

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::error::Flag;
use crate::registers::{gpio, rcc, spi, Register, RegisterBus};

/// How a simulated status line reacts to its enable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Follows the hardware condition immediately.
    Hardware,
    /// Follows the hardware condition, but only after this many reads have
    /// observed the old level.
    Delayed(u32),
    /// Always reads set.
    StuckHigh,
    /// Always reads clear.
    StuckLow,
}

/// One logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read { reg: Register, value: u32 },
    Write { reg: Register, value: u32 },
    Modify { reg: Register, clear: u32, set: u32, value: u32 },
    WriteByte { reg: Register, value: u8 },
}

impl Access {
    pub fn register(&self) -> Register {
        match *self {
            Access::Read { reg, .. }
            | Access::Write { reg, .. }
            | Access::Modify { reg, .. }
            | Access::WriteByte { reg, .. } => reg,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Access::Read { .. })
    }

    /// Bits this access drives high, for writes.
    pub fn sets(&self) -> u32 {
        match *self {
            Access::Read { .. } => 0,
            Access::Write { value, .. } => value,
            Access::Modify { set, .. } => set,
            Access::WriteByte { value, .. } => value as u32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StatusLine {
    response: Response,
    level: bool,
    pending: u32,
}

impl StatusLine {
    const fn new() -> Self {
        Self {
            response: Response::Hardware,
            level: false,
            pending: 0,
        }
    }

    /// Level seen by a read, given the current hardware condition.
    fn sample(&mut self, condition: bool) -> bool {
        match self.response {
            Response::StuckHigh => true,
            Response::StuckLow => false,
            Response::Hardware => {
                self.level = condition;
                self.level
            }
            Response::Delayed(reads) => {
                if condition == self.level {
                    self.pending = 0;
                } else {
                    self.pending += 1;
                    if self.pending > reads {
                        self.level = condition;
                        self.pending = 0;
                    }
                }
                self.level
            }
        }
    }

    /// Level without advancing any latency counter.
    fn peek(&self) -> bool {
        match self.response {
            Response::StuckHigh => true,
            Response::StuckLow => false,
            Response::Hardware | Response::Delayed(_) => self.level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    CsiReady,
    Pll1Ready,
    TxPacket,
    EndOfTransfer,
}

impl From<Flag> for Line {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::CsiReady => Line::CsiReady,
            Flag::Pll1Ready | Flag::Pll1Stopped => Line::Pll1Ready,
            Flag::TxPacketSpace => Line::TxPacket,
            Flag::EndOfTransfer => Line::EndOfTransfer,
        }
    }
}

const RCC_STATUS: u32 = rcc::CR_CSIRDY | rcc::CR_PLL1RDY;
const SPI_STATUS: u32 = spi::SR_TXP | spi::SR_EOT;
const PLL_CONFIG: [Register; 3] = [rcc::PLLCKSELR, rcc::PLLCFGR, rcc::PLL1DIVR];
const SPI_CONFIG: [Register; 3] = [spi::CR2, spi::CFG1, spi::CFG2];

/// Simulated RCC + GPIOA + SPI1 register file.
#[derive(Debug, Clone)]
pub struct SimBus {
    regs: BTreeMap<Register, u32>,
    log: Vec<Access>,
    lines: [StatusLine; 4],
    started: bool,
    frames_sent: u32,
    transmitted: Vec<u8>,
    config_after_enable: Vec<Register>,
    pll_writes_while_running: Vec<Register>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Register file at its power-on reset state.
    pub fn new() -> Self {
        let mut regs = BTreeMap::new();
        regs.insert(rcc::CR, rcc::reset::CR);
        regs.insert(rcc::PLLCKSELR, rcc::reset::PLLCKSELR);
        regs.insert(rcc::PLLCFGR, rcc::reset::PLLCFGR);
        regs.insert(rcc::PLL1DIVR, rcc::reset::PLL1DIVR);
        regs.insert(gpio::MODER, gpio::reset::MODER_A);
        regs.insert(spi::CFG1, spi::reset::CFG1);
        regs.insert(spi::SR, spi::reset::SR & !SPI_STATUS);

        Self {
            regs,
            log: Vec::new(),
            lines: [StatusLine::new(); 4],
            started: false,
            frames_sent: 0,
            transmitted: Vec::new(),
            config_after_enable: Vec::new(),
            pll_writes_while_running: Vec::new(),
        }
    }

    /// Change how the status line behind `flag` behaves.
    pub fn set_response(&mut self, flag: Flag, response: Response) {
        self.lines[Line::from(flag) as usize].response = response;
    }

    /// Builder form of [`SimBus::set_response`].
    pub fn with_response(mut self, flag: Flag, response: Response) -> Self {
        self.set_response(flag, response);
        self
    }

    /// Overwrite a register without logging or side effects, e.g. to start from
    /// a state left behind by a bootloader. Status lines settle to the seeded
    /// state immediately.
    pub fn seed(&mut self, reg: Register, value: u32) {
        self.regs.insert(reg, value);
        if reg == rcc::CR {
            self.lines[Line::CsiReady as usize].level = value & rcc::CR_CSIRDY != 0;
            self.lines[Line::Pll1Ready as usize].level = value & rcc::CR_PLL1RDY != 0;
        }
    }

    /// Current register value without logging or advancing status lines.
    pub fn peek(&self, reg: Register) -> u32 {
        let raw = self.raw(reg);
        if reg == rcc::CR {
            (raw & !RCC_STATUS)
                | flag_bit(self.lines[Line::CsiReady as usize].peek(), rcc::CR_CSIRDY)
                | flag_bit(self.lines[Line::Pll1Ready as usize].peek(), rcc::CR_PLL1RDY)
        } else if reg == spi::SR {
            (raw & !SPI_STATUS)
                | flag_bit(self.lines[Line::TxPacket as usize].peek(), spi::SR_TXP)
                | flag_bit(self.lines[Line::EndOfTransfer as usize].peek(), spi::SR_EOT)
        } else {
            raw
        }
    }

    pub fn log(&self) -> &[Access] {
        &self.log
    }

    pub fn reads_of(&self, reg: Register) -> usize {
        self.log
            .iter()
            .filter(|a| matches!(a, Access::Read { reg: r, .. } if *r == reg))
            .count()
    }

    pub fn writes_to(&self, reg: Register) -> usize {
        self.log
            .iter()
            .filter(|a| a.is_write() && a.register() == reg)
            .count()
    }

    /// Writes to `reg` that drive any of `bits` high.
    pub fn assertions_of(&self, reg: Register, bits: u32) -> usize {
        self.log
            .iter()
            .filter(|a| a.is_write() && a.register() == reg && a.sets() & bits != 0)
            .count()
    }

    /// Frames pushed into TXDR, in order.
    pub fn transmitted(&self) -> &[u8] {
        &self.transmitted
    }

    /// SPI configuration registers written while SPE was set.
    pub fn config_writes_after_enable(&self) -> &[Register] {
        &self.config_after_enable
    }

    /// PLL1 configuration registers written while PLL1 was on or ready.
    pub fn pll_writes_while_running(&self) -> &[Register] {
        &self.pll_writes_while_running
    }

    fn raw(&self, reg: Register) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    fn line(&mut self, line: Line, condition: bool) -> bool {
        self.lines[line as usize].sample(condition)
    }

    fn load(&mut self, reg: Register) -> u32 {
        let raw = self.raw(reg);

        if reg == rcc::CR {
            let csi = self.line(Line::CsiReady, raw & rcc::CR_CSION != 0);
            let pll = self.line(Line::Pll1Ready, raw & rcc::CR_PLL1ON != 0);
            return (raw & !RCC_STATUS)
                | flag_bit(csi, rcc::CR_CSIRDY)
                | flag_bit(pll, rcc::CR_PLL1RDY);
        }

        if reg == spi::SR {
            let cr1 = self.raw(spi::CR1);
            let enabled = cr1 & spi::CR1_SPE != 0;
            let tsize = spi::CR2_TSIZE.get(self.raw(spi::CR2));
            let done = self.started && tsize != 0 && self.frames_sent >= tsize;

            let txp = self.line(Line::TxPacket, enabled);
            let eot = self.line(Line::EndOfTransfer, done);
            if eot {
                // Hardware drops CSTART once the transfer has completed
                self.regs.insert(spi::CR1, cr1 & !spi::CR1_CSTART);
            }
            return (raw & !SPI_STATUS) | flag_bit(txp, spi::SR_TXP) | flag_bit(eot, spi::SR_EOT);
        }

        raw
    }

    fn store(&mut self, reg: Register, value: u32) {
        let old = self.raw(reg);

        if PLL_CONFIG.contains(&reg) {
            let cr = self.raw(rcc::CR);
            let ready = self.lines[Line::Pll1Ready as usize].peek();
            if cr & rcc::CR_PLL1ON != 0 || ready {
                self.pll_writes_while_running.push(reg);
            }
        }

        let spe = self.raw(spi::CR1) & spi::CR1_SPE != 0;
        if spe && SPI_CONFIG.contains(&reg) {
            self.config_after_enable.push(reg);
        }

        let value = match reg {
            r if r == rcc::CR => (value & !RCC_STATUS) | (old & RCC_STATUS),
            r if r == spi::SR => old,
            r if r == spi::CR1 => {
                if spe && (old ^ value) & !spi::CR1_CONTROL != 0 {
                    self.config_after_enable.push(reg);
                }
                if value & spi::CR1_SPE == 0 {
                    self.started = false;
                    self.frames_sent = 0;
                } else if value & spi::CR1_CSTART != 0 && old & spi::CR1_CSTART == 0 {
                    self.started = true;
                    self.frames_sent = 0;
                }
                value
            }
            r if r == spi::TXDR => {
                self.push_frames(&value.to_le_bytes());
                value
            }
            _ => value,
        };

        self.regs.insert(reg, value);
    }

    fn push_frames(&mut self, frames: &[u8]) {
        self.transmitted.extend_from_slice(frames);
        if self.started {
            self.frames_sent += frames.len() as u32;
        }
    }
}

fn flag_bit(set: bool, bit: u32) -> u32 {
    if set {
        bit
    } else {
        0
    }
}

impl RegisterBus for SimBus {
    fn read(&mut self, reg: Register) -> u32 {
        let value = self.load(reg);
        self.log.push(Access::Read { reg, value });
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.log.push(Access::Write { reg, value });
        self.store(reg, value);
    }

    fn write_byte(&mut self, reg: Register, value: u8) {
        self.log.push(Access::WriteByte { reg, value });
        if reg == spi::TXDR {
            self.push_frames(&[value]);
        }
        let merged = (self.raw(reg) & !0xFF) | value as u32;
        self.regs.insert(reg, merged);
    }

    fn modify(&mut self, reg: Register, clear: u32, set: u32) {
        let value = (self.load(reg) & !clear) | set;
        self.log.push(Access::Modify { reg, clear, set, value });
        self.store(reg, value);
    }
}
