// Licensed under the Apache-2.0 license

//! In-memory stand-in for the I2C register block, used by the host tests.
//!
//! Every store is recorded in order. Side effects the driver relies on are modeled:
//! INTR_STATE is write-one-to-clear, INTR_TEST raises state bits, the FIFO reset bits
//! read back as zero, RDATA pops the RX FIFO and FDATA entries are executed at once
//! against an optional simulated target.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use embedded_hal::delay::DelayNs;

use crate::i2c::hardware_interface::{HardwareInterface, I2cRegister};

const INTR_NAK: u32 = 1 << 4;
const FDATA_START: u32 = 1 << 8;
const FDATA_READ: u32 = 1 << 10;
const FDATA_NAKOK: u32 = 1 << 12;
const FIFO_CTRL_RXRST: u32 = 1 << 0;
const FIFO_CTRL_FMTRST: u32 = 1 << 1;

/// Simulated device on the bus.
#[derive(Default)]
pub(crate) struct MockTarget {
    pub address: u8,
    /// Bytes the target returns on reads, in order.
    pub read_data: VecDeque<u8>,
    /// Bytes written to the target.
    pub written: Vec<u8>,
    /// Number of START conditions seen, repeated ones included.
    pub starts: usize,
    /// Number of STOP conditions seen.
    pub stops: usize,
    /// Data bytes accepted before the target starts NAKing writes.
    pub accept_limit: Option<usize>,
}

impl MockTarget {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub(crate) struct MockHardware {
    regs: BTreeMap<I2cRegister, u32>,
    rx_fifo: RefCell<VecDeque<u8>>,
    pub writes: Vec<(I2cRegister, u32)>,
    pub target: Option<MockTarget>,
    addressed: bool,
}

impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: MockTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Stored value of `reg`, without read side effects.
    pub fn value(&self, reg: I2cRegister) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Preload `reg` without recording a store.
    pub fn preset(&mut self, reg: I2cRegister, value: u32) {
        self.regs.insert(reg, value);
    }

    pub fn writes_to(&self, reg: I2cRegister) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn push_rx(&mut self, byte: u8) {
        self.rx_fifo.borrow_mut().push_back(byte);
    }

    fn execute_fdata(&mut self, entry: u32) {
        let byte = (entry & 0xff) as u8;
        let stop = entry & (1 << 9) != 0;
        let nak_ok = entry & FDATA_NAKOK != 0;
        let Some(target) = self.target.as_mut() else {
            return;
        };

        if entry & FDATA_START != 0 {
            target.starts += 1;
            self.addressed = byte >> 1 == target.address;
            if !self.addressed && !nak_ok {
                *self.regs.entry(I2cRegister::IntrState).or_insert(0) |= INTR_NAK;
            }
        } else if entry & FDATA_READ != 0 {
            let count = if byte == 0 { 256 } else { usize::from(byte) };
            let mut rx = self.rx_fifo.borrow_mut();
            for _ in 0..count {
                let value = if self.addressed {
                    target.read_data.pop_front().unwrap_or(0xff)
                } else {
                    0xff
                };
                rx.push_back(value);
            }
        } else if self.addressed
            && target
                .accept_limit
                .map_or(true, |limit| target.written.len() < limit)
        {
            target.written.push(byte);
        } else if !nak_ok {
            *self.regs.entry(I2cRegister::IntrState).or_insert(0) |= INTR_NAK;
        }

        if stop {
            target.stops += 1;
            self.addressed = false;
        }
    }
}

impl HardwareInterface for MockHardware {
    fn read(&self, reg: I2cRegister) -> u32 {
        match reg {
            I2cRegister::Rdata => u32::from(self.rx_fifo.borrow_mut().pop_front().unwrap_or(0)),
            I2cRegister::Fdata => 0,
            I2cRegister::FifoStatus => {
                let rx = self.rx_fifo.borrow().len() as u32;
                (self.value(reg) & !(0x3f << 24)) | (rx.min(0x3f) << 24)
            }
            I2cRegister::Status if self.target.is_some() => {
                // FMT FIFO drains instantly and the host is idle between calls.
                let rx_empty = u32::from(self.rx_fifo.borrow().is_empty());
                (1 << 2) | (1 << 3) | (rx_empty << 5)
            }
            _ => self.value(reg),
        }
    }

    fn write(&mut self, reg: I2cRegister, value: u32) {
        self.writes.push((reg, value));
        match reg {
            I2cRegister::IntrState => {
                *self.regs.entry(reg).or_insert(0) &= !value;
            }
            I2cRegister::IntrTest => {
                *self.regs.entry(I2cRegister::IntrState).or_insert(0) |= value;
            }
            I2cRegister::FifoCtrl => {
                if value & FIFO_CTRL_RXRST != 0 {
                    self.rx_fifo.borrow_mut().clear();
                }
                self.regs
                    .insert(reg, value & !(FIFO_CTRL_RXRST | FIFO_CTRL_FMTRST));
            }
            I2cRegister::Fdata => self.execute_fdata(value),
            _ => {
                self.regs.insert(reg, value);
            }
        }
    }
}

/// Delay that only counts what it was asked to wait.
#[derive(Default)]
pub(crate) struct CountingDelay {
    pub calls: usize,
    pub total_nanos: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_nanos += u64::from(ns);
    }
}
