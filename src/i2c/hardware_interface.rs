// Licensed under the Apache-2.0 license

//! Register-access seam of the I2C driver.
//!
//! The driver never dereferences peripheral memory itself. Every access goes through
//! [`HardwareInterface`], which reads or stores one whole 32-bit register. Field-level
//! updates are composed on a local copy and committed with a single `write`, so one
//! logical register update is always exactly one store. This matters for `FDATA`,
//! where every store enqueues a new FMT FIFO entry.
//!
//! [`MmioRegisters`] is the implementation used on target. Host tests substitute an
//! in-memory register file.

use core::ptr::NonNull;

use tock_registers::interfaces::{Readable, Writeable};

use crate::i2c::registers::I2cRegisters;

/// Registers of the I2C block reachable through [`HardwareInterface`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cRegister {
    IntrState,
    IntrEnable,
    IntrTest,
    Ctrl,
    Status,
    Rdata,
    Fdata,
    FifoCtrl,
    FifoStatus,
    Ovrd,
    Val,
    Timing0,
    Timing1,
    Timing2,
    Timing3,
    Timing4,
}

impl I2cRegister {
    /// Byte offset of the register from the peripheral base address.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            I2cRegister::IntrState => 0x00,
            I2cRegister::IntrEnable => 0x04,
            I2cRegister::IntrTest => 0x08,
            I2cRegister::Ctrl => 0x0c,
            I2cRegister::Status => 0x10,
            I2cRegister::Rdata => 0x14,
            I2cRegister::Fdata => 0x18,
            I2cRegister::FifoCtrl => 0x1c,
            I2cRegister::FifoStatus => 0x20,
            I2cRegister::Ovrd => 0x24,
            I2cRegister::Val => 0x28,
            I2cRegister::Timing0 => 0x2c,
            I2cRegister::Timing1 => 0x30,
            I2cRegister::Timing2 => 0x34,
            I2cRegister::Timing3 => 0x38,
            I2cRegister::Timing4 => 0x3c,
        }
    }
}

/// Whole-register access to one I2C peripheral instance.
pub trait HardwareInterface {
    /// Load the current value of `reg`.
    ///
    /// Reading `Rdata` pops one byte from the RX FIFO.
    fn read(&self, reg: I2cRegister) -> u32;

    /// Store `value` into `reg` with a single 32-bit write.
    fn write(&mut self, reg: I2cRegister, value: u32);
}

impl<H: HardwareInterface + ?Sized> HardwareInterface for &mut H {
    fn read(&self, reg: I2cRegister) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: I2cRegister, value: u32) {
        (**self).write(reg, value);
    }
}

/// Memory-mapped register block of an I2C instance.
pub struct MmioRegisters {
    ptr: NonNull<I2cRegisters>,
}

impl MmioRegisters {
    /// Create a handle for the I2C block mapped at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must be the non-null, 4-byte aligned base address of an I2C register
    ///   block that stays mapped for the lifetime of the handle.
    /// - Only one handle may drive a given block at a time; the hardware state is not
    ///   protected by any lock.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            ptr: NonNull::new_unchecked(base as *mut I2cRegisters),
        }
    }

    fn regs(&self) -> &I2cRegisters {
        // SAFETY: `ptr` is valid for the lifetime of `self` as promised by the caller
        // of `MmioRegisters::new`.
        unsafe { self.ptr.as_ref() }
    }
}

impl HardwareInterface for MmioRegisters {
    fn read(&self, reg: I2cRegister) -> u32 {
        let regs = self.regs();
        match reg {
            I2cRegister::IntrState => regs.intr_state.get(),
            I2cRegister::IntrEnable => regs.intr_enable.get(),
            I2cRegister::IntrTest => regs.intr_test.get(),
            I2cRegister::Ctrl => regs.ctrl.get(),
            I2cRegister::Status => regs.status.get(),
            I2cRegister::Rdata => regs.rdata.get(),
            I2cRegister::Fdata => regs.fdata.get(),
            I2cRegister::FifoCtrl => regs.fifo_ctrl.get(),
            I2cRegister::FifoStatus => regs.fifo_status.get(),
            I2cRegister::Ovrd => regs.ovrd.get(),
            I2cRegister::Val => regs.val.get(),
            I2cRegister::Timing0 => regs.timing0.get(),
            I2cRegister::Timing1 => regs.timing1.get(),
            I2cRegister::Timing2 => regs.timing2.get(),
            I2cRegister::Timing3 => regs.timing3.get(),
            I2cRegister::Timing4 => regs.timing4.get(),
        }
    }

    fn write(&mut self, reg: I2cRegister, value: u32) {
        let regs = self.regs();
        match reg {
            I2cRegister::IntrState => regs.intr_state.set(value),
            I2cRegister::IntrEnable => regs.intr_enable.set(value),
            I2cRegister::IntrTest => regs.intr_test.set(value),
            I2cRegister::Ctrl => regs.ctrl.set(value),
            I2cRegister::Status => regs.status.set(value),
            I2cRegister::Rdata => regs.rdata.set(value),
            I2cRegister::Fdata => regs.fdata.set(value),
            I2cRegister::FifoCtrl => regs.fifo_ctrl.set(value),
            I2cRegister::FifoStatus => regs.fifo_status.set(value),
            I2cRegister::Ovrd => regs.ovrd.set(value),
            I2cRegister::Val => regs.val.set(value),
            I2cRegister::Timing0 => regs.timing0.set(value),
            I2cRegister::Timing1 => regs.timing1.set(value),
            I2cRegister::Timing2 => regs.timing2.set(value),
            I2cRegister::Timing3 => regs.timing3.set(value),
            I2cRegister::Timing4 => regs.timing4.set(value),
        }
    }
}
