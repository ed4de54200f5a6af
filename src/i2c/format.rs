// Licensed under the Apache-2.0 license

//! Format FIFO entry encoding.
//!
//! Every store to FDATA enqueues one entry in the FMT FIFO: a byte plus the control
//! bits telling the host state machine what to do with it. For write entries the
//! byte goes on the bus. For read entries it is the number of bytes to read, where
//! 0 means 256.

use tock_registers::LocalRegisterCopy;

use crate::i2c::error::Error;
use crate::i2c::registers::FDATA;

/// Control bits of one FMT FIFO entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatFlags {
    /// Issue a START (or repeated START) before the byte.
    pub start: bool,
    /// Issue a STOP after the byte.
    pub stop: bool,
    /// Read `byte` bytes instead of writing one.
    pub read: bool,
    /// ACK the last byte read so the read can continue with the next entry.
    pub read_continue: bool,
    /// Do not raise the NAK interrupt if the byte is not acknowledged.
    pub suppress_nak_irq: bool,
}

impl FormatFlags {
    /// Check that the combination is meaningful to the host state machine.
    ///
    /// START and NAK suppression only apply to writes, so they cannot be mixed with
    /// the read bits. `read_continue` needs `read`.
    ///
    /// STOP is accepted together with `read` only in the shape produced by
    /// [`FormatCode::RxStop`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] for an invalid combination.
    pub fn validate(&self) -> Result<(), Error> {
        let has_write_flags = self.start || self.suppress_nak_irq || (self.stop && !self.read);
        let has_read_flags = self.read || self.read_continue;
        if has_write_flags && has_read_flags {
            return Err(Error::BadArg);
        }
        if self.read_continue && !self.read {
            return Err(Error::BadArg);
        }
        if self.read_continue && self.stop {
            return Err(Error::BadArg);
        }
        Ok(())
    }
}

/// Shorthand for the flag combinations used by ordinary transfers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatCode {
    /// START followed by the byte (usually the address).
    Start,
    /// Write the byte.
    Tx,
    /// Write the byte, then STOP.
    TxStop,
    /// Read `byte` bytes, NAK the last one.
    Rx,
    /// Read `byte` bytes, ACK the last one.
    RxContinue,
    /// Read `byte` bytes, NAK the last one, then STOP.
    RxStop,
}

impl FormatCode {
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            FormatCode::Rx | FormatCode::RxContinue | FormatCode::RxStop
        )
    }

    /// Expand the code into entry flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] when NAK suppression is requested on a read code.
    pub fn flags(self, suppress_nak_irq: bool) -> Result<FormatFlags, Error> {
        if suppress_nak_irq && self.is_read() {
            return Err(Error::BadArg);
        }
        let mut flags = FormatFlags {
            suppress_nak_irq,
            ..FormatFlags::default()
        };
        match self {
            FormatCode::Start => flags.start = true,
            FormatCode::Tx => {}
            FormatCode::TxStop => flags.stop = true,
            FormatCode::Rx => flags.read = true,
            FormatCode::RxContinue => {
                flags.read = true;
                flags.read_continue = true;
            }
            FormatCode::RxStop => {
                flags.read = true;
                flags.stop = true;
            }
        }
        Ok(flags)
    }
}

/// Overlay `byte` and `flags` on `base` and return the composite FDATA value.
#[must_use]
pub fn encode_fdata(base: u32, byte: u8, flags: FormatFlags) -> u32 {
    let mut entry = LocalRegisterCopy::<u32, FDATA::Register>::new(base);
    entry.modify(
        FDATA::FBYTE.val(u32::from(byte))
            + FDATA::START.val(u32::from(flags.start))
            + FDATA::STOP.val(u32::from(flags.stop))
            + FDATA::READ.val(u32::from(flags.read))
            + FDATA::RCONT.val(u32::from(flags.read_continue))
            + FDATA::NAKOK.val(u32::from(flags.suppress_nak_irq)),
    );
    entry.get()
}
