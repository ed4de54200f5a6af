// Licensed under the Apache-2.0 license

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Errors reported by the I2C driver.
///
/// `BadArg` is the only error the register-level operations produce, and it is
/// always raised before any register is touched. The other variants come from the
/// transfer layer that polls the hardware for completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A caller-supplied argument failed validation.
    BadArg,
    /// The target did not acknowledge the address or a data byte.
    NoAcknowledge,
    /// The transfer did not complete within the polling budget.
    Timeout,
    /// Interference detected on SCL or SDA.
    Bus,
    /// The FMT or RX FIFO overflowed.
    Overrun,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadArg => f.write_str("invalid argument"),
            Error::NoAcknowledge => f.write_str("no acknowledge from target"),
            Error::Timeout => f.write_str("transfer timed out"),
            Error::Bus => f.write_str("bus interference"),
            Error::Overrun => f.write_str("fifo overflow"),
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::BadArg | Error::Timeout => ErrorKind::Other,
            Error::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::Bus => ErrorKind::Bus,
            Error::Overrun => ErrorKind::Overrun,
        }
    }
}
