// Licensed under the Apache-2.0 license

//! High-level I2C controller for the X-HEEP host block.
//!
//! [`I2cController`] pairs an [`I2cMaster`] with the configuration it was brought up
//! with and implements the embedded-hal I2C interface on top of it.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::I2cConfig;
use crate::i2c::traits::I2cMaster;
use embedded_hal::i2c::{Operation, SevenBitAddress};

pub struct I2cController<H: I2cMaster, L: Logger = NoOpLogger> {
    pub hardware: H,
    pub config: I2cConfig,
    pub logger: L,
}

impl<H: I2cMaster, L: Logger> I2cController<H, L> {
    pub fn new(hardware: H, config: I2cConfig, logger: L) -> Self {
        Self {
            hardware,
            config,
            logger,
        }
    }

    /// Program the hardware with the stored configuration.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`I2cHardwareCore::init`](crate::i2c::I2cHardwareCore::init).
    pub fn init(&mut self) -> Result<(), H::Error> {
        self.hardware.init(&self.config).inspect_err(|e| {
            self.logger.error(format_args!("i2c: init failed: {e:?}"));
        })
    }

    fn report(
        &mut self,
        addr: SevenBitAddress,
        result: Result<(), H::Error>,
    ) -> Result<(), H::Error> {
        if let Err(e) = &result {
            self.logger
                .warn(format_args!("i2c: transfer to {addr:#04x} failed: {e:?}"));
        }
        result
    }
}

impl<H: I2cMaster, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = H::Error;
}

impl<H: I2cMaster, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let result = self.hardware.read(addr, buffer);
        self.report(addr, result)
    }

    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        let result = self.hardware.write(addr, bytes);
        self.report(addr, result)
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let result = self.hardware.write_read(addr, bytes, buffer);
        self.report(addr, result)
    }

    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.hardware.transaction_slice(addr, operations);
        self.report(addr, result)
    }
}
