// Licensed under the Apache-2.0 license

//! # I2C Hardware Abstraction Traits
//!
//! Two small traits separate bring-up from bus traffic so a front end such as
//! [`I2cController`](crate::i2c::I2cController) can be written once for any host block.
//!
//! ```text
//! I2cHardwareCore (init, timing, interrupts, recovery)
//!     └── I2cMaster (host transfers)
//! ```

use crate::i2c::common::{I2cConfig, TimingConfig, TimingSpec};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{AddressMode, Operation, SevenBitAddress};

/// Core I2C hardware interface providing basic operations
///
/// This is the foundation trait every I2C host implementation provides.
///
/// # Examples
///
/// ```rust,no_run
/// use heep_i2c::i2c::{I2cConfigBuilder, I2cHardwareCore, I2cSpeed};
///
/// fn setup_i2c<T: I2cHardwareCore>(controller: &mut T) -> Result<(), T::Error> {
///     let config = I2cConfigBuilder::new().speed(I2cSpeed::Fast).build();
///     controller.init(&config)?;
///     controller.enable_interrupts(1 << 4); // NAK
///     Ok(())
/// }
/// ```
pub trait I2cHardwareCore {
    /// Hardware-specific error type that implements embedded-hal error traits
    type Error: embedded_hal::i2c::Error + core::fmt::Debug;

    /// Initialize the I2C hardware with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected. Implementations validate
    /// the whole configuration before programming anything.
    fn init(&mut self, config: &I2cConfig) -> Result<(), Self::Error>;

    /// Derive and commit bus timing
    ///
    /// Returns the cycle counts that were written to the hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if `spec` cannot be turned into cycle counts.
    fn configure_timing(&mut self, spec: &TimingSpec) -> Result<TimingConfig, Self::Error>;

    /// Enable hardware interrupts with the specified mask
    ///
    /// Bit `n` of `mask` is interrupt line `n`; bits without a line are ignored.
    fn enable_interrupts(&mut self, mask: u32);

    /// Clear latched hardware interrupts with the specified mask
    fn clear_interrupts(&mut self, mask: u32);

    /// Attempt to recover the I2C bus from a target holding SDA low
    ///
    /// `delay` paces the SCL edges generated by software.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus is still stuck afterwards.
    fn recover_bus<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;
}

/// I2C Master mode operations
///
/// The address type `A` must implement `AddressMode` to ensure compatibility
/// with embedded-hal.
///
/// # Examples
///
/// ```rust,no_run
/// use heep_i2c::i2c::I2cMaster;
///
/// fn read_sensor<T: I2cMaster>(mut i2c: T) -> Result<u16, T::Error> {
///     let mut data = [0u8; 2];
///     i2c.read(0x48u8, &mut data)?;
///     Ok(u16::from_be_bytes(data))
/// }
/// ```
pub trait I2cMaster<A: AddressMode = SevenBitAddress>: I2cHardwareCore {
    /// Write data to a target device at the given address
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not acknowledge or the bus misbehaves.
    fn write(&mut self, addr: A, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a target device at the given address
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not acknowledge or the bus misbehaves.
    fn read(&mut self, addr: A, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read with a repeated START in between
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not acknowledge during either phase.
    fn write_read(&mut self, addr: A, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Execute a sequence of operations as one transaction
    ///
    /// Consecutive operations of the same direction are merged on the bus. A STOP is
    /// only issued after the last operation that moves data.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation in the sequence fails; the remaining
    /// operations are not attempted.
    fn transaction_slice(
        &mut self,
        addr: A,
        ops_slice: &mut [Operation<'_>],
    ) -> Result<(), Self::Error>;
}
