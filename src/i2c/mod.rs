// Licensed under the Apache-2.0 license

//! X-HEEP I2C host driver module.
//!
//! The peripheral is the OpenTitan-derived I2C block found on X-HEEP `SoCs`. This
//! module provides:
//!
//! - a declarative register map ([`registers`]) and the register-access seam the
//!   driver is written against ([`hardware_interface`]),
//! - the timing calculator turning a bus speed into cycle counts ([`timing`]),
//! - the format FIFO entry encoder ([`format`]),
//! - the register-level driver handle ([`heep_i2c::HeepI2c`]),
//! - an embedded-hal front end ([`i2c_controller::I2cController`]).

pub mod common;
pub mod error;
pub mod format;
pub mod hardware_interface;
pub mod heep_i2c;
pub mod i2c_controller;
pub mod registers;
pub mod timing;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use common::{
    FifoLevels, I2cConfig, I2cConfigBuilder, I2cIrq, I2cSpeed, I2cStatus, IrqSnapshot,
    TimingConfig, TimingSpec, Toggle, WatermarkLevel,
};
pub use error::Error;
pub use format::{FormatCode, FormatFlags};
pub use hardware_interface::{HardwareInterface, I2cRegister, MmioRegisters};
pub use heep_i2c::{HeepI2c, OverrideSession};
pub use i2c_controller::I2cController;
pub use traits::{I2cHardwareCore, I2cMaster};
