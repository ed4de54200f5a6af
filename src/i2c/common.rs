// Licensed under the Apache-2.0 license

//! Common types for the X-HEEP I2C driver modules.
//!
//! This module provides the small value records exchanged with the driver: bus
//! speeds, timing inputs and outputs, FIFO watermarks, interrupt lines and the
//! configuration builder used at initialization.

use fugit::HertzU32;

use crate::i2c::error::Error;
use crate::i2c::registers::I2C_PARAM_NUM_IRQS;

/// I2C bus speed class, in bits per second.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
    FastPlus = 1_000_000,
}

impl I2cSpeed {
    /// Bus speed in kbit/s.
    #[must_use]
    pub const fn kbps(self) -> u32 {
        self as u32 / 1000
    }

    /// Shortest SCL period allowed for this speed class, in nanoseconds.
    #[must_use]
    pub const fn min_scl_period_nanos(self) -> u32 {
        const NANOS_PER_KBAUD: u32 = 1_000_000;
        NANOS_PER_KBAUD / self.kbps()
    }

    /// Worst-case (rise, fall) times allowed for this speed class, in nanoseconds.
    #[must_use]
    pub const fn max_rise_fall_nanos(self) -> (u32, u32) {
        match self {
            I2cSpeed::Standard => (1000, 300),
            I2cSpeed::Fast => (300, 300),
            I2cSpeed::FastPlus => (120, 120),
        }
    }
}

impl TryFrom<u32> for I2cSpeed {
    type Error = Error;

    /// Map a bus frequency in Hz onto a speed class.
    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            100_000 => Ok(I2cSpeed::Standard),
            400_000 => Ok(I2cSpeed::Fast),
            1_000_000 => Ok(I2cSpeed::FastPlus),
            _ => Err(Error::BadArg),
        }
    }
}

/// Enable/disable switch for single-bit controls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Toggle {
    Enabled,
    Disabled,
}

impl Toggle {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enabled)
    }
}

impl From<bool> for Toggle {
    fn from(enabled: bool) -> Self {
        if enabled {
            Toggle::Enabled
        } else {
            Toggle::Disabled
        }
    }
}

/// Physical characteristics of the bus, used to derive a [`TimingConfig`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingSpec {
    /// Speed class of the slowest device on the bus.
    pub lowest_target_device_speed: I2cSpeed,
    /// Period of the peripheral clock.
    pub clock_period_nanos: u32,
    /// Rise time of SDA (and SCL), t(r).
    pub sda_rise_nanos: u32,
    /// Fall time of SDA (and SCL), t(f).
    pub sda_fall_nanos: u32,
    /// Requested SCL period. Raised to the speed class minimum when shorter.
    pub scl_period_nanos: u32,
}

impl TimingSpec {
    /// Timing inputs for `speed` on a peripheral clocked at `clock`.
    ///
    /// Rise and fall times are the worst case allowed for the speed class and the SCL
    /// period is the speed class minimum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] for a zero clock rate.
    pub fn for_clock(speed: I2cSpeed, clock: HertzU32) -> Result<Self, Error> {
        const NANOS_PER_SECOND: u32 = 1_000_000_000;
        let hz = clock.to_Hz();
        if hz == 0 {
            return Err(Error::BadArg);
        }
        let clock_period_nanos = NANOS_PER_SECOND.div_ceil(hz);
        let (sda_rise_nanos, sda_fall_nanos) = speed.max_rise_fall_nanos();
        Ok(Self {
            lowest_target_device_speed: speed,
            clock_period_nanos,
            sda_rise_nanos,
            sda_fall_nanos,
            scl_period_nanos: speed.min_scl_period_nanos(),
        })
    }
}

/// Cycle counts programmed into TIMING0..TIMING4.
///
/// An all-zero value means "unset".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    pub scl_time_high_cycles: u16,
    pub scl_time_low_cycles: u16,
    pub rise_cycles: u16,
    pub fall_cycles: u16,
    pub start_signal_setup_cycles: u16,
    pub start_signal_hold_cycles: u16,
    pub data_signal_setup_cycles: u16,
    pub data_signal_hold_cycles: u16,
    pub stop_signal_setup_cycles: u16,
    pub stop_signal_hold_cycles: u16,
}

impl TimingConfig {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// Cycles spent on one SCL period: high + low + rise + fall.
    #[must_use]
    pub fn scl_period_cycles(&self) -> u32 {
        u32::from(self.scl_time_high_cycles)
            + u32::from(self.scl_time_low_cycles)
            + u32::from(self.rise_cycles)
            + u32::from(self.fall_cycles)
    }
}

/// FIFO fill level at which the watermark interrupt fires.
///
/// All levels are valid for the RX FIFO; the FMT FIFO supports up to 16 bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatermarkLevel {
    Byte1,
    Byte4,
    Byte8,
    Byte16,
    Byte30,
}

impl TryFrom<u8> for WatermarkLevel {
    type Error = Error;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(WatermarkLevel::Byte1),
            4 => Ok(WatermarkLevel::Byte4),
            8 => Ok(WatermarkLevel::Byte8),
            16 => Ok(WatermarkLevel::Byte16),
            30 => Ok(WatermarkLevel::Byte30),
            _ => Err(Error::BadArg),
        }
    }
}

/// Interrupt lines of the I2C block. The discriminant is the bit index in
/// INTR_STATE, INTR_ENABLE and INTR_TEST.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum I2cIrq {
    FmtWatermark = 0,
    RxWatermark = 1,
    FmtOverflow = 2,
    RxOverflow = 3,
    Nak = 4,
    SclInterference = 5,
    SdaInterference = 6,
    StretchTimeout = 7,
    SdaUnstable = 8,
    TransComplete = 9,
    TxEmpty = 10,
    TxNonEmpty = 11,
    TxOverflow = 12,
    AcqOverflow = 13,
    AckStop = 14,
    HostTimeout = 15,
}

impl I2cIrq {
    pub const ALL: [I2cIrq; I2C_PARAM_NUM_IRQS as usize] = [
        I2cIrq::FmtWatermark,
        I2cIrq::RxWatermark,
        I2cIrq::FmtOverflow,
        I2cIrq::RxOverflow,
        I2cIrq::Nak,
        I2cIrq::SclInterference,
        I2cIrq::SdaInterference,
        I2cIrq::StretchTimeout,
        I2cIrq::SdaUnstable,
        I2cIrq::TransComplete,
        I2cIrq::TxEmpty,
        I2cIrq::TxNonEmpty,
        I2cIrq::TxOverflow,
        I2cIrq::AcqOverflow,
        I2cIrq::AckStop,
        I2cIrq::HostTimeout,
    ];

    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Single-bit mask addressing this line in the interrupt registers.
    #[must_use]
    pub const fn mask(self) -> u32 {
        1 << self.index()
    }
}

impl TryFrom<u32> for I2cIrq {
    type Error = Error;

    /// Validate a raw interrupt line number, which must be below the number of lines.
    fn try_from(line: u32) -> Result<Self, Self::Error> {
        usize::try_from(line)
            .ok()
            .and_then(|i| I2cIrq::ALL.get(i).copied())
            .ok_or(Error::BadArg)
    }
}

/// INTR_ENABLE contents captured by `irq_disable_all`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqSnapshot(pub(crate) u32);

impl IrqSnapshot {
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// Current fill levels of the host FIFOs, in entries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoLevels {
    pub fmt: u8,
    pub rx: u8,
}

/// Live status flags of the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cStatus {
    pub fmt_full: bool,
    pub rx_full: bool,
    pub fmt_empty: bool,
    pub host_idle: bool,
    pub rx_empty: bool,
}

pub struct I2cConfig {
    pub timing: TimingSpec,
    pub rx_watermark: WatermarkLevel,
    pub fmt_watermark: WatermarkLevel,
    pub host_enabled: bool,
}

pub struct I2cConfigBuilder {
    timing: Option<TimingSpec>,
    speed: I2cSpeed,
    clock_period_nanos: u32,
    rx_watermark: WatermarkLevel,
    fmt_watermark: WatermarkLevel,
    host_enabled: bool,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    /// Peripheral clock period assumed when none is given (100 MHz).
    pub const DEFAULT_CLOCK_PERIOD_NANOS: u32 = 10;

    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: None,
            speed: I2cSpeed::Standard,
            clock_period_nanos: Self::DEFAULT_CLOCK_PERIOD_NANOS,
            rx_watermark: WatermarkLevel::Byte1,
            fmt_watermark: WatermarkLevel::Byte1,
            host_enabled: true,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn clock_period_nanos(mut self, nanos: u32) -> Self {
        self.clock_period_nanos = nanos;
        self
    }
    /// Use complete timing inputs; overrides `speed` and `clock_period_nanos`.
    #[must_use]
    pub fn timing(mut self, timing: TimingSpec) -> Self {
        self.timing = Some(timing);
        self
    }
    #[must_use]
    pub fn rx_watermark(mut self, level: WatermarkLevel) -> Self {
        self.rx_watermark = level;
        self
    }
    #[must_use]
    pub fn fmt_watermark(mut self, level: WatermarkLevel) -> Self {
        self.fmt_watermark = level;
        self
    }
    #[must_use]
    pub fn host_enabled(mut self, enabled: bool) -> Self {
        self.host_enabled = enabled;
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        let speed = self.speed;
        let clock_period_nanos = self.clock_period_nanos;
        let (sda_rise_nanos, sda_fall_nanos) = speed.max_rise_fall_nanos();
        I2cConfig {
            timing: self.timing.unwrap_or(TimingSpec {
                lowest_target_device_speed: speed,
                clock_period_nanos,
                sda_rise_nanos,
                sda_fall_nanos,
                scl_period_nanos: speed.min_scl_period_nanos(),
            }),
            rx_watermark: self.rx_watermark,
            fmt_watermark: self.fmt_watermark,
            host_enabled: self.host_enabled,
        }
    }
}
