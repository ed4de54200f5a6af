// Licensed under the Apache-2.0 license

//! Timing calculator.
//!
//! Converts a [`TimingSpec`] into the cycle counts of the TIMING0..TIMING4 registers.
//! Baseline values come from the minimum timings the I2C bus specification defines
//! for each speed class. The SCL high period is then stretched until one full SCL
//! period covers the requested bus period.

use crate::i2c::common::{I2cSpeed, TimingConfig, TimingSpec};
use crate::i2c::error::Error;

/// Minimum bus timings of a speed class, in nanoseconds.
struct SpeedTimings {
    scl_high: u32,
    scl_low: u32,
    start_setup: u32,
    start_hold: u32,
    data_setup: u32,
    stop_setup: u32,
    stop_hold: u32,
}

const fn speed_timings(speed: I2cSpeed) -> SpeedTimings {
    match speed {
        I2cSpeed::Standard => SpeedTimings {
            scl_high: 4000,
            scl_low: 4700,
            start_setup: 4700,
            start_hold: 4000,
            data_setup: 250,
            stop_setup: 4000,
            stop_hold: 4700,
        },
        I2cSpeed::Fast => SpeedTimings {
            scl_high: 600,
            scl_low: 1300,
            start_setup: 600,
            start_hold: 600,
            data_setup: 100,
            stop_setup: 600,
            stop_hold: 1300,
        },
        I2cSpeed::FastPlus => SpeedTimings {
            scl_high: 260,
            scl_low: 500,
            start_setup: 260,
            start_hold: 260,
            data_setup: 50,
            stop_setup: 260,
            stop_hold: 500,
        },
    }
}

/// Ceiling of `a / b`, truncated to 16 bits.
///
/// Returns 0 for `a == 0`. `b` must be non-zero; callers keep the true quotient
/// within 16 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn round_up_divide(a: u32, b: u32) -> u16 {
    if a == 0 {
        return 0;
    }
    (((a - 1) / b) + 1) as u16
}

/// Baseline cycle counts for `speed`, before rise/fall and SCL period adjustments.
///
/// `clock_period_nanos` must be non-zero.
#[must_use]
pub fn default_timing_for_speed(speed: I2cSpeed, clock_period_nanos: u32) -> TimingConfig {
    let t = speed_timings(speed);
    let cycles = |nanos| round_up_divide(nanos, clock_period_nanos);
    TimingConfig {
        scl_time_high_cycles: cycles(t.scl_high),
        scl_time_low_cycles: cycles(t.scl_low),
        rise_cycles: 0,
        fall_cycles: 0,
        start_signal_setup_cycles: cycles(t.start_setup),
        start_signal_hold_cycles: cycles(t.start_hold),
        data_signal_setup_cycles: cycles(t.data_setup),
        data_signal_hold_cycles: 0,
        stop_signal_setup_cycles: cycles(t.stop_setup),
        stop_signal_hold_cycles: cycles(t.stop_hold),
    }
}

/// Derive the register cycle counts for `spec`.
///
/// # Errors
///
/// Returns [`Error::BadArg`] when `spec.clock_period_nanos` is zero.
pub fn compute_timing(spec: &TimingSpec) -> Result<TimingConfig, Error> {
    let period = spec.clock_period_nanos;
    if period == 0 {
        return Err(Error::BadArg);
    }
    let speed = spec.lowest_target_device_speed;

    let mut config = default_timing_for_speed(speed, period);
    config.rise_cycles = round_up_divide(spec.sda_rise_nanos, period);
    config.fall_cycles = round_up_divide(spec.sda_fall_nanos, period);

    let scl_period_nanos = spec.scl_period_nanos.max(speed.min_scl_period_nanos());
    let scl_period_cycles = round_up_divide(scl_period_nanos, period);

    // Lengthen the SCL high period to accommodate the desired SCL period.
    let lengthened_high_cycles = scl_period_cycles
        .saturating_sub(config.scl_time_low_cycles)
        .saturating_sub(config.rise_cycles)
        .saturating_sub(config.fall_cycles);
    if lengthened_high_cycles > config.scl_time_high_cycles {
        config.scl_time_high_cycles = lengthened_high_cycles;
    }

    Ok(config)
}
