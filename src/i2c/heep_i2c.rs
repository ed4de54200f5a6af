// Licensed under the Apache-2.0 license

//! Register-level driver for the X-HEEP I2C host.
//!
//! [`HeepI2c`] owns a [`HardwareInterface`] and exposes every host control of the
//! block: timing, FMT/RX FIFOs, pin override and interrupts. Each operation is a
//! short, bounded sequence of register accesses. Argument validation always happens
//! before the first store, so an `Err(Error::BadArg)` leaves the hardware untouched.
//!
//! The handle holds no lock. Callers sharing one instance between thread and
//! interrupt context must serialize access themselves.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Operation, SevenBitAddress};
use tock_registers::fields::FieldValue;
use tock_registers::{LocalRegisterCopy, RegisterLongName};

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{
    FifoLevels, I2cConfig, I2cIrq, I2cStatus, IrqSnapshot, TimingConfig, TimingSpec, Toggle,
    WatermarkLevel,
};
use crate::i2c::error::Error;
use crate::i2c::format::{encode_fdata, FormatCode, FormatFlags};
use crate::i2c::hardware_interface::{HardwareInterface, I2cRegister};
use crate::i2c::registers::{
    CTRL, FIFO_CTRL, FIFO_STATUS, INTR, OVRD, RDATA, STATUS, TIMING0, TIMING1, TIMING2, TIMING3,
    TIMING4, VAL,
};
use crate::i2c::timing::compute_timing;
use crate::i2c::traits::{I2cHardwareCore, I2cMaster};

/// Iterations spent polling the hardware before a transfer is declared stuck.
const POLL_BUDGET: u32 = 100_000;

/// Largest read a single FMT entry can request.
const MAX_READ_CHUNK: usize = 256;

/// SCL pulses issued by bus recovery before giving up on a stuck SDA.
const RECOVERY_PULSES: u32 = 9;

/// Half of the 100 kHz SCL period bus recovery runs at.
const RECOVERY_HALF_PERIOD_US: u32 = 5;

/// Bits of INTR_* that correspond to real interrupt lines.
const IRQ_MASK: u32 = (1 << crate::i2c::registers::I2C_PARAM_NUM_IRQS) - 1;

pub struct HeepI2c<H: HardwareInterface, L: Logger = NoOpLogger> {
    hw: H,
    logger: L,
}

impl<H: HardwareInterface> HeepI2c<H, NoOpLogger> {
    pub fn without_logging(hw: H) -> Self {
        Self::new(hw, NoOpLogger)
    }
}

impl<H: HardwareInterface, L: Logger> HeepI2c<H, L> {
    pub fn new(hw: H, logger: L) -> Self {
        Self { hw, logger }
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Give back the register handle.
    pub fn release(self) -> H {
        self.hw
    }

    fn load<R: RegisterLongName>(&self, reg: I2cRegister) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.hw.read(reg))
    }

    fn store<R: RegisterLongName>(&mut self, reg: I2cRegister, value: LocalRegisterCopy<u32, R>) {
        self.hw.write(reg, value.get());
    }

    fn update<R: RegisterLongName>(&mut self, reg: I2cRegister, field: FieldValue<u32, R>) {
        let mut value = self.load::<R>(reg);
        value.modify(field);
        self.store(reg, value);
    }

    // ---------------------------------------------------------------------------
    // Timing
    // ---------------------------------------------------------------------------

    /// Commit `config` to TIMING0..TIMING4, one store per register.
    ///
    /// Field ranges are not checked; values wider than 16 bits cannot be expressed.
    pub fn configure(&mut self, config: &TimingConfig) {
        self.update(
            I2cRegister::Timing0,
            TIMING0::THIGH.val(config.scl_time_high_cycles.into())
                + TIMING0::TLOW.val(config.scl_time_low_cycles.into()),
        );
        self.update(
            I2cRegister::Timing1,
            TIMING1::T_R.val(config.rise_cycles.into()) + TIMING1::T_F.val(config.fall_cycles.into()),
        );
        self.update(
            I2cRegister::Timing2,
            TIMING2::TSU_STA.val(config.start_signal_setup_cycles.into())
                + TIMING2::THD_STA.val(config.start_signal_hold_cycles.into()),
        );
        self.update(
            I2cRegister::Timing3,
            TIMING3::TSU_DAT.val(config.data_signal_setup_cycles.into())
                + TIMING3::THD_DAT.val(config.data_signal_hold_cycles.into()),
        );
        self.update(
            I2cRegister::Timing4,
            TIMING4::TSU_STO.val(config.stop_signal_setup_cycles.into())
                + TIMING4::T_BUF.val(config.stop_signal_hold_cycles.into()),
        );
        self.logger.debug(format_args!(
            "i2c: timing high={} low={} rise={} fall={}",
            config.scl_time_high_cycles,
            config.scl_time_low_cycles,
            config.rise_cycles,
            config.fall_cycles
        ));
    }

    // ---------------------------------------------------------------------------
    // Host control and status
    // ---------------------------------------------------------------------------

    pub fn host_set_enabled(&mut self, state: Toggle) {
        self.update(
            I2cRegister::Ctrl,
            CTRL::ENABLEHOST.val(u32::from(state.is_enabled())),
        );
    }

    #[must_use]
    pub fn status(&self) -> I2cStatus {
        let status = self.load::<STATUS::Register>(I2cRegister::Status);
        I2cStatus {
            fmt_full: status.is_set(STATUS::FMTFULL),
            rx_full: status.is_set(STATUS::RXFULL),
            fmt_empty: status.is_set(STATUS::FMTEMPTY),
            host_idle: status.is_set(STATUS::HOSTIDLE),
            rx_empty: status.is_set(STATUS::RXEMPTY),
        }
    }

    // ---------------------------------------------------------------------------
    // FIFOs
    // ---------------------------------------------------------------------------

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_fifo_levels(&self) -> FifoLevels {
        let status = self.load::<FIFO_STATUS::Register>(I2cRegister::FifoStatus);
        FifoLevels {
            fmt: status.read(FIFO_STATUS::FMTLVL) as u8,
            rx: status.read(FIFO_STATUS::RXLVL) as u8,
        }
    }

    /// Set the RX and FMT watermark levels in one FIFO_CTRL store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] for a 30 byte FMT watermark, which the FMT FIFO does
    /// not support. Nothing is written in that case.
    pub fn set_watermarks(
        &mut self,
        rx_level: WatermarkLevel,
        fmt_level: WatermarkLevel,
    ) -> Result<(), Error> {
        let rx = rx_level_value(rx_level);
        let fmt = fmt_level_value(fmt_level)?;
        self.update(I2cRegister::FifoCtrl, rx + fmt);
        Ok(())
    }

    pub fn reset_rx_fifo(&mut self) {
        self.update(I2cRegister::FifoCtrl, FIFO_CTRL::RXRST::SET);
    }

    pub fn reset_fmt_fifo(&mut self) {
        self.update(I2cRegister::FifoCtrl, FIFO_CTRL::FMTRST::SET);
    }

    /// Pop one byte from the RX FIFO.
    ///
    /// The value is meaningless when the FIFO is empty; see [`Self::try_read_byte`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_byte(&mut self) -> u8 {
        self.load::<RDATA::Register>(I2cRegister::Rdata)
            .read(RDATA::RDATA) as u8
    }

    /// Pop one byte from the RX FIFO, or `WouldBlock` while it is empty.
    pub fn try_read_byte(&mut self) -> nb::Result<u8, Error> {
        if self.get_fifo_levels().rx == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.read_byte())
    }

    // ---------------------------------------------------------------------------
    // Format FIFO
    // ---------------------------------------------------------------------------

    /// Enqueue one FMT entry built from `byte` and `flags`.
    ///
    /// The whole entry is assembled on a local copy and stored once. The FMT FIFO
    /// takes every FDATA store as a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] when `flags` mixes write-only and read-only bits, or
    /// sets `read_continue` without `read`.
    pub fn write_byte_raw(&mut self, byte: u8, flags: FormatFlags) -> Result<(), Error> {
        flags.validate()?;
        let entry = encode_fdata(self.hw.read(I2cRegister::Fdata), byte, flags);
        self.hw.write(I2cRegister::Fdata, entry);
        Ok(())
    }

    /// Enqueue one FMT entry described by `code`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadArg`] when `suppress_nak_irq` is combined with a read code.
    pub fn write_byte(
        &mut self,
        byte: u8,
        code: FormatCode,
        suppress_nak_irq: bool,
    ) -> Result<(), Error> {
        let flags = code.flags(suppress_nak_irq)?;
        self.write_byte_raw(byte, flags)
    }

    // ---------------------------------------------------------------------------
    // Override mode
    // ---------------------------------------------------------------------------

    pub fn override_set_enabled(&mut self, state: Toggle) {
        self.update(
            I2cRegister::Ovrd,
            OVRD::TXOVRDEN.val(u32::from(state.is_enabled())),
        );
    }

    /// Set the levels SCL and SDA are driven to while override mode is enabled.
    ///
    /// Accepted while override is disabled, in which case the bus is unaffected until
    /// override is enabled. Prefer [`Self::enter_override`].
    pub fn override_drive_pins(&mut self, scl: bool, sda: bool) {
        let ovrd = self.load::<OVRD::Register>(I2cRegister::Ovrd);
        if !ovrd.is_set(OVRD::TXOVRDEN) {
            self.logger.warn(format_args!(
                "i2c: driving pins with override disabled has no effect"
            ));
        }
        self.drive_override_pins(scl, sda);
    }

    fn drive_override_pins(&mut self, scl: bool, sda: bool) {
        self.update(
            I2cRegister::Ovrd,
            OVRD::SCLVAL.val(u32::from(scl)) + OVRD::SDAVAL.val(u32::from(sda)),
        );
    }

    /// Oversampled SCL and SDA values, one bit per sample, most recent in bit 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn override_sample_pins(&self) -> (u16, u16) {
        let val = self.load::<VAL::Register>(I2cRegister::Val);
        (val.read(VAL::SCL_RX) as u16, val.read(VAL::SDA_RX) as u16)
    }

    /// Enable override mode for the lifetime of the returned session.
    ///
    /// Override is disabled again when the session is dropped.
    pub fn enter_override(&mut self) -> OverrideSession<'_, H, L> {
        self.override_set_enabled(Toggle::Enabled);
        OverrideSession { i2c: self }
    }

    // ---------------------------------------------------------------------------
    // Interrupts
    // ---------------------------------------------------------------------------

    #[must_use]
    pub fn irq_is_pending(&self, irq: I2cIrq) -> bool {
        self.hw.read(I2cRegister::IntrState) & irq.mask() != 0
    }

    /// Clear a latched interrupt. INTR_STATE is write-one-to-clear, so only the bit of
    /// `irq` is written.
    pub fn irq_acknowledge(&mut self, irq: I2cIrq) {
        self.hw.write(I2cRegister::IntrState, irq.mask());
    }

    #[must_use]
    pub fn irq_get_enabled(&self, irq: I2cIrq) -> Toggle {
        Toggle::from(self.hw.read(I2cRegister::IntrEnable) & irq.mask() != 0)
    }

    pub fn irq_set_enabled(&mut self, irq: I2cIrq, state: Toggle) {
        let enable = self.hw.read(I2cRegister::IntrEnable);
        let enable = if state.is_enabled() {
            enable | irq.mask()
        } else {
            enable & !irq.mask()
        };
        self.hw.write(I2cRegister::IntrEnable, enable);
    }

    /// Raise `irq` through INTR_TEST.
    pub fn irq_force(&mut self, irq: I2cIrq) {
        self.hw.write(I2cRegister::IntrTest, irq.mask());
    }

    /// Disable every interrupt and return the previous enable mask.
    pub fn irq_disable_all(&mut self) -> IrqSnapshot {
        let snapshot = IrqSnapshot(self.hw.read(I2cRegister::IntrEnable));
        self.hw.write(I2cRegister::IntrEnable, 0);
        snapshot
    }

    /// Write back a mask captured by [`Self::irq_disable_all`].
    pub fn irq_restore_all(&mut self, snapshot: IrqSnapshot) {
        self.hw.write(I2cRegister::IntrEnable, snapshot.bits());
    }

    // ---------------------------------------------------------------------------
    // Transfers
    // ---------------------------------------------------------------------------

    /// Translate latched error interrupts into an error, cleaning up after a NAK.
    fn check_errors(&mut self) -> Result<(), Error> {
        let state = self.load::<INTR::Register>(I2cRegister::IntrState);
        if state.is_set(INTR::NAK) {
            self.irq_acknowledge(I2cIrq::Nak);
            self.reset_fmt_fifo();
            self.reset_rx_fifo();
            self.logger.debug(format_args!("i2c: target did not acknowledge"));
            return Err(Error::NoAcknowledge);
        }
        if state.is_set(INTR::SCL_INTERFERENCE) || state.is_set(INTR::SDA_INTERFERENCE) {
            self.irq_acknowledge(I2cIrq::SclInterference);
            self.irq_acknowledge(I2cIrq::SdaInterference);
            self.logger.error(format_args!("i2c: bus interference"));
            return Err(Error::Bus);
        }
        if state.is_set(INTR::FMT_OVERFLOW) || state.is_set(INTR::RX_OVERFLOW) {
            self.irq_acknowledge(I2cIrq::FmtOverflow);
            self.irq_acknowledge(I2cIrq::RxOverflow);
            self.logger.error(format_args!("i2c: fifo overflow"));
            return Err(Error::Overrun);
        }
        Ok(())
    }

    fn poll_until(&mut self, done: impl Fn(&Self) -> bool) -> Result<(), Error> {
        for _ in 0..POLL_BUDGET {
            self.check_errors()?;
            if done(&*self) {
                return Ok(());
            }
        }
        self.logger.error(format_args!("i2c: transfer timed out"));
        Err(Error::Timeout)
    }

    fn push_entry(&mut self, byte: u8, flags: FormatFlags) -> Result<(), Error> {
        self.poll_until(|i2c| !i2c.status().fmt_full)?;
        self.write_byte_raw(byte, flags)
    }

    fn read_byte_blocking(&mut self) -> Result<u8, Error> {
        for _ in 0..POLL_BUDGET {
            self.check_errors()?;
            match self.try_read_byte() {
                Ok(byte) => return Ok(byte),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Err(Error::Timeout)
    }

    fn send_address(&mut self, addr: u8, read: bool, stop: bool) -> Result<(), Error> {
        let flags = FormatFlags {
            start: true,
            stop,
            ..FormatFlags::default()
        };
        self.push_entry(addr << 1 | u8::from(read), flags)
    }

    fn transfer_write(&mut self, addr: u8, bytes: &[u8], start: bool, last: bool) -> Result<(), Error> {
        if start {
            self.send_address(addr, false, false)?;
        }
        let count = bytes.len();
        for (i, &byte) in bytes.iter().enumerate() {
            let code = if last && i + 1 == count {
                FormatCode::TxStop
            } else {
                FormatCode::Tx
            };
            self.push_entry(byte, code.flags(false)?)?;
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transfer_read(
        &mut self,
        addr: u8,
        buffer: &mut [u8],
        start: bool,
        last: bool,
        continues: bool,
    ) -> Result<(), Error> {
        if start {
            self.send_address(addr, true, false)?;
        }
        let chunks = buffer.len().div_ceil(MAX_READ_CHUNK);
        for (i, chunk) in buffer.chunks_mut(MAX_READ_CHUNK).enumerate() {
            let code = if i + 1 < chunks || continues {
                FormatCode::RxContinue
            } else if last {
                FormatCode::RxStop
            } else {
                FormatCode::Rx
            };
            // A count of 0 requests 256 bytes.
            self.push_entry(chunk.len() as u8, code.flags(false)?)?;
            for slot in chunk.iter_mut() {
                *slot = self.read_byte_blocking()?;
            }
        }
        Ok(())
    }

    fn wait_for_idle(&mut self) -> Result<(), Error> {
        self.poll_until(|i2c| {
            let status = i2c.status();
            status.fmt_empty && status.host_idle
        })
    }

    /// Run `ops` as one bus transaction.
    ///
    /// Operations with an empty buffer put nothing on the bus. The STOP goes with the
    /// last byte of the last non-empty operation. When every operation is empty the
    /// target is only addressed, with START and STOP on the address entry.
    fn run_transaction(&mut self, addr: u8, ops: &mut [Operation<'_>]) -> Result<(), Error> {
        if addr > 0x7f {
            return Err(Error::BadArg);
        }
        let Some(last_active) = ops.iter().rposition(|op| !is_empty_operation(op)) else {
            if let Some(op) = ops.first() {
                let read = matches!(op, Operation::Read(_));
                self.send_address(addr, read, true)?;
                return self.wait_for_idle();
            }
            return Ok(());
        };

        let mut previous_read: Option<bool> = None;
        for i in 0..=last_active {
            let next_is_read = ops
                .get(i + 1..=last_active)
                .and_then(|rest| rest.iter().find(|op| !is_empty_operation(op)))
                .map(|op| matches!(op, Operation::Read(_)));
            let last = i == last_active;
            let Some(op) = ops.get_mut(i) else {
                break;
            };
            if is_empty_operation(op) {
                continue;
            }
            match op {
                Operation::Write(bytes) => {
                    let start = previous_read != Some(false);
                    self.transfer_write(addr, bytes, start, last)?;
                    previous_read = Some(false);
                }
                Operation::Read(buffer) => {
                    let start = previous_read != Some(true);
                    let continues = next_is_read == Some(true);
                    self.transfer_read(addr, buffer, start, last, continues)?;
                    previous_read = Some(true);
                }
            }
        }
        self.wait_for_idle()
    }
}

fn is_empty_operation(op: &Operation<'_>) -> bool {
    match op {
        Operation::Read(buffer) => buffer.is_empty(),
        Operation::Write(bytes) => bytes.is_empty(),
    }
}

fn rx_level_value(level: WatermarkLevel) -> FieldValue<u32, FIFO_CTRL::Register> {
    match level {
        WatermarkLevel::Byte1 => FIFO_CTRL::RXILVL::RXLVL1,
        WatermarkLevel::Byte4 => FIFO_CTRL::RXILVL::RXLVL4,
        WatermarkLevel::Byte8 => FIFO_CTRL::RXILVL::RXLVL8,
        WatermarkLevel::Byte16 => FIFO_CTRL::RXILVL::RXLVL16,
        WatermarkLevel::Byte30 => FIFO_CTRL::RXILVL::RXLVL30,
    }
}

fn fmt_level_value(level: WatermarkLevel) -> Result<FieldValue<u32, FIFO_CTRL::Register>, Error> {
    match level {
        WatermarkLevel::Byte1 => Ok(FIFO_CTRL::FMTILVL::FMTLVL1),
        WatermarkLevel::Byte4 => Ok(FIFO_CTRL::FMTILVL::FMTLVL4),
        WatermarkLevel::Byte8 => Ok(FIFO_CTRL::FMTILVL::FMTLVL8),
        WatermarkLevel::Byte16 => Ok(FIFO_CTRL::FMTILVL::FMTLVL16),
        WatermarkLevel::Byte30 => Err(Error::BadArg),
    }
}

/// Override mode held open on a [`HeepI2c`].
///
/// While the session lives, SCL and SDA follow [`Self::drive_pins`] instead of the
/// host state machine. Dropping the session hands the pins back.
pub struct OverrideSession<'a, H: HardwareInterface, L: Logger> {
    i2c: &'a mut HeepI2c<H, L>,
}

impl<H: HardwareInterface, L: Logger> OverrideSession<'_, H, L> {
    pub fn drive_pins(&mut self, scl: bool, sda: bool) {
        self.i2c.drive_override_pins(scl, sda);
    }

    #[must_use]
    pub fn sample_pins(&self) -> (u16, u16) {
        self.i2c.override_sample_pins()
    }

    fn sda_is_high(&self) -> bool {
        self.sample_pins().1 & 1 != 0
    }

    /// Leave override mode.
    pub fn exit(self) {}
}

impl<H: HardwareInterface, L: Logger> Drop for OverrideSession<'_, H, L> {
    fn drop(&mut self) {
        self.i2c.override_set_enabled(Toggle::Disabled);
    }
}

impl<H: HardwareInterface, L: Logger> I2cHardwareCore for HeepI2c<H, L> {
    type Error = Error;

    fn init(&mut self, config: &I2cConfig) -> Result<(), Self::Error> {
        let timing = compute_timing(&config.timing)?;
        let watermarks = rx_level_value(config.rx_watermark) + fmt_level_value(config.fmt_watermark)?;

        self.host_set_enabled(Toggle::Disabled);
        self.reset_fmt_fifo();
        self.reset_rx_fifo();
        self.configure(&timing);
        self.update(I2cRegister::FifoCtrl, watermarks);
        self.host_set_enabled(Toggle::from(config.host_enabled));
        Ok(())
    }

    fn configure_timing(&mut self, spec: &TimingSpec) -> Result<TimingConfig, Self::Error> {
        let timing = compute_timing(spec)?;
        self.configure(&timing);
        Ok(timing)
    }

    fn enable_interrupts(&mut self, mask: u32) {
        let enable = self.hw.read(I2cRegister::IntrEnable);
        self.hw.write(I2cRegister::IntrEnable, enable | (mask & IRQ_MASK));
    }

    fn clear_interrupts(&mut self, mask: u32) {
        self.hw.write(I2cRegister::IntrState, mask & IRQ_MASK);
    }

    fn recover_bus<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        let released = {
            let mut session = self.enter_override();
            session.drive_pins(true, true);
            delay.delay_us(RECOVERY_HALF_PERIOD_US);
            for _ in 0..RECOVERY_PULSES {
                if session.sda_is_high() {
                    break;
                }
                session.drive_pins(false, true);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
                session.drive_pins(true, true);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
            }
            let released = session.sda_is_high();
            if released {
                // STOP: pull SDA low under a low SCL, then release it while SCL is high.
                session.drive_pins(false, true);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
                session.drive_pins(false, false);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
                session.drive_pins(true, false);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
                session.drive_pins(true, true);
                delay.delay_us(RECOVERY_HALF_PERIOD_US);
            }
            released
        };
        self.reset_fmt_fifo();
        self.reset_rx_fifo();
        if released {
            Ok(())
        } else {
            self.logger
                .error(format_args!("i2c: SDA stuck low after bus recovery"));
            Err(Error::Bus)
        }
    }
}

impl<H: HardwareInterface, L: Logger> I2cMaster<SevenBitAddress> for HeepI2c<H, L> {
    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Write(bytes)])
    }

    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Read(buffer)])
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Write(bytes), Operation::Read(buffer)])
    }

    fn transaction_slice(
        &mut self,
        addr: SevenBitAddress,
        ops_slice: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run_transaction(addr, ops_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::common::{I2cConfigBuilder, I2cSpeed};
    use crate::i2c::mock::{CountingDelay, MockHardware, MockTarget};

    fn driver() -> HeepI2c<MockHardware> {
        HeepI2c::without_logging(MockHardware::new())
    }

    #[test]
    fn test_configure_packs_two_fields_per_register() {
        let mut i2c = driver();
        let config = TimingConfig {
            scl_time_high_cycles: 1,
            scl_time_low_cycles: 2,
            rise_cycles: 3,
            fall_cycles: 4,
            start_signal_setup_cycles: 5,
            start_signal_hold_cycles: 6,
            data_signal_setup_cycles: 7,
            data_signal_hold_cycles: 8,
            stop_signal_setup_cycles: 9,
            stop_signal_hold_cycles: 10,
        };
        i2c.configure(&config);

        let hw = i2c.hardware();
        assert_eq!(hw.writes.len(), 5);
        assert_eq!(hw.value(I2cRegister::Timing0), 2 << 16 | 1);
        assert_eq!(hw.value(I2cRegister::Timing1), 4 << 16 | 3);
        assert_eq!(hw.value(I2cRegister::Timing2), 6 << 16 | 5);
        assert_eq!(hw.value(I2cRegister::Timing3), 8 << 16 | 7);
        assert_eq!(hw.value(I2cRegister::Timing4), 10 << 16 | 9);
    }

    #[test]
    fn test_configure_replaces_previous_values() {
        let mut i2c = driver();
        i2c.hardware_mut().preset(I2cRegister::Timing0, 0xffff_ffff);
        i2c.configure(&TimingConfig {
            scl_time_high_cycles: 0x12,
            ..TimingConfig::default()
        });
        assert_eq!(i2c.hardware().value(I2cRegister::Timing0), 0x12);
    }

    #[test]
    fn test_write_byte_start_is_single_store() {
        let mut i2c = driver();
        i2c.write_byte(0x2a, FormatCode::Start, false).unwrap();

        let hw = i2c.hardware();
        assert_eq!(hw.writes, vec![(I2cRegister::Fdata, 0x2a | 1 << 8)]);
    }

    #[test]
    fn test_write_byte_rejects_nak_suppression_on_read() {
        let mut i2c = driver();
        assert_eq!(
            i2c.write_byte(0x00, FormatCode::RxContinue, true),
            Err(Error::BadArg)
        );
        assert!(i2c.hardware().writes.is_empty());
    }

    #[test]
    fn test_write_byte_raw_validation_touches_nothing() {
        let mut i2c = driver();
        let start_read = FormatFlags {
            start: true,
            read: true,
            ..FormatFlags::default()
        };
        assert_eq!(i2c.write_byte_raw(0x10, start_read), Err(Error::BadArg));

        let cont_only = FormatFlags {
            read_continue: true,
            ..FormatFlags::default()
        };
        assert_eq!(i2c.write_byte_raw(0x10, cont_only), Err(Error::BadArg));
        assert!(i2c.hardware().writes.is_empty());
    }

    #[test]
    fn test_rx_stop_entry() {
        let mut i2c = driver();
        i2c.write_byte(4, FormatCode::RxStop, false).unwrap();
        assert_eq!(
            i2c.hardware().writes_to(I2cRegister::Fdata),
            vec![4 | 1 << 9 | 1 << 10]
        );
    }

    #[test]
    fn test_fifo_levels() {
        let mut i2c = driver();
        i2c.hardware_mut().preset(I2cRegister::FifoStatus, 7);
        i2c.hardware_mut().push_rx(1);
        i2c.hardware_mut().push_rx(2);

        assert_eq!(i2c.get_fifo_levels(), FifoLevels { fmt: 7, rx: 2 });
        assert_eq!(i2c.try_read_byte(), Ok(1));
        assert_eq!(i2c.read_byte(), 2);
        assert_eq!(i2c.try_read_byte(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_set_watermarks() {
        let mut i2c = driver();
        i2c.set_watermarks(WatermarkLevel::Byte4, WatermarkLevel::Byte16)
            .unwrap();
        // RXILVL = 1 at bit 2, FMTILVL = 3 at bit 5
        assert_eq!(
            i2c.hardware().writes,
            vec![(I2cRegister::FifoCtrl, 1 << 2 | 3 << 5)]
        );

        i2c.set_watermarks(WatermarkLevel::Byte30, WatermarkLevel::Byte1)
            .unwrap();
        assert_eq!(i2c.hardware().value(I2cRegister::FifoCtrl), 4 << 2);
    }

    #[test]
    fn test_set_watermarks_rejects_fmt_30_before_writing() {
        let mut i2c = driver();
        assert_eq!(
            i2c.set_watermarks(WatermarkLevel::Byte1, WatermarkLevel::Byte30),
            Err(Error::BadArg)
        );
        assert!(i2c.hardware().writes.is_empty());
    }

    #[test]
    fn test_fifo_resets_keep_watermarks() {
        let mut i2c = driver();
        i2c.set_watermarks(WatermarkLevel::Byte8, WatermarkLevel::Byte4)
            .unwrap();
        i2c.reset_rx_fifo();
        i2c.reset_fmt_fifo();

        let ctrl = i2c.hardware().writes_to(I2cRegister::FifoCtrl);
        let levels = 2 << 2 | 1 << 5;
        assert_eq!(ctrl, vec![levels, levels | 1, levels | 2]);
    }

    #[test]
    fn test_host_enable() {
        let mut i2c = driver();
        i2c.host_set_enabled(Toggle::Enabled);
        assert_eq!(i2c.hardware().value(I2cRegister::Ctrl), 1);
        i2c.host_set_enabled(Toggle::Disabled);
        assert_eq!(i2c.hardware().value(I2cRegister::Ctrl), 0);
    }

    #[test]
    fn test_override_raw_calls() {
        let mut i2c = driver();
        i2c.override_drive_pins(true, true);
        // Pins latched, override still off.
        assert_eq!(i2c.hardware().value(I2cRegister::Ovrd), 0b110);

        i2c.override_set_enabled(Toggle::Enabled);
        i2c.override_drive_pins(true, false);
        assert_eq!(i2c.hardware().value(I2cRegister::Ovrd), 0b011);
    }

    #[test]
    fn test_override_session_disables_on_drop() {
        let mut i2c = driver();
        i2c.hardware_mut()
            .preset(I2cRegister::Val, 0x00f0 << 16 | 0x000f);
        {
            let mut session = i2c.enter_override();
            session.drive_pins(false, true);
            assert_eq!(session.sample_pins(), (0x000f, 0x00f0));
        }
        let ovrd = i2c.hardware().writes_to(I2cRegister::Ovrd);
        assert_eq!(ovrd, vec![0b001, 0b101, 0b100]);
    }

    #[test]
    fn test_irq_single_bit_operations() {
        let mut i2c = driver();
        i2c.irq_set_enabled(I2cIrq::Nak, Toggle::Enabled);
        i2c.irq_set_enabled(I2cIrq::RxWatermark, Toggle::Enabled);
        assert_eq!(i2c.hardware().value(I2cRegister::IntrEnable), 1 << 4 | 1 << 1);
        assert_eq!(i2c.irq_get_enabled(I2cIrq::Nak), Toggle::Enabled);
        assert_eq!(i2c.irq_get_enabled(I2cIrq::FmtWatermark), Toggle::Disabled);

        i2c.irq_set_enabled(I2cIrq::Nak, Toggle::Disabled);
        assert_eq!(i2c.hardware().value(I2cRegister::IntrEnable), 1 << 1);

        i2c.irq_force(I2cIrq::HostTimeout);
        assert_eq!(i2c.hardware().writes_to(I2cRegister::IntrTest), vec![1 << 15]);
        assert!(i2c.irq_is_pending(I2cIrq::HostTimeout));
        assert!(!i2c.irq_is_pending(I2cIrq::Nak));

        i2c.irq_acknowledge(I2cIrq::HostTimeout);
        assert_eq!(i2c.hardware().writes_to(I2cRegister::IntrState), vec![1 << 15]);
        assert!(!i2c.irq_is_pending(I2cIrq::HostTimeout));
    }

    #[test]
    fn test_recover_bus_with_free_sda_sends_stop() {
        let mut i2c = driver();
        let mut delay = CountingDelay::default();
        i2c.hardware_mut().preset(I2cRegister::Val, 1 << 16);
        i2c.recover_bus(&mut delay).unwrap();

        let ovrd = i2c.hardware().writes_to(I2cRegister::Ovrd);
        assert_eq!(
            ovrd,
            vec![0b001, 0b111, 0b101, 0b001, 0b011, 0b111, 0b110]
        );
        // A half period after the release and after each STOP edge.
        assert_eq!(delay.total_nanos, 5 * 5_000);
    }

    #[test]
    fn test_recover_bus_stuck_sda() {
        let mut i2c = driver();
        let mut delay = CountingDelay::default();
        assert_eq!(i2c.recover_bus(&mut delay), Err(Error::Bus));

        let ovrd = i2c.hardware().writes_to(I2cRegister::Ovrd);
        // enable, release, nine low/high pulses, exit
        assert_eq!(ovrd.len(), 1 + 1 + 2 * 9 + 1);
        assert_eq!(ovrd.last(), Some(&0b110));
        assert_eq!(i2c.hardware().value(I2cRegister::Ovrd) & 1, 0);
        // Every SCL edge is held for half of a 100 kHz period.
        assert_eq!(delay.total_nanos, (1 + 2 * 9) * 5_000);
    }

    #[test]
    fn test_trailing_empty_write_keeps_stop() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x10)));
        let mut ops = [Operation::Write(&[1, 2]), Operation::Write(&[])];
        i2c.transaction_slice(0x10, &mut ops).unwrap();

        let hw = i2c.hardware();
        assert_eq!(
            hw.writes_to(I2cRegister::Fdata),
            vec![0x20 | 1 << 8, 0x01, 0x02 | 1 << 9]
        );
        let target = hw.target.as_ref().unwrap();
        assert_eq!((target.starts, target.stops), (1, 1));
    }

    #[test]
    fn test_trailing_empty_read_keeps_stop() {
        let mut target = MockTarget::new(0x10);
        target.read_data.extend([0x11, 0x22]);
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        let mut buffer = [0u8; 2];
        let mut empty = [0u8; 0];
        let mut ops = [Operation::Read(&mut buffer), Operation::Read(&mut empty)];
        i2c.transaction_slice(0x10, &mut ops).unwrap();

        let hw = i2c.hardware();
        // NAK the last byte and STOP, no RCONT.
        assert_eq!(
            hw.writes_to(I2cRegister::Fdata),
            vec![0x21 | 1 << 8, 2 | 1 << 9 | 1 << 10]
        );
        let target = hw.target.as_ref().unwrap();
        assert_eq!((target.starts, target.stops), (1, 1));
        assert_eq!(buffer, [0x11, 0x22]);
    }

    #[test]
    fn test_empty_read_between_reads_is_skipped() {
        let mut target = MockTarget::new(0x10);
        target.read_data.extend([0x11, 0x22]);
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        let mut first = [0u8; 1];
        let mut empty = [0u8; 0];
        let mut second = [0u8; 1];
        let mut ops = [
            Operation::Read(&mut first),
            Operation::Read(&mut empty),
            Operation::Read(&mut second),
        ];
        i2c.transaction_slice(0x10, &mut ops).unwrap();

        assert_eq!(
            i2c.hardware().writes_to(I2cRegister::Fdata),
            vec![0x21 | 1 << 8, 1 | 1 << 10 | 1 << 11, 1 | 1 << 9 | 1 << 10]
        );
        assert_eq!((first, second), ([0x11], [0x22]));
    }

    #[test]
    fn test_empty_read_only_addresses_target() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x10)));
        i2c.read(0x10, &mut []).unwrap();
        assert_eq!(
            i2c.hardware().writes_to(I2cRegister::Fdata),
            vec![0x21 | 1 << 8 | 1 << 9]
        );
    }

    #[test]
    fn test_read_then_write_uses_plain_rx_before_restart() {
        let mut target = MockTarget::new(0x10);
        target.read_data.push_back(0x55);
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        let mut buffer = [0u8; 1];
        let mut ops = [Operation::Read(&mut buffer), Operation::Write(&[0x99])];
        i2c.transaction_slice(0x10, &mut ops).unwrap();
        assert_eq!(buffer, [0x55]);

        let hw = i2c.hardware();
        assert_eq!(
            hw.writes_to(I2cRegister::Fdata),
            vec![0x21 | 1 << 8, 1 | 1 << 10, 0x20 | 1 << 8, 0x99 | 1 << 9]
        );
        let target = hw.target.as_ref().unwrap();
        assert_eq!(target.written, vec![0x99]);
        assert_eq!((target.starts, target.stops), (2, 1));
    }

    #[test]
    fn test_data_byte_nak() {
        let mut target = MockTarget::new(0x50);
        target.accept_limit = Some(1);
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        assert_eq!(i2c.write(0x50, &[0x01, 0x02]), Err(Error::NoAcknowledge));
        assert!(!i2c.irq_is_pending(I2cIrq::Nak));
        let hw = i2c.hardware();
        assert_eq!(hw.writes_to(I2cRegister::FifoCtrl), vec![1 << 1, 1 << 0]);
        assert_eq!(hw.target.as_ref().unwrap().written, vec![0x01]);
    }

    #[test]
    fn test_full_fmt_fifo_times_out() {
        let mut i2c = driver();
        i2c.hardware_mut().preset(I2cRegister::Status, 1 << 0);
        assert_eq!(i2c.write(0x10, &[0x01]), Err(Error::Timeout));
        assert!(i2c.hardware().writes_to(I2cRegister::Fdata).is_empty());
    }

    #[test]
    fn test_interference_is_bus_error() {
        for line in [I2cIrq::SclInterference, I2cIrq::SdaInterference] {
            let mut i2c = driver();
            i2c.hardware_mut().preset(I2cRegister::IntrState, line.mask());
            assert_eq!(i2c.write(0x10, &[0x01]), Err(Error::Bus));
            assert!(!i2c.irq_is_pending(line));
            assert!(i2c.hardware().writes_to(I2cRegister::Fdata).is_empty());
        }
    }

    #[test]
    fn test_fifo_overflow_is_overrun() {
        for line in [I2cIrq::FmtOverflow, I2cIrq::RxOverflow] {
            let mut i2c = driver();
            i2c.hardware_mut().preset(I2cRegister::IntrState, line.mask());
            let mut buffer = [0u8; 1];
            assert_eq!(i2c.read(0x10, &mut buffer), Err(Error::Overrun));
            assert!(!i2c.irq_is_pending(line));
        }
    }

    #[test]
    fn test_irq_raw_line_out_of_range() {
        for line in [16u32, 17, 31, 1000] {
            assert_eq!(I2cIrq::try_from(line), Err(Error::BadArg));
        }
    }

    #[test]
    fn test_irq_disable_restore_round_trip() {
        let mut i2c = driver();
        i2c.hardware_mut().preset(I2cRegister::IntrEnable, 0xa5a5);

        let snapshot = i2c.irq_disable_all();
        assert_eq!(snapshot.bits(), 0xa5a5);
        assert_eq!(i2c.hardware().value(I2cRegister::IntrEnable), 0);

        i2c.irq_restore_all(snapshot);
        assert_eq!(i2c.hardware().value(I2cRegister::IntrEnable), 0xa5a5);
    }

    #[test]
    fn test_core_interrupt_masks_are_limited_to_real_lines() {
        let mut i2c = driver();
        i2c.enable_interrupts(0xffff_0011);
        assert_eq!(i2c.hardware().value(I2cRegister::IntrEnable), 0x11);
        i2c.clear_interrupts(0x0003_0001);
        assert_eq!(i2c.hardware().writes_to(I2cRegister::IntrState), vec![1]);
    }

    #[test]
    fn test_init_programs_timing_watermarks_and_host() {
        let mut i2c = driver();
        let config = I2cConfigBuilder::new()
            .speed(I2cSpeed::Standard)
            .clock_period_nanos(1000)
            .rx_watermark(WatermarkLevel::Byte8)
            .build();
        i2c.init(&config).unwrap();

        let hw = i2c.hardware();
        // low = 5; 10 - 5 - 1 (rise) - 1 (fall) is below the baseline high of 4
        assert_eq!(hw.value(I2cRegister::Timing0), 5 << 16 | 4);
        // 1000 ns rise and 300 ns fall, one cycle each
        assert_eq!(hw.value(I2cRegister::Timing1), 1 << 16 | 1);
        // start hold 4 in the upper half, start setup 5 in the lower
        assert_eq!(hw.value(I2cRegister::Timing2), 4 << 16 | 5);
        assert_eq!(hw.value(I2cRegister::FifoCtrl), 2 << 2);
        assert_eq!(hw.value(I2cRegister::Ctrl), 1);
        assert_eq!(hw.writes.first(), Some(&(I2cRegister::Ctrl, 0)));
    }

    #[test]
    fn test_init_rejects_bad_config_without_writes() {
        let mut i2c = driver();
        let config = I2cConfigBuilder::new()
            .fmt_watermark(WatermarkLevel::Byte30)
            .build();
        assert_eq!(i2c.init(&config), Err(Error::BadArg));

        let config = I2cConfigBuilder::new().clock_period_nanos(0).build();
        assert_eq!(i2c.init(&config), Err(Error::BadArg));
        assert!(i2c.hardware().writes.is_empty());
    }

    #[test]
    fn test_configure_timing_returns_committed_values() {
        let mut i2c = driver();
        let spec = TimingSpec {
            lowest_target_device_speed: I2cSpeed::Fast,
            clock_period_nanos: 100,
            sda_rise_nanos: 300,
            sda_fall_nanos: 300,
            scl_period_nanos: 2500,
        };
        let timing = i2c.configure_timing(&spec).unwrap();
        assert_eq!(timing.rise_cycles, 3);
        assert_eq!(
            i2c.hardware().value(I2cRegister::Timing1),
            u32::from(timing.fall_cycles) << 16 | u32::from(timing.rise_cycles)
        );
    }

    #[test]
    fn test_write_transaction_entries() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x50)));
        i2c.write(0x50, &[0x01, 0x02]).unwrap();

        let hw = i2c.hardware();
        assert_eq!(
            hw.writes_to(I2cRegister::Fdata),
            vec![0xa0 | 1 << 8, 0x01, 0x02 | 1 << 9]
        );
        let target = hw.target.as_ref().unwrap();
        assert_eq!(target.written, vec![0x01, 0x02]);
        assert_eq!((target.starts, target.stops), (1, 1));
    }

    #[test]
    fn test_write_read_uses_repeated_start() {
        let mut target = MockTarget::new(0x48);
        target.read_data.extend([0xde, 0xad]);
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        let mut buffer = [0u8; 2];
        i2c.write_read(0x48, &[0x10], &mut buffer).unwrap();
        assert_eq!(buffer, [0xde, 0xad]);

        let hw = i2c.hardware();
        assert_eq!(
            hw.writes_to(I2cRegister::Fdata),
            vec![0x90 | 1 << 8, 0x10, 0x91 | 1 << 8, 2 | 1 << 9 | 1 << 10]
        );
        let target = hw.target.as_ref().unwrap();
        assert_eq!((target.starts, target.stops), (2, 1));
    }

    #[test]
    fn test_long_read_is_split_in_chunks() {
        let mut target = MockTarget::new(0x20);
        target.read_data.extend((0..300u32).map(|i| i as u8));
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(target));

        let mut buffer = [0u8; 300];
        i2c.read(0x20, &mut buffer).unwrap();
        assert_eq!(buffer[299], (299u32 & 0xff) as u8);

        let entries = i2c.hardware().writes_to(I2cRegister::Fdata);
        // 256 bytes encoded as 0 with RCONT, then 44 bytes with STOP.
        assert_eq!(
            entries,
            vec![0x41 | 1 << 8, 1 << 10 | 1 << 11, 44 | 1 << 9 | 1 << 10]
        );
    }

    #[test]
    fn test_address_nak() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x50)));
        assert_eq!(i2c.write(0x51, &[0x00]), Err(Error::NoAcknowledge));
        // NAK latched state is cleared and the FIFOs are reset.
        assert!(!i2c.irq_is_pending(I2cIrq::Nak));
        let ctrl = i2c.hardware().writes_to(I2cRegister::FifoCtrl);
        assert_eq!(ctrl, vec![1 << 1, 1 << 0]);
    }

    #[test]
    fn test_empty_write_only_addresses_target() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x3c)));
        i2c.write(0x3c, &[]).unwrap();
        assert_eq!(
            i2c.hardware().writes_to(I2cRegister::Fdata),
            vec![0x78 | 1 << 8 | 1 << 9]
        );
    }

    #[test]
    fn test_ten_bit_address_rejected() {
        let mut i2c = HeepI2c::without_logging(MockHardware::with_target(MockTarget::new(0x3c)));
        assert_eq!(i2c.write(0x80, &[1]), Err(Error::BadArg));
        assert!(i2c.hardware().writes.is_empty());
    }
}
