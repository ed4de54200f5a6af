// Licensed under the Apache-2.0 license

//! Register map of the X-HEEP I2C peripheral.
//!
//! Offsets and field positions follow the hardware register description of the
//! OpenTitan-derived I2C block integrated in X-HEEP. Only the host-side registers
//! used by this driver are described.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Number of interrupt lines of the peripheral.
pub const I2C_PARAM_NUM_IRQS: u32 = 16;

register_structs! {
    pub I2cRegisters {
        // Interrupt State Register
        (0x0000 => pub(crate) intr_state: ReadWrite<u32, INTR::Register>),
        // Interrupt Enable Register
        (0x0004 => pub(crate) intr_enable: ReadWrite<u32, INTR::Register>),
        // Interrupt Test Register
        (0x0008 => pub(crate) intr_test: ReadWrite<u32, INTR::Register>),
        // I2C control register
        (0x000c => pub(crate) ctrl: ReadWrite<u32, CTRL::Register>),
        // I2C live status register
        (0x0010 => pub(crate) status: ReadWrite<u32, STATUS::Register>),
        // I2C read data
        (0x0014 => pub(crate) rdata: ReadWrite<u32, RDATA::Register>),
        // I2C host format data
        (0x0018 => pub(crate) fdata: ReadWrite<u32, FDATA::Register>),
        // I2C FIFO control register
        (0x001c => pub(crate) fifo_ctrl: ReadWrite<u32, FIFO_CTRL::Register>),
        // I2C FIFO status register
        (0x0020 => pub(crate) fifo_status: ReadWrite<u32, FIFO_STATUS::Register>),
        // I2C override control register
        (0x0024 => pub(crate) ovrd: ReadWrite<u32, OVRD::Register>),
        // Oversampled RX values
        (0x0028 => pub(crate) val: ReadWrite<u32, VAL::Register>),
        // Detailed I2C timings (directly corresponding to table 10 in the I2C specification).
        (0x002c => pub(crate) timing0: ReadWrite<u32, TIMING0::Register>),
        (0x0030 => pub(crate) timing1: ReadWrite<u32, TIMING1::Register>),
        (0x0034 => pub(crate) timing2: ReadWrite<u32, TIMING2::Register>),
        (0x0038 => pub(crate) timing3: ReadWrite<u32, TIMING3::Register>),
        (0x003c => pub(crate) timing4: ReadWrite<u32, TIMING4::Register>),
        (0x0040 => @END),
    }
}

register_bitfields![u32,
    // Common Interrupt Offsets
    pub INTR [
        FMT_WATERMARK OFFSET(0) NUMBITS(1) [],
        RX_WATERMARK OFFSET(1) NUMBITS(1) [],
        FMT_OVERFLOW OFFSET(2) NUMBITS(1) [],
        RX_OVERFLOW OFFSET(3) NUMBITS(1) [],
        NAK OFFSET(4) NUMBITS(1) [],
        SCL_INTERFERENCE OFFSET(5) NUMBITS(1) [],
        SDA_INTERFERENCE OFFSET(6) NUMBITS(1) [],
        STRETCH_TIMEOUT OFFSET(7) NUMBITS(1) [],
        SDA_UNSTABLE OFFSET(8) NUMBITS(1) [],
        TRANS_COMPLETE OFFSET(9) NUMBITS(1) [],
        TX_EMPTY OFFSET(10) NUMBITS(1) [],
        TX_NONEMPTY OFFSET(11) NUMBITS(1) [],
        TX_OVERFLOW OFFSET(12) NUMBITS(1) [],
        ACQ_OVERFLOW OFFSET(13) NUMBITS(1) [],
        ACK_STOP OFFSET(14) NUMBITS(1) [],
        HOST_TIMEOUT OFFSET(15) NUMBITS(1) [],
    ],
    pub CTRL [
        ENABLEHOST OFFSET(0) NUMBITS(1) [],
        ENABLETARGET OFFSET(1) NUMBITS(1) [],
        LLPBK OFFSET(2) NUMBITS(1) [],
    ],
    pub STATUS [
        FMTFULL OFFSET(0) NUMBITS(1) [],
        RXFULL OFFSET(1) NUMBITS(1) [],
        FMTEMPTY OFFSET(2) NUMBITS(1) [],
        HOSTIDLE OFFSET(3) NUMBITS(1) [],
        TARGETIDLE OFFSET(4) NUMBITS(1) [],
        RXEMPTY OFFSET(5) NUMBITS(1) [],
    ],
    pub RDATA [
        RDATA OFFSET(0) NUMBITS(8) [],
    ],
    pub FDATA [
        FBYTE OFFSET(0) NUMBITS(8) [],
        START OFFSET(8) NUMBITS(1) [],
        STOP OFFSET(9) NUMBITS(1) [],
        READ OFFSET(10) NUMBITS(1) [],
        RCONT OFFSET(11) NUMBITS(1) [],
        NAKOK OFFSET(12) NUMBITS(1) [],
    ],
    pub FIFO_CTRL [
        RXRST OFFSET(0) NUMBITS(1) [],
        FMTRST OFFSET(1) NUMBITS(1) [],
        RXILVL OFFSET(2) NUMBITS(3) [
            RXLVL1 = 0,
            RXLVL4 = 1,
            RXLVL8 = 2,
            RXLVL16 = 3,
            RXLVL30 = 4,
        ],
        FMTILVL OFFSET(5) NUMBITS(2) [
            FMTLVL1 = 0,
            FMTLVL4 = 1,
            FMTLVL8 = 2,
            FMTLVL16 = 3,
        ],
    ],
    pub FIFO_STATUS [
        FMTLVL OFFSET(0) NUMBITS(6) [],
        RXLVL OFFSET(24) NUMBITS(6) [],
    ],
    pub OVRD [
        TXOVRDEN OFFSET(0) NUMBITS(1) [],
        SCLVAL OFFSET(1) NUMBITS(1) [],
        SDAVAL OFFSET(2) NUMBITS(1) [],
    ],
    pub VAL [
        SCL_RX OFFSET(0) NUMBITS(16) [],
        SDA_RX OFFSET(16) NUMBITS(16) [],
    ],
    pub TIMING0 [
        THIGH OFFSET(0) NUMBITS(16) [],
        TLOW OFFSET(16) NUMBITS(16) [],
    ],
    pub TIMING1 [
        T_R OFFSET(0) NUMBITS(16) [],
        T_F OFFSET(16) NUMBITS(16) [],
    ],
    pub TIMING2 [
        TSU_STA OFFSET(0) NUMBITS(16) [],
        THD_STA OFFSET(16) NUMBITS(16) [],
    ],
    pub TIMING3 [
        TSU_DAT OFFSET(0) NUMBITS(16) [],
        THD_DAT OFFSET(16) NUMBITS(16) [],
    ],
    pub TIMING4 [
        TSU_STO OFFSET(0) NUMBITS(16) [],
        T_BUF OFFSET(16) NUMBITS(16) [],
    ],
];
