//! Strongly typed parameter enumerations for the ADS126x driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config), the register bit-field views and the
//! high-level driver APIs. Prefer these types over raw option bytes to keep
//! configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use ads126x::params::{DataRate, Filter, Gain};
//!
//! let rate = DataRate::Sps20;
//! let gain = Gain::X32;
//! let filter = Filter::Fir;
//! assert!(filter.supports(rate));
//! assert_eq!(gain.factor(), 32);
//! ```

use modular_bitfield::prelude::Specifier;

// ======================================================================
// == ID (0x00) =========================================================
// ======================================================================

/// Device variant reported in `ID.DEV_ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum DeviceVariant {
    /// ADS1262 (ADC1 only).
    Ads1262 = 0b000,
    /// ADS1263 (ADC1 and auxiliary ADC2).
    Ads1263 = 0b001,
}

// ======================================================================
// == POWER (0x01) ======================================================
// ======================================================================

/// Internal 2.5 V reference enable (`POWER.INTREF`).
///
/// The IDACs and the temperature sensor require the internal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum InternalReference {
    /// Internal reference off.
    Disabled = 0,
    /// Internal reference on (default).
    Enabled = 1,
}

/// Level-shift voltage on `AINCOM` (`POWER.VBIAS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum LevelShift {
    /// No level shift (default).
    Disabled = 0,
    /// `AINCOM` driven to (VAVDD + VAVSS) / 2.
    Enabled = 1,
}

// ======================================================================
// == INTERFACE (0x02) ==================================================
// ======================================================================

/// Integrity byte appended to conversion data (`INTERFACE.CRC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum ChecksumMode {
    /// No integrity byte.
    Disabled = 0b00,
    /// Additive checksum (default).
    Checksum = 0b01,
    /// CRC-8.
    Crc = 0b10,
}

/// Status byte in conversion read-back (`INTERFACE.STATUS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum StatusByte {
    /// Status byte omitted.
    Disabled = 0,
    /// Status byte precedes the data (default).
    Enabled = 1,
}

/// Serial interface automatic time-out (`INTERFACE.TIMEOUT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum SerialTimeout {
    /// Time-out disabled (default).
    Disabled = 0,
    /// Time-out enabled.
    Enabled = 1,
}

// ======================================================================
// == MODE0 (0x03) ======================================================
// ======================================================================

/// Conversion start delay (`MODE0.DELAY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum ConversionDelay {
    /// No delay (default).
    None = 0b0000,
    /// 8.7 µs.
    Us8_7 = 0b0001,
    /// 17 µs.
    Us17 = 0b0010,
    /// 35 µs.
    Us35 = 0b0011,
    /// 69 µs.
    Us69 = 0b0100,
    /// 139 µs.
    Us139 = 0b0101,
    /// 278 µs.
    Us278 = 0b0110,
    /// 555 µs.
    Us555 = 0b0111,
    /// 1.1 ms.
    Ms1_1 = 0b1000,
    /// 2.2 ms.
    Ms2_2 = 0b1001,
    /// 4.4 ms.
    Ms4_4 = 0b1010,
    /// 8.8 ms.
    Ms8_8 = 0b1011,
}

/// Input chop and IDAC rotation (`MODE0.CHOP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Chop {
    /// Chop and rotation off (default).
    Disabled = 0b00,
    /// Input chop on.
    InputChop = 0b01,
    /// IDAC rotation on.
    IdacRotation = 0b10,
    /// Input chop and IDAC rotation on.
    InputChopAndIdacRotation = 0b11,
}

/// ADC conversion run mode (`MODE0.RUNMODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum RunMode {
    /// Free-running conversions (default).
    Continuous = 0,
    /// One conversion per start.
    Pulse = 1,
}

/// Reference multiplexer output polarity (`MODE0.REFREV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum ReferencePolarity {
    /// Normal polarity (default).
    Normal = 0,
    /// Reversed polarity.
    Reversed = 1,
}

// ======================================================================
// == MODE1 (0x04) ======================================================
// ======================================================================

/// Sensor bias magnitude (`MODE1.SBMAG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum SensorBiasMagnitude {
    /// No bias current or resistor (default).
    None = 0b000,
    /// 0.5 µA.
    Na500 = 0b001,
    /// 2 µA.
    Ua2 = 0b010,
    /// 10 µA.
    Ua10 = 0b011,
    /// 50 µA.
    Ua50 = 0b100,
    /// 200 µA.
    Ua200 = 0b101,
    /// 10 MΩ resistor.
    Resistor10M = 0b110,
}

/// Sensor bias polarity (`MODE1.SBPOL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum SensorBiasPolarity {
    /// AINP pulled high, AINN pulled low (default).
    PullUp = 0,
    /// AINP pulled low, AINN pulled high.
    PullDown = 1,
}

/// ADC the sensor bias is connected to (`MODE1.SBADC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum SensorBiasAdc {
    /// ADC1 mux output (default).
    Adc1 = 0,
    /// ADC2 mux output.
    Adc2 = 1,
}

/// Digital filter (`MODE1.FILTER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum Filter {
    /// sinc1.
    Sinc1 = 0b000,
    /// sinc2.
    Sinc2 = 0b001,
    /// sinc3.
    Sinc3 = 0b010,
    /// sinc4.
    Sinc4 = 0b011,
    /// FIR (default); limited to 2.5, 5, 10 and 20 SPS.
    Fir = 0b100,
}

impl Filter {
    /// Returns `true` when the filter can run at the supplied data rate.
    pub const fn supports(self, rate: DataRate) -> bool {
        match self {
            Self::Fir => matches!(
                rate,
                DataRate::Sps2_5 | DataRate::Sps5 | DataRate::Sps10 | DataRate::Sps20
            ),
            Self::Sinc1 | Self::Sinc2 | Self::Sinc3 | Self::Sinc4 => true,
        }
    }
}

// ======================================================================
// == MODE2 (0x05) ======================================================
// ======================================================================

/// PGA bypass (`MODE2.BYPASS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum PgaMode {
    /// PGA in the signal path (default).
    Enabled = 0,
    /// PGA bypassed.
    Bypassed = 1,
}

/// PGA gain (`MODE2.GAIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum Gain {
    /// 1 V/V (default).
    X1 = 0b000,
    /// 2 V/V.
    X2 = 0b001,
    /// 4 V/V.
    X4 = 0b010,
    /// 8 V/V.
    X8 = 0b011,
    /// 16 V/V.
    X16 = 0b100,
    /// 32 V/V.
    X32 = 0b101,
}

impl Gain {
    /// Returns the gain as a multiplication factor.
    pub const fn factor(self) -> u8 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
            Self::X16 => 16,
            Self::X32 => 32,
        }
    }
}

/// Output data rate (`MODE2.DR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum DataRate {
    /// 2.5 SPS.
    Sps2_5 = 0b0000,
    /// 5 SPS.
    Sps5 = 0b0001,
    /// 10 SPS.
    Sps10 = 0b0010,
    /// 16.6 SPS.
    Sps16_6 = 0b0011,
    /// 20 SPS (default).
    Sps20 = 0b0100,
    /// 50 SPS.
    Sps50 = 0b0101,
    /// 60 SPS.
    Sps60 = 0b0110,
    /// 100 SPS.
    Sps100 = 0b0111,
    /// 400 SPS.
    Sps400 = 0b1000,
    /// 1200 SPS.
    Sps1200 = 0b1001,
    /// 2400 SPS.
    Sps2400 = 0b1010,
    /// 4800 SPS.
    Sps4800 = 0b1011,
    /// 7200 SPS.
    Sps7200 = 0b1100,
    /// 14400 SPS.
    Sps14400 = 0b1101,
    /// 19200 SPS.
    Sps19200 = 0b1110,
    /// 38400 SPS.
    Sps38400 = 0b1111,
}

impl DataRate {
    /// Returns the nominal rate in millisamples per second.
    pub const fn millisamples(self) -> u32 {
        match self {
            Self::Sps2_5 => 2_500,
            Self::Sps5 => 5_000,
            Self::Sps10 => 10_000,
            Self::Sps16_6 => 16_600,
            Self::Sps20 => 20_000,
            Self::Sps50 => 50_000,
            Self::Sps60 => 60_000,
            Self::Sps100 => 100_000,
            Self::Sps400 => 400_000,
            Self::Sps1200 => 1_200_000,
            Self::Sps2400 => 2_400_000,
            Self::Sps4800 => 4_800_000,
            Self::Sps7200 => 7_200_000,
            Self::Sps14400 => 14_400_000,
            Self::Sps19200 => 19_200_000,
            Self::Sps38400 => 38_400_000,
        }
    }
}

// ======================================================================
// == INPMUX (0x06) =====================================================
// ======================================================================

/// Input multiplexer selection, shared by `INPMUX.MUXP` and `INPMUX.MUXN`.
///
/// The monitor selections come in pairs: select e.g. [`Input::TemperatureSensor`]
/// on both sides to read the internal temperature sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum Input {
    /// AIN0.
    Ain0 = 0b0000,
    /// AIN1.
    Ain1 = 0b0001,
    /// AIN2.
    Ain2 = 0b0010,
    /// AIN3.
    Ain3 = 0b0011,
    /// AIN4.
    Ain4 = 0b0100,
    /// AIN5.
    Ain5 = 0b0101,
    /// AIN6.
    Ain6 = 0b0110,
    /// AIN7.
    Ain7 = 0b0111,
    /// AIN8.
    Ain8 = 0b1000,
    /// AIN9.
    Ain9 = 0b1001,
    /// AINCOM.
    AinCom = 0b1010,
    /// Temperature sensor monitor.
    TemperatureSensor = 0b1011,
    /// Analog power supply monitor.
    AnalogSupply = 0b1100,
    /// Digital power supply monitor.
    DigitalSupply = 0b1101,
    /// TDAC test signal.
    Tdac = 0b1110,
    /// Open connection.
    Float = 0b1111,
}

// ======================================================================
// == REFMUX (0x0F) =====================================================
// ======================================================================

/// Positive reference input (`REFMUX.RMUXP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum ReferencePositive {
    /// Internal 2.5 V reference (default).
    Internal = 0b000,
    /// External AIN0.
    Ain0 = 0b001,
    /// External AIN2.
    Ain2 = 0b010,
    /// External AIN4.
    Ain4 = 0b011,
    /// Internal analog supply (VAVDD).
    AnalogSupply = 0b100,
}

/// Negative reference input (`REFMUX.RMUXN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum ReferenceNegative {
    /// Internal 2.5 V reference (default).
    Internal = 0b000,
    /// External AIN1.
    Ain1 = 0b001,
    /// External AIN3.
    Ain3 = 0b010,
    /// External AIN5.
    Ain5 = 0b011,
    /// Internal analog supply (VAVSS).
    AnalogSupply = 0b100,
}
