//! Register map definitions for the ADS1262/ADS1263 converters.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{
    Chop, ChecksumMode, ConversionDelay, DataRate, DeviceVariant, Filter, Gain, Input,
    InternalReference, LevelShift, PgaMode, ReferenceNegative, ReferencePolarity,
    ReferencePositive, RunMode, SensorBiasAdc, SensorBiasMagnitude, SensorBiasPolarity,
    SerialTimeout, StatusByte,
};

/// Register address of `ID`.
pub const REG_ID: u8 = 0x00;
/// Register address of `POWER`.
pub const REG_POWER: u8 = 0x01;
/// Register address of `INTERFACE`.
pub const REG_INTERFACE: u8 = 0x02;
/// Register address of `MODE0`.
pub const REG_MODE0: u8 = 0x03;
/// Register address of `MODE1`.
pub const REG_MODE1: u8 = 0x04;
/// Register address of `MODE2`.
pub const REG_MODE2: u8 = 0x05;
/// Register address of `INPMUX`.
pub const REG_INPMUX: u8 = 0x06;
/// Register address of `OFCAL0`.
pub const REG_OFCAL0: u8 = 0x07;
/// Register address of `OFCAL1`.
pub const REG_OFCAL1: u8 = 0x08;
/// Register address of `OFCAL2`.
pub const REG_OFCAL2: u8 = 0x09;
/// Register address of `FSCAL0`.
pub const REG_FSCAL0: u8 = 0x0A;
/// Register address of `FSCAL1`.
pub const REG_FSCAL1: u8 = 0x0B;
/// Register address of `FSCAL2`.
pub const REG_FSCAL2: u8 = 0x0C;
/// Register address of `IDACMUX`.
pub const REG_IDACMUX: u8 = 0x0D;
/// Register address of `IDACMAG`.
pub const REG_IDACMAG: u8 = 0x0E;
/// Register address of `REFMUX`.
pub const REG_REFMUX: u8 = 0x0F;
/// Register address of `TDACP`.
pub const REG_TDACP: u8 = 0x10;
/// Register address of `TDACN`.
pub const REG_TDACN: u8 = 0x11;
/// Register address of `GPIOCON`.
pub const REG_GPIOCON: u8 = 0x12;
/// Register address of `GPIODIR`.
pub const REG_GPIODIR: u8 = 0x13;
/// Register address of `GPIODAT`.
pub const REG_GPIODAT: u8 = 0x14;
/// Register address of `ADC2CFG` (ADS1263 only).
pub const REG_ADC2CFG: u8 = 0x15;
/// Register address of `ADC2MUX` (ADS1263 only).
pub const REG_ADC2MUX: u8 = 0x16;
/// Register address of `ADC2OFC0` (ADS1263 only).
pub const REG_ADC2OFC0: u8 = 0x17;
/// Register address of `ADC2OFC1` (ADS1263 only).
pub const REG_ADC2OFC1: u8 = 0x18;
/// Register address of `ADC2FSC0` (ADS1263 only).
pub const REG_ADC2FSC0: u8 = 0x19;
/// Register address of `ADC2FSC1` (ADS1263 only).
pub const REG_ADC2FSC1: u8 = 0x1A;

/// Highest address encodable in the 5-bit address field of `RREG`/`WREG`.
pub const MAX_REGISTER_ADDRESS: u8 = 0x1F;

/// `NOP` opcode.
pub const OPCODE_NOP: u8 = 0x00;
/// `RESET` opcode.
pub const OPCODE_RESET: u8 = 0x06;
/// `START1` opcode: start ADC1 conversions.
pub const OPCODE_START1: u8 = 0x08;
/// `STOP1` opcode: stop ADC1 conversions.
pub const OPCODE_STOP1: u8 = 0x0A;
/// `RDATA1` opcode: read ADC1 conversion data.
pub const OPCODE_RDATA1: u8 = 0x12;
/// `SYOCAL1` opcode: ADC1 system offset calibration.
pub const OPCODE_SYOCAL1: u8 = 0x16;
/// `SYGCAL1` opcode: ADC1 system gain calibration.
pub const OPCODE_SYGCAL1: u8 = 0x17;
/// `SFOCAL1` opcode: ADC1 self offset calibration.
pub const OPCODE_SFOCAL1: u8 = 0x19;
/// `RREG` opcode, OR-ed with the starting register address.
pub const OPCODE_RREG: u8 = 0x20;
/// `WREG` opcode, OR-ed with the starting register address.
pub const OPCODE_WREG: u8 = 0x40;

/// Stand-alone single-byte commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Reset the device to its power-on register values.
    Reset,
    /// Start ADC1 conversions.
    Start1,
    /// Stop ADC1 conversions.
    Stop1,
    /// Read ADC1 conversion data.
    ReadData1,
    /// ADC1 system offset calibration.
    SystemOffsetCalibration1,
    /// ADC1 system gain calibration.
    SystemGainCalibration1,
    /// ADC1 self offset calibration.
    SelfOffsetCalibration1,
}

impl Command {
    /// Returns the opcode byte sent on the bus.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Reset => OPCODE_RESET,
            Self::Start1 => OPCODE_START1,
            Self::Stop1 => OPCODE_STOP1,
            Self::ReadData1 => OPCODE_RDATA1,
            Self::SystemOffsetCalibration1 => OPCODE_SYOCAL1,
            Self::SystemGainCalibration1 => OPCODE_SYGCAL1,
            Self::SelfOffsetCalibration1 => OPCODE_SFOCAL1,
        }
    }
}

// ======================================================================
// == Register model ====================================================
// ======================================================================

/// A device register being composed for a write.
///
/// The value is built from option bytes (see [`RegisterOption`]) combined by
/// bitwise OR. [`Register::compose`] always starts from zero, so a register
/// reused for a second configuration cycle never carries bits over from the
/// first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    name: &'static str,
    address: u8,
    value: u8,
}

impl Register {
    /// Creates a register with a zero value.
    ///
    /// The value is *not* the datasheet default; compose the default options
    /// explicitly when they are wanted.
    pub const fn new(name: &'static str, address: u8) -> Self {
        Self {
            name,
            address,
            value: 0,
        }
    }

    /// Creates an empty register for a bit-field layout.
    pub const fn of<L: RegisterLayout>() -> Self {
        Self::new(L::NAME, L::ADDRESS)
    }

    /// Replaces the value with the OR of `options`.
    pub fn compose(&mut self, options: &[u8]) {
        self.value = 0;
        self.accumulate(options);
    }

    /// ORs `options` into the current value without clearing it first.
    pub fn accumulate(&mut self, options: &[u8]) {
        self.value = options.iter().fold(self.value, |value, option| value | option);
    }

    /// Clears the value back to zero.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Builder form of [`Register::compose`].
    pub fn with_options(mut self, options: &[u8]) -> Self {
        self.compose(options);
        self
    }

    /// Diagnostic register name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Register address.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Composed value.
    pub const fn value(&self) -> u8 {
        self.value
    }
}

/// An option enum that occupies a field of one register.
pub trait RegisterOption: Copy {
    /// Address of the register holding the field.
    const ADDRESS: u8;

    /// Returns the option positioned within its register byte, all other bits clear.
    fn option(self) -> u8;
}

/// Positive side of the input multiplexer (`INPMUX.MUXP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveInput(pub Input);

/// Negative side of the input multiplexer (`INPMUX.MUXN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeInput(pub Input);

macro_rules! register_option {
    ($($option:ty => $layout:ident :: $setter:ident;)*) => {
        $(
            impl RegisterOption for $option {
                const ADDRESS: u8 = <$layout as RegisterLayout>::ADDRESS;

                fn option(self) -> u8 {
                    u8::from($layout::new().$setter(self))
                }
            }
        )*
    };
}

register_option! {
    InternalReference => Power::with_internal_reference;
    LevelShift => Power::with_level_shift;
    ChecksumMode => Interface::with_checksum;
    StatusByte => Interface::with_status_byte;
    SerialTimeout => Interface::with_timeout;
    ConversionDelay => Mode0::with_delay;
    Chop => Mode0::with_chop;
    RunMode => Mode0::with_run_mode;
    ReferencePolarity => Mode0::with_reference_polarity;
    SensorBiasMagnitude => Mode1::with_bias_magnitude;
    SensorBiasPolarity => Mode1::with_bias_polarity;
    SensorBiasAdc => Mode1::with_bias_adc;
    Filter => Mode1::with_filter;
    DataRate => Mode2::with_data_rate;
    Gain => Mode2::with_gain;
    PgaMode => Mode2::with_pga;
    ReferenceNegative => RefMux::with_negative;
    ReferencePositive => RefMux::with_positive;
}

impl RegisterOption for PositiveInput {
    const ADDRESS: u8 = REG_INPMUX;

    fn option(self) -> u8 {
        u8::from(InputMux::new().with_positive(self.0))
    }
}

impl RegisterOption for NegativeInput {
    const ADDRESS: u8 = REG_INPMUX;

    fn option(self) -> u8 {
        u8::from(InputMux::new().with_negative(self.0))
    }
}

// ======================================================================
// == Bit-field layouts =================================================
// ======================================================================

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register bit-field type.
pub trait RegisterLayout {
    /// Datasheet register name.
    const NAME: &'static str;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Reset/default value defined by the datasheet, if fixed.
    const RESET_VALUE: Option<u8>;
}

macro_rules! byte_conversions {
    ($($layout:ident),* $(,)?) => {
        $(
            impl From<u8> for $layout {
                fn from(value: u8) -> Self {
                    Self::from_bytes([value])
                }
            }

            impl From<$layout> for u8 {
                fn from(value: $layout) -> Self {
                    value.into_bytes()[0]
                }
            }
        )*
    };
}

/// Bitfield representation of the `ID` register (address `0x00`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    // Die revision (bits 4:0).
    pub revision: B5,
    // Device variant (bits 7:5).
    pub variant: DeviceVariant,
}

/// Bitfield representation of the `POWER` register (address `0x01`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Power {
    // Internal reference enable (bit 0).
    pub internal_reference: InternalReference,
    // Level-shift voltage enable (bit 1).
    pub level_shift: LevelShift,
    #[skip]
    __: B2,
    // Reset indicator, write 0 to clear (bit 4).
    pub reset: bool,
    #[skip]
    __: B3,
}

/// Bitfield representation of the `INTERFACE` register (address `0x02`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    // Checksum/CRC byte mode (bits 1:0).
    pub checksum: ChecksumMode,
    // Status byte enable (bit 2).
    pub status_byte: StatusByte,
    // Serial interface time-out (bit 3).
    pub timeout: SerialTimeout,
    #[skip]
    __: B4,
}

/// Bitfield representation of the `MODE0` register (address `0x03`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode0 {
    // Conversion delay (bits 3:0).
    pub delay: ConversionDelay,
    // Chop and IDAC rotation (bits 5:4).
    pub chop: Chop,
    // Conversion run mode (bit 6).
    pub run_mode: RunMode,
    // Reference mux polarity reversal (bit 7).
    pub reference_polarity: ReferencePolarity,
}

/// Bitfield representation of the `MODE1` register (address `0x04`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode1 {
    // Sensor bias magnitude (bits 2:0).
    pub bias_magnitude: SensorBiasMagnitude,
    // Sensor bias polarity (bit 3).
    pub bias_polarity: SensorBiasPolarity,
    // Sensor bias ADC connection (bit 4).
    pub bias_adc: SensorBiasAdc,
    // Digital filter (bits 7:5).
    pub filter: Filter,
}

/// Bitfield representation of the `MODE2` register (address `0x05`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode2 {
    // Data rate (bits 3:0).
    pub data_rate: DataRate,
    // PGA gain (bits 6:4).
    pub gain: Gain,
    // PGA bypass (bit 7).
    pub pga: PgaMode,
}

/// Bitfield representation of the `INPMUX` register (address `0x06`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMux {
    // Negative input (bits 3:0).
    pub negative: Input,
    // Positive input (bits 7:4).
    pub positive: Input,
}

/// Bitfield representation of the `REFMUX` register (address `0x0F`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefMux {
    // Negative reference input (bits 2:0).
    pub negative: ReferenceNegative,
    // Positive reference input (bits 5:3).
    pub positive: ReferencePositive,
    #[skip]
    __: B2,
}

/// Bitfield representation of the status byte that leads every conversion frame.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStatus {
    // Device reset since the POWER.RESET bit was last cleared (bit 0).
    pub reset: bool,
    // PGA differential output alarm (bit 1).
    pub pga_differential_alarm: bool,
    // PGA output high alarm (bit 2).
    pub pga_high_alarm: bool,
    // PGA output low alarm (bit 3).
    pub pga_low_alarm: bool,
    // Low reference alarm (bit 4).
    pub reference_alarm: bool,
    // External clock in use (bit 5).
    pub external_clock: bool,
    // New ADC1 data (bit 6).
    pub adc1_new_data: bool,
    // New ADC2 data (bit 7).
    pub adc2_new_data: bool,
}

impl ConversionStatus {
    /// Returns `true` when any analog alarm flag is raised.
    pub fn has_alarm(&self) -> bool {
        self.pga_differential_alarm()
            || self.pga_high_alarm()
            || self.pga_low_alarm()
            || self.reference_alarm()
    }
}

byte_conversions!(
    DeviceId,
    Power,
    Interface,
    Mode0,
    Mode1,
    Mode2,
    InputMux,
    RefMux,
    ConversionStatus,
);

impl RegisterLayout for DeviceId {
    const NAME: &'static str = "ID";
    const ADDRESS: u8 = REG_ID;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
    const RESET_VALUE: Option<u8> = None;
}

impl RegisterLayout for Power {
    const NAME: &'static str = "POWER";
    const ADDRESS: u8 = REG_POWER;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x11);
}

impl RegisterLayout for Interface {
    const NAME: &'static str = "INTERFACE";
    const ADDRESS: u8 = REG_INTERFACE;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x05);
}

impl RegisterLayout for Mode0 {
    const NAME: &'static str = "MODE0";
    const ADDRESS: u8 = REG_MODE0;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x00);
}

impl RegisterLayout for Mode1 {
    const NAME: &'static str = "MODE1";
    const ADDRESS: u8 = REG_MODE1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x80);
}

impl RegisterLayout for Mode2 {
    const NAME: &'static str = "MODE2";
    const ADDRESS: u8 = REG_MODE2;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x04);
}

impl RegisterLayout for InputMux {
    const NAME: &'static str = "INPMUX";
    const ADDRESS: u8 = REG_INPMUX;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x01);
}

impl RegisterLayout for RefMux {
    const NAME: &'static str = "REFMUX";
    const ADDRESS: u8 = REG_REFMUX;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<u8> = Some(0x00);
}

/// Returns `true` when `registers` form one gap-free ascending address range.
///
/// `WREG` writes a contiguous block; a register left out of the middle of a
/// block cannot be skipped.
pub fn is_contiguous(registers: &[Register]) -> bool {
    registers
        .windows(2)
        .all(|pair| pair[0].address().checked_add(1) == Some(pair[1].address()))
}
