//! Configuration primitives for the ADS126x driver.

use crate::params::{
    Chop, ChecksumMode, ConversionDelay, DataRate, Filter, Gain, Input, InternalReference,
    LevelShift, PgaMode, ReferencePolarity, RunMode, SensorBiasAdc, SensorBiasMagnitude,
    SensorBiasPolarity, SerialTimeout, StatusByte,
};
use crate::registers::{
    Interface, InputMux, Mode0, Mode1, Mode2, NegativeInput, PositiveInput, Power, Register,
    RegisterOption,
};

/// Number of registers in the configuration block (`POWER` through `INPMUX`).
pub const CONFIG_REGISTER_COUNT: usize = 6;

/// User-facing configuration for the ADS126x ADC1 signal chain.
///
/// Covers the contiguous register block `POWER` (0x01) through `INPMUX`
/// (0x06), which is written in a single `WREG` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Internal 2.5 V reference enable.
    pub internal_reference: InternalReference,
    /// `AINCOM` level shift enable.
    pub level_shift: LevelShift,
    /// Integrity byte mode.
    pub checksum: ChecksumMode,
    /// Status byte in conversion data.
    pub status_byte: StatusByte,
    /// Serial interface time-out.
    pub serial_timeout: SerialTimeout,
    /// Conversion start delay.
    pub delay: ConversionDelay,
    /// Chop and IDAC rotation.
    pub chop: Chop,
    /// Continuous or pulse conversions.
    pub run_mode: RunMode,
    /// Reference mux polarity.
    pub reference_polarity: ReferencePolarity,
    /// Digital filter.
    pub filter: Filter,
    /// Sensor bias ADC connection.
    pub bias_adc: SensorBiasAdc,
    /// Sensor bias polarity.
    pub bias_polarity: SensorBiasPolarity,
    /// Sensor bias magnitude.
    pub bias_magnitude: SensorBiasMagnitude,
    /// Input channel, gain and data rate.
    pub channel: ChannelSetting,
    /// Deadline for each data-ready wait, `None` to wait indefinitely.
    pub data_ready_timeout_ms: Option<u32>,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration supports checksummed continuous reads.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.status_byte != StatusByte::Enabled {
            return Err(ConfigError::StatusByteDisabled);
        }

        if self.checksum != ChecksumMode::Checksum {
            return Err(ConfigError::ChecksumDisabled);
        }

        if !self.filter.supports(self.channel.data_rate) {
            return Err(ConfigError::FirDataRate);
        }

        Ok(())
    }

    /// Composes the `POWER`..`INPMUX` registers in address order.
    pub fn registers(&self) -> [Register; CONFIG_REGISTER_COUNT] {
        let [mode2, inpmux] = self.channel.registers();
        [
            Register::of::<Power>().with_options(&[
                self.internal_reference.option(),
                self.level_shift.option(),
            ]),
            Register::of::<Interface>().with_options(&[
                self.checksum.option(),
                self.status_byte.option(),
                self.serial_timeout.option(),
            ]),
            Register::of::<Mode0>().with_options(&[
                self.delay.option(),
                self.chop.option(),
                self.run_mode.option(),
                self.reference_polarity.option(),
            ]),
            Register::of::<Mode1>().with_options(&[
                self.bias_magnitude.option(),
                self.bias_polarity.option(),
                self.bias_adc.option(),
                self.filter.option(),
            ]),
            mode2,
            inpmux,
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            internal_reference: InternalReference::Enabled,
            level_shift: LevelShift::Disabled,
            checksum: ChecksumMode::Checksum,
            status_byte: StatusByte::Enabled,
            serial_timeout: SerialTimeout::Disabled,
            delay: ConversionDelay::None,
            chop: Chop::Disabled,
            run_mode: RunMode::Continuous,
            reference_polarity: ReferencePolarity::Normal,
            filter: Filter::Fir,
            bias_adc: SensorBiasAdc::Adc1,
            bias_polarity: SensorBiasPolarity::PullUp,
            bias_magnitude: SensorBiasMagnitude::None,
            channel: ChannelSetting::default(),
            data_ready_timeout_ms: None,
        }
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Enables or disables the internal reference.
    pub fn internal_reference(mut self, internal_reference: InternalReference) -> Self {
        self.config.internal_reference = internal_reference;
        self
    }

    /// Enables or disables the `AINCOM` level shift.
    pub fn level_shift(mut self, level_shift: LevelShift) -> Self {
        self.config.level_shift = level_shift;
        self
    }

    /// Overrides the integrity byte mode.
    pub fn checksum(mut self, checksum: ChecksumMode) -> Self {
        self.config.checksum = checksum;
        self
    }

    /// Overrides the status byte selection.
    pub fn status_byte(mut self, status_byte: StatusByte) -> Self {
        self.config.status_byte = status_byte;
        self
    }

    /// Enables or disables the serial interface time-out.
    pub fn serial_timeout(mut self, serial_timeout: SerialTimeout) -> Self {
        self.config.serial_timeout = serial_timeout;
        self
    }

    /// Sets the conversion start delay.
    pub fn delay(mut self, delay: ConversionDelay) -> Self {
        self.config.delay = delay;
        self
    }

    /// Sets the chop mode.
    pub fn chop(mut self, chop: Chop) -> Self {
        self.config.chop = chop;
        self
    }

    /// Sets the conversion run mode.
    pub fn run_mode(mut self, run_mode: RunMode) -> Self {
        self.config.run_mode = run_mode;
        self
    }

    /// Sets the reference mux polarity.
    pub fn reference_polarity(mut self, reference_polarity: ReferencePolarity) -> Self {
        self.config.reference_polarity = reference_polarity;
        self
    }

    /// Sets the digital filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Configures the sensor bias source.
    pub fn sensor_bias(
        mut self,
        adc: SensorBiasAdc,
        polarity: SensorBiasPolarity,
        magnitude: SensorBiasMagnitude,
    ) -> Self {
        self.config.bias_adc = adc;
        self.config.bias_polarity = polarity;
        self.config.bias_magnitude = magnitude;
        self
    }

    /// Sets the input channel, gain and data rate.
    pub fn channel(mut self, channel: ChannelSetting) -> Self {
        self.config.channel = channel;
        self
    }

    /// Sets the data-ready wait deadline in milliseconds.
    pub fn data_ready_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.config.data_ready_timeout_ms = Some(timeout_ms);
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Measurement channel: the `MODE2` and `INPMUX` register pair.
///
/// The two registers are adjacent, so switching channels is a single
/// two-byte `WREG` starting at `MODE2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSetting {
    /// Positive multiplexer input.
    pub positive: Input,
    /// Negative multiplexer input.
    pub negative: Input,
    /// PGA gain.
    pub gain: Gain,
    /// Output data rate.
    pub data_rate: DataRate,
    /// PGA in circuit or bypassed.
    pub pga: PgaMode,
}

impl ChannelSetting {
    /// Differential channel through the PGA.
    pub const fn differential(positive: Input, negative: Input, gain: Gain, data_rate: DataRate) -> Self {
        Self {
            positive,
            negative,
            gain,
            data_rate,
            pga: PgaMode::Enabled,
        }
    }

    /// Internal temperature sensor at unity gain.
    pub const fn temperature_sensor(data_rate: DataRate) -> Self {
        Self::differential(
            Input::TemperatureSensor,
            Input::TemperatureSensor,
            Gain::X1,
            data_rate,
        )
    }

    /// Composes the `MODE2` and `INPMUX` registers.
    pub fn registers(&self) -> [Register; 2] {
        [
            Register::of::<Mode2>().with_options(&[
                self.pga.option(),
                self.gain.option(),
                self.data_rate.option(),
            ]),
            Register::of::<InputMux>().with_options(&[
                PositiveInput(self.positive).option(),
                NegativeInput(self.negative).option(),
            ]),
        ]
    }
}

impl Default for ChannelSetting {
    fn default() -> Self {
        Self::differential(Input::Ain0, Input::Ain1, Gain::X1, DataRate::Sps20)
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Conversion frames would lack the checksum byte.
    ChecksumDisabled,
    /// Conversion frames would lack the leading status byte.
    StatusByteDisabled,
    /// The FIR filter only runs at 2.5, 5, 10 or 20 SPS.
    FirDataRate,
}
