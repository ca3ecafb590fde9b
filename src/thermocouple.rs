//! Type-K thermocouple and on-chip temperature sensor conversions.
//!
//! Polynomials are the NIST ITS-90 reference functions for type K. EMF is in
//! millivolts and temperature in degrees Celsius throughout.

/// `emf = Σ cᵢ·tⁱ + a0·exp(a1·(t − a2)²)`, valid 0 °C to 1372 °C.
const EMF_COEFFICIENTS: [f64; 10] = [
    -0.176_004_136_860e-1,
    0.389_212_049_750e-1,
    0.185_587_700_320e-4,
    -0.994_575_928_740e-7,
    0.318_409_457_190e-9,
    -0.560_728_448_890e-12,
    0.560_750_590_590e-15,
    -0.320_207_200_030e-18,
    0.971_511_471_520e-22,
    -0.121_047_212_750e-25,
];
const EMF_A0: f64 = 0.118_597_600_000;
const EMF_A1: f64 = -0.118_343_200_000e-3;
const EMF_A2: f64 = 0.126_968_600_000e3;

/// Inverse polynomial, valid 0 mV to 20.644 mV (0 °C to 500 °C).
const TEMPERATURE_COEFFICIENTS: [f64; 10] = [
    0.0,
    2.508_355_1e1,
    7.860_106e-2,
    -2.503_131e-1,
    8.315_270e-2,
    -1.228_034e-2,
    9.804_036e-4,
    -4.413_030e-5,
    1.057_734e-6,
    -1.052_755e-8,
];

/// Internal sensor output at 25 °C, in microvolts.
const SENSOR_OFFSET_UV: f64 = 122_400.0;
/// Internal sensor slope, in microvolts per degree.
const SENSOR_SLOPE_UV_PER_C: f64 = 420.0;

fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * x + coefficient)
}

/// Thermocouple EMF in millivolts for a junction temperature in °C.
pub fn emf_from_temperature(celsius: f64) -> f64 {
    let offset = celsius - EMF_A2;
    horner(&EMF_COEFFICIENTS, celsius) + EMF_A0 * libm::exp(EMF_A1 * offset * offset)
}

/// Junction temperature in °C for a thermocouple EMF in millivolts.
pub fn temperature_from_emf(millivolts: f64) -> f64 {
    horner(&TEMPERATURE_COEFFICIENTS, millivolts)
}

/// Temperature in °C reported by the on-chip sensor for its output voltage.
///
/// Expects a gain-1 reading with the sensor selected on both mux inputs.
pub fn internal_sensor_temperature(volts: f64) -> f64 {
    (volts * 1.0e6 - SENSOR_OFFSET_UV) / SENSOR_SLOPE_UV_PER_C + 25.0
}

/// Cold-junction compensation using the on-chip temperature sensor.
///
/// The die temperature stands in for the terminal block temperature. The
/// die runs warmer than the terminals, and the measured chain carries a
/// small fixed EMF offset; both corrections are configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColdJunction {
    /// PGA gain used for the thermocouple channel.
    pub gain: f64,
    /// Die self-heating subtracted from the sensor reading, in °C.
    pub self_heating_c: f64,
    /// Offset subtracted from the compensated EMF, in mV.
    pub emf_offset_mv: f64,
}

impl ColdJunction {
    /// Compensation for a thermocouple read at `gain` with the default corrections.
    pub const fn new(gain: f64) -> Self {
        Self {
            gain,
            self_heating_c: 0.7,
            emf_offset_mv: 0.2,
        }
    }

    /// Hot-junction temperature in °C.
    ///
    /// `reference_volts` is the internal sensor reading, `thermocouple_volts`
    /// the ADC-input voltage of the thermocouple channel (not yet divided by
    /// the gain).
    pub fn temperature(&self, reference_volts: f64, thermocouple_volts: f64) -> f64 {
        let ambient = internal_sensor_temperature(reference_volts) - self.self_heating_c;
        let junction_mv = thermocouple_volts / self.gain * 1_000.0;
        temperature_from_emf(emf_from_temperature(ambient) + junction_mv - self.emf_offset_mv)
    }
}
