//! Conversion frame decoding utilities.
//!
//! With the status byte and checksum mode enabled every ADC1 read returns
//! six bytes: `[status, d3, d2, d1, d0, checksum]`.

use crate::params::Gain;
use crate::registers::ConversionStatus;

/// Length in bytes of a checksummed conversion frame.
pub const FRAME_LEN: usize = 6;
/// Constant added to the payload sum by the device checksum.
pub const CHECKSUM_SEED: u8 = 0x9B;
/// Full-scale reference voltage of the internal reference.
pub const REFERENCE_VOLTS: f64 = 2.5;

// 2^31, the magnitude of the most negative 32-bit code.
const FULL_SCALE_CODES: f64 = 2_147_483_648.0;

/// A validated ADC1 conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Raw status byte that preceded the data.
    pub status: u8,
    /// Signed 32-bit conversion code.
    pub raw: i32,
}

impl Sample {
    /// Typed view of the status byte.
    pub fn status(&self) -> ConversionStatus {
        ConversionStatus::from(self.status)
    }

    /// Conversion result in volts at the ADC input, ±2.5 V full scale.
    pub fn volts(&self) -> f64 {
        convert(self.raw)
    }

    /// Conversion result referred to the PGA input.
    pub fn input_volts(&self, gain: Gain) -> f64 {
        self.volts() / f64::from(gain.factor())
    }
}

/// Checksum mismatch detected while decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Checksum computed from the payload.
    pub expected: u8,
    /// Checksum byte carried by the frame.
    pub received: u8,
}

/// Computes the device checksum over the four data bytes.
pub fn checksum(payload: &[u8; 4]) -> u8 {
    payload
        .iter()
        .fold(CHECKSUM_SEED, |sum, byte| sum.wrapping_add(*byte))
}

/// Validates the checksum and decodes the big-endian conversion code.
pub fn decode(frame: &[u8; FRAME_LEN]) -> Result<Sample, ChecksumMismatch> {
    let payload = [frame[1], frame[2], frame[3], frame[4]];
    let expected = checksum(&payload);
    let received = frame[5];
    if expected != received {
        return Err(ChecksumMismatch { expected, received });
    }

    Ok(Sample {
        status: frame[0],
        raw: i32::from_be_bytes(payload),
    })
}

/// Converts a raw conversion code to volts: `raw × 2.5 / 2³¹`.
///
/// Does not account for the PGA gain.
pub fn convert(raw: i32) -> f64 {
    f64::from(raw) * (REFERENCE_VOLTS / FULL_SCALE_CODES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_for(status: u8, payload: [u8; 4]) -> [u8; FRAME_LEN] {
        let sum = checksum(&payload);
        [status, payload[0], payload[1], payload[2], payload[3], sum]
    }

    #[test]
    fn checksum_matches_reference_formula() {
        let payload = [0x12, 0x34, 0x56, 0x78];
        let reference = (0x12u32 + 0x34 + 0x56 + 0x78 + 0x9B) % 256;
        assert_eq!(u32::from(checksum(&payload)), reference);
    }

    #[test]
    fn decodes_big_endian_signed_code() {
        let frame = frame_for(0x40, [0x12, 0x34, 0x56, 0x78]);
        let sample = decode(&frame).unwrap();
        assert_eq!(sample.raw, 0x1234_5678);
        assert_eq!(sample.status, 0x40);
        assert!(sample.status().adc1_new_data());

        let expected = 305_419_896.0 * 2.5 / 2_147_483_648.0;
        assert!((sample.volts() - expected).abs() < 1e-12);
        assert!((sample.volts() - 0.355_55).abs() < 1e-4);
    }

    #[test]
    fn decodes_negative_codes() {
        let frame = frame_for(0x40, [0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(decode(&frame).unwrap().raw, -2);

        let frame = frame_for(0x40, [0x80, 0x00, 0x00, 0x00]);
        assert_eq!(decode(&frame).unwrap().raw, i32::MIN);
    }

    #[test]
    fn any_single_bit_flip_in_payload_is_rejected() {
        let frame = frame_for(0x40, [0x12, 0x34, 0x56, 0x78]);
        for index in 1..=4 {
            for bit in 0..8 {
                let mut corrupted = frame;
                corrupted[index] ^= 1 << bit;
                assert!(decode(&corrupted).is_err(), "byte {index} bit {bit}");
            }
        }
    }

    #[test]
    fn corrupted_checksum_byte_yields_no_sample() {
        let mut frame = frame_for(0x40, [0x12, 0x34, 0x56, 0x78]);
        frame[5] ^= 0x01;
        let err = decode(&frame).unwrap_err();
        assert_eq!(err.received, frame[5]);
        assert_eq!(err.expected, frame[5] ^ 0x01);
    }

    #[test]
    fn zero_payload_is_a_legitimate_zero_only_with_matching_checksum() {
        let good = frame_for(0x40, [0, 0, 0, 0]);
        assert_eq!(good[5], CHECKSUM_SEED);
        assert_eq!(decode(&good).unwrap().raw, 0);

        let mut bad = good;
        bad[5] = 0x00;
        assert!(decode(&bad).is_err());
    }

    #[test]
    fn conversion_is_linear_and_odd() {
        assert_eq!(convert(0), 0.0);
        assert!((convert(i32::MAX) - 2.5).abs() < 1e-8);
        assert_eq!(convert(i32::MIN), -2.5);
        assert_eq!(convert(-1_000), -convert(1_000));
        assert!((convert(2_000) - 2.0 * convert(1_000)).abs() < 1e-15);
    }

    #[test]
    fn input_volts_divides_by_gain() {
        let sample = Sample {
            status: 0,
            raw: 1 << 30,
        };
        assert_eq!(sample.volts(), 1.25);
        assert!((sample.input_volts(Gain::X32) - 1.25 / 32.0).abs() < 1e-15);
    }
}
