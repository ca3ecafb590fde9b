//! Error handling primitives for the ADS126x driver.
//!
//! Two families are kept apart: [`Error`] covers
//! configuration-phase operations (register writes, commands, pin control),
//! where a failure leaves the device in an unknown state and callers should
//! abort. [`ReadError`] covers a single conversion read, where every failure
//! means "skip this sample" and acquisition carries on.

use embedded_hal::digital::ErrorKind;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by configuration and command operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// A control or data-ready pin reported an error.
    Pin(ErrorKind),
    /// Register address or count outside the device register map.
    InvalidArgument,
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// The `ID` register holds a reserved device code (raw register value).
    UnknownDevice(u8),
    /// Read-back of a written register returned a different value.
    RegisterMismatch {
        /// Address of the first mismatching register.
        address: u8,
        /// Value that was written.
        expected: u8,
        /// Value the device returned.
        actual: u8,
    },
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

/// Reasons a single conversion read produced no sample.
///
/// None of these end acquisition: the caller drops the cycle and reads again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError<E> {
    /// The SPI transfer itself failed.
    Transport(E),
    /// The data-ready line could not be sampled.
    DataReady(ErrorKind),
    /// The checksum byte does not match the payload.
    Checksum {
        /// Checksum computed from the received payload.
        expected: u8,
        /// Checksum byte sent by the device.
        received: u8,
    },
    /// No data-ready edge arrived before the configured deadline.
    Timeout,
}

impl<E> ReadError<E> {
    /// Returns `true` when acquisition may continue with the next conversion.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::DataReady(_) | Self::Checksum { .. } | Self::Timeout => true,
        }
    }
}

impl<E> From<E> for ReadError<E> {
    fn from(err: E) -> Self {
        Self::Transport(err)
    }
}
