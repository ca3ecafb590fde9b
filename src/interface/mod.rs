//! Bus and signal abstractions for the ADS126x driver.

pub mod control;
pub mod data_ready;
pub mod spi;

use crate::frame::FRAME_LEN;

/// Abstraction over the low-level bus access required by the driver.
///
/// Each method is one chip-select framed exchange; none of them keep state
/// between calls. Register ranges are validated by the driver: an empty
/// buffer is a no-op here, while [`crate::Ads126x`] rejects it with
/// [`crate::Error::InvalidArgument`].
pub trait Ads126xInterface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes consecutive registers starting at `register` with one `WREG` frame.
    fn write_registers(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Reads consecutive registers starting at `register` into the provided buffer.
    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Sends a stand-alone single-byte command.
    fn command(&mut self, opcode: u8) -> core::result::Result<(), Self::Error>;

    /// Clocks one conversion frame out of the device with an all-zero transmit buffer.
    fn read_frame(&mut self, frame: &mut [u8; FRAME_LEN]) -> core::result::Result<(), Self::Error>;

    /// Sends `opcode` and clocks the conversion frame that follows it.
    fn command_read_frame(
        &mut self,
        opcode: u8,
        frame: &mut [u8; FRAME_LEN],
    ) -> core::result::Result<(), Self::Error>;
}

/// Blocking wait on the active-low data-ready (`DRDY`) line.
pub trait DataReady {
    /// Error type produced while sampling the line.
    type Error: embedded_hal::digital::Error;

    /// Blocks until the line falls, or until `timeout_ms` elapses.
    ///
    /// Returns `Ok(true)` on a falling edge and `Ok(false)` on time-out.
    /// `None` waits indefinitely.
    fn wait_for_falling_edge(&mut self, timeout_ms: Option<u32>) -> core::result::Result<bool, Self::Error>;
}
