//! Power-down and START line control.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};

/// Time `PWDN` is held low during a power cycle.
pub const POWER_DOWN_HOLD_MS: u32 = 500;
/// Settling time after `PWDN` is released.
pub const POWER_UP_SETTLE_MS: u32 = 2_000;

/// The `PWDN` and `START` output lines of one converter.
///
/// Both lines are optional on the device (`START` may be tied low and
/// conversions started by opcode), but when they are wired they are driven
/// from here.
pub struct ControlPins<PWDN, START> {
    power_down: PWDN,
    start: START,
}

impl<PWDN, START> ControlPins<PWDN, START>
where
    PWDN: OutputPin,
    START: OutputPin,
{
    /// Wraps the two output pins.
    pub fn new(power_down: PWDN, start: START) -> Self {
        Self { power_down, start }
    }

    /// Power-cycles the converter.
    ///
    /// Drives `PWDN` low for [`POWER_DOWN_HOLD_MS`], releases it, parks
    /// `START` low so conversions are under opcode control, then waits
    /// [`POWER_UP_SETTLE_MS`]. All registers are back at their reset values
    /// afterwards.
    pub fn power_cycle(&mut self, delay: &mut impl DelayNs) -> core::result::Result<(), ErrorKind> {
        self.power_down.set_low().map_err(|err| err.kind())?;
        delay.delay_ms(POWER_DOWN_HOLD_MS);
        self.power_down.set_high().map_err(|err| err.kind())?;
        self.start.set_low().map_err(|err| err.kind())?;
        delay.delay_ms(POWER_UP_SETTLE_MS);
        Ok(())
    }

    /// Drives `START` high.
    pub fn start(&mut self) -> core::result::Result<(), ErrorKind> {
        self.start.set_high().map_err(|err| err.kind())
    }

    /// Drives `START` low.
    pub fn stop(&mut self) -> core::result::Result<(), ErrorKind> {
        self.start.set_low().map_err(|err| err.kind())
    }

    /// Consumes the wrapper and returns the pins.
    pub fn release(self) -> (PWDN, START) {
        (self.power_down, self.start)
    }
}
