//! Data-ready line handling.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use super::DataReady;

/// Default sampling period of [`PolledDataReady`] in microseconds.
pub const DEFAULT_POLL_INTERVAL_US: u32 = 50;

/// [`DataReady`] for a plain input pin, sampled at a fixed interval.
///
/// Fallback for boards where `DRDY` cannot raise an interrupt; prefer
/// [`LatchedDataReady`] when it can.
///
/// A falling edge is reported once the pin has been seen high and then low.
/// A line that is already low on entry is not an edge: the wait keeps
/// sampling until the line has gone high and come back down, so a frame is
/// never read on a stale `DRDY` level. `DRDY` pulses shorter than the poll
/// interval can be missed; pick an interval well below the conversion period.
pub struct PolledDataReady<PIN, D> {
    pin: PIN,
    delay: D,
    poll_interval_us: u32,
}

impl<PIN, D> PolledDataReady<PIN, D> {
    /// Wraps `pin`, sampling every [`DEFAULT_POLL_INTERVAL_US`].
    pub fn new(pin: PIN, delay: D) -> Self {
        Self::with_poll_interval(pin, delay, DEFAULT_POLL_INTERVAL_US)
    }

    /// Wraps `pin` with an explicit sampling period (minimum 1 µs).
    pub fn with_poll_interval(pin: PIN, delay: D, poll_interval_us: u32) -> Self {
        Self {
            pin,
            delay,
            poll_interval_us: poll_interval_us.max(1),
        }
    }

    /// Consumes the adapter and returns the pin and delay.
    pub fn release(self) -> (PIN, D) {
        (self.pin, self.delay)
    }
}

impl<PIN, D> DataReady for PolledDataReady<PIN, D>
where
    PIN: InputPin,
    D: DelayNs,
{
    type Error = PIN::Error;

    fn wait_for_falling_edge(&mut self, timeout_ms: Option<u32>) -> core::result::Result<bool, Self::Error> {
        let limit_us = timeout_ms.map(|ms| u64::from(ms) * 1_000);
        let mut waited_us: u64 = 0;
        let mut seen_high = false;

        loop {
            if self.pin.is_high()? {
                seen_high = true;
            } else if seen_high {
                return Ok(true);
            }

            if let Some(limit) = limit_us {
                if waited_us >= limit {
                    return Ok(false);
                }
            }

            self.delay.delay_us(self.poll_interval_us);
            waited_us += u64::from(self.poll_interval_us);
        }
    }
}

/// Falling-edge latch set from the `DRDY` interrupt handler.
///
/// The GPIO peripheral catches the edge, so `DRDY` pulses of any length are
/// seen. Place it in a `static` shared with the handler.
#[derive(Debug, Default)]
pub struct EdgeFlag {
    pending: AtomicBool,
}

impl EdgeFlag {
    /// Creates a latch with no pending edge.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Records a falling edge. Call from the interrupt handler.
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Discards a pending edge, e.g. one raised before conversions restarted.
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Consumes the pending edge, returning whether there was one.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// [`DataReady`] waiting on an [`EdgeFlag`] latched by an interrupt.
///
/// An edge latched before the wait is reported immediately and consumed.
pub struct LatchedDataReady<'a, D> {
    flag: &'a EdgeFlag,
    delay: D,
    poll_interval_us: u32,
}

impl<'a, D> LatchedDataReady<'a, D> {
    /// Waits on `flag`, checking it every [`DEFAULT_POLL_INTERVAL_US`].
    pub fn new(flag: &'a EdgeFlag, delay: D) -> Self {
        Self::with_poll_interval(flag, delay, DEFAULT_POLL_INTERVAL_US)
    }

    /// Waits on `flag` with an explicit check period (minimum 1 µs).
    pub fn with_poll_interval(flag: &'a EdgeFlag, delay: D, poll_interval_us: u32) -> Self {
        Self {
            flag,
            delay,
            poll_interval_us: poll_interval_us.max(1),
        }
    }

    /// Consumes the adapter and returns the delay.
    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> DataReady for LatchedDataReady<'_, D> {
    type Error = Infallible;

    fn wait_for_falling_edge(&mut self, timeout_ms: Option<u32>) -> core::result::Result<bool, Self::Error> {
        let limit_us = timeout_ms.map(|ms| u64::from(ms) * 1_000);
        let mut waited_us: u64 = 0;

        loop {
            if self.flag.take() {
                return Ok(true);
            }

            if let Some(limit) = limit_us {
                if waited_us >= limit {
                    return Ok(false);
                }
            }

            self.delay.delay_us(self.poll_interval_us);
            waited_us += u64::from(self.poll_interval_us);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeFlag, LatchedDataReady, PolledDataReady};
    use crate::interface::DataReady;
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::MockError;

    #[test]
    fn reports_high_to_low_transition() {
        let expectations = [
            PinTransaction::get(State::High),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
        ];
        let mut pin = PinMock::new(&expectations);
        let mut drdy = PolledDataReady::new(pin.clone(), NoopDelay::new());

        assert!(drdy.wait_for_falling_edge(None).unwrap());
        pin.done();
    }

    #[test]
    fn low_level_on_entry_is_not_an_edge() {
        let expectations = [
            PinTransaction::get(State::Low),
            PinTransaction::get(State::Low),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
        ];
        let mut pin = PinMock::new(&expectations);
        let mut drdy = PolledDataReady::new(pin.clone(), NoopDelay::new());

        assert!(drdy.wait_for_falling_edge(None).unwrap());
        pin.done();
    }

    #[test]
    fn times_out_without_edge() {
        // 1 ms at 250 µs per poll: samples at 0, 250, 500, 750 and 1000 µs.
        let expectations = vec![PinTransaction::get(State::High); 5];
        let mut pin = PinMock::new(&expectations);
        let mut drdy = PolledDataReady::with_poll_interval(pin.clone(), NoopDelay::new(), 250);

        assert!(!drdy.wait_for_falling_edge(Some(1)).unwrap());
        pin.done();
    }

    #[test]
    fn zero_timeout_samples_once() {
        let expectations = [PinTransaction::get(State::Low)];
        let mut pin = PinMock::new(&expectations);
        let mut drdy = PolledDataReady::new(pin.clone(), NoopDelay::new());

        assert!(!drdy.wait_for_falling_edge(Some(0)).unwrap());
        pin.done();
    }

    #[test]
    fn pin_errors_propagate() {
        let expectations = [PinTransaction::get(State::High)
            .with_error(MockError::Io(std::io::ErrorKind::Other))];
        let mut pin = PinMock::new(&expectations);
        let mut drdy = PolledDataReady::new(pin.clone(), NoopDelay::new());

        let err = drdy.wait_for_falling_edge(None).unwrap_err();
        assert_eq!(embedded_hal::digital::Error::kind(&err), ErrorKind::Other);
        pin.done();
    }

    // Delay that stands in for the interrupt: the edge arrives during the
    // `nth` wait period.
    struct EdgeDuring<'a> {
        flag: &'a EdgeFlag,
        nth: u32,
        periods: u32,
    }

    impl embedded_hal::delay::DelayNs for EdgeDuring<'_> {
        fn delay_ns(&mut self, _ns: u32) {
            self.periods += 1;
            if self.periods == self.nth {
                self.flag.signal();
            }
        }
    }

    #[test]
    fn latched_edge_is_reported_once() {
        let flag = EdgeFlag::new();
        let mut drdy = LatchedDataReady::new(&flag, NoopDelay::new());

        flag.signal();
        assert!(drdy.wait_for_falling_edge(Some(0)).unwrap());
        assert!(!drdy.wait_for_falling_edge(Some(0)).unwrap());
    }

    #[test]
    fn latched_wait_blocks_until_interrupt() {
        let flag = EdgeFlag::new();
        let delay = EdgeDuring {
            flag: &flag,
            nth: 3,
            periods: 0,
        };
        let mut drdy = LatchedDataReady::new(&flag, delay);

        assert!(drdy.wait_for_falling_edge(None).unwrap());
        assert_eq!(drdy.release().periods, 3);
    }

    #[test]
    fn latched_wait_times_out() {
        let flag = EdgeFlag::new();
        let delay = EdgeDuring {
            flag: &flag,
            nth: u32::MAX,
            periods: 0,
        };
        let mut drdy = LatchedDataReady::with_poll_interval(&flag, delay, 250);

        assert!(!drdy.wait_for_falling_edge(Some(1)).unwrap());
        assert_eq!(drdy.release().periods, 4);
    }

    #[test]
    fn cleared_edge_is_not_reported() {
        let flag = EdgeFlag::new();
        flag.signal();
        flag.clear();

        let mut drdy = LatchedDataReady::new(&flag, NoopDelay::new());
        assert!(!drdy.wait_for_falling_edge(Some(0)).unwrap());
    }
}
