//! Acquisition loop: program, start, read, emit, repeat.
//!
//! [`Acquisition`] drives an initialised [`Ads126x`] until a
//! [`Cancellation`] fires, writing one [`Record`] per valid conversion to a
//! [`RecordSink`]. Failed reads are counted and skipped; only setup
//! operations (commands, register writes) and sink failures end a run.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::ChannelSetting;
use crate::device::Ads126x;
use crate::error::{Error, ReadError};
use crate::frame::Sample;
use crate::interface::{Ads126xInterface, DataReady};

/// Default period between statistics log lines.
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 5_000;

/// One output line: `timestamp_ms,value[,derived]`.
///
/// `Display` writes the line without the trailing newline; sinks add it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Record {
    /// Milliseconds since the acquisition clock started.
    pub timestamp_ms: u64,
    /// Converted sample in volts.
    pub value: f64,
    /// Value derived from the reference average and this sample.
    pub derived: Option<f64>,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.timestamp_ms, self.value)?;
        if let Some(derived) = self.derived {
            write!(f, ",{}", derived)?;
        }
        Ok(())
    }
}

/// Destination for acquisition records.
pub trait RecordSink {
    /// Error produced by the destination.
    type Error;

    /// Writes one record.
    fn emit(&mut self, record: &Record) -> core::result::Result<(), Self::Error>;

    /// Flushes buffered records. Called once when a run ends.
    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// [`RecordSink`] writing newline-terminated lines to a [`core::fmt::Write`].
pub struct FmtSink<W> {
    writer: W,
}

impl<W: fmt::Write> FmtSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: fmt::Write> RecordSink for FmtSink<W> {
    type Error = fmt::Error;

    fn emit(&mut self, record: &Record) -> core::result::Result<(), Self::Error> {
        writeln!(self.writer, "{}", record)
    }
}

/// Monotonic millisecond time source for record timestamps.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    fn elapsed_ms(&self) -> u64;
}

/// Stop signal polled between conversions.
pub trait Cancellation {
    /// Returns `true` once the run should end.
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<F> Cancellation for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Read outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionStats {
    /// Reads that produced a sample.
    pub successes: u64,
    /// Frames rejected by the checksum.
    pub checksum_failures: u64,
    /// SPI transfers that failed.
    pub transport_failures: u64,
    /// Data-ready line errors.
    pub data_ready_failures: u64,
    /// Data-ready waits that timed out.
    pub timeouts: u64,
    /// Alternating cycles dropped because the reference window had no sample.
    pub skipped_cycles: u64,
}

impl AcquisitionStats {
    /// Counts one read outcome.
    pub fn record<E>(&mut self, outcome: &core::result::Result<Sample, ReadError<E>>) {
        match outcome {
            Ok(_) => self.successes += 1,
            Err(ReadError::Checksum { .. }) => self.checksum_failures += 1,
            Err(ReadError::Transport(_)) => self.transport_failures += 1,
            Err(ReadError::DataReady(_)) => self.data_ready_failures += 1,
            Err(ReadError::Timeout) => self.timeouts += 1,
        }
    }

    /// Reads that produced no sample.
    pub fn failures(&self) -> u64 {
        self.checksum_failures + self.transport_failures + self.data_ready_failures + self.timeouts
    }

    /// All read attempts.
    pub fn attempts(&self) -> u64 {
        self.successes + self.failures()
    }

    /// Failed attempts over all attempts, `0.0` before the first attempt.
    pub fn failure_rate(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            attempts => self.failures() as f64 / attempts as f64,
        }
    }
}

/// Failure that ends an acquisition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError<E, S> {
    /// A command or register write failed.
    Device(Error<E>),
    /// The record sink failed.
    Sink(S),
}

impl<E, S> From<Error<E>> for AcquisitionError<E, S> {
    fn from(err: Error<E>) -> Self {
        Self::Device(err)
    }
}

/// Two-channel schedule: a reference window followed by a measurement window.
///
/// Each valid measurement sample is emitted with
/// `derive(reference_average_volts, sample_volts)`.
pub struct AlternatingPlan<F> {
    /// Channel averaged at the start of each cycle.
    pub reference: ChannelSetting,
    /// Channel recorded after the reference window.
    pub measurement: ChannelSetting,
    /// Read attempts per reference window.
    pub reference_samples: u32,
    /// Read attempts per measurement window.
    pub measurement_samples: u32,
    /// Combines the reference average with one measurement.
    pub derive: F,
}

/// What an [`Acquisition`] reads.
pub enum Schedule<F> {
    /// The configured channel, continuously.
    Stream,
    /// Alternate between a reference and a measurement channel.
    Alternating(AlternatingPlan<F>),
}

/// Configurable acquisition loop.
pub struct Acquisition<F> {
    schedule: Schedule<F>,
    monitor: StatsMonitor,
}

/// Function type of a [`Schedule::Stream`] acquisition, which derives nothing.
pub type NoDerive = fn(f64, f64) -> f64;

impl Acquisition<NoDerive> {
    /// Continuous acquisition of the configured channel.
    pub fn stream() -> Self {
        Self::new(Schedule::Stream)
    }
}

impl<F> Acquisition<F>
where
    F: FnMut(f64, f64) -> f64,
{
    /// Creates an acquisition for `schedule`.
    pub fn new(schedule: Schedule<F>) -> Self {
        Self {
            schedule,
            monitor: StatsMonitor::new(DEFAULT_REPORT_INTERVAL_MS),
        }
    }

    /// Alternating acquisition following `plan`.
    pub fn alternating(plan: AlternatingPlan<F>) -> Self {
        Self::new(Schedule::Alternating(plan))
    }

    /// Overrides the statistics log period.
    pub fn with_report_interval(mut self, interval_ms: u64) -> Self {
        self.monitor.interval_ms = interval_ms;
        self
    }

    /// Counters accumulated so far, across runs.
    pub fn stats(&self) -> AcquisitionStats {
        self.monitor.stats
    }

    /// Runs until `cancel` fires, then stops conversions and flushes `sink`.
    ///
    /// A device or sink error also ends the run. Conversions are still
    /// stopped, and the error that ended the run is returned.
    ///
    /// Cancellation is polled before every read, so a run ends within one
    /// conversion period (or one data-ready timeout) of the request.
    pub fn run<IFACE, DRDY, CommE, S, C, K>(
        &mut self,
        adc: &mut Ads126x<IFACE, DRDY>,
        sink: &mut S,
        clock: &C,
        cancel: &K,
    ) -> core::result::Result<AcquisitionStats, AcquisitionError<CommE, S::Error>>
    where
        IFACE: Ads126xInterface<Error = CommE>,
        DRDY: DataReady,
        S: RecordSink,
        C: Clock + ?Sized,
        K: Cancellation + ?Sized,
    {
        self.monitor.begin(clock.elapsed_ms());

        let scheduled = match &mut self.schedule {
            Schedule::Stream => stream(&mut self.monitor, adc, sink, clock, cancel),
            Schedule::Alternating(plan) => {
                alternate(plan, &mut self.monitor, adc, sink, clock, cancel)
            }
        };

        // Conversions are stopped on every exit path; the schedule's error wins.
        let stopped = adc.stop();
        if let Err(err) = scheduled {
            if stopped.is_err() {
                warn!("stop after failed run also failed");
            }
            return Err(err);
        }
        stopped?;

        sink.flush().map_err(AcquisitionError::Sink)?;
        self.monitor.report();
        Ok(self.monitor.stats)
    }
}

fn stream<IFACE, DRDY, CommE, S, C, K>(
    monitor: &mut StatsMonitor,
    adc: &mut Ads126x<IFACE, DRDY>,
    sink: &mut S,
    clock: &C,
    cancel: &K,
) -> core::result::Result<(), AcquisitionError<CommE, S::Error>>
where
    IFACE: Ads126xInterface<Error = CommE>,
    DRDY: DataReady,
    S: RecordSink,
    C: Clock + ?Sized,
    K: Cancellation + ?Sized,
{
    adc.start()?;
    while !cancel.is_cancelled() {
        if let Some((timestamp_ms, sample)) = monitor.read(adc, clock) {
            let record = Record {
                timestamp_ms,
                value: sample.volts(),
                derived: None,
            };
            sink.emit(&record).map_err(AcquisitionError::Sink)?;
        }
    }
    Ok(())
}

fn alternate<F, IFACE, DRDY, CommE, S, C, K>(
    plan: &mut AlternatingPlan<F>,
    monitor: &mut StatsMonitor,
    adc: &mut Ads126x<IFACE, DRDY>,
    sink: &mut S,
    clock: &C,
    cancel: &K,
) -> core::result::Result<(), AcquisitionError<CommE, S::Error>>
where
    F: FnMut(f64, f64) -> f64,
    IFACE: Ads126xInterface<Error = CommE>,
    DRDY: DataReady,
    S: RecordSink,
    C: Clock + ?Sized,
    K: Cancellation + ?Sized,
{
    if plan.reference_samples == 0 || plan.measurement_samples == 0 {
        return Err(AcquisitionError::Device(Error::InvalidArgument));
    }

    while !cancel.is_cancelled() {
        adc.stop()?;
        adc.switch_channel(&plan.reference)?;
        adc.start()?;

        let mut sum = 0.0;
        let mut count = 0u32;
        for _ in 0..plan.reference_samples {
            if cancel.is_cancelled() {
                return Ok(());
            }
            if let Some((_, sample)) = monitor.read(adc, clock) {
                sum += sample.volts();
                count += 1;
            }
        }
        adc.stop()?;

        if count == 0 {
            debug!("no valid reference sample, cycle skipped");
            monitor.stats.skipped_cycles += 1;
            continue;
        }
        let reference = sum / f64::from(count);

        adc.switch_channel(&plan.measurement)?;
        adc.start()?;
        for _ in 0..plan.measurement_samples {
            if cancel.is_cancelled() {
                return Ok(());
            }
            if let Some((timestamp_ms, sample)) = monitor.read(adc, clock) {
                let value = sample.volts();
                let record = Record {
                    timestamp_ms,
                    value,
                    derived: Some((plan.derive)(reference, value)),
                };
                sink.emit(&record).map_err(AcquisitionError::Sink)?;
            }
        }
        adc.stop()?;
    }
    Ok(())
}

/// Statistics plus the periodic report timer.
struct StatsMonitor {
    stats: AcquisitionStats,
    interval_ms: u64,
    last_report_ms: u64,
}

impl StatsMonitor {
    fn new(interval_ms: u64) -> Self {
        Self {
            stats: AcquisitionStats::default(),
            interval_ms,
            last_report_ms: 0,
        }
    }

    fn begin(&mut self, now_ms: u64) {
        self.last_report_ms = now_ms;
    }

    fn read<IFACE, DRDY, CommE, C>(
        &mut self,
        adc: &mut Ads126x<IFACE, DRDY>,
        clock: &C,
    ) -> Option<(u64, Sample)>
    where
        IFACE: Ads126xInterface<Error = CommE>,
        DRDY: DataReady,
        C: Clock + ?Sized,
    {
        let outcome = adc.read_continuous();
        let now_ms = clock.elapsed_ms();
        self.stats.record(&outcome);
        self.tick(now_ms);
        outcome.ok().map(|sample| (now_ms, sample))
    }

    /// Logs the counters when a report is due. Returns `true` if it logged.
    fn tick(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_report_ms) < self.interval_ms {
            return false;
        }
        self.last_report_ms = now_ms;
        self.report();
        true
    }

    fn report(&self) {
        info!(
            "samples={} checksum={} transport={} drdy={} timeouts={} failure_rate={}",
            self.stats.successes,
            self.stats.checksum_failures,
            self.stats.transport_failures,
            self.stats.data_ready_failures,
            self.stats.timeouts,
            self.stats.failure_rate()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::tests::{frame_for, Loopback, ScriptedReady};
    use crate::interface::spi::SpiInterface;
    use crate::params::{DataRate, Gain, Input};
    use crate::registers::{OPCODE_START1, OPCODE_STOP1, REG_INPMUX, REG_MODE2};
    use core::cell::Cell;
    use std::string::String;

    struct StepClock {
        now: Cell<u64>,
    }

    impl StepClock {
        fn new() -> Self {
            Self { now: Cell::new(0) }
        }
    }

    impl Clock for StepClock {
        fn elapsed_ms(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + 10);
            now
        }
    }

    fn cancel_after(checks: u32) -> impl Fn() -> bool {
        let seen = Cell::new(0u32);
        move || {
            seen.set(seen.get() + 1);
            seen.get() > checks
        }
    }

    fn driver(spi: Loopback, drdy: ScriptedReady) -> Ads126x<SpiInterface<Loopback>, ScriptedReady> {
        Ads126x::new_spi(spi, drdy, Config::default())
    }

    fn corrupted(raw: i32) -> [u8; 6] {
        let mut frame = frame_for(raw);
        frame[5] ^= 0xFF;
        frame
    }

    fn thermocouple_plan(derive: fn(f64, f64) -> f64) -> AlternatingPlan<fn(f64, f64) -> f64> {
        AlternatingPlan {
            reference: ChannelSetting::temperature_sensor(DataRate::Sps20),
            measurement: ChannelSetting::differential(Input::Ain9, Input::AinCom, Gain::X32, DataRate::Sps20),
            reference_samples: 2,
            measurement_samples: 2,
            derive,
        }
    }

    #[test]
    fn record_formats_as_csv_line() {
        let plain = Record {
            timestamp_ms: 12,
            value: 0.5,
            derived: None,
        };
        assert_eq!(std::format!("{plain}"), "12,0.5");

        let derived = Record {
            derived: Some(25.25),
            ..plain
        };
        assert_eq!(std::format!("{derived}"), "12,0.5,25.25");
    }

    #[test]
    fn failure_rate_counts_over_all_attempts() {
        let mut stats = AcquisitionStats::default();
        assert_eq!(stats.failure_rate(), 0.0);

        for _ in 0..3 {
            stats.record::<()>(&Ok(Sample { status: 0, raw: 0 }));
        }
        stats.record::<()>(&Err(ReadError::Timeout));
        assert_eq!(stats.attempts(), 4);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.failure_rate(), 0.25);
    }

    #[test]
    fn stream_emits_only_valid_samples() {
        let mut spi = Loopback::new();
        spi.push_sample(1 << 30);
        spi.frames.push_back(corrupted(5));
        spi.push_sample(-(1 << 29));
        let mut adc = driver(spi, ScriptedReady::always());
        let mut sink = FmtSink::new(String::new());

        let mut acquisition = Acquisition::stream();
        let stats = acquisition
            .run(&mut adc, &mut sink, &StepClock::new(), &cancel_after(4))
            .unwrap();

        // The fourth read finds no frame queued and fails on the bus.
        assert_eq!(sink.into_inner(), "10,1.25\n30,-0.625\n");
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.checksum_failures, 1);
        assert_eq!(stats.transport_failures, 1);
        assert_eq!(stats.failure_rate(), 0.5);

        let (spi, _, _) = adc.release_spi();
        assert_eq!(spi.commands, [OPCODE_START1, OPCODE_STOP1]);
    }

    #[test]
    fn timeouts_are_counted_not_fatal() {
        let mut spi = Loopback::new();
        spi.push_sample(1 << 30);
        let drdy = ScriptedReady::with(&[Ok(false), Ok(false)]);
        let mut adc = driver(spi, drdy);
        let mut sink = FmtSink::new(String::new());

        let stats = Acquisition::stream()
            .run(&mut adc, &mut sink, &StepClock::new(), &cancel_after(3))
            .unwrap();

        assert_eq!(stats.timeouts, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(sink.into_inner(), "30,1.25\n");
    }

    #[test]
    fn alternating_cycle_averages_reference_then_measures() {
        let mut spi = Loopback::new();
        spi.push_sample(1 << 30);
        spi.push_sample(1 << 29);
        spi.push_sample(1 << 28);
        spi.frames.push_back(corrupted(1 << 28));
        let mut adc = driver(spi, ScriptedReady::always());
        let mut sink = FmtSink::new(String::new());

        let mut acquisition = Acquisition::alternating(thermocouple_plan(|reference, volts| {
            reference * 1000.0 + volts
        }));
        let stats = acquisition
            .run(&mut adc, &mut sink, &StepClock::new(), &cancel_after(5))
            .unwrap();

        assert_eq!(sink.into_inner(), "30,0.3125,937.8125\n");
        assert_eq!(stats.successes, 3);
        assert_eq!(stats.checksum_failures, 1);

        let (spi, _, _) = adc.release_spi();
        assert_eq!(
            spi.commands,
            [OPCODE_STOP1, OPCODE_START1, OPCODE_STOP1, OPCODE_START1, OPCODE_STOP1, OPCODE_STOP1]
        );
        assert_eq!(spi.writes, 2);
        assert_eq!(spi.registers[usize::from(REG_MODE2)], 0x54);
        assert_eq!(spi.registers[usize::from(REG_INPMUX)], 0x9A);
    }

    #[test]
    fn cycle_without_reference_sample_is_skipped() {
        let drdy = ScriptedReady::with(&[Ok(false), Ok(false)]);
        let mut adc = driver(Loopback::new(), drdy);
        let mut sink = FmtSink::new(String::new());

        let mut acquisition = Acquisition::alternating(thermocouple_plan(|_, volts| volts));
        let stats = acquisition
            .run(&mut adc, &mut sink, &StepClock::new(), &cancel_after(3))
            .unwrap();

        assert_eq!(stats.skipped_cycles, 1);
        assert_eq!(stats.timeouts, 2);
        assert!(sink.into_inner().is_empty());

        let (spi, _, _) = adc.release_spi();
        assert_eq!(spi.writes, 1);
        assert_eq!(spi.commands, [OPCODE_STOP1, OPCODE_START1, OPCODE_STOP1, OPCODE_STOP1]);
    }

    #[test]
    fn empty_windows_are_rejected() {
        let mut adc = driver(Loopback::new(), ScriptedReady::always());
        let mut sink = FmtSink::new(String::new());
        let mut plan = thermocouple_plan(|_, volts| volts);
        plan.measurement_samples = 0;

        let result = Acquisition::alternating(plan).run(
            &mut adc,
            &mut sink,
            &StepClock::new(),
            &cancel_after(10),
        );
        assert_eq!(result, Err(AcquisitionError::Device(Error::InvalidArgument)));
    }

    #[test]
    fn sink_failure_ends_the_run() {
        struct Broken;

        impl RecordSink for Broken {
            type Error = ();

            fn emit(&mut self, _record: &Record) -> core::result::Result<(), ()> {
                Err(())
            }
        }

        let mut spi = Loopback::new();
        spi.push_sample(1);
        let mut adc = driver(spi, ScriptedReady::always());

        let result = Acquisition::stream().run(&mut adc, &mut Broken, &StepClock::new(), &|| false);
        assert_eq!(result, Err(AcquisitionError::Sink(())));

        let (spi, _, _) = adc.release_spi();
        assert_eq!(spi.commands, [OPCODE_START1, OPCODE_STOP1]);
    }

    #[test]
    fn atomic_flag_cancels_before_first_read() {
        let cancel = AtomicBool::new(true);
        let mut adc = driver(Loopback::new(), ScriptedReady::always());
        let mut sink = FmtSink::new(String::new());

        let stats = Acquisition::stream()
            .run(&mut adc, &mut sink, &StepClock::new(), &cancel)
            .unwrap();
        assert_eq!(stats.attempts(), 0);
        assert_eq!(adc.data_ready_mut().waits, 0);
    }

    #[test]
    fn statistics_report_on_interval() {
        let mut monitor = StatsMonitor::new(DEFAULT_REPORT_INTERVAL_MS);
        monitor.begin(1_000);

        assert!(!monitor.tick(5_999));
        assert!(monitor.tick(6_000));
        assert!(!monitor.tick(10_999));
        assert!(monitor.tick(11_000));
    }
}
