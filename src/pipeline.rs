//! Threaded acquisition for hosted targets (`std` feature).
//!
//! The reader thread owns the converter for the duration of the run and
//! pushes records into a bounded channel; the calling thread drains the
//! channel into the sink. A full channel blocks the reader, so records are
//! never dropped.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};
use std::io;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;
use std::time::Instant;

use crate::acquisition::{Acquisition, AcquisitionError, AcquisitionStats, Clock, Record, RecordSink};
use crate::device::Ads126x;
use crate::interface::{Ads126xInterface, DataReady};

/// [`Clock`] measuring from its construction.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    /// Starts the clock now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// [`RecordSink`] writing newline-terminated lines to a [`std::io::Write`].
pub struct IoSink<W> {
    writer: W,
}

impl<W: io::Write> IoSink<W> {
    /// Wraps `writer`. Wrap files in a [`std::io::BufWriter`].
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> RecordSink for IoSink<W> {
    type Error = io::Error;

    fn emit(&mut self, record: &Record) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// Reader half. A closed channel turns into cancellation instead of an error.
struct ChannelSink<'a> {
    sender: SyncSender<Record>,
    closed: &'a AtomicBool,
}

impl RecordSink for ChannelSink<'_> {
    type Error = Infallible;

    fn emit(&mut self, record: &Record) -> Result<(), Infallible> {
        if self.sender.send(*record).is_err() {
            self.closed.store(true, Ordering::Release);
        }
        Ok(())
    }
}

fn drain<S: RecordSink>(receiver: Receiver<Record>, sink: &mut S) -> Result<(), S::Error> {
    for record in receiver {
        sink.emit(&record)?;
    }
    sink.flush()
}

/// Runs `acquisition` on a reader thread and writes its records to `sink`.
///
/// `capacity` bounds the records in flight between the threads. On
/// cancellation the reader stops conversions and closes the channel; the
/// writer drains what is left and flushes. A sink error stops the reader
/// and is returned in preference to any reader error.
pub fn run_threaded<F, IFACE, DRDY, CommE, C, S>(
    acquisition: &mut Acquisition<F>,
    adc: &mut Ads126x<IFACE, DRDY>,
    sink: &mut S,
    clock: &C,
    cancel: &AtomicBool,
    capacity: usize,
) -> Result<AcquisitionStats, AcquisitionError<CommE, S::Error>>
where
    F: FnMut(f64, f64) -> f64 + Send,
    IFACE: Ads126xInterface<Error = CommE> + Send,
    DRDY: DataReady + Send,
    CommE: Send,
    C: Clock + Sync + ?Sized,
    S: RecordSink,
{
    let closed = AtomicBool::new(false);
    let (sender, receiver) = sync_channel(capacity);

    thread::scope(|scope| {
        let closed = &closed;
        let reader = scope.spawn(move || {
            let mut channel = ChannelSink { sender, closed };
            let stop = || cancel.load(Ordering::Acquire) || closed.load(Ordering::Acquire);
            acquisition.run(adc, &mut channel, clock, &stop)
        });

        let written = drain(receiver, sink);
        if written.is_err() {
            closed.store(true, Ordering::Release);
        }

        let read = reader
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

        written.map_err(AcquisitionError::Sink)?;
        read.map_err(|err| match err {
            AcquisitionError::Device(err) => AcquisitionError::Device(err),
            AcquisitionError::Sink(never) => match never {},
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::tests::{Loopback, ScriptedReady};
    use crate::registers::{OPCODE_START1, OPCODE_STOP1};

    struct ZeroClock;

    impl Clock for ZeroClock {
        fn elapsed_ms(&self) -> u64 {
            0
        }
    }

    struct CancellingSink<'a> {
        lines: Vec<Record>,
        cancel: &'a AtomicBool,
        after: usize,
    }

    impl RecordSink for CancellingSink<'_> {
        type Error = io::Error;

        fn emit(&mut self, record: &Record) -> io::Result<()> {
            self.lines.push(*record);
            if self.lines.len() >= self.after {
                self.cancel.store(true, Ordering::Release);
            }
            Ok(())
        }
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn loaded_driver(samples: i32) -> Ads126x<crate::interface::spi::SpiInterface<Loopback>, ScriptedReady> {
        let mut spi = Loopback::new();
        for raw in 1..=samples {
            spi.push_sample(raw << 20);
        }
        Ads126x::new_spi(spi, ScriptedReady::always(), Config::default())
    }

    #[test]
    fn io_sink_writes_lines() {
        let mut sink = IoSink::new(Vec::new());
        sink.emit(&Record {
            timestamp_ms: 5,
            value: -1.5,
            derived: Some(20.0),
        })
        .unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"5,-1.5,20\n");
    }

    #[test]
    fn instant_clock_is_monotonic() {
        let clock = InstantClock::new();
        let first = clock.elapsed_ms();
        assert!(clock.elapsed_ms() >= first);
    }

    #[test]
    fn records_cross_threads_in_order() {
        let cancel = AtomicBool::new(false);
        let mut adc = loaded_driver(8);
        let mut sink = CancellingSink {
            lines: Vec::new(),
            cancel: &cancel,
            after: 8,
        };
        let mut acquisition = Acquisition::stream();

        let stats = run_threaded(&mut acquisition, &mut adc, &mut sink, &ZeroClock, &cancel, 2)
            .unwrap();

        // Reads past the queued frames fail on the bus until the writer cancels.
        assert_eq!(stats.successes, 8);
        let raws: Vec<f64> = sink.lines.iter().map(|record| record.value).collect();
        let expected: Vec<f64> = (1..=8).map(|raw| crate::frame::convert(raw << 20)).collect();
        assert_eq!(raws, expected);

        let (spi, _, _) = adc.release_spi();
        assert_eq!(spi.commands.first(), Some(&OPCODE_START1));
        assert_eq!(spi.commands.last(), Some(&OPCODE_STOP1));
    }

    #[test]
    fn writer_error_stops_reader_and_is_returned() {
        let cancel = AtomicBool::new(false);
        let mut adc = loaded_driver(4);
        let mut sink = IoSink::new(FailingWriter);
        let mut acquisition = Acquisition::stream();

        let result = run_threaded(&mut acquisition, &mut adc, &mut sink, &ZeroClock, &cancel, 1);
        match result {
            Err(AcquisitionError::Sink(err)) => assert_eq!(err.to_string(), "disk full"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!cancel.load(Ordering::Acquire));
    }

    #[test]
    fn pre_cancelled_run_reads_nothing() {
        let cancel = AtomicBool::new(true);
        let mut adc = loaded_driver(1);
        let mut sink = IoSink::new(Vec::new());

        let stats = run_threaded(
            &mut Acquisition::stream(),
            &mut adc,
            &mut sink,
            &InstantClock::new(),
            &cancel,
            4,
        )
        .unwrap();
        assert_eq!(stats.attempts(), 0);
        assert!(sink.into_inner().is_empty());
    }
}
