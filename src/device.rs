//! High-level ADS126x device driver implementation.

use crate::config::{ChannelSetting, Config};
use crate::error::{Error, ReadError, Result};
use crate::frame::{self, Sample, FRAME_LEN};
use crate::interface::control::ControlPins;
use crate::interface::spi::SpiInterface;
use crate::interface::{Ads126xInterface, DataReady};
use crate::params::{ReferenceNegative, ReferencePositive};
use crate::registers::{
    is_contiguous, Command, DeviceId, RefMux, Register, RegisterOption, MAX_REGISTER_ADDRESS,
    REG_ID,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::spi::SpiDevice;

// Size of the addressable register file (5-bit address field).
const REGISTER_FILE_LEN: usize = MAX_REGISTER_ADDRESS as usize + 1;

/// High-level synchronous driver for the ADS1262/ADS1263 converters.
///
/// `IFACE` is the bus (usually [`SpiInterface`]) and `DRDY` the data-ready
/// wait used by [`Ads126x::read_continuous`].
pub struct Ads126x<IFACE, DRDY> {
    interface: IFACE,
    drdy: DRDY,
    config: Config,
}

impl<IFACE, DRDY> Ads126x<IFACE, DRDY> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface and data-ready line.
    pub fn new(interface: IFACE, drdy: DRDY, config: Config) -> Self {
        Self {
            interface,
            drdy,
            config,
        }
    }

    /// Consumes the driver and returns its parts.
    pub fn release(self) -> (IFACE, DRDY, Config) {
        (self.interface, self.drdy, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Provides mutable access to the data-ready wait.
    pub fn data_ready_mut(&mut self) -> &mut DRDY {
        &mut self.drdy
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<SPI, DRDY> Ads126x<SpiInterface<SPI>, DRDY>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, drdy: DRDY, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), drdy, config)
    }

    /// Releases the driver, returning the SPI device, data-ready wait and configuration.
    pub fn release_spi(self) -> (SPI, DRDY, Config) {
        let (iface, drdy, config) = self.release();
        (iface.release(), drdy, config)
    }
}

impl<IFACE, DRDY, CommE> Ads126x<IFACE, DRDY>
where
    IFACE: Ads126xInterface<Error = CommE>,
{
    // ==================================================================
    // == Initialization & Global Configuration ==========================
    // ==================================================================
    /// Programs the current configuration and verifies it by read-back.
    ///
    /// Conversions are stopped first and left stopped; call
    /// [`Ads126x::start`] afterwards.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.configure(self.config)
    }

    /// Power-cycles the converter through its control pins, then runs [`Ads126x::init`].
    pub fn power_up<PWDN, START>(
        &mut self,
        pins: &mut ControlPins<PWDN, START>,
        delay: &mut impl DelayNs,
    ) -> Result<(), CommE>
    where
        PWDN: OutputPin,
        START: OutputPin,
    {
        pins.power_cycle(delay).map_err(Error::Pin)?;
        self.init()
    }

    /// Validates and applies a new configuration.
    ///
    /// `POWER` through `INPMUX` go out as one `WREG` frame and are read back
    /// before the configuration is adopted.
    pub fn configure(&mut self, config: Config) -> Result<(), CommE> {
        config.validate().map_err(|_| Error::InvalidConfig)?;

        self.stop()?;
        let registers = config.registers();
        self.write_register_block(&registers)?;
        self.verify_register_block(&registers)?;

        info!("ADS126x configured");
        self.config = config;
        Ok(())
    }

    /// Switches the measurement channel with one two-byte write of `MODE2` and `INPMUX`.
    ///
    /// The configured filter must support the new data rate.
    pub fn switch_channel(&mut self, channel: &ChannelSetting) -> Result<(), CommE> {
        if !self.config.filter.supports(channel.data_rate) {
            return Err(Error::InvalidConfig);
        }

        self.write_register_block(&channel.registers())?;
        self.config.channel = *channel;
        Ok(())
    }

    /// Selects the reference inputs (`REFMUX`).
    pub fn configure_reference(
        &mut self,
        positive: ReferencePositive,
        negative: ReferenceNegative,
    ) -> Result<(), CommE> {
        let refmux = Register::of::<RefMux>().with_options(&[positive.option(), negative.option()]);
        self.write_register_block(&[refmux])
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Writes `values` to consecutive registers starting at `start`.
    pub fn write_registers(&mut self, start: u8, values: &[u8]) -> Result<(), CommE> {
        Self::check_range(start, values.len())?;
        debug!("WREG start={} count={}", start, values.len());
        self.interface.write_registers(start, values).map_err(Error::from)
    }

    /// Reads `buf.len()` consecutive registers starting at `start`.
    pub fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), CommE> {
        Self::check_range(start, buf.len())?;
        self.interface.read_registers(start, buf).map_err(Error::from)
    }

    /// Writes composed registers in one frame.
    ///
    /// The registers must be in ascending address order with no gaps.
    pub fn write_register_block(&mut self, registers: &[Register]) -> Result<(), CommE> {
        let (start, values, len) = Self::block_bytes(registers)?;
        self.write_registers(start, &values[..len])
    }

    /// Reads back `expected.len()` registers from `start` and compares them.
    pub fn verify_registers(&mut self, start: u8, expected: &[u8]) -> Result<(), CommE> {
        Self::check_range(start, expected.len())?;

        let mut actual = [0u8; REGISTER_FILE_LEN];
        let actual = &mut actual[..expected.len()];
        self.read_registers(start, actual)?;

        for (offset, (&want, &got)) in expected.iter().zip(actual.iter()).enumerate() {
            if want != got {
                let address = start + offset as u8;
                warn!("register {=u8:#x} wrote {=u8:#x} read {=u8:#x}", address, want, got);
                return Err(Error::RegisterMismatch {
                    address,
                    expected: want,
                    actual: got,
                });
            }
        }

        Ok(())
    }

    /// Verifies a block previously written with [`Ads126x::write_register_block`].
    pub fn verify_register_block(&mut self, registers: &[Register]) -> Result<(), CommE> {
        let (start, values, len) = Self::block_bytes(registers)?;
        self.verify_registers(start, &values[..len])
    }

    /// Reads the `ID` register.
    ///
    /// A reserved device code, as read from a floating `DOUT` line, is
    /// reported as [`Error::UnknownDevice`].
    pub fn device_id(&mut self) -> Result<DeviceId, CommE> {
        let mut raw = [0u8; 1];
        self.read_registers(REG_ID, &mut raw)?;
        let id = DeviceId::from(raw[0]);
        if id.variant_or_err().is_err() {
            warn!("unknown device id {=u8:#x}", raw[0]);
            return Err(Error::UnknownDevice(raw[0]));
        }
        Ok(id)
    }

    // ==================================================================
    // == Commands ======================================================
    // ==================================================================
    /// Sends a single-byte command.
    pub fn send(&mut self, command: Command) -> Result<(), CommE> {
        self.interface
            .command(command.opcode())
            .map_err(Error::from)
    }

    /// Starts ADC1 conversions (`START1`).
    pub fn start(&mut self) -> Result<(), CommE> {
        self.send(Command::Start1)
    }

    /// Stops ADC1 conversions (`STOP1`).
    pub fn stop(&mut self) -> Result<(), CommE> {
        self.send(Command::Stop1)
    }

    /// Resets the device to its power-on register values.
    pub fn reset(&mut self) -> Result<(), CommE> {
        self.send(Command::Reset)
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Reads one conversion with the `RDATA1` command, without waiting on `DRDY`.
    pub fn read_by_command(&mut self) -> core::result::Result<Sample, ReadError<CommE>> {
        let mut frame = [0u8; FRAME_LEN];
        self.interface
            .command_read_frame(Command::ReadData1.opcode(), &mut frame)
            .map_err(ReadError::Transport)?;
        Self::decode_frame(&frame)
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn check_range(start: u8, count: usize) -> Result<(), CommE> {
        if count == 0 || start > MAX_REGISTER_ADDRESS {
            return Err(Error::InvalidArgument);
        }

        let last = usize::from(start) + count - 1;
        if last > usize::from(MAX_REGISTER_ADDRESS) {
            return Err(Error::InvalidArgument);
        }

        Ok(())
    }

    fn block_bytes(registers: &[Register]) -> Result<(u8, [u8; REGISTER_FILE_LEN], usize), CommE> {
        let first = registers.first().ok_or(Error::InvalidArgument)?;
        if !is_contiguous(registers) {
            return Err(Error::InvalidArgument);
        }
        Self::check_range(first.address(), registers.len())?;

        let mut values = [0u8; REGISTER_FILE_LEN];
        for (slot, register) in values.iter_mut().zip(registers) {
            *slot = register.value();
        }

        Ok((first.address(), values, registers.len()))
    }

    fn decode_frame(frame: &[u8; FRAME_LEN]) -> core::result::Result<Sample, ReadError<CommE>> {
        frame::decode(frame).map_err(|mismatch| {
            debug!(
                "checksum mismatch: expected {=u8:#x} received {=u8:#x}",
                mismatch.expected, mismatch.received
            );
            ReadError::Checksum {
                expected: mismatch.expected,
                received: mismatch.received,
            }
        })
    }
}

impl<IFACE, DRDY, CommE> Ads126x<IFACE, DRDY>
where
    IFACE: Ads126xInterface<Error = CommE>,
    DRDY: DataReady,
{
    /// Waits for the next data-ready edge and reads one checksummed conversion.
    ///
    /// Every error is recoverable: the conversion is dropped and the next
    /// call reads the following one.
    pub fn read_continuous(&mut self) -> core::result::Result<Sample, ReadError<CommE>> {
        let ready = self
            .drdy
            .wait_for_falling_edge(self.config.data_ready_timeout_ms)
            .map_err(|err| ReadError::DataReady(err.kind()))?;
        if !ready {
            debug!("data-ready timeout");
            return Err(ReadError::Timeout);
        }

        let mut frame = [0u8; FRAME_LEN];
        self.interface
            .read_frame(&mut frame)
            .map_err(ReadError::Transport)?;
        Self::decode_frame(&frame)
    }
}
