//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Operation, SpiDevice};

use super::Ads126xInterface;
use crate::frame::FRAME_LEN;
use crate::registers::{MAX_REGISTER_ADDRESS, OPCODE_RREG, OPCODE_WREG};

/// SPI-based interface implementation for the ADS126x driver.
///
/// The device expects SPI mode 1 (CPOL = 0, CPHA = 1).
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Builds the two opcode bytes that open an `RREG`/`WREG` frame.
    ///
    /// `count` must be 1..=32; the driver range-checks before calling.
    fn register_header(opcode: u8, register: u8, count: usize) -> [u8; 2] {
        debug_assert!(
            (1..=usize::from(MAX_REGISTER_ADDRESS) + 1).contains(&count),
            "register count out of range"
        );
        [opcode | (register & 0x1F), count.saturating_sub(1) as u8]
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Ads126xInterface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_registers(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        let header = Self::register_header(OPCODE_WREG, register, data.len());
        let mut operations = [Operation::Write(&header), Operation::Write(data)];
        self.spi.transaction(&mut operations)
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        let header = Self::register_header(OPCODE_RREG, register, buf.len());
        buf.fill(0);
        let mut operations = [Operation::Write(&header), Operation::TransferInPlace(buf)];
        self.spi.transaction(&mut operations)
    }

    fn command(&mut self, opcode: u8) -> core::result::Result<(), Self::Error> {
        self.spi.write(&[opcode])
    }

    fn read_frame(&mut self, frame: &mut [u8; FRAME_LEN]) -> core::result::Result<(), Self::Error> {
        frame.fill(0);
        self.spi.transfer_in_place(frame)
    }

    fn command_read_frame(
        &mut self,
        opcode: u8,
        frame: &mut [u8; FRAME_LEN],
    ) -> core::result::Result<(), Self::Error> {
        let command = [opcode];
        frame.fill(0);
        let mut operations = [Operation::Write(&command), Operation::TransferInPlace(frame)];
        self.spi.transaction(&mut operations)
    }
}

#[cfg(test)]
mod tests {
    use super::SpiInterface;
    use crate::interface::Ads126xInterface;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn write_registers_sends_wreg_header_then_payload() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x41, 0x04]),
            SpiTransaction::write_vec(vec![0x02, 0x05, 0x00, 0x80, 0x04]),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        interface
            .write_registers(0x01, &[0x02, 0x05, 0x00, 0x80, 0x04])
            .unwrap();
        spi.done();
    }

    #[test]
    fn read_registers_clocks_zeros_and_fills_buffer() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x25, 0x01]),
            SpiTransaction::transfer_in_place(vec![0x00, 0x00], vec![0x54, 0x9A]),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        let mut buffer = [0xFFu8; 2];
        interface.read_registers(0x05, &mut buffer).unwrap();
        assert_eq!(buffer, [0x54, 0x9A]);
        spi.done();
    }

    #[test]
    fn command_is_a_single_byte_write() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x08]),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        interface.command(0x08).unwrap();
        spi.done();
    }

    #[test]
    fn read_frame_transfers_six_zero_bytes() {
        let response = vec![0x40, 0x12, 0x34, 0x56, 0x78, 0xAF];
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![0; 6], response.clone()),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        let mut frame = [0xAAu8; 6];
        interface.read_frame(&mut frame).unwrap();
        assert_eq!(frame.to_vec(), response);
        spi.done();
    }

    #[test]
    fn command_read_frame_keeps_chip_select_across_opcode_and_data() {
        let response = vec![0x40, 0x00, 0x00, 0x00, 0x01, 0x9C];
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x12]),
            SpiTransaction::transfer_in_place(vec![0; 6], response.clone()),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        let mut frame = [0u8; 6];
        interface.command_read_frame(0x12, &mut frame).unwrap();
        assert_eq!(frame.to_vec(), response);
        spi.done();
    }

    #[test]
    fn empty_transfers_issue_no_transaction() {
        let expectations: [SpiTransaction<u8>; 0] = [];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SpiInterface::new(spi.clone());

        interface.write_registers(0x01, &[]).unwrap();
        interface.read_registers(0x01, &mut []).unwrap();
        spi.done();
    }

    #[test]
    fn header_encodes_count_minus_one() {
        assert_eq!(SpiInterface::<SpiMock<u8>>::register_header(0x40, 0x01, 6), [0x41, 0x05]);
        assert_eq!(SpiInterface::<SpiMock<u8>>::register_header(0x20, 0x00, 32), [0x20, 0x1F]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "register count out of range")]
    fn oversized_count_is_caught_in_debug_builds() {
        SpiInterface::<SpiMock<u8>>::register_header(0x40, 0x00, 257);
    }
}
