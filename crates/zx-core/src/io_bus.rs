use crate::Bus;

/// A bus that also supports separate I/O port operations.
///
/// The Z80 has a separate 16-bit I/O address space accessed via IN and OUT
/// instructions. The full 16-bit port number is always passed through: the
/// Spectrum decodes the keyboard half-rows from the high byte.
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn write_io(&mut self, port: u16, value: u8);

    /// Value on the data bus during an interrupt acknowledge cycle.
    ///
    /// Used by interrupt mode 2 as the low byte of the vector table address.
    /// A stock Spectrum leaves the bus floating, so the default is 0xFF.
    fn data_bus_value(&mut self) -> u8 {
        0xFF
    }
}
