//! Memory bus interface.

/// A bus that supports memory read/write operations.
///
/// The Z80 sees a flat 64 KiB logical address space. ROM write protection,
/// 128K bank paging and contention all live behind this trait; the CPU only
/// issues plain address/value pairs.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}
