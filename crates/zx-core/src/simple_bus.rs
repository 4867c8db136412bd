//! Flat 64 KiB RAM bus with an I/O port latch.

use std::collections::HashMap;

use crate::{Bus, IoBus};

/// Flat 64 KiB RAM with no ROM, paging or contention.
///
/// Port reads return whatever was preloaded with [`SimpleBus::set_port`], or
/// 0xFF for an unmapped port. Port writes are recorded in order so tests can
/// check what the CPU sent out.
pub struct SimpleBus {
    ram: Box<[u8]>,
    ports: HashMap<u16, u8>,
    writes: Vec<(u16, u8)>,
    data_bus: u8,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x10000].into_boxed_slice(),
            ports: HashMap::new(),
            writes: Vec::new(),
            data_bus: 0xFF,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Preload the value an IN from `port` will return.
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports.insert(port, value);
    }

    /// Every OUT the CPU performed, oldest first.
    #[must_use]
    pub fn port_writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    /// Set the byte supplied during an IM 2 acknowledge.
    pub fn set_data_bus(&mut self, value: u8) {
        self.data_bus = value;
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }
}

impl IoBus for SimpleBus {
    fn read_io(&mut self, port: u16) -> u8 {
        self.ports.get(&port).copied().unwrap_or(0xFF)
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
    }

    fn data_bus_value(&mut self) -> u8 {
        self.data_bus
    }
}
