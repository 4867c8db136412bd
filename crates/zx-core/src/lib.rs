//! Core traits for the ZX Spectrum Z80 core.
//!
//! The CPU never owns memory or peripherals. The surrounding emulator hands
//! it a bus on every call, and everything the CPU needs from the machine
//! goes through the traits defined here.

mod bus;
mod cpu;
mod io_bus;
mod observable;
mod simple_bus;

pub use bus::Bus;
pub use cpu::{Cpu, StepResult};
pub use io_bus::IoBus;
pub use observable::{Observable, Value};
pub use simple_bus::SimpleBus;
