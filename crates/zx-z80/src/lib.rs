//! Zilog Z80 interpreter for ZX Spectrum emulation.
//!
//! [`Z80::step`] executes one instruction per call against a caller-owned
//! bus implementing [`zx_core::IoBus`]. Documented behaviour and the common
//! undocumented quirks (flag bits 3 and 5, IXH/IXL/IYH/IYL, SLL, the DD CB
//! register copies) are implemented.

mod alu;
mod config;
mod cpu;
mod error;
mod flags;
mod mnemonic;
mod registers;

pub use alu::AluResult;
pub use config::{Config, PowerOn};
pub use cpu::{Z80, displacement, effective};
pub use error::{Error, Prefix};
pub use flags::{Flag, FlagUpdate, Flags};
pub use mnemonic::mnemonic;
pub use registers::{Reg8, Reg16, Registers};

/// Flag bit masks and the pure ALU primitives, for callers that want to
/// compute results without a CPU.
pub mod ops {
    pub use crate::alu::*;
    pub use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, apply, parity, sz53, sz53p};
}
