//! Errors raised while decoding or executing an instruction.

use std::fmt;

use thiserror::Error;

/// Opcode table an undefined opcode was found in.
///
/// The base, CB and indexed tables define every byte, so only ED can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Ed,
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Ed => f.write_str("ED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The opcode has no defined behaviour. No register was changed.
    #[error("undefined opcode {opcode:#04X} in {prefix} table at {pc:#06X}")]
    Decode { prefix: Prefix, opcode: u8, pc: u16 },
    #[error("invalid condition code {0}")]
    InvalidCondition(u8),
    #[error("invalid interrupt mode {0}")]
    InvalidInterruptMode(u8),
}
