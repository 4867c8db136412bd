//! Stack, jumps, calls and indexed addressing.

use zx_core::IoBus;

use super::Z80;
use crate::error::Error;
use crate::flags::{CF, PF, SF, ZF};

/// Decode a displacement byte as a signed offset.
#[must_use]
pub const fn displacement(byte: u8) -> i8 {
    byte as i8
}

/// Address `base + d` with 16-bit wraparound.
#[must_use]
pub const fn effective(base: u16, d: i8) -> u16 {
    base.wrapping_add_signed(d as i16)
}

impl Z80 {
    /// Evaluate condition code `cc`: NZ, Z, NC, C, PO, PE, P, M.
    pub fn condition(&self, cc: u8) -> Result<bool, Error> {
        let f = self.regs.f;
        let taken = match cc {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            7 => f & SF != 0,
            _ => return Err(Error::InvalidCondition(cc)),
        };
        Ok(taken)
    }

    /// Push a word: high byte to SP-1, low byte to SP-2.
    pub fn push<B: IoBus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    pub fn pop<B: IoBus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    pub fn jump(&mut self, addr: u16) {
        self.regs.pc = addr;
    }

    pub fn jump_if(&mut self, cc: u8, addr: u16) -> Result<bool, Error> {
        let taken = self.condition(cc)?;
        if taken {
            self.jump(addr);
        }
        Ok(taken)
    }

    /// Relative jump from the current PC (already past the operand).
    pub fn jump_relative(&mut self, d: i8) {
        self.regs.pc = effective(self.regs.pc, d);
    }

    pub fn jump_relative_if(&mut self, cc: u8, d: i8) -> Result<bool, Error> {
        let taken = self.condition(cc)?;
        if taken {
            self.jump_relative(d);
        }
        Ok(taken)
    }

    /// DJNZ: decrement B, jump while it is not zero. No flags change.
    pub fn djnz(&mut self, d: i8) -> bool {
        self.regs.b = self.regs.b.wrapping_sub(1);
        let taken = self.regs.b != 0;
        if taken {
            self.jump_relative(d);
        }
        taken
    }

    /// Push the current PC (the return address) and jump.
    pub fn call<B: IoBus>(&mut self, bus: &mut B, addr: u16) {
        self.push(bus, self.regs.pc);
        self.regs.pc = addr;
    }

    pub fn call_if<B: IoBus>(&mut self, bus: &mut B, cc: u8, addr: u16) -> Result<bool, Error> {
        let taken = self.condition(cc)?;
        if taken {
            self.call(bus, addr);
        }
        Ok(taken)
    }

    pub fn ret<B: IoBus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop(bus);
    }

    pub fn ret_if<B: IoBus>(&mut self, bus: &mut B, cc: u8) -> Result<bool, Error> {
        let taken = self.condition(cc)?;
        if taken {
            self.ret(bus);
        }
        Ok(taken)
    }

    /// Restart: call one of the eight page-zero vectors (0x00, 0x08 .. 0x38).
    pub fn rst<B: IoBus>(&mut self, bus: &mut B, vector: u8) {
        self.call(bus, u16::from(vector & 0x38));
    }
}
