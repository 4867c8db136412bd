//! Block transfer, compare and I/O instructions.
//!
//! Each call moves a single element. The repeating forms rewind PC onto
//! their own ED prefix while there is more to do, so the next step runs
//! them again.

use zx_core::IoBus;

use super::Z80;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53};

/// Direction HL (and DE) move after each element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    /// Decode from bit 3 of the ED opcode (A0 increments, A8 decrements).
    pub(super) const fn from_opcode(op: u8) -> Self {
        if op & 0x08 == 0 {
            Direction::Increment
        } else {
            Direction::Decrement
        }
    }

    const fn apply(self, value: u16) -> u16 {
        match self {
            Direction::Increment => value.wrapping_add(1),
            Direction::Decrement => value.wrapping_sub(1),
        }
    }

    const fn apply8(self, value: u8) -> u8 {
        match self {
            Direction::Increment => value.wrapping_add(1),
            Direction::Decrement => value.wrapping_sub(1),
        }
    }
}

impl Z80 {
    fn repeat_if(&mut self, again: bool) {
        if again {
            self.regs.pc = self.regs.pc.wrapping_sub(2);
        }
    }

    /// LDI, LDD, LDIR, LDDR
    pub(super) fn block_load<B: IoBus>(&mut self, bus: &mut B, dir: Direction, repeat: bool) {
        let value = bus.read(self.regs.hl());
        bus.write(self.regs.de(), value);

        self.regs.set_hl(dir.apply(self.regs.hl()));
        self.regs.set_de(dir.apply(self.regs.de()));
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let n = value.wrapping_add(self.regs.a);
        let mut f = (self.regs.f & (SF | ZF | CF)) | (n & XF);
        if n & 0x02 != 0 {
            f |= YF;
        }
        if bc != 0 {
            f |= PF;
        }
        self.regs.f = f;

        self.repeat_if(repeat && bc != 0);
    }

    /// CPI, CPD, CPIR, CPDR
    pub(super) fn block_compare<B: IoBus>(&mut self, bus: &mut B, dir: Direction, repeat: bool) {
        let value = bus.read(self.regs.hl());
        let a = self.regs.a;
        let result = a.wrapping_sub(value);
        let half = (a & 0x0F) < (value & 0x0F);

        self.regs.set_hl(dir.apply(self.regs.hl()));
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let n = result.wrapping_sub(u8::from(half));
        let mut f = (self.regs.f & CF) | NF | (result & SF) | (n & XF);
        if result == 0 {
            f |= ZF;
        }
        if half {
            f |= HF;
        }
        if bc != 0 {
            f |= PF;
        }
        if n & 0x02 != 0 {
            f |= YF;
        }
        self.regs.f = f;

        self.repeat_if(repeat && bc != 0 && result != 0);
    }

    /// INI, IND, INIR, INDR
    pub(super) fn block_in<B: IoBus>(&mut self, bus: &mut B, dir: Direction, repeat: bool) {
        let value = bus.read_io(self.regs.bc());
        bus.write(self.regs.hl(), value);

        let k = u16::from(value) + u16::from(dir.apply8(self.regs.c));
        self.regs.b = self.regs.b.wrapping_sub(1);
        self.regs.set_hl(dir.apply(self.regs.hl()));

        self.regs.f = self.block_io_flags(value, k);
        self.repeat_if(repeat && self.regs.b != 0);
    }

    /// OUTI, OUTD, OTIR, OTDR
    ///
    /// B is decremented before the port is driven, so the high byte of the
    /// port address is the new B.
    pub(super) fn block_out<B: IoBus>(&mut self, bus: &mut B, dir: Direction, repeat: bool) {
        let value = bus.read(self.regs.hl());
        self.regs.b = self.regs.b.wrapping_sub(1);
        bus.write_io(self.regs.bc(), value);
        self.regs.set_hl(dir.apply(self.regs.hl()));

        let k = u16::from(value) + u16::from(self.regs.l);
        self.regs.f = self.block_io_flags(value, k);
        self.repeat_if(repeat && self.regs.b != 0);
    }

    /// Shared flag rule for the block I/O family, after B has been decremented.
    fn block_io_flags(&self, value: u8, k: u16) -> u8 {
        let b = self.regs.b;
        let mut f = sz53(b);
        if value & 0x80 != 0 {
            f |= NF;
        }
        if k > 0xFF {
            f |= HF | CF;
        }
        if parity((k as u8 & 7) ^ b) {
            f |= PF;
        }
        f
    }
}
