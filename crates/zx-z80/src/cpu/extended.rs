//! ED-prefixed instructions.

use zx_core::IoBus;

use super::block::Direction;
use super::{Index, Z80};
use crate::alu;
use crate::error::{Error, Prefix};
use crate::flags::{self, FlagUpdate};

/// Flags for IN r,(C), LD A,I and LD A,R: H = N = 0, carry kept.
const LOAD_FLAGS: FlagUpdate = FlagUpdate::SZ53P
    .with_half_carry(false)
    .with_add_subtract(false);

impl Z80 {
    pub(super) fn execute_ed<B: IoBus>(&mut self, bus: &mut B, op: u8) -> Result<(), Error> {
        let y = (op >> 3) & 7;
        let p = (op >> 4) & 3;

        match op {
            // IN (C) - flags only
            0x70 => {
                let value = bus.read_io(self.regs.bc());
                self.regs.f = flags::apply(self.regs.f, value, LOAD_FLAGS);
            }

            // IN r, (C)
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x78 => {
                let value = bus.read_io(self.regs.bc());
                self.set_reg8(y, Index::Hl, value);
                self.regs.f = flags::apply(self.regs.f, value, LOAD_FLAGS);
            }

            // OUT (C), 0
            0x71 => bus.write_io(self.regs.bc(), 0),

            // OUT (C), r
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x79 => {
                bus.write_io(self.regs.bc(), self.reg8(y, Index::Hl));
            }

            // SBC HL, rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                let carry = self.regs.f & flags::CF != 0;
                let (value, f) = alu::sbc16(self.regs.hl(), self.reg16(p, Index::Hl), carry);
                self.regs.set_hl(value);
                self.regs.f = f;
            }

            // ADC HL, rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                let carry = self.regs.f & flags::CF != 0;
                let (value, f) = alu::adc16(self.regs.hl(), self.reg16(p, Index::Hl), carry);
                self.regs.set_hl(value);
                self.regs.f = f;
            }

            // LD (nn), rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch_word(bus);
                Self::write_word(bus, addr, self.reg16(p, Index::Hl));
            }

            // LD rr, (nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch_word(bus);
                let value = Self::read_word(bus, addr);
                self.set_reg16(p, Index::Hl, value);
            }

            // NEG (44 and its mirrors)
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::neg(self.regs.a);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }

            // RETI (4D and its mirrors)
            0x4D | 0x5D | 0x6D | 0x7D => {
                self.ret(bus);
                self.regs.iff1 = true;
            }

            // RETN (45 and its mirrors)
            0x45 | 0x55 | 0x65 | 0x75 => {
                self.ret(bus);
                self.regs.iff1 = self.regs.iff2;
            }

            // IM 0 (46, 4E, 66, 6E)
            0x46 | 0x4E | 0x66 | 0x6E => self.set_interrupt_mode(0)?,

            // IM 1 (56, 76)
            0x56 | 0x76 => self.set_interrupt_mode(1)?,

            // IM 2 (5E, 7E)
            0x5E | 0x7E => self.set_interrupt_mode(2)?,

            // LD I, A
            0x47 => self.regs.i = self.regs.a,

            // LD R, A
            0x4F => self.regs.r = self.regs.a,

            // LD A, I
            0x57 => {
                self.regs.a = self.regs.i;
                self.load_ir_flags();
            }

            // LD A, R
            0x5F => {
                self.regs.a = self.regs.r;
                self.load_ir_flags();
            }

            // RRD
            0x67 => {
                let hl = self.regs.hl();
                let (a, mem, f) = alu::rrd(self.regs.a, bus.read(hl), self.regs.f);
                bus.write(hl, mem);
                self.regs.a = a;
                self.regs.f = f;
            }

            // RLD
            0x6F => {
                let hl = self.regs.hl();
                let (a, mem, f) = alu::rld(self.regs.a, bus.read(hl), self.regs.f);
                bus.write(hl, mem);
                self.regs.a = a;
                self.regs.f = f;
            }

            // LDI, LDD, LDIR, LDDR
            0xA0 | 0xA8 | 0xB0 | 0xB8 => {
                self.block_load(bus, Direction::from_opcode(op), op >= 0xB0);
            }

            // CPI, CPD, CPIR, CPDR
            0xA1 | 0xA9 | 0xB1 | 0xB9 => {
                self.block_compare(bus, Direction::from_opcode(op), op >= 0xB0);
            }

            // INI, IND, INIR, INDR
            0xA2 | 0xAA | 0xB2 | 0xBA => {
                self.block_in(bus, Direction::from_opcode(op), op >= 0xB0);
            }

            // OUTI, OUTD, OTIR, OTDR
            0xA3 | 0xAB | 0xB3 | 0xBB => {
                self.block_out(bus, Direction::from_opcode(op), op >= 0xB0);
            }

            // Holes: 00-3F, 77, 7F, 80-9F, A4-A7, AC-AF, B4-B7, BC-FF
            _ => {
                return Err(Error::Decode {
                    prefix: Prefix::Ed,
                    opcode: op,
                    pc: self.instruction_start(2),
                });
            }
        }

        Ok(())
    }

    /// LD A,I and LD A,R copy IFF2 into PV.
    fn load_ir_flags(&mut self) {
        let update = LOAD_FLAGS.with_parity_overflow(self.regs.iff2);
        self.regs.f = flags::apply(self.regs.f, self.regs.a, update);
    }

    /// Address of the first byte of an instruction `len` bytes into decoding.
    pub(super) const fn instruction_start(&self, len: u16) -> u16 {
        self.regs.pc.wrapping_sub(len)
    }
}
