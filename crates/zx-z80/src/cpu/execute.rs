//! Unprefixed and CB-prefixed instructions.
//!
//! The unprefixed table is shared with the DD and FD prefixes: `idx` names
//! the register that replaces HL, and memory operands written `(HL)` become
//! `(IX+d)` / `(IY+d)` with a displacement byte following the opcode.

use tracing::debug;
use zx_core::IoBus;

use super::{Index, Z80, displacement, effective};
use crate::alu::{self, AluResult, Shift};
use crate::error::Error;

impl Z80 {
    /// Fetch and execute one instruction, prefixes included.
    pub(super) fn execute<B: IoBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        let op = self.fetch_opcode(bus);
        self.execute_base(bus, op, Index::Hl)
    }

    /// Address of the `(HL)` operand, or `(IX+d)` / `(IY+d)` after fetching d.
    pub(super) fn memory_operand<B: IoBus>(&mut self, bus: &mut B, idx: Index) -> u16 {
        match idx {
            Index::Hl => self.regs.hl(),
            Index::Ix | Index::Iy => {
                let d = displacement(self.fetch_byte(bus));
                effective(self.index_reg(idx), d)
            }
        }
    }

    // =========================================================================
    // Unprefixed instructions
    // =========================================================================

    pub(super) fn execute_base<B: IoBus>(
        &mut self,
        bus: &mut B,
        op: u8,
        idx: Index,
    ) -> Result<(), Error> {
        let y = (op >> 3) & 7;
        let z = op & 7;
        let p = (op >> 4) & 3;

        match op {
            // NOP
            0x00 => {}

            // EX AF, AF'
            0x08 => self.regs.exchange_af(),

            // DJNZ e
            0x10 => {
                let d = displacement(self.fetch_byte(bus));
                self.djnz(d);
            }

            // JR e
            0x18 => {
                let d = displacement(self.fetch_byte(bus));
                self.jump_relative(d);
            }

            // JR cc, e (20=NZ, 28=Z, 30=NC, 38=C)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let d = displacement(self.fetch_byte(bus));
                self.jump_relative_if(y - 4, d)?;
            }

            // LD rr, nn (01=BC, 11=DE, 21=HL, 31=SP)
            0x01 | 0x11 | 0x21 | 0x31 => {
                let nn = self.fetch_word(bus);
                self.set_reg16(p, idx, nn);
            }

            // ADD HL, rr (09=BC, 19=DE, 29=HL, 39=SP)
            0x09 | 0x19 | 0x29 | 0x39 => {
                let base = self.index_reg(idx);
                let (value, flags) = alu::add16(base, self.reg16(p, idx), self.regs.f);
                self.set_index_reg(idx, value);
                self.regs.f = flags;
            }

            // LD (BC), A
            0x02 => bus.write(self.regs.bc(), self.regs.a),

            // LD (DE), A
            0x12 => bus.write(self.regs.de(), self.regs.a),

            // LD (nn), HL
            0x22 => {
                let addr = self.fetch_word(bus);
                Self::write_word(bus, addr, self.index_reg(idx));
            }

            // LD (nn), A
            0x32 => {
                let addr = self.fetch_word(bus);
                bus.write(addr, self.regs.a);
            }

            // LD A, (BC)
            0x0A => self.regs.a = bus.read(self.regs.bc()),

            // LD A, (DE)
            0x1A => self.regs.a = bus.read(self.regs.de()),

            // LD HL, (nn)
            0x2A => {
                let addr = self.fetch_word(bus);
                let value = Self::read_word(bus, addr);
                self.set_index_reg(idx, value);
            }

            // LD A, (nn)
            0x3A => {
                let addr = self.fetch_word(bus);
                self.regs.a = bus.read(addr);
            }

            // INC rr (03=BC, 13=DE, 23=HL, 33=SP)
            0x03 | 0x13 | 0x23 | 0x33 => {
                let value = self.reg16(p, idx).wrapping_add(1);
                self.set_reg16(p, idx, value);
            }

            // DEC rr (0B=BC, 1B=DE, 2B=HL, 3B=SP)
            0x0B | 0x1B | 0x2B | 0x3B => {
                let value = self.reg16(p, idx).wrapping_sub(1);
                self.set_reg16(p, idx, value);
            }

            // INC (HL)
            0x34 => {
                let addr = self.memory_operand(bus, idx);
                let result = alu::inc8(bus.read(addr), self.regs.f);
                bus.write(addr, result.value);
                self.regs.f = result.flags;
            }

            // DEC (HL)
            0x35 => {
                let addr = self.memory_operand(bus, idx);
                let result = alu::dec8(bus.read(addr), self.regs.f);
                bus.write(addr, result.value);
                self.regs.f = result.flags;
            }

            // INC r (04=B, 0C=C, 14=D, 1C=E, 24=H, 2C=L, 3C=A)
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                let result = alu::inc8(self.reg8(y, idx), self.regs.f);
                self.set_reg8(y, idx, result.value);
                self.regs.f = result.flags;
            }

            // DEC r (05=B, 0D=C, 15=D, 1D=E, 25=H, 2D=L, 3D=A)
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                let result = alu::dec8(self.reg8(y, idx), self.regs.f);
                self.set_reg8(y, idx, result.value);
                self.regs.f = result.flags;
            }

            // LD (HL), n - the displacement comes before n
            0x36 => {
                let addr = self.memory_operand(bus, idx);
                let n = self.fetch_byte(bus);
                bus.write(addr, n);
            }

            // LD r, n (06=B, 0E=C, 16=D, 1E=E, 26=H, 2E=L, 3E=A)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let n = self.fetch_byte(bus);
                self.set_reg8(y, idx, n);
            }

            // RLCA, RRCA, RLA, RRA
            0x07 | 0x0F | 0x17 | 0x1F => {
                let result = alu::rotate_accumulator(Shift::from_bits(y), self.regs.a, self.regs.f);
                self.set_a(result);
            }

            // DAA
            0x27 => {
                let result = alu::daa(self.regs.a, self.regs.f);
                self.set_a(result);
            }

            // CPL
            0x2F => {
                let result = alu::cpl(self.regs.a, self.regs.f);
                self.set_a(result);
            }

            // SCF
            0x37 => self.regs.f = alu::scf(self.regs.a, self.regs.f),

            // CCF
            0x3F => self.regs.f = alu::ccf(self.regs.a, self.regs.f),

            // HALT (sits inside the LD r, r' block)
            0x76 => {
                self.regs.halted = true;
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                debug!(pc = self.regs.pc, "halted");
            }

            // LD (HL), r
            0x70..=0x77 => {
                let addr = self.memory_operand(bus, idx);
                bus.write(addr, self.reg8(z, Index::Hl));
            }

            // LD r, (HL)
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                let addr = self.memory_operand(bus, idx);
                let value = bus.read(addr);
                self.set_reg8(y, Index::Hl, value);
            }

            // LD r, r'
            0x40..=0x7F => {
                let value = self.reg8(z, idx);
                self.set_reg8(y, idx, value);
            }

            // ALU A, (HL)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let addr = self.memory_operand(bus, idx);
                let value = bus.read(addr);
                self.alu_a(y, value);
            }

            // ALU A, r
            0x80..=0xBF => {
                let value = self.reg8(z, idx);
                self.alu_a(y, value);
            }

            // ALU A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let n = self.fetch_byte(bus);
                self.alu_a(y, n);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                self.ret_if(bus, y)?;
            }

            // POP rr (C1=BC, D1=DE, E1=HL, F1=AF)
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop(bus);
                self.set_reg16_af(p, idx, value);
            }

            // PUSH rr (C5=BC, D5=DE, E5=HL, F5=AF)
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = self.reg16_af(p, idx);
                self.push(bus, value);
            }

            // RET
            0xC9 => self.ret(bus),

            // EXX
            0xD9 => self.regs.exchange_shadow(),

            // JP (HL)
            0xE9 => self.regs.pc = self.index_reg(idx),

            // LD SP, HL
            0xF9 => self.regs.sp = self.index_reg(idx),

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let nn = self.fetch_word(bus);
                self.jump_if(y, nn)?;
            }

            // JP nn
            0xC3 => {
                let nn = self.fetch_word(bus);
                self.jump(nn);
            }

            // CB prefix
            0xCB => match idx {
                Index::Hl => {
                    let op = self.fetch_opcode(bus);
                    self.execute_cb(bus, op);
                }
                Index::Ix | Index::Iy => self.execute_indexed_cb(bus, idx),
            },

            // OUT (n), A
            0xD3 => {
                let n = self.fetch_byte(bus);
                let port = u16::from(self.regs.a) << 8 | u16::from(n);
                bus.write_io(port, self.regs.a);
            }

            // IN A, (n)
            0xDB => {
                let n = self.fetch_byte(bus);
                let port = u16::from(self.regs.a) << 8 | u16::from(n);
                self.regs.a = bus.read_io(port);
            }

            // EX (SP), HL
            0xE3 => {
                let sp = self.regs.sp;
                let value = Self::read_word(bus, sp);
                Self::write_word(bus, sp, self.index_reg(idx));
                self.set_index_reg(idx, value);
            }

            // EX DE, HL (never affected by DD/FD)
            0xEB => self.regs.exchange_de_hl(),

            // DI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }

            // EI
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.ei_delay = true;
            }

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let nn = self.fetch_word(bus);
                self.call_if(bus, y, nn)?;
            }

            // CALL nn
            0xCD => {
                let nn = self.fetch_word(bus);
                self.call(bus, nn);
            }

            // DD prefix
            0xDD => self.execute_indexed(bus, Index::Ix)?,

            // ED prefix
            0xED => {
                let op = self.fetch_opcode(bus);
                self.execute_ed(bus, op)?;
            }

            // FD prefix
            0xFD => self.execute_indexed(bus, Index::Iy)?,

            // RST p (C7, CF, D7, DF, E7, EF, F7, FF)
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.rst(bus, op & 0x38),
        }

        Ok(())
    }

    fn set_a(&mut self, result: AluResult) {
        self.regs.a = result.value;
        self.regs.f = result.flags;
    }

    /// ADD, ADC, SUB, SBC, AND, XOR, OR, CP selected by bits 5-3.
    fn alu_a(&mut self, op: u8, value: u8) {
        let a = self.regs.a;
        let f = self.regs.f;
        let result = match op & 7 {
            0 => alu::add8(a, value, false),
            1 => alu::adc8(a, value, f),
            2 => alu::sub8(a, value, false),
            3 => alu::sbc8(a, value, f),
            4 => alu::and8(a, value),
            5 => alu::xor8(a, value),
            6 => alu::or8(a, value),
            _ => alu::cp8(a, value),
        };
        self.set_a(result);
    }

    // =========================================================================
    // CB-prefixed instructions
    // =========================================================================

    pub(super) fn execute_cb<B: IoBus>(&mut self, bus: &mut B, op: u8) {
        let r = op & 7;
        if r == 6 {
            let addr = self.regs.hl();
            let value = bus.read(addr);
            // BIT n, (HL) takes F5/F3 from H in the absence of MEMPTR.
            if let Some(result) = self.cb_operation(op, value, self.regs.h) {
                bus.write(addr, result);
            }
        } else {
            let value = self.reg8(r, Index::Hl);
            if let Some(result) = self.cb_operation(op, value, value) {
                self.set_reg8(r, Index::Hl, result);
            }
        }
    }

    /// Rotate/shift, BIT, RES or SET on `value`.
    ///
    /// Returns the value to write back, or `None` for BIT.
    pub(super) fn cb_operation(&mut self, op: u8, value: u8, xy_source: u8) -> Option<u8> {
        let y = (op >> 3) & 7;
        match op >> 6 {
            0 => {
                let result = alu::shift(Shift::from_bits(y), value, self.regs.f);
                self.regs.f = result.flags;
                Some(result.value)
            }
            1 => {
                self.regs.f = alu::bit(y, value, self.regs.f, xy_source);
                None
            }
            2 => Some(alu::reset_bit(y, value)),
            _ => Some(alu::set_bit(y, value)),
        }
    }
}
