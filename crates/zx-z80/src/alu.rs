//! ALU operations for the Z80.
//!
//! Every function is pure: operands (and the incoming flag state where the
//! instruction keeps some flags) go in, result and the new F byte come out.
//! The executor decides where the result is written back.

#![allow(clippy::verbose_bit_mask)] // Clearer to read mask comparisons.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

const fn flag_if(condition: bool, flag: u8) -> u8 {
    if condition { flag } else { 0 }
}

/// Add with carry-in. ADD A is `add8(a, b, false)`, ADC A is `add8(a, b, c)`.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let value = wide as u8;

    let flags = sz53(value)
        | flag_if((a & 0x0F) + (b & 0x0F) + c > 0x0F, HF)
        // Both operands share a sign the result does not have
        | flag_if((a ^ value) & (b ^ value) & 0x80 != 0, PF)
        | flag_if(wide > 0xFF, CF);

    AluResult { value, flags }
}

#[must_use]
pub fn adc8(a: u8, b: u8, f: u8) -> AluResult {
    add8(a, b, f & CF != 0)
}

/// Subtract with borrow-in. SUB is `sub8(a, b, false)`, SBC is `sub8(a, b, c)`.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let flags = NF
        | sz53(value)
        | flag_if((a & 0x0F) < (b & 0x0F) + c, HF)
        | flag_if((a ^ b) & (a ^ value) & 0x80 != 0, PF)
        | flag_if(u16::from(a) < u16::from(b) + u16::from(c), CF);

    AluResult { value, flags }
}

#[must_use]
pub fn sbc8(a: u8, b: u8, f: u8) -> AluResult {
    sub8(a, b, f & CF != 0)
}

/// Compare: flags of `a - b`, with F5/F3 taken from the operand.
///
/// The returned value is the untouched accumulator.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    AluResult {
        value: a,
        flags: (diff.flags & !(YF | XF)) | (b & (YF | XF)),
    }
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: sz53p(value) | HF,
    }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult {
        value,
        flags: sz53p(value),
    }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult {
        value,
        flags: sz53p(value),
    }
}

/// Increment byte. Carry is carried over from `f` unchanged.
#[must_use]
pub fn inc8(a: u8, f: u8) -> AluResult {
    let value = a.wrapping_add(1);
    let flags = (f & CF) | sz53(value) | flag_if(a & 0x0F == 0x0F, HF) | flag_if(a == 0x7F, PF);
    AluResult { value, flags }
}

/// Decrement byte. Carry is carried over from `f` unchanged.
#[must_use]
pub fn dec8(a: u8, f: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    let flags =
        (f & CF) | NF | sz53(value) | flag_if(a & 0x0F == 0x00, HF) | flag_if(a == 0x80, PF);
    AluResult { value, flags }
}

/// NEG: `0 - a` with subtraction flags.
#[must_use]
pub fn neg(a: u8) -> AluResult {
    sub8(0, a, false)
}

/// Decimal adjust after BCD add or subtract, driven by N, H and C in `f`.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let half = f & HF != 0;
    let lo = a & 0x0F;

    let mut correction = 0;
    let mut carry = f & CF != 0;
    if half || lo > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let value = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let half_out = if subtract { half && lo < 6 } else { lo > 9 };

    let flags = sz53p(value) | (f & NF) | flag_if(half_out, HF) | flag_if(carry, CF);
    AluResult { value, flags }
}

/// CPL: invert A, set H and N.
#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let value = !a;
    let flags = (f & (SF | ZF | PF | CF)) | HF | NF | (value & (YF | XF));
    AluResult { value, flags }
}

/// SCF: set carry. F5/F3 come from A.
#[must_use]
pub fn scf(a: u8, f: u8) -> u8 {
    (f & (SF | ZF | PF)) | (a & (YF | XF)) | CF
}

/// CCF: complement carry, old carry goes to H. F5/F3 come from A.
#[must_use]
pub fn ccf(a: u8, f: u8) -> u8 {
    let old_carry = f & CF != 0;
    (f & (SF | ZF | PF)) | (a & (YF | XF)) | flag_if(old_carry, HF) | flag_if(!old_carry, CF)
}

/// Rotate/shift operation selected by bits 5-3 of a CB opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

impl Shift {
    /// Decode from the `y` field (0-7) of a CB opcode.
    #[must_use]
    pub const fn from_bits(y: u8) -> Self {
        match y & 7 {
            0 => Shift::Rlc,
            1 => Shift::Rrc,
            2 => Shift::Rl,
            3 => Shift::Rr,
            4 => Shift::Sla,
            5 => Shift::Sra,
            6 => Shift::Sll,
            _ => Shift::Srl,
        }
    }

    /// Shift `a`, returning the new value and the bit shifted out.
    const fn apply(self, a: u8, carry_in: bool) -> (u8, bool) {
        let c = carry_in as u8;
        match self {
            Shift::Rlc => (a.rotate_left(1), a & 0x80 != 0),
            Shift::Rrc => (a.rotate_right(1), a & 1 != 0),
            Shift::Rl => ((a << 1) | c, a & 0x80 != 0),
            Shift::Rr => ((a >> 1) | (c << 7), a & 1 != 0),
            Shift::Sla => (a << 1, a & 0x80 != 0),
            Shift::Sra => ((a >> 1) | (a & 0x80), a & 1 != 0),
            // Undocumented: shifts a 1 into bit 0
            Shift::Sll => ((a << 1) | 1, a & 0x80 != 0),
            Shift::Srl => (a >> 1, a & 1 != 0),
        }
    }
}

/// CB-prefixed rotate or shift: H = N = 0, S/Z/PV/F5/F3 from the result.
#[must_use]
pub fn shift(op: Shift, a: u8, f: u8) -> AluResult {
    let (value, carry) = op.apply(a, f & CF != 0);
    AluResult {
        value,
        flags: sz53p(value) | flag_if(carry, CF),
    }
}

/// Accumulator rotate (RLCA, RRCA, RLA, RRA).
///
/// Unlike the CB forms, S, Z and PV are preserved.
#[must_use]
pub fn rotate_accumulator(op: Shift, a: u8, f: u8) -> AluResult {
    let (value, carry) = op.apply(a, f & CF != 0);
    AluResult {
        value,
        flags: (f & (SF | ZF | PF)) | (value & (YF | XF)) | flag_if(carry, CF),
    }
}

/// BIT b: test one bit of `value`.
///
/// F5/F3 are copied from `xy_source`, which differs between the register,
/// (HL) and (IX+d) forms. Carry is kept.
#[must_use]
pub fn bit(n: u8, value: u8, f: u8, xy_source: u8) -> u8 {
    let mask = 1u8 << (n & 7);
    let clear = value & mask == 0;
    (f & CF)
        | HF
        | flag_if(clear, ZF | PF)
        | flag_if(n & 7 == 7 && !clear, SF)
        | (xy_source & (YF | XF))
}

#[must_use]
pub const fn set_bit(n: u8, value: u8) -> u8 {
    value | (1 << (n & 7))
}

#[must_use]
pub const fn reset_bit(n: u8, value: u8) -> u8 {
    value & !(1 << (n & 7))
}

/// 16-bit add for HL/IX/IY. S, Z and PV are kept from `f`.
#[must_use]
pub fn add16(a: u16, b: u16, f: u8) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let value = wide as u16;

    let flags = (f & (SF | ZF | PF))
        | (((value >> 8) as u8) & (YF | XF))
        | flag_if((a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF, HF)
        | flag_if(wide > 0xFFFF, CF);

    (value, flags)
}

fn sz53_16(value: u16) -> u8 {
    (sz53((value >> 8) as u8) & !ZF) | flag_if(value == 0, ZF)
}

/// ADC HL,rr
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let value = wide as u16;

    let flags = sz53_16(value)
        | flag_if((a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF, HF)
        | flag_if((a ^ value) & (b ^ value) & 0x8000 != 0, PF)
        | flag_if(wide > 0xFFFF, CF);

    (value, flags)
}

/// SBC HL,rr
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let flags = NF
        | sz53_16(value)
        | flag_if((a & 0x0FFF) < (b & 0x0FFF) + c, HF)
        | flag_if((a ^ b) & (a ^ value) & 0x8000 != 0, PF)
        | flag_if(u32::from(a) < u32::from(b) + u32::from(c), CF);

    (value, flags)
}

/// RLD: rotate the low nibble of A and the byte at (HL) left by one nibble.
///
/// Returns the new A, the new memory byte and the flags.
#[must_use]
pub fn rld(a: u8, mem: u8, f: u8) -> (u8, u8, u8) {
    let new_a = (a & 0xF0) | (mem >> 4);
    let new_mem = (mem << 4) | (a & 0x0F);
    (new_a, new_mem, (f & CF) | sz53p(new_a))
}

/// RRD: rotate right by one nibble through A and (HL).
#[must_use]
pub fn rrd(a: u8, mem: u8, f: u8) -> (u8, u8, u8) {
    let new_a = (a & 0xF0) | (mem & 0x0F);
    let new_mem = (a << 4) | (mem >> 4);
    (new_a, new_mem, (f & CF) | sz53p(new_a))
}
