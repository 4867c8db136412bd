//! Z80 register set.

use crate::error::Error;
use crate::flags::Flags;

/// Named 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
    I,
    R,
}

/// Named 16-bit register or register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    AfAlt,
    BcAlt,
    DeAlt,
    HlAlt,
    Ix,
    Iy,
    Sp,
    Pc,
}

/// Z80 registers, interrupt flip-flops and halt state.
///
/// Every field is exactly as wide as the hardware register, so out-of-range
/// values cannot be stored and all arithmetic wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,

    // Halt state
    pub halted: bool,
}

const fn pair(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

impl Registers {
    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        pair(self.a, self.f)
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    /// Set AF register pair.
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8;
    }

    /// Set BC register pair.
    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    /// Set DE register pair.
    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    /// Set HL register pair.
    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    /// The flag register as named booleans.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        Flags::unpack(self.f)
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.f = flags.pack();
    }

    #[must_use]
    pub const fn read8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
            Reg8::Ixh => (self.ix >> 8) as u8,
            Reg8::Ixl => self.ix as u8,
            Reg8::Iyh => (self.iy >> 8) as u8,
            Reg8::Iyl => self.iy as u8,
            Reg8::I => self.i,
            Reg8::R => self.r,
        }
    }

    /// Write one 8-bit register. Flags are never touched as a side effect.
    pub fn write8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::F => self.f = value,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
            Reg8::Ixh => self.ix = (self.ix & 0x00FF) | (u16::from(value) << 8),
            Reg8::Ixl => self.ix = (self.ix & 0xFF00) | u16::from(value),
            Reg8::Iyh => self.iy = (self.iy & 0x00FF) | (u16::from(value) << 8),
            Reg8::Iyl => self.iy = (self.iy & 0xFF00) | u16::from(value),
            Reg8::I => self.i = value,
            Reg8::R => self.r = value,
        }
    }

    #[must_use]
    pub const fn read_pair(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Af => self.af(),
            Reg16::Bc => self.bc(),
            Reg16::De => self.de(),
            Reg16::Hl => self.hl(),
            Reg16::AfAlt => pair(self.a_alt, self.f_alt),
            Reg16::BcAlt => pair(self.b_alt, self.c_alt),
            Reg16::DeAlt => pair(self.d_alt, self.e_alt),
            Reg16::HlAlt => pair(self.h_alt, self.l_alt),
            Reg16::Ix => self.ix,
            Reg16::Iy => self.iy,
            Reg16::Sp => self.sp,
            Reg16::Pc => self.pc,
        }
    }

    pub fn write_pair(&mut self, reg: Reg16, value: u16) {
        let hi = (value >> 8) as u8;
        let lo = value as u8;
        match reg {
            Reg16::Af => self.set_af(value),
            Reg16::Bc => self.set_bc(value),
            Reg16::De => self.set_de(value),
            Reg16::Hl => self.set_hl(value),
            Reg16::AfAlt => (self.a_alt, self.f_alt) = (hi, lo),
            Reg16::BcAlt => (self.b_alt, self.c_alt) = (hi, lo),
            Reg16::DeAlt => (self.d_alt, self.e_alt) = (hi, lo),
            Reg16::HlAlt => (self.h_alt, self.l_alt) = (hi, lo),
            Reg16::Ix => self.ix = value,
            Reg16::Iy => self.iy = value,
            Reg16::Sp => self.sp = value,
            Reg16::Pc => self.pc = value,
        }
    }

    /// EX AF, AF'
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// EXX - swap BC, DE and HL with their shadows.
    pub fn exchange_shadow(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// EX DE, HL
    pub fn exchange_de_hl(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }

    /// Select interrupt mode 0, 1 or 2.
    pub fn set_interrupt_mode(&mut self, mode: u8) -> Result<(), Error> {
        if mode > 2 {
            return Err(Error::InvalidInterruptMode(mode));
        }
        self.im = mode;
        Ok(())
    }

    /// Advance the memory refresh counter by one M1 cycle.
    ///
    /// Only the low 7 bits count; bit 7 is whatever was last loaded by LD R,A.
    pub fn bump_refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_compose_high_byte_first() {
        let mut regs = Registers::default();
        regs.write_pair(Reg16::Bc, 0x1234);
        assert_eq!(regs.b, 0x12);
        assert_eq!(regs.c, 0x34);
        assert_eq!(regs.read_pair(Reg16::Bc), 0x1234);
    }

    #[test]
    fn every_pair_round_trips() {
        let all = [
            Reg16::Af,
            Reg16::Bc,
            Reg16::De,
            Reg16::Hl,
            Reg16::AfAlt,
            Reg16::BcAlt,
            Reg16::DeAlt,
            Reg16::HlAlt,
            Reg16::Ix,
            Reg16::Iy,
            Reg16::Sp,
            Reg16::Pc,
        ];
        let mut regs = Registers::default();
        for (i, reg) in all.into_iter().enumerate() {
            let value = 0xA000 | (i as u16) << 4 | 0x5;
            regs.write_pair(reg, value);
            assert_eq!(regs.read_pair(reg), value, "{reg:?}");
        }
    }

    #[test]
    fn index_halves_touch_only_their_byte() {
        let mut regs = Registers {
            ix: 0x1234,
            ..Registers::default()
        };
        regs.write8(Reg8::Ixh, 0xAB);
        assert_eq!(regs.ix, 0xAB34);
        regs.write8(Reg8::Ixl, 0xCD);
        assert_eq!(regs.ix, 0xABCD);
        assert_eq!(regs.read8(Reg8::Ixh), 0xAB);
    }

    #[test]
    fn writing_a_leaves_flags_alone() {
        let mut regs = Registers {
            f: 0xD7,
            ..Registers::default()
        };
        regs.write8(Reg8::A, 0x00);
        assert_eq!(regs.f, 0xD7);
    }

    #[test]
    fn exx_swaps_pairs_but_not_af() {
        let mut regs = Registers::default();
        regs.set_bc(0x1111);
        regs.set_hl(0x3333);
        regs.set_af(0x4444);
        regs.write_pair(Reg16::BcAlt, 0xAAAA);
        regs.exchange_shadow();
        assert_eq!(regs.bc(), 0xAAAA);
        assert_eq!(regs.read_pair(Reg16::BcAlt), 0x1111);
        assert_eq!(regs.read_pair(Reg16::HlAlt), 0x3333);
        assert_eq!(regs.af(), 0x4444);
    }

    #[test]
    fn interrupt_mode_rejects_three() {
        let mut regs = Registers::default();
        assert!(regs.set_interrupt_mode(2).is_ok());
        assert_eq!(regs.im, 2);
        assert_eq!(
            regs.set_interrupt_mode(3),
            Err(Error::InvalidInterruptMode(3))
        );
        assert_eq!(regs.im, 2);
    }

    #[test]
    fn refresh_keeps_bit_seven() {
        let mut regs = Registers {
            r: 0xFF,
            ..Registers::default()
        };
        regs.bump_refresh();
        assert_eq!(regs.r, 0x80);
        regs.r = 0x7F;
        regs.bump_refresh();
        assert_eq!(regs.r, 0x00);
    }
}
