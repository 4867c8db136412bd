//! Z80 flag register bits.

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - copy of bit 3 of result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// Build flags byte for common arithmetic results.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let mut f = 0;
    if value == 0 {
        f |= ZF;
    }
    if value & 0x80 != 0 {
        f |= SF;
    }
    // Copy bits 5 and 3 from value (undocumented flags)
    f |= value & (YF | XF);
    f
}

/// Build flags byte with parity.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let mut f = sz53(value);
    if parity(value) {
        f |= PF;
    }
    f
}

/// One named bit of the F register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Sign,
    Zero,
    F5,
    HalfCarry,
    F3,
    ParityOverflow,
    AddSubtract,
    Carry,
}

impl Flag {
    /// All flags, most significant bit first.
    pub const ALL: [Flag; 8] = [
        Flag::Sign,
        Flag::Zero,
        Flag::F5,
        Flag::HalfCarry,
        Flag::F3,
        Flag::ParityOverflow,
        Flag::AddSubtract,
        Flag::Carry,
    ];

    /// Bit mask of this flag within F.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Flag::Sign => SF,
            Flag::Zero => ZF,
            Flag::F5 => YF,
            Flag::HalfCarry => HF,
            Flag::F3 => XF,
            Flag::ParityOverflow => PF,
            Flag::AddSubtract => NF,
            Flag::Carry => CF,
        }
    }
}

/// The F register as eight named booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub sign: bool,
    pub zero: bool,
    pub f5: bool,
    pub half_carry: bool,
    pub f3: bool,
    pub parity_overflow: bool,
    pub add_subtract: bool,
    pub carry: bool,
}

impl Flags {
    /// Decompose an F byte.
    #[must_use]
    pub const fn unpack(f: u8) -> Self {
        Self {
            sign: f & SF != 0,
            zero: f & ZF != 0,
            f5: f & YF != 0,
            half_carry: f & HF != 0,
            f3: f & XF != 0,
            parity_overflow: f & PF != 0,
            add_subtract: f & NF != 0,
            carry: f & CF != 0,
        }
    }

    /// Assemble the F byte.
    #[must_use]
    pub const fn pack(self) -> u8 {
        (if self.sign { SF } else { 0 })
            | (if self.zero { ZF } else { 0 })
            | (if self.f5 { YF } else { 0 })
            | (if self.half_carry { HF } else { 0 })
            | (if self.f3 { XF } else { 0 })
            | (if self.parity_overflow { PF } else { 0 })
            | (if self.add_subtract { NF } else { 0 })
            | (if self.carry { CF } else { 0 })
    }

    #[must_use]
    pub const fn get(self, flag: Flag) -> bool {
        match flag {
            Flag::Sign => self.sign,
            Flag::Zero => self.zero,
            Flag::F5 => self.f5,
            Flag::HalfCarry => self.half_carry,
            Flag::F3 => self.f3,
            Flag::ParityOverflow => self.parity_overflow,
            Flag::AddSubtract => self.add_subtract,
            Flag::Carry => self.carry,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        let slot = match flag {
            Flag::Sign => &mut self.sign,
            Flag::Zero => &mut self.zero,
            Flag::F5 => &mut self.f5,
            Flag::HalfCarry => &mut self.half_carry,
            Flag::F3 => &mut self.f3,
            Flag::ParityOverflow => &mut self.parity_overflow,
            Flag::AddSubtract => &mut self.add_subtract,
            Flag::Carry => &mut self.carry,
        };
        *slot = value;
    }
}

/// Selects which flags a result updates.
///
/// Flags not selected keep their previous value. The result-derived
/// selectors (`sign`, `zero`, `undocumented`, `parity`) are computed from
/// the result byte; the others are given explicitly by the instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    pub sign: bool,
    pub zero: bool,
    /// Copy bits 5 and 3 of the result into F5/F3.
    pub undocumented: bool,
    /// PV = even parity of the result.
    pub parity: bool,
    pub parity_overflow: Option<bool>,
    pub half_carry: Option<bool>,
    pub add_subtract: Option<bool>,
    pub carry: Option<bool>,
}

impl FlagUpdate {
    /// Update nothing.
    pub const NONE: Self = Self {
        sign: false,
        zero: false,
        undocumented: false,
        parity: false,
        parity_overflow: None,
        half_carry: None,
        add_subtract: None,
        carry: None,
    };

    /// Sign, zero, bits 5/3 and parity from the result.
    pub const SZ53P: Self = Self {
        sign: true,
        zero: true,
        undocumented: true,
        parity: true,
        ..Self::NONE
    };

    /// Sign, zero and bits 5/3 from the result.
    pub const SZ53: Self = Self {
        parity: false,
        ..Self::SZ53P
    };

    #[must_use]
    pub const fn with_parity_overflow(mut self, value: bool) -> Self {
        self.parity = false;
        self.parity_overflow = Some(value);
        self
    }

    #[must_use]
    pub const fn with_half_carry(mut self, value: bool) -> Self {
        self.half_carry = Some(value);
        self
    }

    #[must_use]
    pub const fn with_add_subtract(mut self, value: bool) -> Self {
        self.add_subtract = Some(value);
        self
    }

    #[must_use]
    pub const fn with_carry(mut self, value: bool) -> Self {
        self.carry = Some(value);
        self
    }
}

/// Apply a selective flag update to `f` from an 8-bit result.
#[must_use]
pub fn apply(f: u8, result: u8, update: FlagUpdate) -> u8 {
    let mut flags = Flags::unpack(f);
    if update.sign {
        flags.sign = result & 0x80 != 0;
    }
    if update.zero {
        flags.zero = result == 0;
    }
    if update.undocumented {
        flags.f5 = result & YF != 0;
        flags.f3 = result & XF != 0;
    }
    if update.parity {
        flags.parity_overflow = parity(result);
    }
    let explicit = [
        (Flag::ParityOverflow, update.parity_overflow),
        (Flag::HalfCarry, update.half_carry),
        (Flag::AddSubtract, update.add_subtract),
        (Flag::Carry, update.carry),
    ];
    for (flag, value) in explicit {
        if let Some(value) = value {
            flags.set(flag, value);
        }
    }
    flags.pack()
}
