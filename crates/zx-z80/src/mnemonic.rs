//! Z80 disassembly for trace output.
//!
//! Numbers are printed as `$`-prefixed hex. Relative jumps are printed
//! against `$`, the address of the instruction itself, so `18 FE` is `JR $`.

const R: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const RP: [&str; 4] = ["BC", "DE", "HL", "SP"];
const RP2: [&str; 4] = ["BC", "DE", "HL", "AF"];
const CC: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];
const ALU: [&str; 8] = [
    "ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP ",
];
const ROT: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SLL", "SRL"];
const ACCUMULATOR: [&str; 8] = ["RLCA", "RRCA", "RLA", "RRA", "DAA", "CPL", "SCF", "CCF"];
const IM: [&str; 8] = ["0", "0", "1", "2", "0", "0", "1", "2"];

/// Render the instruction encoded at the start of `bytes`.
///
/// Missing trailing operand bytes read as zero. Undefined ED opcodes render
/// as `DB` directives.
#[must_use]
pub fn mnemonic(bytes: &[u8]) -> String {
    Decoder { bytes, pos: 0 }.instruction()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Idx {
    Hl,
    Ix,
    Iy,
}

impl Idx {
    const fn name(self) -> &'static str {
        match self {
            Idx::Hl => "HL",
            Idx::Ix => "IX",
            Idx::Iy => "IY",
        }
    }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn next(&mut self) -> u8 {
        let byte = self.bytes.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    fn imm8(&mut self) -> String {
        format!("${:02X}", self.next())
    }

    fn imm16(&mut self) -> String {
        let lo = self.next();
        let hi = self.next();
        format!("${:04X}", u16::from_le_bytes([lo, hi]))
    }

    fn relative(&mut self) -> String {
        let e = i16::from(self.next() as i8) + 2;
        match e {
            0 => "$".to_string(),
            e if e > 0 => format!("$+{e}"),
            e => format!("$-{}", -e),
        }
    }

    fn indexed(base: &str, d: i8) -> String {
        if d < 0 {
            format!("({base}-${:02X})", d.unsigned_abs())
        } else {
            format!("({base}+${d:02X})")
        }
    }

    /// Register operand; code 6 is the memory operand and reads d if indexed.
    fn reg(&mut self, r: u8, idx: Idx) -> String {
        match (r, idx) {
            (6, Idx::Hl) => "(HL)".to_string(),
            (6, _) => {
                let d = self.next() as i8;
                Self::indexed(idx.name(), d)
            }
            (4 | 5, Idx::Ix | Idx::Iy) => format!("{}{}", idx.name(), R[usize::from(r)]),
            _ => R[usize::from(r)].to_string(),
        }
    }

    fn rp(p: u8, idx: Idx) -> &'static str {
        if p == 2 {
            idx.name()
        } else {
            RP[usize::from(p)]
        }
    }

    fn instruction(&mut self) -> String {
        let op = self.next();
        self.base(op, Idx::Hl)
    }

    fn base(&mut self, op: u8, idx: Idx) -> String {
        let x = op >> 6;
        let y = (op >> 3) & 7;
        let z = op & 7;
        let p = y >> 1;
        let q = y & 1;
        let hl = idx.name();

        match (x, z) {
            (0, 0) => match y {
                0 => "NOP".to_string(),
                1 => "EX AF,AF'".to_string(),
                2 => format!("DJNZ {}", self.relative()),
                3 => format!("JR {}", self.relative()),
                _ => format!("JR {},{}", CC[usize::from(y - 4)], self.relative()),
            },
            (0, 1) if q == 0 => format!("LD {},{}", Self::rp(p, idx), self.imm16()),
            (0, 1) => format!("ADD {hl},{}", Self::rp(p, idx)),
            (0, 2) => match y {
                0 => "LD (BC),A".to_string(),
                1 => "LD A,(BC)".to_string(),
                2 => "LD (DE),A".to_string(),
                3 => "LD A,(DE)".to_string(),
                4 => format!("LD ({}),{hl}", self.imm16()),
                5 => format!("LD {hl},({})", self.imm16()),
                6 => format!("LD ({}),A", self.imm16()),
                _ => format!("LD A,({})", self.imm16()),
            },
            (0, 3) => {
                let name = if q == 0 { "INC" } else { "DEC" };
                format!("{name} {}", Self::rp(p, idx))
            }
            (0, 4) => format!("INC {}", self.reg(y, idx)),
            (0, 5) => format!("DEC {}", self.reg(y, idx)),
            (0, 6) => {
                let dst = self.reg(y, idx);
                format!("LD {dst},{}", self.imm8())
            }
            (0, _) => ACCUMULATOR[usize::from(y)].to_string(),

            (1, _) if op == 0x76 => "HALT".to_string(),
            (1, _) => {
                // The other operand stays H/L when one side is (IX+d).
                let pick = |r: u8| if r == 6 { idx } else { Idx::Hl };
                let (dst_idx, src_idx) = if y == 6 || z == 6 {
                    (pick(y), pick(z))
                } else {
                    (idx, idx)
                };
                let dst = self.reg(y, dst_idx);
                let src = self.reg(z, src_idx);
                format!("LD {dst},{src}")
            }

            (2, _) => format!("{}{}", ALU[usize::from(y)], self.reg(z, idx)),

            (_, 0) => format!("RET {}", CC[usize::from(y)]),
            (_, 1) if q == 0 => {
                let name = if p == 2 { hl } else { RP2[usize::from(p)] };
                format!("POP {name}")
            }
            (_, 1) => match p {
                0 => "RET".to_string(),
                1 => "EXX".to_string(),
                2 => format!("JP ({hl})"),
                _ => format!("LD SP,{hl}"),
            },
            (_, 2) => format!("JP {},{}", CC[usize::from(y)], self.imm16()),
            (_, 3) => match y {
                0 => format!("JP {}", self.imm16()),
                1 => self.cb(idx),
                2 => format!("OUT ({}),A", self.imm8()),
                3 => format!("IN A,({})", self.imm8()),
                4 => format!("EX (SP),{hl}"),
                5 => "EX DE,HL".to_string(),
                6 => "DI".to_string(),
                _ => "EI".to_string(),
            },
            (_, 4) => format!("CALL {},{}", CC[usize::from(y)], self.imm16()),
            (_, 5) if q == 0 => {
                let name = if p == 2 { hl } else { RP2[usize::from(p)] };
                format!("PUSH {name}")
            }
            (_, 5) => match p {
                0 => format!("CALL {}", self.imm16()),
                1 => self.prefixed(Idx::Ix),
                2 => self.ed(),
                _ => self.prefixed(Idx::Iy),
            },
            (_, 6) => format!("{}{}", ALU[usize::from(y)], self.imm8()),
            _ => format!("RST ${:02X}", y * 8),
        }
    }

    fn prefixed(&mut self, idx: Idx) -> String {
        match self.bytes.get(self.pos) {
            Some(0xDD | 0xED | 0xFD) | None => "NOP*".to_string(),
            Some(_) => {
                let op = self.next();
                self.base(op, idx)
            }
        }
    }

    fn cb(&mut self, idx: Idx) -> String {
        // DD CB d op: the displacement precedes the opcode.
        let d = if idx == Idx::Hl { 0 } else { self.next() as i8 };
        let op = self.next();
        let y = (op >> 3) & 7;
        let z = op & 7;

        let operand = if idx == Idx::Hl {
            R[usize::from(z)].to_string()
        } else {
            Self::indexed(idx.name(), d)
        };
        let body = match op >> 6 {
            0 => format!("{} {operand}", ROT[usize::from(y)]),
            1 => return format!("BIT {y},{operand}"),
            2 => format!("RES {y},{operand}"),
            _ => format!("SET {y},{operand}"),
        };
        if idx != Idx::Hl && z != 6 {
            format!("{body},{}", R[usize::from(z)])
        } else {
            body
        }
    }

    fn ed(&mut self) -> String {
        let op = self.next();
        let y = (op >> 3) & 7;
        let z = op & 7;
        let p = y >> 1;
        let q = y & 1;

        match (op >> 6, z) {
            (1, 0) if y == 6 => "IN (C)".to_string(),
            (1, 0) => format!("IN {},(C)", R[usize::from(y)]),
            (1, 1) if y == 6 => "OUT (C),0".to_string(),
            (1, 1) => format!("OUT (C),{}", R[usize::from(y)]),
            (1, 2) => {
                let name = if q == 0 { "SBC" } else { "ADC" };
                format!("{name} HL,{}", RP[usize::from(p)])
            }
            (1, 3) if q == 0 => format!("LD ({}),{}", self.imm16(), RP[usize::from(p)]),
            (1, 3) => format!("LD {},({})", RP[usize::from(p)], self.imm16()),
            (1, 4) => "NEG".to_string(),
            (1, 5) if q == 1 => "RETI".to_string(),
            (1, 5) => "RETN".to_string(),
            (1, 6) => format!("IM {}", IM[usize::from(y)]),
            (1, 7) => match y {
                0 => "LD I,A".to_string(),
                1 => "LD R,A".to_string(),
                2 => "LD A,I".to_string(),
                3 => "LD A,R".to_string(),
                4 => "RRD".to_string(),
                5 => "RLD".to_string(),
                _ => format!("DB $ED,${op:02X}"),
            },
            (2, 0..=3) if y >= 4 => {
                const BLOCK: [[&str; 4]; 4] = [
                    ["LDI", "CPI", "INI", "OUTI"],
                    ["LDD", "CPD", "IND", "OUTD"],
                    ["LDIR", "CPIR", "INIR", "OTIR"],
                    ["LDDR", "CPDR", "INDR", "OTDR"],
                ];
                BLOCK[usize::from(y - 4)][usize::from(z)].to_string()
            }
            _ => format!("DB $ED,${op:02X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mnemonic;

    #[test]
    fn base_table() {
        assert_eq!(mnemonic(&[0x00]), "NOP");
        assert_eq!(mnemonic(&[0x21, 0x34, 0x12]), "LD HL,$1234");
        assert_eq!(mnemonic(&[0x76]), "HALT");
        assert_eq!(mnemonic(&[0x7E]), "LD A,(HL)");
        assert_eq!(mnemonic(&[0xFE, 0x10]), "CP $10");
        assert_eq!(mnemonic(&[0xFF]), "RST $38");
        assert_eq!(mnemonic(&[0x18, 0xFE]), "JR $");
        assert_eq!(mnemonic(&[0x10, 0x05]), "DJNZ $+7");
        assert_eq!(mnemonic(&[0x20, 0xF0]), "JR NZ,$-14");
    }

    #[test]
    fn indexed_forms() {
        assert_eq!(mnemonic(&[0xDD, 0x7E, 0x05]), "LD A,(IX+$05)");
        assert_eq!(mnemonic(&[0xFD, 0x66, 0xFE]), "LD H,(IY-$02)");
        assert_eq!(mnemonic(&[0xDD, 0x36, 0x01, 0x42]), "LD (IX+$01),$42");
        assert_eq!(mnemonic(&[0xDD, 0x44]), "LD B,IXH");
        assert_eq!(mnemonic(&[0xFD, 0xE9]), "JP (IY)");
        assert_eq!(mnemonic(&[0xDD, 0xDD]), "NOP*");
    }

    #[test]
    fn cb_tables() {
        assert_eq!(mnemonic(&[0xCB, 0x7C]), "BIT 7,H");
        assert_eq!(mnemonic(&[0xCB, 0x06]), "RLC (HL)");
        assert_eq!(mnemonic(&[0xDD, 0xCB, 0x03, 0xC6]), "SET 0,(IX+$03)");
        assert_eq!(mnemonic(&[0xFD, 0xCB, 0xFF, 0x10]), "RL (IY-$01),B");
        assert_eq!(mnemonic(&[0xDD, 0xCB, 0x00, 0x46]), "BIT 0,(IX+$00)");
    }

    #[test]
    fn ed_table() {
        assert_eq!(mnemonic(&[0xED, 0xB0]), "LDIR");
        assert_eq!(mnemonic(&[0xED, 0x56]), "IM 1");
        assert_eq!(mnemonic(&[0xED, 0x4D]), "RETI");
        assert_eq!(mnemonic(&[0xED, 0x78]), "IN A,(C)");
        assert_eq!(mnemonic(&[0xED, 0x43, 0x00, 0x80]), "LD ($8000),BC");
        assert_eq!(mnemonic(&[0xED, 0x00]), "DB $ED,$00");
    }
}
