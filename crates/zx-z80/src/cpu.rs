//! Z80 CPU state and the instruction stepper.
//!
//! One call to [`Z80::step`] fetches, decodes and executes exactly one
//! instruction. Block instructions move one element per step and rewind PC
//! while they still have work to do, so interrupts are sampled between
//! elements. Timing is left to the caller.

use tracing::{Level, debug, trace, warn};
use zx_core::{Cpu, IoBus, Observable, StepResult, Value};

use crate::config::{Config, PowerOn};
use crate::error::Error;
use crate::flags::Flag;
use crate::mnemonic::mnemonic;
use crate::registers::{Reg8, Registers};

mod block;
mod control;
mod execute;
mod extended;
mod indexed;
mod interrupt;

pub use control::{displacement, effective};

/// Which register stands in for HL in the current instruction.
///
/// A DD prefix selects IX, an FD prefix selects IY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Index {
    Hl,
    Ix,
    Iy,
}

/// Bytes fetched for the instruction being executed, kept for the trace line.
#[derive(Debug, Clone, Copy, Default)]
struct Fetched {
    bytes: [u8; 4],
    len: usize,
}

impl Fetched {
    fn push(&mut self, byte: u8) {
        if let Some(slot) = self.bytes.get_mut(self.len) {
            *slot = byte;
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Z80 CPU.
///
/// The CPU does not own the bus. The emulator passes it to every call that
/// touches memory or ports.
pub struct Z80 {
    pub(crate) regs: Registers,
    config: Config,

    // === Interrupt requests ===
    /// Maskable interrupt latched for the next instruction boundary.
    int_pending: bool,
    /// NMI latched for the next instruction boundary.
    nmi_pending: bool,
    /// EI was the last instruction; INT is not accepted until one more has run.
    ei_delay: bool,

    fetched: Fetched,
    /// Instructions executed since construction or reset.
    instructions: u64,
}

impl Z80 {
    /// Create a Z80 with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            regs: power_on_registers(config.power_on),
            config,
            int_pending: false,
            nmi_pending: false,
            ei_delay: false,
            fetched: Fetched::default(),
            instructions: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.regs.halted
    }

    /// Copy of the full register set.
    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    /// Mutable access for snapshot loaders and test setup.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Instructions executed since construction or the last reset.
    #[must_use]
    pub const fn instruction_count(&self) -> u64 {
        self.instructions
    }

    /// Select interrupt mode 0, 1 or 2.
    pub fn set_interrupt_mode(&mut self, mode: u8) -> Result<(), Error> {
        self.regs.set_interrupt_mode(mode)?;
        debug!(mode, "interrupt mode");
        Ok(())
    }

    pub fn request_interrupt(&mut self) {
        self.int_pending = true;
    }

    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Reset the CPU.
    ///
    /// PC, I, R, both interrupt flip-flops and the interrupt mode are cleared
    /// and any latched request is dropped. The other registers follow the
    /// configured power-on policy.
    pub fn reset(&mut self) {
        self.regs = power_on_registers(self.config.power_on);
        self.int_pending = false;
        self.nmi_pending = false;
        self.ei_delay = false;
        self.instructions = 0;
        debug!("reset");
    }

    /// Execute one instruction.
    ///
    /// A latched NMI or interrupt is serviced first; the first instruction
    /// of the handler then runs in the same step. On error the register set
    /// and any pending EI delay are left as they were before the failing
    /// instruction.
    pub fn step<B: IoBus>(&mut self, bus: &mut B) -> Result<StepResult, Error> {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.non_maskable_interrupt(bus);
        } else if self.int_pending && !self.ei_delay {
            self.int_pending = false;
            self.maskable_interrupt(bus);
        }
        let ei_delay = self.ei_delay;
        self.ei_delay = false;

        let pc = self.regs.pc;
        self.fetched = Fetched::default();

        if self.regs.halted {
            // HALT keeps re-fetching its own opcode.
            self.regs.bump_refresh();
            let opcode = bus.read(pc);
            self.fetched.push(opcode);
            return Ok(self.finish(pc));
        }

        let snapshot = self.regs;
        if let Err(err) = self.execute(bus) {
            self.regs = snapshot;
            self.ei_delay = ei_delay;
            warn!(%err, "instruction not executed");
            return Err(err);
        }
        self.instructions += 1;
        Ok(self.finish(pc))
    }

    fn finish(&self, pc: u16) -> StepResult {
        let wanted = self.config.trace || tracing::enabled!(Level::TRACE);
        let line = wanted.then(|| self.trace_line(pc));
        if let Some(line) = &line {
            trace!("{line}");
        }
        StepResult {
            pc,
            halted: self.regs.halted,
            trace: if self.config.trace { line } else { None },
        }
    }

    fn trace_line(&self, pc: u16) -> String {
        let bytes = self.fetched.as_slice();
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
        format!("{pc:04X}  {:<11}  {}", hex.join(" "), mnemonic(bytes))
    }

    // =========================================================================
    // Fetch helpers
    // =========================================================================

    /// M1 fetch: read at PC, advance PC and the refresh counter.
    pub(crate) fn fetch_opcode<B: IoBus>(&mut self, bus: &mut B) -> u8 {
        self.regs.bump_refresh();
        self.fetch_byte(bus)
    }

    /// Operand fetch: read at PC and advance PC.
    pub(crate) fn fetch_byte<B: IoBus>(&mut self, bus: &mut B) -> u8 {
        let byte = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.fetched.push(byte);
        byte
    }

    /// Little-endian 16-bit operand.
    pub(crate) fn fetch_word<B: IoBus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read_word<B: IoBus>(bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read(addr);
        let hi = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn write_word<B: IoBus>(bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        bus.write(addr, lo);
        bus.write(addr.wrapping_add(1), hi);
    }

    // =========================================================================
    // Register decoding
    // =========================================================================

    /// HL, IX or IY, depending on the active prefix.
    pub(crate) const fn index_reg(&self, idx: Index) -> u16 {
        match idx {
            Index::Hl => self.regs.hl(),
            Index::Ix => self.regs.ix,
            Index::Iy => self.regs.iy,
        }
    }

    pub(crate) fn set_index_reg(&mut self, idx: Index, value: u16) {
        match idx {
            Index::Hl => self.regs.set_hl(value),
            Index::Ix => self.regs.ix = value,
            Index::Iy => self.regs.iy = value,
        }
    }

    /// Register pair by 2-bit encoding (BC, DE, HL/IX/IY, SP).
    pub(crate) const fn reg16(&self, rp: u8, idx: Index) -> u16 {
        match rp & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.index_reg(idx),
            _ => self.regs.sp,
        }
    }

    pub(crate) fn set_reg16(&mut self, rp: u8, idx: Index, value: u16) {
        match rp & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.set_index_reg(idx, value),
            _ => self.regs.sp = value,
        }
    }

    /// Register pair for PUSH/POP (AF instead of SP).
    pub(crate) const fn reg16_af(&self, rp: u8, idx: Index) -> u16 {
        match rp & 3 {
            3 => self.regs.af(),
            _ => self.reg16(rp, idx),
        }
    }

    pub(crate) fn set_reg16_af(&mut self, rp: u8, idx: Index, value: u16) {
        match rp & 3 {
            3 => self.regs.set_af(value),
            _ => self.set_reg16(rp, idx, value),
        }
    }

    /// 8-bit register by 3-bit encoding. Callers handle code 6 themselves.
    pub(crate) fn reg8(&self, r: u8, idx: Index) -> u8 {
        self.regs.read8(reg8_code(r, idx))
    }

    pub(crate) fn set_reg8(&mut self, r: u8, idx: Index, value: u8) {
        self.regs.write8(reg8_code(r, idx), value);
    }
}

/// Map a 3-bit register code to a register.
///
/// Codes 4 and 5 become the index halves under a DD/FD prefix. Code 6 is a
/// memory operand and has no register; it maps to A and must not be used.
const fn reg8_code(r: u8, idx: Index) -> Reg8 {
    match (r & 7, idx) {
        (0, _) => Reg8::B,
        (1, _) => Reg8::C,
        (2, _) => Reg8::D,
        (3, _) => Reg8::E,
        (4, Index::Hl) => Reg8::H,
        (4, Index::Ix) => Reg8::Ixh,
        (4, Index::Iy) => Reg8::Iyh,
        (5, Index::Hl) => Reg8::L,
        (5, Index::Ix) => Reg8::Ixl,
        (5, Index::Iy) => Reg8::Iyl,
        _ => Reg8::A,
    }
}

fn power_on_registers(power_on: PowerOn) -> Registers {
    match power_on {
        PowerOn::Zeroed => Registers::default(),
        PowerOn::Silicon => Registers {
            a: 0xFF,
            f: 0xFF,
            sp: 0xFFFF,
            ..Registers::default()
        },
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: IoBus> Cpu<B> for Z80 {
    type Registers = Registers;
    type Error = Error;

    fn step(&mut self, bus: &mut B) -> Result<StepResult, Error> {
        Z80::step(self, bus)
    }

    fn reset(&mut self) {
        Z80::reset(self);
    }

    fn request_interrupt(&mut self) {
        Z80::request_interrupt(self);
    }

    fn request_nmi(&mut self) {
        Z80::request_nmi(self);
    }

    fn interrupt(&mut self, bus: &mut B) -> bool {
        self.maskable_interrupt(bus)
    }

    fn nmi(&mut self, bus: &mut B) {
        self.non_maskable_interrupt(bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn registers(&self) -> Registers {
        self.regs
    }
}

const Z80_QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l", "af", "bc", "de", "hl", "a'", "f'", "b'", "c'", "d'",
    "e'", "h'", "l'", "af'", "bc'", "de'", "hl'", "ix", "iy", "ixh", "ixl", "iyh", "iyl", "sp",
    "pc", "i", "r", "flags.s", "flags.z", "flags.y", "flags.h", "flags.x", "flags.p", "flags.n",
    "flags.c", "iff1", "iff2", "im", "halted", "instructions",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        use crate::registers::Reg16;

        if let Some(name) = path.strip_prefix("flags.") {
            let flag = match name {
                "s" => Flag::Sign,
                "z" => Flag::Zero,
                "y" => Flag::F5,
                "h" => Flag::HalfCarry,
                "x" => Flag::F3,
                "p" => Flag::ParityOverflow,
                "n" => Flag::AddSubtract,
                "c" => Flag::Carry,
                _ => return None,
            };
            return Some(self.regs.flags().get(flag).into());
        }

        let reg8 = |r: Reg8| Some(Value::from(self.regs.read8(r)));
        let reg16 = |r: Reg16| Some(Value::from(self.regs.read_pair(r)));

        match path {
            "a" => reg8(Reg8::A),
            "f" => reg8(Reg8::F),
            "b" => reg8(Reg8::B),
            "c" => reg8(Reg8::C),
            "d" => reg8(Reg8::D),
            "e" => reg8(Reg8::E),
            "h" => reg8(Reg8::H),
            "l" => reg8(Reg8::L),

            "af" => reg16(Reg16::Af),
            "bc" => reg16(Reg16::Bc),
            "de" => reg16(Reg16::De),
            "hl" => reg16(Reg16::Hl),

            "a'" => Some(self.regs.a_alt.into()),
            "f'" => Some(self.regs.f_alt.into()),
            "b'" => Some(self.regs.b_alt.into()),
            "c'" => Some(self.regs.c_alt.into()),
            "d'" => Some(self.regs.d_alt.into()),
            "e'" => Some(self.regs.e_alt.into()),
            "h'" => Some(self.regs.h_alt.into()),
            "l'" => Some(self.regs.l_alt.into()),

            "af'" => reg16(Reg16::AfAlt),
            "bc'" => reg16(Reg16::BcAlt),
            "de'" => reg16(Reg16::DeAlt),
            "hl'" => reg16(Reg16::HlAlt),

            "ix" => reg16(Reg16::Ix),
            "iy" => reg16(Reg16::Iy),
            "ixh" => reg8(Reg8::Ixh),
            "ixl" => reg8(Reg8::Ixl),
            "iyh" => reg8(Reg8::Iyh),
            "iyl" => reg8(Reg8::Iyl),

            "sp" => reg16(Reg16::Sp),
            "pc" => reg16(Reg16::Pc),
            "i" => reg8(Reg8::I),
            "r" => reg8(Reg8::R),

            "iff1" => Some(self.regs.iff1.into()),
            "iff2" => Some(self.regs.iff2.into()),
            "im" => Some(self.regs.im.into()),
            "halted" => Some(self.regs.halted.into()),
            "instructions" => Some(self.instructions.into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
