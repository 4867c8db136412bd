//! Interrupt acknowledge sequences.

use tracing::debug;
use zx_core::IoBus;

use super::Z80;

impl Z80 {
    /// A halted CPU sits on its HALT opcode; step past it so the handler
    /// returns to the following instruction.
    fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    /// Accept a maskable interrupt if IFF1 allows it.
    ///
    /// IM 0 and IM 1 both restart at 0x0038 (the Spectrum's data bus holds
    /// 0xFF, which IM 0 executes as RST 38h). IM 2 reads the handler address
    /// from the table entry at `I << 8 | vector`, with the vector taken from
    /// the data bus.
    pub fn maskable_interrupt<B: IoBus>(&mut self, bus: &mut B) -> bool {
        if !self.regs.iff1 {
            return false;
        }
        self.leave_halt();
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.bump_refresh();
        self.push(bus, self.regs.pc);

        self.regs.pc = if self.regs.im == 2 {
            let vector = bus.data_bus_value();
            let table = u16::from(self.regs.i) << 8 | u16::from(vector);
            Self::read_word(bus, table)
        } else {
            0x0038
        };
        debug!(im = self.regs.im, pc = self.regs.pc, "interrupt accepted");
        true
    }

    /// Non-maskable interrupt: always accepted, restarts at 0x0066.
    ///
    /// IFF2 keeps the pre-NMI IFF1 so RETN can restore it.
    pub fn non_maskable_interrupt<B: IoBus>(&mut self, bus: &mut B) {
        self.leave_halt();
        self.regs.iff1 = false;
        self.regs.bump_refresh();
        self.push(bus, self.regs.pc);
        self.regs.pc = 0x0066;
        debug!("nmi accepted");
    }
}
