//! DD and FD prefixes, including the DD CB / FD CB bit operations.

use zx_core::IoBus;

use super::{Index, Z80, displacement, effective};
use crate::error::Error;

impl Z80 {
    /// Execute the instruction after a DD (IX) or FD (IY) prefix.
    ///
    /// A prefix followed by DD, FD or ED is dropped: it behaves as a one-byte
    /// NOP and the next step decodes the following prefix on its own. For
    /// opcodes that do not involve HL the prefix has no effect.
    pub(super) fn execute_indexed<B: IoBus>(
        &mut self,
        bus: &mut B,
        idx: Index,
    ) -> Result<(), Error> {
        if matches!(bus.read(self.regs.pc), 0xDD | 0xED | 0xFD) {
            return Ok(());
        }
        let op = self.fetch_opcode(bus);
        self.execute_base(bus, op, idx)
    }

    /// DD CB d op / FD CB d op.
    ///
    /// Neither `d` nor `op` is an M1 fetch, so R is not advanced for them.
    /// Every form works on `(IX+d)`; apart from BIT, when the register field
    /// is not 6 the result is also copied into that register.
    pub(super) fn execute_indexed_cb<B: IoBus>(&mut self, bus: &mut B, idx: Index) {
        let d = displacement(self.fetch_byte(bus));
        let op = self.fetch_byte(bus);
        let addr = effective(self.index_reg(idx), d);
        let value = bus.read(addr);

        // BIT takes F5/F3 from the high byte of the address.
        let [_, addr_hi] = addr.to_le_bytes();
        if let Some(result) = self.cb_operation(op, value, addr_hi) {
            bus.write(addr, result);
            let r = op & 7;
            if r != 6 {
                self.set_reg8(r, Index::Hl, result);
            }
        }
    }
}
