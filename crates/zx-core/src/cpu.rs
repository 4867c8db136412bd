use crate::IoBus;

/// Outcome of executing one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Address the instruction was fetched from.
    pub pc: u16,
    /// True if the CPU is halted after this step.
    pub halted: bool,
    /// Optional trace line (address, opcode bytes, mnemonic).
    ///
    /// Only filled in when the CPU was configured to trace. Never needed for
    /// correct emulation.
    pub trace: Option<String>,
}

/// A CPU that executes one instruction per call.
///
/// The type parameter `B` is the bus type this CPU operates on. The external
/// scheduler owns timing: it decides how often to step and when to raise
/// interrupts. Interrupt requests are only ever made between steps.
pub trait Cpu<B: IoBus> {
    /// The type used for register inspection.
    type Registers;

    /// Error returned when an instruction cannot be executed.
    type Error: std::error::Error;

    /// Execute one instruction.
    fn step(&mut self, bus: &mut B) -> Result<StepResult, Self::Error>;

    /// Reset the CPU to its initial state.
    fn reset(&mut self);

    /// Latch a maskable interrupt request for the next instruction boundary.
    fn request_interrupt(&mut self);

    /// Latch a non-maskable interrupt request for the next instruction boundary.
    fn request_nmi(&mut self);

    /// Run the maskable interrupt entry sequence now. Returns true if accepted.
    fn interrupt(&mut self, bus: &mut B) -> bool;

    /// Run the non-maskable interrupt entry sequence now.
    fn nmi(&mut self, bus: &mut B);

    /// Get the current program counter.
    fn pc(&self) -> u16;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;
}
