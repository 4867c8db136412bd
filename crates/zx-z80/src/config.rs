//! CPU construction options.

/// Register contents at construction and after [`reset`](crate::Z80::reset).
///
/// PC, I, R, the interrupt flip-flops and the interrupt mode are always
/// cleared by reset; this only decides the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerOn {
    /// Every register zero.
    #[default]
    Zeroed,
    /// AF and SP read 0xFFFF, as measured on real Z80s after power-up.
    Silicon,
}

/// Z80 configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub power_on: PowerOn,
    /// Fill [`StepResult::trace`](zx_core::StepResult::trace) with a
    /// disassembly line for every executed instruction.
    pub trace: bool,
}

impl Config {
    #[must_use]
    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub const fn with_power_on(mut self, power_on: PowerOn) -> Self {
        self.power_on = power_on;
        self
    }
}
