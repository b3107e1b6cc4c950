//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// The bus is passed in, not owned, so the machine that hosts the CPU keeps
/// control of memory between instructions. One call to [`Cpu::step`]
/// executes one whole instruction.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Fault raised when the instruction stream cannot be executed.
    type Error;

    /// Execute one instruction and return the T-cycles it consumed.
    ///
    /// On error no architectural state has changed, so the caller can
    /// inspect the faulting program counter.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted or stopped.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
