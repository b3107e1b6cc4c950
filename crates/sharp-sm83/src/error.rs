//! CPU fault type.

use thiserror::Error;

/// A fault raised at the `step()` boundary.
///
/// When a step fails no register, flag or memory cell has changed. PC still
/// points at the faulting byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The fetched byte has no entry in the primary opcode table.
    #[error("illegal opcode {opcode:#04X} at {pc:#06X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}
