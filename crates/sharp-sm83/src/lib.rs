//! Sharp SM83 (LR35902) CPU interpreter.
//!
//! Each call to `step()` executes one whole instruction and returns the
//! T-cycles it took. Opcodes are decoded through two 256-entry descriptor
//! tables, one for the primary space and one for the 0xCB-prefixed space.

mod alu;
mod cpu;
mod decode;
mod error;
mod flags;
mod registers;
mod trace;

pub use cpu::Sm83;
pub use decode::{
    AluOp, Cond, Instruction, Location, Op, Operand, Reg8, Reg16, ShiftOp, StackPair, Timing,
    extended, primary,
};
pub use error::CpuError;
pub use flags::{CF, HF, NF, ZF};
pub use registers::{PowerOn, Registers};
pub use trace::{NoTrace, TextTracer, TraceEntry, Tracer};
