//! Per-instruction tracing.
//!
//! A tracer is passed into [`Sm83::step_traced`](crate::Sm83::step_traced)
//! explicitly, so every session decides for itself whether and where
//! diagnostics go.

use std::io;

use crate::decode::Instruction;
use crate::registers::Registers;

/// One executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Registers before the instruction executed.
    pub regs: Registers,
    /// The four bytes at PC before execution.
    pub pcmem: [u8; 4],
    pub instruction: Instruction,
    /// T-cycles the instruction took.
    pub cycles: u32,
}

/// Observer invoked once per executed instruction.
pub trait Tracer {
    /// Whether entries should be assembled at all.
    ///
    /// Building an entry costs four extra bus reads, so disabled tracers
    /// skip it.
    fn enabled(&self) -> bool {
        true
    }

    fn trace(&mut self, entry: &TraceEntry);
}

/// Tracer that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl Tracer for NoTrace {
    fn enabled(&self) -> bool {
        false
    }

    fn trace(&mut self, _entry: &TraceEntry) {}
}

/// Writes one line per instruction in the "doctor" log layout:
///
/// ```text
/// A:01 F:B0 B:00 C:13 D:00 E:D8 H:01 L:4D SP:FFFE PC:0100 PCMEM:00,C3,13,02
/// ```
///
/// The first write error stops further output and is kept for
/// [`TextTracer::take_error`].
pub struct TextTracer<W: io::Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: io::Write> TextTracer<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> Tracer for TextTracer<W> {
    fn enabled(&self) -> bool {
        self.error.is_none()
    }

    fn trace(&mut self, entry: &TraceEntry) {
        let r = &entry.regs;
        let [m0, m1, m2, m3] = entry.pcmem;
        let result = writeln!(
            self.out,
            "A:{:02X} F:{:02X} B:{:02X} C:{:02X} D:{:02X} E:{:02X} H:{:02X} L:{:02X} SP:{:04X} PC:{:04X} PCMEM:{m0:02X},{m1:02X},{m2:02X},{m3:02X}",
            r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l, r.sp, r.pc,
        );
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}
