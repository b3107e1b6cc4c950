//! SM83 CPU core.
//!
//! `step()` fetches one opcode, looks it up in the descriptor tables and
//! executes it to completion. Decoding happens before anything is written,
//! so an illegal opcode leaves the CPU exactly as it was.

use emu_core::{Bus, Cpu, Observable, Value};

use crate::alu;
use crate::decode::{
    AluOp, Cond, Instruction, Location, Op, Operand, Reg8, Reg16, StackPair, Timing, extended,
    primary,
};
use crate::error::CpuError;
use crate::flags::{CF, HF, NF, ZF};
use crate::registers::{PowerOn, Registers};
use crate::trace::{NoTrace, TraceEntry, Tracer};

/// Cycles charged for each step while halted or stopped.
const IDLE_CYCLES: u32 = 4;

/// Sharp SM83 CPU.
pub struct Sm83 {
    regs: Registers,
    power_on: PowerOn,
    total_cycles: u64,
}

impl Sm83 {
    /// Create a CPU in the given power-on state.
    #[must_use]
    pub fn new(power_on: PowerOn) -> Self {
        Self {
            regs: Registers::power_on(power_on),
            power_on,
            total_cycles: 0,
        }
    }

    /// Mutable access to the register file.
    ///
    /// Interrupt delivery and test harnesses load state through this.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Total T-cycles executed since power-on or reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.regs.stopped
    }

    /// Leave the halted and stopped states.
    ///
    /// This is the hook an interrupt controller calls when a request is
    /// pending; servicing the request itself is the caller's business.
    pub fn wake(&mut self) {
        self.regs.halted = false;
        self.regs.stopped = false;
    }

    /// Execute one instruction, reporting it to `tracer`.
    pub fn step_traced<B: Bus, T: Tracer + ?Sized>(
        &mut self,
        bus: &mut B,
        tracer: &mut T,
    ) -> Result<u32, CpuError> {
        if self.regs.halted || self.regs.stopped {
            self.total_cycles += u64::from(IDLE_CYCLES);
            return Ok(IDLE_CYCLES);
        }

        let pc = self.regs.pc;
        let opcode = bus.read(pc);
        let instruction = if opcode == 0xCB {
            extended(bus.read(pc.wrapping_add(1)))
        } else {
            primary(opcode).ok_or(CpuError::IllegalOpcode { opcode, pc })?
        };

        let before = tracer.enabled().then(|| {
            let pcmem = [0, 1, 2, 3].map(|i| bus.read(pc.wrapping_add(i)));
            (self.regs, pcmem)
        });

        // Opcode bytes are consumed; operand bytes are fetched by execute().
        let opcode_len = if opcode == 0xCB { 2 } else { 1 };
        self.regs.pc = pc.wrapping_add(opcode_len);
        let cycles = self.execute(bus, instruction);
        self.total_cycles += u64::from(cycles);

        if let Some((regs, pcmem)) = before {
            tracer.trace(&TraceEntry {
                regs,
                pcmem,
                instruction,
                cycles,
            });
        }
        Ok(cycles)
    }

    fn execute<B: Bus>(&mut self, bus: &mut B, instruction: Instruction) -> u32 {
        let mut taken = true;

        match instruction.op {
            Op::Nop | Op::PrefixCb => {}
            Op::Stop => {
                self.fetch8(bus);
                self.regs.stopped = true;
            }
            Op::Halt => self.regs.halted = true,
            Op::Di => self.regs.ime = false,
            Op::Ei => self.regs.ime = true,

            Op::Ld { dst, src } => {
                let value = self.read_operand(bus, src);
                self.write_operand(bus, dst, value);
            }
            Op::LdImm16(rr) => {
                let value = self.fetch16(bus);
                self.set_reg16(rr, value);
            }
            Op::StoreSp => {
                let addr = self.fetch16(bus);
                let [lo, hi] = self.regs.sp.to_le_bytes();
                bus.write(addr, lo);
                bus.write(addr.wrapping_add(1), hi);
            }
            Op::LdSpHl => self.regs.sp = self.regs.hl(),
            Op::LdHlSpOffset => {
                let offset = self.fetch8(bus);
                let (value, flags) = alu::add_sp_offset(self.regs.sp, offset);
                self.regs.set_hl(value);
                self.regs.f = flags;
            }

            Op::Inc(operand) => {
                let value = self.read_operand(bus, operand);
                let r = alu::inc8(value, self.regs.f);
                self.write_operand(bus, operand, r.value);
                self.regs.f = r.flags;
            }
            Op::Dec(operand) => {
                let value = self.read_operand(bus, operand);
                let r = alu::dec8(value, self.regs.f);
                self.write_operand(bus, operand, r.value);
                self.regs.f = r.flags;
            }
            Op::Inc16(rr) => {
                let value = self.reg16(rr).wrapping_add(1);
                self.set_reg16(rr, value);
            }
            Op::Dec16(rr) => {
                let value = self.reg16(rr).wrapping_sub(1);
                self.set_reg16(rr, value);
            }
            Op::AddHl(rr) => {
                let (value, flags) = alu::add16(self.regs.hl(), self.reg16(rr), self.regs.f);
                self.regs.set_hl(value);
                self.regs.f = flags;
            }
            Op::AddSpOffset => {
                let offset = self.fetch8(bus);
                let (value, flags) = alu::add_sp_offset(self.regs.sp, offset);
                self.regs.sp = value;
                self.regs.f = flags;
            }
            Op::Alu(op, operand) => {
                let value = self.read_operand(bus, operand);
                let r = alu::accumulate(op, self.regs.a, value, self.regs.f);
                if op != AluOp::Cp {
                    self.regs.a = r.value;
                }
                self.regs.f = r.flags;
            }
            Op::RotateA(op) => {
                let r = alu::shift(op, self.regs.a, self.regs.f);
                self.regs.a = r.value;
                self.regs.f = r.flags & CF;
            }
            Op::Daa => {
                let r = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = r.value;
                self.regs.f = r.flags;
            }
            Op::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f |= NF | HF;
            }
            Op::Scf => self.regs.f = (self.regs.f & ZF) | CF,
            Op::Ccf => self.regs.f = (self.regs.f & ZF) | ((self.regs.f & CF) ^ CF),

            Op::Jr(cond) => {
                let offset = self.fetch8(bus) as i8;
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
                }
            }
            Op::Jp(cond) => {
                let target = self.fetch16(bus);
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = target;
                }
            }
            Op::JpHl => self.regs.pc = self.regs.hl(),
            Op::Call(cond) => {
                let target = self.fetch16(bus);
                taken = self.condition(cond);
                if taken {
                    self.push(bus, self.regs.pc);
                    self.regs.pc = target;
                }
            }
            Op::Ret(cond) => {
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = self.pop(bus);
                }
            }
            Op::Reti => {
                self.regs.pc = self.pop(bus);
                self.regs.ime = true;
            }
            Op::Rst(vector) => {
                self.push(bus, self.regs.pc);
                self.regs.pc = u16::from(vector);
            }
            Op::Push(pair) => {
                let value = match pair {
                    StackPair::BC => self.regs.bc(),
                    StackPair::DE => self.regs.de(),
                    StackPair::HL => self.regs.hl(),
                    StackPair::AF => self.regs.af(),
                };
                self.push(bus, value);
            }
            Op::Pop(pair) => {
                let value = self.pop(bus);
                match pair {
                    StackPair::BC => self.regs.set_bc(value),
                    StackPair::DE => self.regs.set_de(value),
                    StackPair::HL => self.regs.set_hl(value),
                    StackPair::AF => self.regs.set_af(value),
                }
            }

            Op::Shift(op, operand) => {
                let value = self.read_operand(bus, operand);
                let r = alu::shift(op, value, self.regs.f);
                self.write_operand(bus, operand, r.value);
                self.regs.f = r.flags;
            }
            Op::Bit(bit, operand) => {
                let value = self.read_operand(bus, operand);
                self.regs.f = alu::bit(bit, value, self.regs.f);
            }
            Op::Res(bit, operand) => {
                let value = self.read_operand(bus, operand);
                self.write_operand(bus, operand, value & !(1 << bit));
            }
            Op::Set(bit, operand) => {
                let value = self.read_operand(bus, operand);
                self.write_operand(bus, operand, value | (1 << bit));
            }
        }

        match instruction.timing {
            Timing::Fixed(cycles) => cycles,
            Timing::Branch { taken: t, not_taken } => {
                if taken {
                    t
                } else {
                    not_taken
                }
            }
        }
    }

    fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// SP drops by two; the low byte lands at SP and the high byte at SP+1.
    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.regs.sp);
        let hi = bus.read(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::NZ => !self.regs.flag(ZF),
            Cond::Z => self.regs.flag(ZF),
            Cond::NC => !self.regs.flag(CF),
            Cond::C => self.regs.flag(CF),
        }
    }

    fn reg8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.b,
            Reg8::C => self.regs.c,
            Reg8::D => self.regs.d,
            Reg8::E => self.regs.e,
            Reg8::H => self.regs.h,
            Reg8::L => self.regs.l,
            Reg8::A => self.regs.a,
        }
    }

    fn set_reg8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::B => self.regs.b = value,
            Reg8::C => self.regs.c = value,
            Reg8::D => self.regs.d = value,
            Reg8::E => self.regs.e = value,
            Reg8::H => self.regs.h = value,
            Reg8::L => self.regs.l = value,
            Reg8::A => self.regs.a = value,
        }
    }

    fn reg16(&self, rr: Reg16) -> u16 {
        match rr {
            Reg16::BC => self.regs.bc(),
            Reg16::DE => self.regs.de(),
            Reg16::HL => self.regs.hl(),
            Reg16::SP => self.regs.sp,
        }
    }

    fn set_reg16(&mut self, rr: Reg16, value: u16) {
        match rr {
            Reg16::BC => self.regs.set_bc(value),
            Reg16::DE => self.regs.set_de(value),
            Reg16::HL => self.regs.set_hl(value),
            Reg16::SP => self.regs.sp = value,
        }
    }

    /// Resolve a memory operand, consuming immediate bytes and applying
    /// the HL post-increment/decrement.
    fn address<B: Bus>(&mut self, bus: &mut B, loc: Location) -> u16 {
        match loc {
            Location::BC => self.regs.bc(),
            Location::DE => self.regs.de(),
            Location::HL => self.regs.hl(),
            Location::HLInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Location::HLDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
            Location::Absolute => self.fetch16(bus),
            Location::High => 0xFF00 | u16::from(self.fetch8(bus)),
            Location::HighC => 0xFF00 | u16::from(self.regs.c),
        }
    }

    fn read_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Imm8 => self.fetch8(bus),
            Operand::Reg(reg) => self.reg8(reg),
            Operand::Mem(loc) => {
                let addr = self.address(bus, loc);
                bus.read(addr)
            }
        }
    }

    /// Read-modify-write instructions only ever use registers or `(HL)`,
    /// so resolving the address a second time is side-effect free.
    fn write_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        match operand {
            // Immediates are never destinations.
            Operand::Imm8 => {}
            Operand::Reg(reg) => self.set_reg8(reg, value),
            Operand::Mem(loc) => {
                let addr = self.address(bus, loc);
                bus.write(addr, value);
            }
        }
    }
}

impl Default for Sm83 {
    fn default() -> Self {
        Self::new(PowerOn::BareMetal)
    }
}

impl Cpu for Sm83 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        self.step_traced(bus, &mut NoTrace)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted || self.regs.stopped
    }

    fn reset(&mut self) {
        self.regs = Registers::power_on(self.power_on);
        self.total_cycles = 0;
    }
}

const SM83_QUERY_PATHS: &[&str] = &[
    // Registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    "sp", "pc",
    // Flags (individual)
    "flags.z", "flags.n", "flags.h", "flags.c",
    // CPU state
    "ime", "halted", "stopped", "cycles",
];

impl Observable for Sm83 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "a" => Some(self.regs.a.into()),
            "f" => Some(self.regs.f.into()),
            "b" => Some(self.regs.b.into()),
            "c" => Some(self.regs.c.into()),
            "d" => Some(self.regs.d.into()),
            "e" => Some(self.regs.e.into()),
            "h" => Some(self.regs.h.into()),
            "l" => Some(self.regs.l.into()),

            "af" => Some(self.regs.af().into()),
            "bc" => Some(self.regs.bc().into()),
            "de" => Some(self.regs.de().into()),
            "hl" => Some(self.regs.hl().into()),
            "sp" => Some(self.regs.sp.into()),
            "pc" => Some(self.regs.pc.into()),

            "flags.z" => Some(self.regs.flag(ZF).into()),
            "flags.n" => Some(self.regs.flag(NF).into()),
            "flags.h" => Some(self.regs.flag(HF).into()),
            "flags.c" => Some(self.regs.flag(CF).into()),

            "ime" => Some(self.regs.ime.into()),
            "halted" => Some(self.regs.halted.into()),
            "stopped" => Some(self.regs.stopped.into()),
            "cycles" => Some(self.total_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        SM83_QUERY_PATHS
    }
}
