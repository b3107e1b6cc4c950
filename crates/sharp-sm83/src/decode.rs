//! Opcode descriptor tables.
//!
//! Both tables are built at compile time from the opcode bit-fields. The
//! primary table has a hole for every undefined opcode; the extended table
//! (reached through 0xCB) is dense.
//!
//! Field names follow the usual octal split of an opcode byte:
//! `x = bits 7-6`, `y = bits 5-3`, `z = bits 2-0`, `p = y >> 1`, `q = y & 1`.

#![allow(clippy::upper_case_acronyms)] // Names match assembler mnemonics.

use std::fmt;

/// 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

/// 16-bit register pair as used by loads and 16-bit arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    BC,
    DE,
    HL,
    SP,
}

/// 16-bit register pair as used by PUSH and POP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPair {
    BC,
    DE,
    HL,
    AF,
}

/// How a memory operand's address is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// `(BC)`
    BC,
    /// `(DE)`
    DE,
    /// `(HL)`
    HL,
    /// `(HL+)`: HL is incremented after the access.
    HLInc,
    /// `(HL-)`: HL is decremented after the access.
    HLDec,
    /// `(a16)`: two immediate bytes, low first.
    Absolute,
    /// `(FF00+a8)`
    High,
    /// `(FF00+C)`
    HighC,
}

/// Source or destination of an 8-bit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Immediate byte following the opcode.
    Imm8,
    Reg(Reg8),
    Mem(Location),
}

/// Branch condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Always,
    NZ,
    Z,
    NC,
    C,
}

/// Accumulator operation selected by bits 5-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// Rotate/shift operation selected by bits 5-3 of an extended opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

/// The operation an opcode performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    /// Escape into the extended table.
    PrefixCb,

    /// `LD dst,src` for every 8-bit addressing form.
    Ld { dst: Operand, src: Operand },
    /// `LD rr,d16`
    LdImm16(Reg16),
    /// `LD (a16),SP`
    StoreSp,
    /// `LD SP,HL`
    LdSpHl,
    /// `LD HL,SP+r8`
    LdHlSpOffset,

    Inc(Operand),
    Dec(Operand),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    /// `ADD SP,r8`
    AddSpOffset,
    Alu(AluOp, Operand),
    /// `RLCA`, `RRCA`, `RLA`, `RRA`: the accumulator rotates.
    RotateA(ShiftOp),
    Daa,
    Cpl,
    Scf,
    Ccf,

    Jr(Cond),
    Jp(Cond),
    JpHl,
    Call(Cond),
    Ret(Cond),
    Reti,
    Rst(u8),
    Push(StackPair),
    Pop(StackPair),

    Shift(ShiftOp, Operand),
    Bit(u8, Operand),
    Res(u8, Operand),
    Set(u8, Operand),
}

/// Cycle cost of an instruction, in T-cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Fixed(u32),
    /// Conditional control flow costs more when the branch is taken.
    Branch { taken: u32, not_taken: u32 },
}

/// Descriptor for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub timing: Timing,
    /// Total encoded length in bytes, including any prefix.
    pub len: u8,
}

/// Look up a primary opcode. `None` marks an undefined opcode.
#[must_use]
pub fn primary(opcode: u8) -> Option<Instruction> {
    PRIMARY[opcode as usize]
}

/// Look up the opcode following a 0xCB prefix.
#[must_use]
pub fn extended(opcode: u8) -> Instruction {
    EXTENDED[opcode as usize]
}

static PRIMARY: [Option<Instruction>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = decode_primary(i as u8);
        i += 1;
    }
    table
};

static EXTENDED: [Instruction; 256] = {
    let mut table = [decode_extended(0); 256];
    let mut i = 1;
    while i < 256 {
        table[i] = decode_extended(i as u8);
        i += 1;
    }
    table
};

const fn fixed(op: Op, cycles: u32, len: u8) -> Instruction {
    Instruction {
        op,
        timing: Timing::Fixed(cycles),
        len,
    }
}

const fn branch(op: Op, taken: u32, not_taken: u32, len: u8) -> Instruction {
    Instruction {
        op,
        timing: Timing::Branch { taken, not_taken },
        len,
    }
}

/// Register operand for a 3-bit field; index 6 is `(HL)`.
const fn r(index: u8) -> Operand {
    match index & 7 {
        0 => Operand::Reg(Reg8::B),
        1 => Operand::Reg(Reg8::C),
        2 => Operand::Reg(Reg8::D),
        3 => Operand::Reg(Reg8::E),
        4 => Operand::Reg(Reg8::H),
        5 => Operand::Reg(Reg8::L),
        6 => Operand::Mem(Location::HL),
        _ => Operand::Reg(Reg8::A),
    }
}

const fn rp(index: u8) -> Reg16 {
    match index & 3 {
        0 => Reg16::BC,
        1 => Reg16::DE,
        2 => Reg16::HL,
        _ => Reg16::SP,
    }
}

const fn rp2(index: u8) -> StackPair {
    match index & 3 {
        0 => StackPair::BC,
        1 => StackPair::DE,
        2 => StackPair::HL,
        _ => StackPair::AF,
    }
}

const fn cc(index: u8) -> Cond {
    match index & 3 {
        0 => Cond::NZ,
        1 => Cond::Z,
        2 => Cond::NC,
        _ => Cond::C,
    }
}

const fn alu(index: u8) -> AluOp {
    match index & 7 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

const fn shift(index: u8) -> ShiftOp {
    match index & 7 {
        0 => ShiftOp::Rlc,
        1 => ShiftOp::Rrc,
        2 => ShiftOp::Rl,
        3 => ShiftOp::Rr,
        4 => ShiftOp::Sla,
        5 => ShiftOp::Sra,
        6 => ShiftOp::Swap,
        _ => ShiftOp::Srl,
    }
}

const fn decode_primary(opcode: u8) -> Option<Instruction> {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let p = y >> 1;
    let q = y & 1;

    let instruction = match x {
        0 => match z {
            0 => match y {
                0 => fixed(Op::Nop, 4, 1),
                1 => fixed(Op::StoreSp, 20, 3),
                // The byte after STOP is padding.
                2 => fixed(Op::Stop, 4, 2),
                3 => fixed(Op::Jr(Cond::Always), 12, 2),
                _ => branch(Op::Jr(cc(y - 4)), 12, 8, 2),
            },
            1 => {
                if q == 0 {
                    fixed(Op::LdImm16(rp(p)), 12, 3)
                } else {
                    fixed(Op::AddHl(rp(p)), 8, 1)
                }
            }
            2 => {
                let mem = Operand::Mem(match p {
                    0 => Location::BC,
                    1 => Location::DE,
                    2 => Location::HLInc,
                    _ => Location::HLDec,
                });
                let a = Operand::Reg(Reg8::A);
                if q == 0 {
                    fixed(Op::Ld { dst: mem, src: a }, 8, 1)
                } else {
                    fixed(Op::Ld { dst: a, src: mem }, 8, 1)
                }
            }
            3 => {
                if q == 0 {
                    fixed(Op::Inc16(rp(p)), 8, 1)
                } else {
                    fixed(Op::Dec16(rp(p)), 8, 1)
                }
            }
            4 => fixed(Op::Inc(r(y)), if y == 6 { 12 } else { 4 }, 1),
            5 => fixed(Op::Dec(r(y)), if y == 6 { 12 } else { 4 }, 1),
            6 => fixed(
                Op::Ld {
                    dst: r(y),
                    src: Operand::Imm8,
                },
                if y == 6 { 12 } else { 8 },
                2,
            ),
            _ => match y {
                0..=3 => fixed(Op::RotateA(shift(y)), 4, 1),
                4 => fixed(Op::Daa, 4, 1),
                5 => fixed(Op::Cpl, 4, 1),
                6 => fixed(Op::Scf, 4, 1),
                _ => fixed(Op::Ccf, 4, 1),
            },
        },
        1 => {
            if opcode == 0x76 {
                fixed(Op::Halt, 4, 1)
            } else {
                let cycles = if y == 6 || z == 6 { 8 } else { 4 };
                fixed(
                    Op::Ld {
                        dst: r(y),
                        src: r(z),
                    },
                    cycles,
                    1,
                )
            }
        }
        2 => fixed(Op::Alu(alu(y), r(z)), if z == 6 { 8 } else { 4 }, 1),
        _ => {
            let a = Operand::Reg(Reg8::A);
            match z {
                0 => match y {
                    0..=3 => branch(Op::Ret(cc(y)), 20, 8, 1),
                    4 => fixed(
                        Op::Ld {
                            dst: Operand::Mem(Location::High),
                            src: a,
                        },
                        12,
                        2,
                    ),
                    5 => fixed(Op::AddSpOffset, 16, 2),
                    6 => fixed(
                        Op::Ld {
                            dst: a,
                            src: Operand::Mem(Location::High),
                        },
                        12,
                        2,
                    ),
                    _ => fixed(Op::LdHlSpOffset, 12, 2),
                },
                1 => {
                    if q == 0 {
                        fixed(Op::Pop(rp2(p)), 12, 1)
                    } else {
                        match p {
                            0 => fixed(Op::Ret(Cond::Always), 16, 1),
                            1 => fixed(Op::Reti, 16, 1),
                            2 => fixed(Op::JpHl, 4, 1),
                            _ => fixed(Op::LdSpHl, 8, 1),
                        }
                    }
                }
                2 => match y {
                    0..=3 => branch(Op::Jp(cc(y)), 16, 12, 3),
                    4 => fixed(
                        Op::Ld {
                            dst: Operand::Mem(Location::HighC),
                            src: a,
                        },
                        8,
                        1,
                    ),
                    5 => fixed(
                        Op::Ld {
                            dst: Operand::Mem(Location::Absolute),
                            src: a,
                        },
                        16,
                        3,
                    ),
                    6 => fixed(
                        Op::Ld {
                            dst: a,
                            src: Operand::Mem(Location::HighC),
                        },
                        8,
                        1,
                    ),
                    _ => fixed(
                        Op::Ld {
                            dst: a,
                            src: Operand::Mem(Location::Absolute),
                        },
                        16,
                        3,
                    ),
                },
                3 => match y {
                    0 => fixed(Op::Jp(Cond::Always), 16, 3),
                    // Cost and length come from the extended entry.
                    1 => fixed(Op::PrefixCb, 4, 2),
                    6 => fixed(Op::Di, 4, 1),
                    7 => fixed(Op::Ei, 4, 1),
                    _ => return None,
                },
                4 => match y {
                    0..=3 => branch(Op::Call(cc(y)), 24, 12, 3),
                    _ => return None,
                },
                5 => {
                    if q == 0 {
                        fixed(Op::Push(rp2(p)), 16, 1)
                    } else if p == 0 {
                        fixed(Op::Call(Cond::Always), 24, 3)
                    } else {
                        return None;
                    }
                }
                6 => fixed(Op::Alu(alu(y), Operand::Imm8), 8, 2),
                _ => fixed(Op::Rst(y * 8), 16, 1),
            }
        }
    };
    Some(instruction)
}

const fn decode_extended(opcode: u8) -> Instruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let operand = r(z);
    let memory = z == 6;

    match x {
        0 => fixed(Op::Shift(shift(y), operand), if memory { 16 } else { 8 }, 2),
        1 => fixed(Op::Bit(y, operand), if memory { 12 } else { 8 }, 2),
        2 => fixed(Op::Res(y, operand), if memory { 16 } else { 8 }, 2),
        _ => fixed(Op::Set(y, operand), if memory { 16 } else { 8 }, 2),
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::A => "A",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StackPair::BC => "BC",
            StackPair::DE => "DE",
            StackPair::HL => "HL",
            StackPair::AF => "AF",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm8 => f.write_str("d8"),
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::Mem(loc) => f.write_str(match loc {
                Location::BC => "(BC)",
                Location::DE => "(DE)",
                Location::HL => "(HL)",
                Location::HLInc => "(HL+)",
                Location::HLDec => "(HL-)",
                Location::Absolute => "(a16)",
                Location::High => "(a8)",
                Location::HighC => "(C)",
            }),
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cond::Always => "",
            Cond::NZ => "NZ,",
            Cond::Z => "Z,",
            Cond::NC => "NC,",
            Cond::C => "C,",
        })
    }
}

impl fmt::Display for ShiftOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftOp::Rlc => "RLC",
            ShiftOp::Rrc => "RRC",
            ShiftOp::Rl => "RL",
            ShiftOp::Rr => "RR",
            ShiftOp::Sla => "SLA",
            ShiftOp::Sra => "SRA",
            ShiftOp::Swap => "SWAP",
            ShiftOp::Srl => "SRL",
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Op::Nop => f.write_str("NOP"),
            Op::Stop => f.write_str("STOP"),
            Op::Halt => f.write_str("HALT"),
            Op::Di => f.write_str("DI"),
            Op::Ei => f.write_str("EI"),
            Op::PrefixCb => f.write_str("PREFIX CB"),
            Op::Ld {
                dst: dst @ Operand::Mem(Location::High),
                src,
            }
            | Op::Ld {
                dst,
                src: src @ Operand::Mem(Location::High),
            } => write!(f, "LDH {dst},{src}"),
            Op::Ld { dst, src } => write!(f, "LD {dst},{src}"),
            Op::LdImm16(rr) => write!(f, "LD {rr},d16"),
            Op::StoreSp => f.write_str("LD (a16),SP"),
            Op::LdSpHl => f.write_str("LD SP,HL"),
            Op::LdHlSpOffset => f.write_str("LD HL,SP+r8"),
            Op::Inc(o) => write!(f, "INC {o}"),
            Op::Dec(o) => write!(f, "DEC {o}"),
            Op::Inc16(rr) => write!(f, "INC {rr}"),
            Op::Dec16(rr) => write!(f, "DEC {rr}"),
            Op::AddHl(rr) => write!(f, "ADD HL,{rr}"),
            Op::AddSpOffset => f.write_str("ADD SP,r8"),
            Op::Alu(op, o) => match op {
                AluOp::Add => write!(f, "ADD A,{o}"),
                AluOp::Adc => write!(f, "ADC A,{o}"),
                AluOp::Sub => write!(f, "SUB {o}"),
                AluOp::Sbc => write!(f, "SBC A,{o}"),
                AluOp::And => write!(f, "AND {o}"),
                AluOp::Xor => write!(f, "XOR {o}"),
                AluOp::Or => write!(f, "OR {o}"),
                AluOp::Cp => write!(f, "CP {o}"),
            },
            Op::RotateA(op) => write!(f, "{op}A"),
            Op::Daa => f.write_str("DAA"),
            Op::Cpl => f.write_str("CPL"),
            Op::Scf => f.write_str("SCF"),
            Op::Ccf => f.write_str("CCF"),
            Op::Jr(cond) => write!(f, "JR {cond}r8"),
            Op::Jp(cond) => write!(f, "JP {cond}a16"),
            Op::JpHl => f.write_str("JP HL"),
            Op::Call(cond) => write!(f, "CALL {cond}a16"),
            Op::Ret(Cond::Always) => f.write_str("RET"),
            Op::Ret(Cond::NZ) => f.write_str("RET NZ"),
            Op::Ret(Cond::Z) => f.write_str("RET Z"),
            Op::Ret(Cond::NC) => f.write_str("RET NC"),
            Op::Ret(Cond::C) => f.write_str("RET C"),
            Op::Reti => f.write_str("RETI"),
            Op::Rst(vector) => write!(f, "RST {vector:02X}H"),
            Op::Push(pair) => write!(f, "PUSH {pair}"),
            Op::Pop(pair) => write!(f, "POP {pair}"),
            Op::Shift(op, o) => write!(f, "{op} {o}"),
            Op::Bit(b, o) => write!(f, "BIT {b},{o}"),
            Op::Res(b, o) => write!(f, "RES {b},{o}"),
            Op::Set(b, o) => write!(f, "SET {b},{o}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.op.fmt(f)
    }
}
