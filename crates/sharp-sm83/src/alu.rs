//! ALU operations for the SM83.
//!
//! Every function returns the result byte together with the complete new
//! value of F. Functions that preserve some flags take the current F.

#![allow(clippy::verbose_bit_mask)] // Clearer to read mask comparisons.

use crate::decode::{AluOp, ShiftOp};
use crate::flags::{CF, HF, NF, ZF, z};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Add two bytes with optional carry.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let value = wide as u8;

    let mut flags = z(value);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    if wide > 0xFF {
        flags |= CF;
    }
    AluResult { value, flags }
}

/// Subtract two bytes with optional borrow.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF | z(value);
    if u16::from(a & 0x0F) < u16::from(b & 0x0F) + u16::from(c) {
        flags |= HF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }
    AluResult { value, flags }
}

/// Apply one of the eight accumulator operations.
///
/// `CP` returns the accumulator unchanged in `value`.
#[must_use]
pub fn accumulate(op: AluOp, a: u8, operand: u8, f: u8) -> AluResult {
    let carry = f & CF != 0;
    match op {
        AluOp::Add => add8(a, operand, false),
        AluOp::Adc => add8(a, operand, carry),
        AluOp::Sub => sub8(a, operand, false),
        AluOp::Sbc => sub8(a, operand, carry),
        AluOp::And => {
            let value = a & operand;
            AluResult {
                value,
                flags: z(value) | HF,
            }
        }
        AluOp::Xor => {
            let value = a ^ operand;
            AluResult {
                value,
                flags: z(value),
            }
        }
        AluOp::Or => {
            let value = a | operand;
            AluResult {
                value,
                flags: z(value),
            }
        }
        AluOp::Cp => AluResult {
            value: a,
            flags: sub8(a, operand, false).flags,
        },
    }
}

/// 8-bit increment. Carry is preserved.
#[must_use]
pub fn inc8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_add(1);
    let mut flags = (f & CF) | z(result);
    if value & 0x0F == 0x0F {
        flags |= HF;
    }
    AluResult {
        value: result,
        flags,
    }
}

/// 8-bit decrement. Carry is preserved.
#[must_use]
pub fn dec8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_sub(1);
    let mut flags = (f & CF) | NF | z(result);
    if value & 0x0F == 0 {
        flags |= HF;
    }
    AluResult {
        value: result,
        flags,
    }
}

/// `ADD HL,rr`. Zero is preserved; half-carry from bit 11, carry from bit 15.
#[must_use]
pub fn add16(hl: u16, rr: u16, f: u8) -> (u16, u8) {
    let (result, carry) = hl.overflowing_add(rr);
    let mut flags = f & ZF;
    if (hl & 0x0FFF) + (rr & 0x0FFF) > 0x0FFF {
        flags |= HF;
    }
    if carry {
        flags |= CF;
    }
    (result, flags)
}

/// `SP + e8` as used by `ADD SP,e8` and `LD HL,SP+e8`.
///
/// Half-carry and carry come from the unsigned addition of the low byte of
/// SP and the raw offset byte. Zero and subtract are always clear.
#[must_use]
pub fn add_sp_offset(sp: u16, offset: u8) -> (u16, u8) {
    let result = sp.wrapping_add_signed(i16::from(offset as i8));
    let low = sp as u8;
    let mut flags = 0;
    if (low & 0x0F) + (offset & 0x0F) > 0x0F {
        flags |= HF;
    }
    if u16::from(low) + u16::from(offset) > 0xFF {
        flags |= CF;
    }
    (result, flags)
}

/// Rotate, shift or swap a byte.
///
/// Zero comes from the result. The accumulator forms (`RLCA` etc.) clear
/// it afterwards.
#[must_use]
pub fn shift(op: ShiftOp, value: u8, f: u8) -> AluResult {
    let carry_in = u8::from(f & CF != 0);
    let (result, carry_out) = match op {
        ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
        ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
        ShiftOp::Rl => ((value << 1) | carry_in, value & 0x80 != 0),
        ShiftOp::Rr => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
        ShiftOp::Sla => (value << 1, value & 0x80 != 0),
        ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        ShiftOp::Swap => (value.rotate_left(4), false),
        ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
    };
    let mut flags = z(result);
    if carry_out {
        flags |= CF;
    }
    AluResult {
        value: result,
        flags,
    }
}

/// `BIT b,x`. Carry is preserved.
#[must_use]
pub fn bit(bit: u8, value: u8, f: u8) -> u8 {
    let mut flags = (f & CF) | HF;
    if value & (1 << bit) == 0 {
        flags |= ZF;
    }
    flags
}

/// Decimal-adjust the accumulator after a BCD addition or subtraction.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let mut correction = 0u8;
    let mut carry = false;

    if f & HF != 0 || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if f & CF != 0 || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }

    let value = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };

    let mut flags = (f & NF) | z(value);
    if carry {
        flags |= CF;
    }
    AluResult { value, flags }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_half_carry_and_carry() {
        let r = add8(0x0F, 0x01, false);
        assert_eq!(r.value, 0x10);
        assert_eq!(r.flags, HF);

        let r = add8(0xFF, 0x01, false);
        assert_eq!(r.value, 0x00);
        assert_eq!(r.flags, ZF | HF | CF);
    }

    #[test]
    fn adc_includes_carry_in_half_carry() {
        let r = add8(0x0E, 0x01, true);
        assert_eq!(r.value, 0x10);
        assert_eq!(r.flags, HF);
    }

    #[test]
    fn sub_borrow_flags() {
        let r = sub8(0x10, 0x01, false);
        assert_eq!(r.value, 0x0F);
        assert_eq!(r.flags, NF | HF);

        let r = sub8(0x00, 0x01, false);
        assert_eq!(r.value, 0xFF);
        assert_eq!(r.flags, NF | HF | CF);
    }

    #[test]
    fn sbc_with_carry_borrows_through_zero_operand() {
        let r = sub8(0x00, 0x00, true);
        assert_eq!(r.value, 0xFF);
        assert_eq!(r.flags, NF | HF | CF);
    }

    #[test]
    fn cp_leaves_accumulator() {
        let r = accumulate(AluOp::Cp, 0x42, 0x42, 0);
        assert_eq!(r.value, 0x42);
        assert_eq!(r.flags, ZF | NF);
    }

    #[test]
    fn logical_ops() {
        assert_eq!(accumulate(AluOp::And, 0xF0, 0x0F, CF).flags, ZF | HF);
        assert_eq!(accumulate(AluOp::Or, 0x00, 0x00, CF | HF | NF).flags, ZF);
        let r = accumulate(AluOp::Xor, 0xFF, 0x0F, CF);
        assert_eq!(r.value, 0xF0);
        assert_eq!(r.flags, 0);
    }

    #[test]
    fn inc_dec_preserve_carry() {
        let r = inc8(0xFF, CF);
        assert_eq!(r.value, 0x00);
        assert_eq!(r.flags, ZF | HF | CF);

        let r = dec8(0x00, 0);
        assert_eq!(r.value, 0xFF);
        assert_eq!(r.flags, NF | HF);

        let r = dec8(0x01, CF);
        assert_eq!(r.flags, ZF | NF | CF);
    }

    #[test]
    fn add16_uses_bit_11_and_15() {
        let (v, f) = add16(0x0FFF, 0x0001, ZF);
        assert_eq!(v, 0x1000);
        assert_eq!(f, ZF | HF);

        let (v, f) = add16(0xFFFF, 0x0001, 0);
        assert_eq!(v, 0x0000);
        assert_eq!(f, HF | CF, "zero flag is not derived from the result");
    }

    #[test]
    fn sp_offset_flags_come_from_low_byte() {
        let (v, f) = add_sp_offset(0xFFF8, 0x08);
        assert_eq!(v, 0x0000);
        assert_eq!(f, HF | CF);

        let (v, f) = add_sp_offset(0x0000, 0xFF);
        assert_eq!(v, 0xFFFF);
        assert_eq!(f, 0);

        let (v, f) = add_sp_offset(0x00FF, 0xFF);
        assert_eq!(v, 0x00FE);
        assert_eq!(f, HF | CF);
    }

    #[test]
    fn rotates() {
        let r = shift(ShiftOp::Rlc, 0x80, 0);
        assert_eq!(r.value, 0x01);
        assert_eq!(r.flags, CF);

        let r = shift(ShiftOp::Rl, 0x80, 0);
        assert_eq!(r.value, 0x00);
        assert_eq!(r.flags, ZF | CF);

        let r = shift(ShiftOp::Rr, 0x01, CF);
        assert_eq!(r.value, 0x80);
        assert_eq!(r.flags, CF);

        let r = shift(ShiftOp::Sra, 0x81, 0);
        assert_eq!(r.value, 0xC0);
        assert_eq!(r.flags, CF);
    }

    #[test]
    fn swap_clears_carry() {
        let r = shift(ShiftOp::Swap, 0xA5, CF);
        assert_eq!(r.value, 0x5A);
        assert_eq!(r.flags, 0);
        assert_eq!(shift(ShiftOp::Swap, 0x00, 0).flags, ZF);
    }

    #[test]
    fn bit_test() {
        assert_eq!(bit(7, 0x7F, CF), ZF | HF | CF);
        assert_eq!(bit(0, 0x01, 0), HF);
    }

    #[test]
    fn daa_after_addition() {
        // 0x15 + 0x27 = 0x3C, adjusted to BCD 42.
        let sum = add8(0x15, 0x27, false);
        let r = daa(sum.value, sum.flags);
        assert_eq!(r.value, 0x42);
        assert_eq!(r.flags, 0);

        // 0x99 + 0x01 = 0x9A, adjusted to 00 with carry.
        let sum = add8(0x99, 0x01, false);
        let r = daa(sum.value, sum.flags);
        assert_eq!(r.value, 0x00);
        assert_eq!(r.flags, ZF | CF);
    }

    #[test]
    fn daa_after_subtraction() {
        // 0x42 - 0x15 = 0x2D, adjusted to BCD 27.
        let diff = sub8(0x42, 0x15, false);
        let r = daa(diff.value, diff.flags);
        assert_eq!(r.value, 0x27);
        assert_eq!(r.flags, NF);
    }
}
