//! ALU and shifter.

use super::flags::flags_for;
use crate::encoding::{AluOperation, Shift};
use crate::Flags;

/// Result of one pass through the ALU and shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    /// ALU output before the shifter.
    pub pre_shift: u32,
    /// Flags derived from [`Self::pre_shift`].
    pub flags: Flags,
    /// Shifter output, the value placed on the C-bus.
    pub c: u32,
}

/// Evaluates an ALU operation on `h` and the B-bus value. Arithmetic wraps
/// modulo 2^32 and [`AluOperation::Undefined`] yields zero.
#[must_use]
pub const fn evaluate(op: AluOperation, h: u32, b: u32) -> u32 {
    match op {
        AluOperation::And => h & b,
        AluOperation::One => 1,
        AluOperation::MinusOne => u32::MAX,
        AluOperation::PassB => b,
        AluOperation::PassH => h,
        AluOperation::NotH => !h,
        AluOperation::Or => h | b,
        AluOperation::NotB => !b,
        AluOperation::IncB => b.wrapping_add(1),
        AluOperation::DecB => b.wrapping_sub(1),
        AluOperation::IncH => h.wrapping_add(1),
        AluOperation::NegH => h.wrapping_neg(),
        AluOperation::Add => h.wrapping_add(b),
        AluOperation::AddInc => h.wrapping_add(b).wrapping_add(1),
        AluOperation::SubBH => b.wrapping_sub(h),
        AluOperation::Undefined => 0,
    }
}

/// Runs the ALU, latches flags from the raw result, then applies the shifter.
#[must_use]
pub const fn compute(op: AluOperation, shift: Shift, h: u32, b: u32) -> AluOutput {
    let pre_shift = evaluate(op, h, b);
    AluOutput {
        pre_shift,
        flags: flags_for(pre_shift),
        c: shift.apply(pre_shift),
    }
}
