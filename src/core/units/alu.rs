//! Arithmetic and shift unit.
//!
//! One combinational execute slot: 64-bit add/subtract, signed and
//! unsigned compares, and logical/arithmetic shifts. All operations are
//! pure functions of their inputs.

/// Execute-stage operation selector.
///
/// The 32-bit shift variants truncate the shift amount to 5 bits, the
/// 64-bit variants to 6 bits; the shifted value is always the full 64-bit
/// operand. The arithmetic right shifts sign-extend from bit 63.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExMode {
    #[default]
    Add64,
    Sub64,
    SetLess,
    SetLessUnsigned,
    And64,
    Or64,
    Xor64,
    Nor64,
    ShiftLeft,
    ShiftLeft64,
    ShiftRight,
    ShiftRight64,
    ShiftRightArith,
    ShiftRightArith64,
}

/// Arithmetic/shift unit for one pipeline slot.
pub struct Alu;

impl Alu {
    /// Executes one operation. For shifts, `x` carries the amount and `y`
    /// the value to shift; everywhere else the operands are symmetric in
    /// role (`x` op `y`).
    pub fn execute(mode: ExMode, x: u64, y: u64) -> u64 {
        const SHAMT_MASK_32: u64 = 0x1f;
        const SHAMT_MASK_64: u64 = 0x3f;

        let sh5 = (x & SHAMT_MASK_32) as u32;
        let sh6 = (x & SHAMT_MASK_64) as u32;

        match mode {
            ExMode::Add64 => x.wrapping_add(y),
            ExMode::Sub64 => x.wrapping_sub(y),
            ExMode::SetLess => u64::from((x as i64) < (y as i64)),
            ExMode::SetLessUnsigned => u64::from(x < y),
            ExMode::And64 => x & y,
            ExMode::Or64 => x | y,
            ExMode::Xor64 => x ^ y,
            ExMode::Nor64 => !(x | y),
            ExMode::ShiftLeft => y << sh5,
            ExMode::ShiftLeft64 => y << sh6,
            ExMode::ShiftRight => y >> sh5,
            ExMode::ShiftRight64 => y >> sh6,
            ExMode::ShiftRightArith => ((y as i64) >> sh5) as u64,
            ExMode::ShiftRightArith64 => ((y as i64) >> sh6) as u64,
        }
    }
}
