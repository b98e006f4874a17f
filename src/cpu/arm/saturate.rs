//! # Saturating Arithmetic
//!
//! QADD/QSUB and their doubling forms QDADD/QDSUB (which saturate twice:
//! once on the doubled operand, once on the final sum), and the bit-width
//! saturations SSAT/USAT/SSAT16/USAT16.

use crate::arith::{high_half, low_half, pack_halves, signed_saturate, signed_saturate64, unsigned_saturate};
use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

pub(super) fn next_address(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let result = match extra {
        Extra::Qadd | Extra::Qsub | Extra::Qdadd | Extra::Qdsub => {
            // QADD/QSUB: Rd = sat(Rm ± Rn); doubling forms first saturate 2*Rn.
            let n = i64::from(ctx.operand(instr.get_bits(16..=19)) as i32);
            let m = i64::from(ctx.operand(instr.get_bits(0..=3)) as i32);
            let operand = match extra {
                Extra::Qdadd | Extra::Qdsub => signed_saturate64(2 * n, 32),
                _ => n,
            };
            let sum = match extra {
                Extra::Qadd | Extra::Qdadd => m + operand,
                _ => m - operand,
            };
            signed_saturate64(sum, 32) as u32
        }
        Extra::Ssat | Extra::Usat => {
            let value = ctx.operand(instr.get_bits(0..=3));
            let amount = instr.get_bits(7..=11);
            let shifted = if instr.get_bit(6) {
                // ASR; 0 encodes ASR #32
                let amount = if amount == 0 { 31 } else { amount };
                (value as i32) >> amount
            } else {
                (value << amount) as i32
            };
            if extra == Extra::Ssat {
                let width = instr.get_bits(16..=20) + 1;
                signed_saturate(shifted, width) as u32
            } else {
                let width = instr.get_bits(16..=20);
                unsigned_saturate(i64::from(shifted), width.max(1))
            }
        }
        Extra::Ssat16 => {
            let value = ctx.operand(instr.get_bits(0..=3));
            let width = instr.get_bits(16..=19) + 1;
            pack_halves(
                signed_saturate(high_half(value), width),
                signed_saturate(low_half(value), width),
            )
        }
        Extra::Usat16 => {
            let value = ctx.operand(instr.get_bits(0..=3));
            let width = instr.get_bits(16..=19).max(1);
            pack_halves(
                unsigned_saturate(i64::from(high_half(value)), width) as i32,
                unsigned_saturate(i64::from(low_half(value)), width) as i32,
            )
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the saturate family"),
    };
    Outcome::classify(result).unpredictable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> CpuContext {
        let mut ctx = CpuContext::default();
        ctx.regs.set_register_at(15, 0x1000);
        ctx
    }

    #[test]
    fn non_pc_destination_is_linear() {
        // QADD R2, R1, R0
        let instr = 0b1110_0001_0000_0000_0010_0000_0101_0001;
        assert_eq!(next_address(instr, Extra::Qadd, &ctx()), Outcome::linear());
    }

    #[test]
    fn qadd_saturates_the_sum() {
        // QADD PC, R1, R0 (Rm = R1, Rn = R0)
        let instr = 0b1110_0001_0000_0000_1111_0000_0101_0001;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x7FFF_FFF0);
        ctx.regs.set_register_at(1, 0x100);
        assert_eq!(
            next_address(instr, Extra::Qadd, &ctx),
            Outcome::classify(0x7FFF_FFFF).unpredictable()
        );
    }

    #[test]
    fn qdsub_saturates_the_doubling_too() {
        // QDSUB PC, R1, R0 with Rn = 0x40000000: 2*Rn saturates to 0x7FFFFFFF
        let instr = 0b1110_0001_0110_0000_1111_0000_0101_0001;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x4000_0000);
        ctx.regs.set_register_at(1, 0);
        // 0 - 0x7FFFFFFF = -0x7FFFFFFF, in range
        assert_eq!(
            next_address(instr, Extra::Qdsub, &ctx),
            Outcome::classify(0x8000_0001).unpredictable()
        );
    }

    #[test]
    fn ssat_shifts_then_clamps() {
        // SSAT PC, #8, R0, LSL #4 (sat_imm field = 7)
        let instr = 0b1110_0110_1010_0111_1111_0010_0001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x100);
        // 0x100 << 4 = 0x1000, clamped to 8-bit signed max 127
        assert_eq!(
            next_address(instr, Extra::Ssat, &ctx),
            Outcome::classify(127).unpredictable()
        );
    }

    #[test]
    fn usat16_clamps_both_halves() {
        // USAT16 PC, #8, R0
        let instr = 0b1110_0110_1110_1000_1111_1111_0011_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0123_FFFF);
        // high: 0x123 -> 0xFF; low: -1 -> 0
        assert_eq!(
            next_address(instr, Extra::Usat16, &ctx),
            Outcome::classify(0x00FF_0000).unpredictable()
        );
    }
}
