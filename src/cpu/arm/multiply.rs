//! # Multiply, Multiply-Accumulate and Divide
//!
//! The 32-bit MUL/MLA/MLS group, the signed halfword multiplies
//! (SMUL\<x\>\<y\>, SMLA\<x\>\<y\>, SMULW\<y\>, SMLAW\<y\>), the most-significant-word
//! group (SMMUL/SMMLA/SMMLS), the dual forms (SMUAD/SMUSD/SMLAD/SMLSD), the
//! 64-bit accumulating group (UMULL/SMULL/UMLAL/SMLAL/UMAAL and the dual
//! SMLALD/SMLSLD), and SDIV/UDIV.
//!
//! None of these may name the PC architecturally; a PC destination is
//! UNPREDICTABLE, and the computed product is still the best guess for the
//! resulting jump.
//!
//! Field layout shared by the family: Rd bits 19-16, Ra bits 15-12 (RdLo for
//! the long forms, RdHi is bits 19-16), Rm bits 11-8, Rn bits 3-0.

use crate::arith::{high_half, low_half};
use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

fn half_of(value: u32, top: bool) -> i32 {
    if top { high_half(value) } else { low_half(value) }
}

/// Dual-halfword product pair; bit 5 swaps the halves of `m`.
fn dual_products(instr: u32, n: u32, m: u32) -> (i64, i64) {
    let m = if instr.get_bit(5) { m.rotate_right(16) } else { m };
    let low = i64::from(low_half(n)) * i64::from(low_half(m));
    let high = i64::from(high_half(n)) * i64::from(high_half(m));
    (low, high)
}

/// SDIV/UDIV. Quotients truncate toward zero; a zero divisor yields zero
/// (the divide-by-zero trap is not taken on cores without it enabled).
pub(super) fn next_address_div(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(16..=19);
    let rm = instr.get_bits(8..=11);
    let rn = instr.get_bits(0..=3);

    if rd != 15 {
        return Outcome::linear().unpredictable_if(rm == 15 || rn == 15);
    }

    let dividend = ctx.operand(rn);
    let divisor = ctx.operand(rm);
    let quotient = match extra {
        Extra::Sdiv => {
            if divisor == 0 {
                0
            } else {
                (dividend as i32).wrapping_div(divisor as i32) as u32
            }
        }
        Extra::Udiv => {
            if divisor == 0 { 0 } else { dividend / divisor }
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the divide family"),
    };
    Outcome::classify(quotient)
}

/// 32-bit result multiplies and multiply-accumulates.
pub(super) fn next_address_mac(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(16..=19);
    if rd != 15 {
        return Outcome::linear();
    }

    let m = ctx.operand(instr.get_bits(8..=11));
    let n = ctx.operand(instr.get_bits(0..=3));
    let ra = || ctx.reg(instr.get_bits(12..=15));

    let result = match extra {
        // Low 32 bits are the same for signed and unsigned products.
        Extra::Mul => n.wrapping_mul(m),
        Extra::Mla => n.wrapping_mul(m).wrapping_add(ra()),
        Extra::Mls => ra().wrapping_sub(n.wrapping_mul(m)),
        Extra::SmulWordHalf | Extra::SmlaWordHalf => {
            // 48-bit product of Rn and a halfword of Rm, top 32 bits kept.
            let product = i64::from(n as i32) * i64::from(half_of(m, instr.get_bit(6)));
            let word = (product >> 16) as u32;
            if extra == Extra::SmlaWordHalf {
                word.wrapping_add(ra())
            } else {
                word
            }
        }
        Extra::SmulHalf | Extra::SmlaHalf => {
            let product =
                half_of(n, instr.get_bit(5)).wrapping_mul(half_of(m, instr.get_bit(6))) as u32;
            if extra == Extra::SmlaHalf {
                product.wrapping_add(ra())
            } else {
                product
            }
        }
        Extra::Smmul | Extra::Smmla | Extra::Smmls => {
            let product = i64::from(n as i32) * i64::from(m as i32);
            let round = if instr.get_bit(5) { 0x8000_0000 } else { 0 };
            let acc = match extra {
                Extra::Smmla => (i64::from(ra() as i32) << 32) + product,
                Extra::Smmls => (i64::from(ra() as i32) << 32) - product,
                _ => product,
            };
            ((acc + round) >> 32) as u32
        }
        Extra::Smuad | Extra::Smusd | Extra::Smlad | Extra::Smlsd => {
            let (low, high) = dual_products(instr, n, m);
            let sum = if matches!(extra, Extra::Smuad | Extra::Smlad) {
                low + high
            } else {
                low - high
            };
            let sum = sum as u32;
            if matches!(extra, Extra::Smlad | Extra::Smlsd) {
                sum.wrapping_add(ra())
            } else {
                sum
            }
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the multiply family"),
    };
    Outcome::classify(result).unpredictable()
}

/// 64-bit accumulating multiplies. The register pair RdHi:RdLo both holds
/// the accumulator and receives the result; whichever of the two is the PC
/// receives its half of the product.
pub(super) fn next_address_mac_long(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd_hi = instr.get_bits(16..=19);
    let rd_lo = instr.get_bits(12..=15);
    if rd_hi != 15 && rd_lo != 15 {
        return Outcome::linear();
    }

    let m = ctx.operand(instr.get_bits(8..=11));
    let n = ctx.operand(instr.get_bits(0..=3));
    let acc = (u64::from(ctx.reg(rd_hi)) << 32) | u64::from(ctx.reg(rd_lo));

    let result: u64 = match extra {
        Extra::Smull => (i64::from(n as i32) * i64::from(m as i32)) as u64,
        Extra::Smlal => {
            (i64::from(n as i32) * i64::from(m as i32)).wrapping_add(acc as i64) as u64
        }
        Extra::SmlalHalf => {
            let product =
                i64::from(half_of(n, instr.get_bit(5))) * i64::from(half_of(m, instr.get_bit(6)));
            product.wrapping_add(acc as i64) as u64
        }
        Extra::Umull => u64::from(n) * u64::from(m),
        Extra::Umlal => (u64::from(n) * u64::from(m)).wrapping_add(acc),
        Extra::Umaal => {
            // Both halves accumulate as independent 32-bit values.
            (u64::from(n) * u64::from(m))
                .wrapping_add(u64::from(ctx.reg(rd_hi)))
                .wrapping_add(u64::from(ctx.reg(rd_lo)))
        }
        Extra::Smlald | Extra::Smlsld => {
            let (low, high) = dual_products(instr, n, m);
            let sum = if extra == Extra::Smlald {
                low + high
            } else {
                low - high
            };
            sum.wrapping_add(acc as i64) as u64
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the long multiply family"),
    };

    let word = if rd_hi == 15 {
        (result >> 32) as u32
    } else {
        result as u32
    };
    Outcome::classify(word).unpredictable()
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
        // MUL R2, R0, R1
        let instr = 0b1110_0000_0000_0010_0000_0001_1001_0000;
        assert_eq!(next_address_mac(instr, Extra::Mul, &ctx()), Outcome::linear());
    }

    #[test]
    fn sdiv_truncates_toward_zero() {
        // SDIV PC, R0, R1 with -7 / 2
        let instr = 0b1110_0111_0001_1111_1111_0001_0001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, (-7_i32) as u32);
        ctx.regs.set_register_at(1, 2);
        assert_eq!(
            next_address_div(instr, Extra::Sdiv, &ctx),
            Outcome::classify((-3_i32) as u32)
        );
    }

    #[test]
    fn division_by_zero_yields_zero() {
        // SDIV PC, R0, R1 with R1 = 0
        let instr = 0b1110_0111_0001_1111_1111_0001_0001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 1234);
        assert_eq!(
            next_address_div(instr, Extra::Sdiv, &ctx),
            Outcome::arm(0)
        );
    }

    #[test]
    fn udiv_with_pc_operand_is_flagged() {
        // UDIV R2, R0, PC
        let instr = 0b1110_0111_0011_0010_1111_1111_0001_0000;
        let outcome = next_address_div(instr, Extra::Udiv, &ctx());
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn mla_accumulates() {
        // MLA PC, R0, R1, R2: 6 * 7 + 0x102
        let instr = 0b1110_0000_0010_1111_0010_0001_1001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 6);
        ctx.regs.set_register_at(1, 7);
        ctx.regs.set_register_at(2, 0x102);
        assert_eq!(
            next_address_mac(instr, Extra::Mla, &ctx),
            Outcome::arm(0x12C).unpredictable()
        );
    }

    #[test]
    fn smul_selects_halves() {
        // SMULTB PC, R0, R1: top of R0 * bottom of R1
        // N (bit 5) selects Rn's half, M (bit 6) selects Rm's half.
        let instr = 0b1110_0001_0110_1111_0000_0001_1010_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0005_0000); // Rn, top half 5
        ctx.regs.set_register_at(1, 0x0000_0007); // Rm, bottom half 7
        assert_eq!(
            next_address_mac(instr, Extra::SmulHalf, &ctx),
            Outcome::classify(35).unpredictable()
        );
    }

    #[test]
    fn smuad_sums_both_products() {
        // SMUAD PC, R0, R1 (no swap)
        let instr = 0b1110_0111_0000_1111_1111_0001_0001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0002_0003); // Rn halves 2, 3
        ctx.regs.set_register_at(1, 0x0004_0005); // Rm halves 4, 5
        // 3*5 + 2*4 = 23
        assert_eq!(
            next_address_mac(instr, Extra::Smuad, &ctx),
            Outcome::classify(23).unpredictable()
        );
    }

    #[test]
    fn umull_splits_across_the_pair() {
        // UMULL R0, PC, R1, R2 (RdLo = R0, RdHi = PC)
        let instr = 0b1110_0000_1000_1111_0000_0010_1001_0001;
        let mut ctx = ctx();
        ctx.regs.set_register_at(1, 0x8000_0000);
        ctx.regs.set_register_at(2, 4);
        // product = 0x2_0000_0000, high word = 2
        assert_eq!(
            next_address_mac_long(instr, Extra::Umull, &ctx),
            Outcome::classify(2).unpredictable()
        );
    }

    #[test]
    fn smlal_adds_the_64_bit_accumulator() {
        // SMLAL RdLo=PC, RdHi=R2
        let instr = 0b1110_0000_1110_0010_1111_0001_1001_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 10);
        ctx.regs.set_register_at(1, 3);
        ctx.regs.set_register_at(2, 1);
        ctx.regs.set_register_at(15, 0x20);
        // acc = (1 << 32) | 0x20 (RdLo = PC raw value), product = 30
        // low word of result = 0x20 + 30 = 0x3E
        assert_eq!(
            next_address_mac_long(instr, Extra::Smlal, &ctx),
            Outcome::classify(0x3E).unpredictable()
        );
    }
}
