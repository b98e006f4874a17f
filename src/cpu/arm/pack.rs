//! # Pack and Extend
//!
//! PKHBT/PKHTB and the byte/halfword extension family SXT*/UXT* with their
//! accumulating forms (SXTA*/UXTA*). The extend forms rotate the source by
//! 0/8/16/24 bits first; the accumulating forms add Rn, per halfword for the
//! dual-byte (B16) variants.

use crate::arith::{high_half, low_half, pack_halves, signed_byte, signed_half};
use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

pub(super) fn next_address(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    if extra == Extra::Pkh {
        let n = ctx.operand(instr.get_bits(16..=19));
        let m = ctx.operand(instr.get_bits(0..=3));
        let imm = instr.get_bits(7..=11);
        let result = if instr.get_bit(6) {
            // PKHTB: top from Rn, bottom from Rm ASR imm (0 encodes 32)
            let amount = if imm == 0 { 31 } else { imm };
            let shifted = ((m as i32) >> amount) as u32;
            (n & 0xFFFF_0000) | (shifted & 0xFFFF)
        } else {
            // PKHBT: top from Rm LSL imm, bottom from Rn
            ((m << imm) & 0xFFFF_0000) | (n & 0xFFFF)
        };
        return Outcome::classify(result).unpredictable();
    }

    let rotation = instr.get_bits(10..=11) * 8;
    let value = ctx.operand(instr.get_bits(0..=3)).rotate_right(rotation);
    let rn = instr.get_bits(16..=19);

    use Extra::{Sxtab, Sxtab16, Sxtah, Sxtb, Sxtb16, Sxth, Uxtab, Uxtab16, Uxtah, Uxtb, Uxtb16, Uxth};
    let result = match extra {
        Sxtb | Sxtab => {
            let extended = signed_byte(value) as u32;
            if rn == 15 {
                extended
            } else {
                extended.wrapping_add(ctx.reg(rn))
            }
        }
        Uxtb | Uxtab => {
            let extended = value & 0xFF;
            if rn == 15 {
                extended
            } else {
                extended.wrapping_add(ctx.reg(rn))
            }
        }
        Sxth | Sxtah => {
            let extended = signed_half(value) as u32;
            if rn == 15 {
                extended
            } else {
                extended.wrapping_add(ctx.reg(rn))
            }
        }
        Uxth | Uxtah => {
            let extended = value & 0xFFFF;
            if rn == 15 {
                extended
            } else {
                extended.wrapping_add(ctx.reg(rn))
            }
        }
        Sxtb16 | Sxtab16 => {
            let low = signed_byte(value);
            let high = signed_byte(value >> 16);
            if rn == 15 {
                pack_halves(high, low)
            } else {
                let acc = ctx.reg(rn);
                pack_halves(high_half(acc).wrapping_add(high), low_half(acc).wrapping_add(low))
            }
        }
        Uxtb16 | Uxtab16 => {
            let low = (value & 0xFF) as i32;
            let high = ((value >> 16) & 0xFF) as i32;
            if rn == 15 {
                pack_halves(high, low)
            } else {
                let acc = ctx.reg(rn);
                pack_halves(high_half(acc).wrapping_add(high), low_half(acc).wrapping_add(low))
            }
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the pack/extend family"),
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
        // UXTB R1, R0
        let instr = 0b1110_0110_1110_1111_0001_0000_0111_0000;
        assert_eq!(next_address(instr, Extra::Uxtb, &ctx()), Outcome::linear());
    }

    #[test]
    fn pkhbt_merges_halves() {
        // PKHBT PC, R0, R1, LSL #4
        let instr = 0b1110_0110_1000_0000_1111_0010_0001_0001;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0000_1234);
        ctx.regs.set_register_at(1, 0x0555_0000);
        // top = (R1 << 4) high half = 0x5550, bottom = 0x1234
        assert_eq!(
            next_address(instr, Extra::Pkh, &ctx),
            Outcome::classify(0x5550_1234).unpredictable()
        );
    }

    #[test]
    fn sxtb_rotates_then_extends() {
        // SXTB PC, R0, ROR #8: byte 1 of R0 = 0x80 -> -128
        let instr = 0b1110_0110_1010_1111_1111_0100_0111_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0000_8000);
        assert_eq!(
            next_address(instr, Extra::Sxtb, &ctx),
            Outcome::classify(0xFFFF_FF80).unpredictable()
        );
    }

    #[test]
    fn uxtah_accumulates() {
        // UXTAH PC, R1, R0 with R0 low half 0x0123, R1 = 0x4000
        let instr = 0b1110_0110_1111_0001_1111_0000_0111_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0xFFFF_0123);
        ctx.regs.set_register_at(1, 0x4000);
        assert_eq!(
            next_address(instr, Extra::Uxtah, &ctx),
            Outcome::classify(0x4123).unpredictable()
        );
    }

    #[test]
    fn sxtb16_extends_both_lanes() {
        // SXTB16 PC, R0 with bytes 0x80 in lanes 0 and 2
        let instr = 0b1110_0110_1000_1111_1111_0000_0111_0000;
        let mut ctx = ctx();
        ctx.regs.set_register_at(0, 0x0080_0080);
        assert_eq!(
            next_address(instr, Extra::Sxtb16, &ctx),
            Outcome::classify(0xFF80_FF80).unpredictable()
        );
    }
}
