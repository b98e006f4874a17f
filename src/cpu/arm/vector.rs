//! # VFP and Advanced SIMD
//!
//! The vector pipelines cannot branch, so the data-processing families are
//! placeholders that report `Linear` once their UNDEFINED field checks have
//! run (the muxes carry those for the shared encodings). What this module
//! models fully is every path that can still reach the general-purpose PC:
//! the base-register writeback of the element/structure and extension
//! load/stores, and the register-transfer forms (VMOV/VMRS) moving a vector
//! value into an ARM register.

use crate::arith::{signed_byte, signed_half};
use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

/// Vector data-processing placeholder: no control-flow effect.
pub(super) fn next_address_data(_instr: u32, extra: Extra) -> Outcome {
    debug_assert!(matches!(
        extra,
        Extra::FpData
            | Extra::VBits
            | Extra::VComp
            | Extra::VMac
            | Extra::VMisc
            | Extra::VPar
            | Extra::VShift
    ));
    Outcome::linear()
}

/// Per-transfer byte count and UNDEFINED field checks for the
/// element/structure forms. Returns `None` for UNDEFINED encodings.
fn element_transfer_bytes(instr: u32, extra: Extra) -> Option<u32> {
    let align = instr.get_bits(4..=5);
    let size = instr.get_bits(6..=7);
    let index_align = instr.get_bits(4..=7);
    let lane_size = instr.get_bits(10..=11);

    let bytes = match extra {
        Extra::Vld1Mult | Extra::Vst1Mult => {
            let regs = match instr.get_bits(8..=11) {
                0b0010 => 4,
                0b0110 => {
                    if align & 0b10 != 0 {
                        return None;
                    }
                    3
                }
                0b0111 => {
                    if align & 0b10 != 0 {
                        return None;
                    }
                    1
                }
                0b1010 => {
                    if align == 0b11 {
                        return None;
                    }
                    2
                }
                _ => return None,
            };
            regs * 8
        }
        Extra::Vld2Mult | Extra::Vst2Mult => {
            if size == 0b11 {
                return None;
            }
            let regs = match instr.get_bits(8..=11) {
                0b0011 => 2,
                0b1000 | 0b1001 => {
                    if align == 0b11 {
                        return None;
                    }
                    1
                }
                _ => return None,
            };
            regs * 16
        }
        Extra::Vld3Mult | Extra::Vst3Mult => {
            if size == 0b11 || align & 0b10 != 0 {
                return None;
            }
            24
        }
        Extra::Vld4Mult | Extra::Vst4Mult => {
            if size == 0b11 {
                return None;
            }
            32
        }
        Extra::Vld1One | Extra::Vst1One => match lane_size {
            0b00 => {
                if index_align & 1 != 0 {
                    return None;
                }
                1
            }
            0b01 => {
                if index_align & 0b10 != 0 {
                    return None;
                }
                2
            }
            0b10 => {
                if index_align & 0b100 != 0 || matches!(index_align & 0b11, 0b01 | 0b10) {
                    return None;
                }
                4
            }
            _ => return None,
        },
        Extra::Vld2One | Extra::Vst2One => match lane_size {
            0b00 => 2,
            0b01 => 4,
            0b10 => {
                if index_align & 0b10 != 0 {
                    return None;
                }
                8
            }
            _ => return None,
        },
        Extra::Vld3One | Extra::Vst3One => match lane_size {
            0b00 | 0b01 => {
                if index_align & 1 != 0 {
                    return None;
                }
                3 << lane_size
            }
            0b10 => {
                if index_align & 0b11 != 0 {
                    return None;
                }
                12
            }
            _ => return None,
        },
        Extra::Vld4One | Extra::Vst4One => match lane_size {
            0b00 => 4,
            0b01 => 8,
            0b10 => {
                if index_align & 0b11 == 0b11 {
                    return None;
                }
                16
            }
            _ => return None,
        },
        Extra::Vld1All => {
            if size == 0b11 || (size == 0 && instr.get_bit(4)) {
                return None;
            }
            1 << size
        }
        Extra::Vld2All => {
            if size == 0b11 {
                return None;
            }
            2 << size
        }
        Extra::Vld3All => {
            if size == 0b11 || instr.get_bit(4) {
                return None;
            }
            3 << size
        }
        Extra::Vld4All => {
            if size == 0b11 && !instr.get_bit(4) {
                return None;
            }
            let ebytes = if size == 0b11 { 4 } else { 1 << size };
            4 * ebytes
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the element load/store family"),
    };
    Some(bytes)
}

/// VLDn/VSTn element and structure forms. Rm selects the writeback flavor:
/// 15 = none, 13 = advance by the transfer size, else advance by Rm.
pub(super) fn next_address_ldst_elem(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let Some(bytes) = element_transfer_bytes(instr, extra) else {
        return Outcome::UNDEFINED;
    };

    let rn = instr.get_bits(16..=19);
    let rm = instr.get_bits(0..=3);
    if rn != 15 {
        return Outcome::linear();
    }

    // A PC base is itself UNPREDICTABLE; the writeback is still the guess.
    if rm == 15 {
        return Outcome::linear().unpredictable();
    }
    let advance = if rm == 13 { bytes } else { ctx.reg(rm) };
    Outcome::classify(ctx.operand(15).wrapping_add(advance)).unpredictable()
}

/// VLDM/VSTM/VLDR/VSTR/VPUSH/VPOP.
pub(super) fn next_address_ldst_ext(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    match extra {
        // The single-transfer forms never write their base back.
        Extra::Vldr | Extra::Vstr => Outcome::linear(),
        Extra::Vpop | Extra::Vpush => {
            Outcome::linear().unpredictable_if(instr.get_bits(0..=7) == 0)
        }
        Extra::Vldm | Extra::Vstm => {
            let puw =
                (instr.get_bit_as::<u32>(24) << 2) | (instr.get_bit_as::<u32>(23) << 1)
                    | instr.get_bit_as::<u32>(21);
            // P=0,U=0 with W and P=1,U=1 with W have no listed addressing mode.
            if puw == 0b001 || puw == 0b111 {
                return Outcome::UNDEFINED;
            }
            let rn = instr.get_bits(16..=19);
            if rn != 15 {
                return Outcome::linear();
            }
            let bytes = instr.get_bits(0..=7) * 4;
            let base = ctx.operand(15);
            match puw {
                // IA without writeback leaves the base alone.
                0b010 => Outcome::linear().unpredictable(),
                0b011 => Outcome::classify(base.wrapping_add(bytes)).unpredictable(),
                0b101 => Outcome::classify(base.wrapping_sub(bytes)).unpredictable(),
                _ => Outcome::linear().unpredictable(),
            }
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the extension load/store family"),
    }
}

/// Register transfer between the ARM core and the vector file.
pub(super) fn next_address_xfer(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rt = instr.get_bits(12..=15);
    let to_arm = instr.get_bit(20);

    match extra {
        Extra::VmovTwoSingles | Extra::VmovDoubleword => {
            let rt2 = instr.get_bits(16..=19);
            let mut unp = rt == 15 || rt2 == 15;
            if to_arm {
                unp |= rt == rt2;
            }
            if !to_arm || (rt != 15 && rt2 != 15) {
                return Outcome::linear().unpredictable_if(unp);
            }
            // Word indices into the vector file for the transferred pair.
            let (low, high) = if extra == Extra::VmovTwoSingles {
                let m = (instr.get_bits(0..=3) << 1) | instr.get_bit_as::<u32>(5);
                if m == 31 {
                    // S31 has no S32 partner.
                    return Outcome::linear().unpredictable();
                }
                (m, m + 1)
            } else {
                let m = instr.get_bits(0..=3) | (instr.get_bit_as::<u32>(5) << 4);
                (m * 2, m * 2 + 1)
            };
            let value = if rt == 15 {
                ctx.vreg_word(low)
            } else {
                ctx.vreg_word(high)
            };
            Outcome::classify(value).unpredictable()
        }
        Extra::VmovSingle => {
            let n = (instr.get_bits(16..=19) << 1) | instr.get_bit_as::<u32>(7);
            if !to_arm || rt != 15 {
                return Outcome::linear().unpredictable_if(rt == 15);
            }
            Outcome::classify(ctx.vreg_word(n)).unpredictable()
        }
        Extra::VmovFromScalar => {
            let opc1 = instr.get_bits(21..=22);
            let opc2 = instr.get_bits(5..=6);
            let unsigned = instr.get_bit(23);
            let dreg = instr.get_bits(16..=19) | (instr.get_bit_as::<u32>(7) << 4);

            let value = if opc1 & 0b10 != 0 {
                // Byte lane: index = opc1<0>:opc2
                let lane = ((opc1 & 1) << 2) | opc2;
                let byte = u32::from(ctx.vreg_byte(dreg, lane));
                if unsigned { byte } else { signed_byte(byte) as u32 }
            } else if opc2 & 1 != 0 {
                // Halfword lane: index = opc1<0>:opc2<1>
                let lane = ((opc1 & 1) << 1) | (opc2 >> 1);
                let half = (ctx.vregs[dreg as usize] >> (16 * lane)) as u16;
                if unsigned {
                    u32::from(half)
                } else {
                    signed_half(u32::from(half)) as u32
                }
            } else if opc2 == 0b10 || unsigned {
                return Outcome::UNDEFINED;
            } else {
                // Word lane: index = opc1<0>
                ctx.vreg_word(dreg * 2 + (opc1 & 1))
            };

            if rt != 15 {
                return Outcome::linear();
            }
            Outcome::classify(value).unpredictable()
        }
        Extra::VmovToScalar => {
            // opc1<1> clear with opc2 = 0b10 has no lane width.
            if !instr.get_bit(22) && instr.get_bits(5..=6) == 0b10 {
                return Outcome::UNDEFINED;
            }
            Outcome::linear()
        }
        Extra::Vdup => {
            // B:E = 1:1 is reserved.
            if instr.get_bit(22) && instr.get_bit(5) {
                return Outcome::UNDEFINED;
            }
            Outcome::linear().unpredictable_if(rt == 15)
        }
        // VMRS APSR_nzcv, FPSCR writes the flags, never the PC.
        Extra::VmrsFpscr => Outcome::linear(),
        Extra::VmrsReg => {
            if rt != 15 {
                return Outcome::linear();
            }
            match instr.get_bits(16..=19) {
                // FPSCR is the only system register the snapshot carries.
                0b0001 => Outcome::arm(ctx.fpscr).unpredictable(),
                // FPSID/MVFR*/FPEXC exist but are not modeled.
                0b0000 | 0b0110 | 0b0111 | 0b1000 => Outcome::linear().unpredictable(),
                _ => Outcome::UNDEFINED,
            }
        }
        Extra::VmsrFpscr | Extra::VmsrReg => Outcome::linear().unpredictable_if(rt == 15),
        _ => unreachable!("extra tag {extra:?} does not belong to the vector transfer family"),
    }
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
    fn data_processing_is_linear() {
        assert_eq!(
            next_address_data(0xF200_0110, Extra::VBits),
            Outcome::linear()
        );
    }

    #[test]
    fn vld1_multiple_advances_a_pc_base() {
        // VLD1.8 {d0-d3}, [PC]! — type 0b0010 (4 regs), Rm = 13
        let instr = 0xF42F_020D;
        let outcome = next_address_ldst_elem(instr, Extra::Vld1Mult, &ctx());
        // 4 registers * 8 bytes past PC+8
        assert_eq!(outcome.address(), Some(0x1008 + 32));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn vld1_without_writeback_stays_linear() {
        // Rm = 15: no writeback
        let instr = 0xF42F_020F;
        let outcome = next_address_ldst_elem(instr, Extra::Vld1Mult, &ctx());
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn vld3_with_bad_align_is_undefined() {
        // VLD3 multiple with align<1> set
        let instr = 0xF42F_0420;
        assert_eq!(
            next_address_ldst_elem(instr, Extra::Vld3Mult, &ctx()),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn vldm_writeback_on_pc_base() {
        // VLDMIA PC!, {s0-s3}: P=0 U=1 W=1, 4 words
        let instr = 0x0CBF_0A04 | 0xE000_0000;
        let outcome = next_address_ldst_ext(instr, Extra::Vldm, &ctx());
        assert_eq!(outcome.address(), Some(0x1008 + 16));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn vldm_reserved_puw_is_undefined() {
        // P=1 U=1 W=1 has no addressing mode
        let instr = 0xED7F_0A04 | (1 << 23);
        assert_eq!(
            next_address_ldst_ext(instr, Extra::Vldm, &ctx()),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn vmov_single_to_pc_reads_the_s_register() {
        // VMOV PC, S1 (Vn = 0, N = 1, op = to-ARM)
        let instr = 0xEE10_FA90;
        let mut ctx = ctx();
        ctx.vregs[0] = 0x8000_4000_0000_0000;
        let outcome = next_address_xfer(instr, Extra::VmovSingle, &ctx);
        assert_eq!(outcome.address(), Some(0x8000_4000));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn vmov_scalar_sign_extends_byte_lanes() {
        // VMOV.S8 PC, d0[7] (opc1 = 0b11, opc2 = 0b11, U = 0)
        let instr = 0xEE70_FB70;
        let mut ctx = ctx();
        ctx.vregs[0] = 0x80_00000000000000;
        let outcome = next_address_xfer(instr, Extra::VmovFromScalar, &ctx);
        assert_eq!(outcome.address(), Some(0xFFFF_FF80));
    }

    #[test]
    fn vmrs_flags_form_is_linear() {
        // VMRS APSR_nzcv, FPSCR
        assert_eq!(
            next_address_xfer(0xEEF1_FA10, Extra::VmrsFpscr, &ctx()),
            Outcome::linear()
        );
    }

    #[test]
    fn vmrs_fpscr_to_pc_reads_the_snapshot() {
        let mut ctx = ctx();
        ctx.fpscr = 0xF000_0010;
        let outcome = next_address_xfer(0xEEF1_FA10, Extra::VmrsReg, &ctx);
        assert_eq!(outcome.address(), Some(0xF000_0010));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn vdup_reserved_be_is_undefined() {
        // VDUP with B = E = 1
        let instr = 0xEEC0_0B30;
        assert_eq!(
            next_address_xfer(instr, Extra::Vdup, &ctx()),
            Outcome::UNDEFINED
        );
    }
}
