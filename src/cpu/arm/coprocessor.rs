//! # Coprocessor Transfers
//!
//! MCR/MRC, MCRR/MRRC, LDC/STC, CDP and their unconditional `*2` forms.
//!
//! Coprocessor numbers 8, 9, 12 and 13 are architecturally reserved and
//! UNDEFINED regardless of the rest of the encoding. The remaining forms
//! never redirect execution from this engine's point of view; transfers
//! that name the PC or SP are flagged UNPREDICTABLE.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;

const RESERVED_COPROCS: [u32; 4] = [8, 9, 12, 13];

pub(super) fn next_address(instr: u32, extra: Extra) -> Outcome {
    let coproc = instr.get_bits(8..=11);
    if RESERVED_COPROCS.contains(&coproc) {
        return Outcome::UNDEFINED;
    }

    match extra {
        Extra::Mcrr | Extra::Mcrr2 | Extra::Mrrc | Extra::Mrrc2 => {
            let rt2 = instr.get_bits(16..=19);
            let rt = instr.get_bits(12..=15);
            let mut unp = rt == 15 || rt2 == 15;
            if matches!(extra, Extra::Mrrc | Extra::Mrrc2) {
                unp |= rt == rt2;
            }
            Outcome::linear().unpredictable_if(unp)
        }
        Extra::Mcr | Extra::Mcr2 | Extra::Mrc | Extra::Mrc2 => {
            let rt = instr.get_bits(12..=15);
            // MRC with Rt=15 writes the flags (APSR_nzcv form) — still no
            // control-flow change, but the transfer itself is flagged.
            Outcome::linear().unpredictable_if(rt == 15 || rt == 13)
        }
        Extra::Ldc | Extra::Ldc2 | Extra::LdcLit | Extra::Ldc2Lit | Extra::Stc | Extra::Stc2 => {
            // P=U=D=W=0 has no defined addressing mode.
            if instr.get_bits(21..=24) == 0 {
                return Outcome::UNDEFINED;
            }
            // Writeback targets a general register; the coprocessor data
            // path itself cannot touch the PC.
            let rn = instr.get_bits(16..=19);
            let wback = instr.get_bit(21);
            Outcome::linear().unpredictable_if(wback && rn == 15)
        }
        Extra::Cdp | Extra::Cdp2 => Outcome::linear(),
        _ => unreachable!("extra tag {extra:?} does not belong to the coprocessor family"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reserved_coprocessor_numbers_are_undefined() {
        for coproc in RESERVED_COPROCS {
            // MRC p<n>, 0, R0, c0, c0, 0
            let instr = 0xEE10_0010 | (coproc << 8);
            assert_eq!(next_address(instr, Extra::Mrc), Outcome::UNDEFINED);
        }
    }

    #[test]
    fn mrc_to_ordinary_register_is_linear() {
        // MRC p15, 0, R0, c0, c0, 0
        let instr = 0xEE10_0F10;
        assert_eq!(next_address(instr, Extra::Mrc), Outcome::linear());
    }

    #[test]
    fn mrc_to_pc_is_flagged() {
        // MRC p15, 0, PC, c0, c0, 0 (APSR_nzcv form)
        let instr = 0xEE10_FF10;
        let outcome = next_address(instr, Extra::Mrc);
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn mrrc_with_equal_targets_is_flagged() {
        // MRRC p14, 0, R3, R3, c0
        let instr = 0xEC53_3E00;
        assert!(next_address(instr, Extra::Mrrc).is_unpredictable());
    }

    #[test]
    fn ldc_without_an_addressing_mode_is_undefined() {
        // LDC p14 with P=U=D=W=0
        let instr = 0xEC10_1E00;
        assert_eq!(next_address(instr, Extra::Ldc), Outcome::UNDEFINED);
    }

    #[test]
    fn ldc_offset_form_is_linear() {
        // LDC p14, c1, [R2, #4]
        let instr = 0xED92_1E01;
        assert_eq!(next_address(instr, Extra::Ldc), Outcome::linear());
    }
}
