//! # Hints, Barriers and Preload
//!
//! SEV/DBG (the hint sub-space rows that need no mux), SETEND, CLREX and the
//! DMB/DSB/ISB barriers, plus the PLD/PLI preload family. None of these
//! redirect execution; PLD/PLI with bad register choices are flagged.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;

pub(super) fn next_address(instr: u32, extra: Extra) -> Outcome {
    match extra {
        Extra::Sev
        | Extra::Dbg
        | Extra::Setend
        | Extra::Clrex
        | Extra::Dmb
        | Extra::Dsb
        | Extra::Isb
        | Extra::PldImm
        | Extra::PldLit
        | Extra::PliImm => Outcome::linear(),
        Extra::PldReg => {
            // PLDW (R clear) has no literal form, so Rn=PC makes no sense.
            let pldw = !instr.get_bit(22);
            let unp =
                (pldw && instr.get_bits(16..=19) == 15) || instr.get_bits(0..=3) == 15;
            Outcome::linear().unpredictable_if(unp)
        }
        Extra::PliReg => Outcome::linear().unpredictable_if(instr.get_bits(0..=3) == 15),
        _ => unreachable!("extra tag {extra:?} does not belong to the hint family"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn barriers_are_linear() {
        assert_eq!(next_address(0xF57F_F04F, Extra::Dsb), Outcome::linear());
        assert_eq!(next_address(0xF57F_F05F, Extra::Dmb), Outcome::linear());
        assert_eq!(next_address(0xF57F_F06F, Extra::Isb), Outcome::linear());
        assert_eq!(next_address(0xF57F_F01F, Extra::Clrex), Outcome::linear());
    }

    #[test]
    fn pld_literal_is_linear() {
        // PLD [PC, #16]
        assert_eq!(next_address(0xF55F_F010, Extra::PldLit), Outcome::linear());
    }

    #[test]
    fn pld_register_with_pc_offset_is_flagged() {
        // PLD [R0, PC]
        let outcome = next_address(0xF750_F00F, Extra::PldReg);
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }
}
