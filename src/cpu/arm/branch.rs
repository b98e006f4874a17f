//! # Branch Instructions
//!
//! B/BL/BLX with an immediate offset, and the register forms BX/BLX/BXJ.
//!
//! The immediate forms encode a signed 24-bit word offset relative to the
//! PC read value (instruction address + 8). BLX (immediate) always switches
//! to Thumb and uses the H bit (24) as a halfword adjustment. The register
//! forms take the raw register value and select the instruction set from
//! bit 0. BXJ behaves as BX on cores without Jazelle acceleration.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

pub(super) fn next_address(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    match extra {
        Extra::BranchImm | Extra::BranchLinkImm => {
            let offset = instr.get_bits(0..=23).sign_extended(24) << 2;
            let target = ctx.operand(15).wrapping_add(offset);
            Outcome::arm(target)
        }
        Extra::BranchLinkExchangeImm => {
            // The H bit gives BLX halfword resolution on the Thumb side.
            let offset = (instr.get_bits(0..=23).sign_extended(24) << 2)
                | (instr.get_bit_as::<u32>(24) << 1);
            let target = ctx.operand(15).wrapping_add(offset);
            Outcome::thumb(target)
        }
        Extra::BranchExchangeReg | Extra::BranchLinkExchangeReg | Extra::BranchJazelleReg => {
            let rm = instr.get_bits(0..=3);
            let target = ctx.operand(rm);
            Outcome::classify(target).unpredictable_if(rm == 15)
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the branch family"),
    }
}
