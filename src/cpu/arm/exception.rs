//! # Exception Generation and Return
//!
//! SVC/HVC/SMC/BKPT/UDF, ERET, and the exception-frame pair RFE/SRS.
//!
//! The monitor single-steps *through* software exceptions: taking the trap
//! would land in the monitor's own handlers, so SVC/HVC/SMC/BKPT are
//! deliberately reported as linear where they are legal — the vector is not
//! modeled. Mode and security gating still decides where an encoding is
//! UNDEFINED instead.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::{CpuContext, Memory};
use crate::cpu::cpu_modes::Mode;

/// SCR.HCE, Hyp Call enable.
const SCR_HCE: u8 = 8;
/// SCR.SCD, Secure Monitor Call disable.
const SCR_SCD: u8 = 7;
/// HCR.TSC, trap SMC to Hyp.
const HCR_TSC: u8 = 19;
/// NSACR.RFR, FIQ bank reserved for secure state.
const NSACR_RFR: u8 = 19;

pub(super) fn next_address(
    instr: u32,
    extra: Extra,
    ctx: &CpuContext,
    mem: &dyn Memory,
) -> Outcome {
    match extra {
        // Trap routing (HCR.TGE) changes the vector, not the fact that the
        // stepped program resumes behind the call.
        Extra::Svc => Outcome::linear(),
        Extra::Bkpt => Outcome::linear(),
        Extra::Hvc => {
            if ctx.secure || ctx.mode() == Mode::User {
                return Outcome::UNDEFINED;
            }
            if !ctx.scr.get_bit(SCR_HCE) {
                return Outcome::UNDEFINED;
            }
            Outcome::linear()
        }
        Extra::Smc => {
            if ctx.mode() == Mode::User {
                return Outcome::UNDEFINED;
            }
            if ctx.hcr.get_bit(HCR_TSC) && !ctx.secure {
                return Outcome::linear();
            }
            if ctx.scr.get_bit(SCR_SCD) && !ctx.secure {
                return Outcome::UNDEFINED;
            }
            Outcome::linear()
        }
        Extra::Udf => Outcome::UNDEFINED,
        Extra::Eret => match ctx.mode() {
            // ELR_hyp is the return target; Hyp single-stepping itself is
            // not supported, so the guess is flagged.
            Mode::Hyp => Outcome::arm(ctx.bank.elr_hyp).unpredictable(),
            Mode::User | Mode::System => Outcome::UNDEFINED,
            _ => {
                let lr = ctx.reg(14);
                if ctx.spsr().state_bit() {
                    Outcome::thumb(lr)
                } else {
                    Outcome::arm(lr & !3)
                }
            }
        },
        Extra::Rfe => {
            if ctx.mode() == Mode::Hyp {
                return Outcome::UNDEFINED;
            }
            let rn = instr.get_bits(16..=19);
            let base = ctx.reg(rn);
            let increment = instr.get_bit(23);
            let wordhigher = instr.get_bit(24) == increment;
            let mut address = if increment { base } else { base.wrapping_sub(8) };
            if wordhigher {
                address = address.wrapping_add(4);
            }
            let new_pc = mem.read_word(address);
            let saved_psr = mem.read_word(address.wrapping_add(4));
            let outcome = if saved_psr.get_bit(5) {
                Outcome::thumb(new_pc)
            } else {
                Outcome::arm(new_pc & !3)
            };
            outcome.unpredictable_if(rn == 15)
        }
        Extra::Srs => {
            if ctx.mode() == Mode::Hyp {
                return Outcome::UNDEFINED;
            }
            let mut unp = ctx.mode().is_user_or_system();
            unp |= instr.get_bits(0..=4) == u32::from(Mode::Hyp);
            unp |= ctx.mode() == Mode::Monitor && !ctx.secure;
            unp |= ctx.mode() == Mode::Fiq && !ctx.secure && ctx.nsacr.get_bit(NSACR_RFR);
            Outcome::linear().unpredictable_if(unp)
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the exception family"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::context::testing::TestBus;
    use crate::cpu::psr::Psr;
    use pretty_assertions::assert_eq;

    fn ctx_in(mode: Mode) -> CpuContext {
        let mut ctx = CpuContext::default();
        ctx.cpsr = Psr::from(u32::from(mode));
        ctx
    }

    const SVC: u32 = 0xEF00_0001;

    #[test]
    fn svc_is_stepped_linearly() {
        let bus = TestBus::default();
        assert_eq!(
            next_address(SVC, Extra::Svc, &ctx_in(Mode::User), &bus),
            Outcome::linear()
        );
    }

    #[test]
    fn hvc_from_secure_state_is_undefined() {
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.secure = true;
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xE140_0070, Extra::Hvc, &ctx, &bus),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn hvc_needs_the_enable_bit() {
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.secure = false;
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xE140_0070, Extra::Hvc, &ctx, &bus),
            Outcome::UNDEFINED
        );
        ctx.scr = 1 << 8;
        assert_eq!(
            next_address(0xE140_0070, Extra::Hvc, &ctx, &bus),
            Outcome::linear()
        );
    }

    #[test]
    fn smc_from_user_is_undefined() {
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xE160_0070, Extra::Smc, &ctx_in(Mode::User), &bus),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn eret_outside_an_exception_mode_is_undefined() {
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xE160_006E, Extra::Eret, &ctx_in(Mode::User), &bus),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn eret_returns_through_lr() {
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.regs.set_register_at(14, 0x8004);
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xE160_006E, Extra::Eret, &ctx, &bus),
            Outcome::arm(0x8004)
        );
    }

    #[test]
    fn rfe_reads_the_saved_pc_and_state() {
        // RFEIA R0 (P=0, U=1): PC at [R0], PSR at [R0+4]
        let instr = 0xF8B0_0A00 | (0 << 16);
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.regs.set_register_at(0, 0x9000);
        let bus = TestBus::with_words(&[(0x9000, 0x4000), (0x9004, 1 << 5)]);
        assert_eq!(
            next_address(instr, Extra::Rfe, &ctx, &bus),
            Outcome::thumb(0x4000)
        );
    }

    #[test]
    fn rfe_in_hyp_mode_is_undefined() {
        let bus = TestBus::default();
        assert_eq!(
            next_address(0xF8B0_0A00, Extra::Rfe, &ctx_in(Mode::Hyp), &bus),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn srs_from_user_is_flagged() {
        let bus = TestBus::default();
        let outcome = next_address(0xF84D_0513, Extra::Srs, &ctx_in(Mode::User), &bus);
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }
}
