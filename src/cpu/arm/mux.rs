//! # Multiplex Resolver
//!
//! Some decode-table rows cover several instructions whose encodings are
//! bit-identical under any mask/value test — a field *value* decides which
//! instruction it is (LSL #0 is MOV, a zero MSR mask field selects the hint
//! space, the ASIMD cmode/type fields pick between whole instruction
//! groups). This second dispatch level re-tests those fields and either
//! settles the outcome directly or delegates to a class handler with a
//! resolved tag.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::arm::{alu, vector};
use crate::cpu::context::CpuContext;
use crate::cpu::cpu_modes::Mode;

/// CPSR bits a User-mode MRS may observe (APSR: flags, Q, GE).
const CPSR_READ_MASK_USER: u32 = 0xF80F_0000;
/// CPSR bits a privileged MRS observes.
const CPSR_READ_MASK_PRIV: u32 = 0xF8FF_03DF;

pub(super) fn resolve(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    match extra {
        // LSL (imm) / MOV (reg): a zero shift amount is the plain move.
        Extra::MuxLslMov | Extra::MuxLslMovPc => {
            let pc_variant = extra == Extra::MuxLslMovPc;
            let resolved = if instr.get_bits(7..=11) == 0 {
                if pc_variant && instr.get_bit(20) {
                    Extra::RetMovPc
                } else {
                    Extra::MovReg
                }
            } else if pc_variant && instr.get_bit(20) {
                Extra::RetLslImm
            } else {
                Extra::LslImm
            };
            tracing::trace!("mux: {extra:?} -> {resolved:?}");
            alu::next_address_shift(instr, resolved, ctx)
        }
        // ROR (imm) / RRX: a zero rotate amount is RRX.
        Extra::MuxRorRrx => {
            let resolved = if instr.get_bits(7..=11) == 0 {
                Extra::RrxReg
            } else {
                Extra::RorImm
            };
            tracing::trace!("mux: {extra:?} -> {resolved:?}");
            alu::next_address_shift(instr, resolved, ctx)
        }
        Extra::MuxMrsReg => resolve_mrs(instr, ctx),
        Extra::MuxMsrReg => resolve_msr(instr, ctx),
        Extra::MuxMsrImmHints => resolve_msr_imm_hints(instr, ctx),
        // WFE/WFI share a row; both just pause the pipeline.
        Extra::MuxWfeWfi => match instr.get_bits(0..=7) {
            2 | 3 => Outcome::linear(),
            _ => Outcome::UNDEFINED,
        },
        // VBIC (imm) / VMVN (imm): cmode 0b111x1 has no meaning here.
        Extra::MuxVbicVmvn => {
            if instr.get_bits(9..=11) != 0b111 {
                Outcome::linear()
            } else {
                Outcome::UNDEFINED
            }
        }
        // VSHRN / VQSHR{U}N and the rounding pair: Vm<0> must be clear.
        Extra::MuxVshrn | Extra::MuxVrshrn => {
            if instr.get_bit(0) {
                Outcome::UNDEFINED
            } else {
                Outcome::linear()
            }
        }
        // VSHLL / VMOVL: imm3 = 0 has no encoding; either way no branch.
        Extra::MuxVshllVmovl => {
            if instr.get_bit(12) || instr.get_bits(19..=21) == 0 {
                Outcome::UNDEFINED
            } else {
                Outcome::linear()
            }
        }
        // VORR (imm) / VMOV (imm) / VSHR (imm), split on cmode and bit 7.
        Extra::MuxVorrVmovVshr => {
            if !instr.get_bit(6) || instr.get_bit(12) {
                return Outcome::UNDEFINED;
            }
            if !instr.get_bit(7) && instr.get_bits(19..=21) == 0 {
                let cmode_hi = instr.get_bits(10..=11);
                let vorr = !instr.get_bit(5) && instr.get_bit(8) && cmode_hi != 0b11;
                let vmov = !instr.get_bit(8) || cmode_hi == 0b11;
                if vorr || vmov {
                    Outcome::linear()
                } else {
                    Outcome::UNDEFINED
                }
            } else if !instr.get_bit(0) {
                // VSHR lane checks
                Outcome::linear()
            } else {
                Outcome::UNDEFINED
            }
        }
        // VORR (reg) / VMOV (reg): same-register VORR is the move.
        Extra::MuxVorrVmovReg => {
            if !instr.get_bit(16) && !instr.get_bit(12) && !instr.get_bit(0) {
                Outcome::linear()
            } else {
                Outcome::UNDEFINED
            }
        }
        // VST1-4 / VLD1-4 (multiple): the type field picks the group size.
        Extra::MuxVstType | Extra::MuxVldType => {
            let load = extra == Extra::MuxVldType;
            let resolved = match instr.get_bits(8..=11) {
                0b0010 | 0b0110 | 0b0111 | 0b1010 => {
                    if load {
                        Extra::Vld1Mult
                    } else {
                        Extra::Vst1Mult
                    }
                }
                0b0011 | 0b1000 | 0b1001 => {
                    if load {
                        Extra::Vld2Mult
                    } else {
                        Extra::Vst2Mult
                    }
                }
                0b0100 | 0b0101 => {
                    if load {
                        Extra::Vld3Mult
                    } else {
                        Extra::Vst3Mult
                    }
                }
                0b0000 | 0b0001 => {
                    if load {
                        Extra::Vld4Mult
                    } else {
                        Extra::Vst4Mult
                    }
                }
                _ => return Outcome::UNDEFINED,
            };
            tracing::trace!("mux: {extra:?} -> {resolved:?}");
            vector::next_address_ldst_elem(instr, resolved, ctx)
        }
        _ => unreachable!("extra tag {extra:?} is not a multiplexed encoding"),
    }
}

/// MRS (register): mode-dependent view of CPSR/SPSR; Rd = PC turns the
/// status read into a flagged jump.
fn resolve_mrs(instr: u32, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(12..=15);
    let spsr = instr.get_bit(22);
    let user = ctx.mode() == Mode::User;

    if rd != 15 {
        return Outcome::linear().unpredictable_if(user && spsr);
    }
    if user && spsr {
        // No SPSR to read; the PC write is anybody's guess.
        return Outcome::linear().unpredictable();
    }
    let value = if spsr {
        ctx.spsr().raw()
    } else if user {
        ctx.cpsr().raw() & CPSR_READ_MASK_USER
    } else {
        ctx.cpsr().raw() & CPSR_READ_MASK_PRIV
    };
    Outcome::arm(value).unpredictable()
}

/// MSR (register): never redirects execution; the mask field and mode decide
/// how trustworthy that is.
fn resolve_msr(instr: u32, ctx: &CpuContext) -> Outcome {
    let rn = instr.get_bits(0..=3);
    let spsr = instr.get_bit(22);
    let outcome = Outcome::linear();

    match ctx.mode() {
        Mode::User => outcome.unpredictable_if(
            spsr || instr.get_bits(18..=19) == 0 || rn == 15,
        ),
        Mode::System => {
            // The written value must keep a User/System mode encoding.
            let target_mode = ctx.reg(rn) & 0b11111;
            let bad_mode = target_mode != u32::from(Mode::User)
                && target_mode != u32::from(Mode::System);
            outcome.unpredictable_if(bad_mode || instr.get_bits(16..=19) == 0 || rn == 15)
        }
        _ => outcome.unpredictable_if(instr.get_bits(16..=19) == 0 || rn == 15),
    }
}

/// MSR (immediate) when the mask field is non-zero, otherwise the hint
/// space: NOP/YIELD/WFE/WFI/SEV are linear, DBG keeps its own nibble, the
/// rest of the space is UNDEFINED.
fn resolve_msr_imm_hints(instr: u32, ctx: &CpuContext) -> Outcome {
    if instr.get_bits(16..=19) != 0 {
        let spsr = instr.get_bit(22);
        return Outcome::linear()
            .unpredictable_if(ctx.mode().is_user_or_system() && spsr);
    }
    match instr.get_bits(0..=7) {
        0..=4 => Outcome::linear(),
        op if op & 0xF0 == 0xF0 => Outcome::linear(), // DBG #option
        op => {
            tracing::debug!("hint opcode 0x{op:02X} outside the defined space");
            Outcome::UNDEFINED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::psr::Psr;
    use pretty_assertions::assert_eq;

    fn ctx_in(mode: Mode) -> CpuContext {
        let mut ctx = CpuContext::default();
        ctx.cpsr = Psr::from(u32::from(mode));
        ctx
    }

    #[test]
    fn zero_shift_resolves_to_mov() {
        // MOV PC, R3 (shift amount 0) with R3 = 0x4000
        let instr = 0b1110_0001_1010_0000_1111_0000_0000_0011;
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.regs.set_register_at(3, 0x4000);
        assert_eq!(
            resolve(instr, Extra::MuxLslMovPc, &ctx),
            Outcome::arm(0x4000)
        );
    }

    #[test]
    fn nonzero_shift_resolves_to_lsl() {
        // LSL PC, R3, #4
        let instr = 0b1110_0001_1010_0000_1111_0010_0000_0011;
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.regs.set_register_at(3, 0x0400);
        assert_eq!(
            resolve(instr, Extra::MuxLslMovPc, &ctx),
            Outcome::arm(0x4000)
        );
    }

    #[test]
    fn mov_pc_with_s_bit_is_an_exception_return() {
        // MOVS PC, R3 in User mode -> SVC vector guess
        let instr = 0b1110_0001_1011_0000_1111_0000_0000_0011;
        let ctx = ctx_in(Mode::User);
        assert_eq!(
            resolve(instr, Extra::MuxLslMovPc, &ctx),
            Outcome::arm(0x8).unpredictable()
        );
    }

    #[test]
    fn zero_rotate_resolves_to_rrx() {
        // RRX R0, R1 — not a PC destination, linear
        let instr = 0b1110_0001_1010_0000_0000_0000_0110_0001;
        assert_eq!(
            resolve(instr, Extra::MuxRorRrx, &ctx_in(Mode::Supervisor)),
            Outcome::linear()
        );
    }

    #[test]
    fn mrs_to_pc_reads_the_masked_cpsr() {
        // MRS PC, CPSR in Supervisor mode
        let instr = 0b1110_0001_0000_1111_1111_0000_0000_0000;
        let mut ctx = ctx_in(Mode::Supervisor);
        ctx.cpsr = Psr::from(0xF000_0000 | u32::from(Mode::Supervisor));
        assert_eq!(
            resolve(instr, Extra::MuxMrsReg, &ctx),
            Outcome::arm((0xF000_0000 | u32::from(Mode::Supervisor)) & 0xF8FF_03DF)
                .unpredictable()
        );
    }

    #[test]
    fn mrs_spsr_in_user_mode_is_flagged_linear() {
        // MRS PC, SPSR in User mode
        let instr = 0b1110_0001_0100_1111_1111_0000_0000_0000;
        let outcome = resolve(instr, Extra::MuxMrsReg, &ctx_in(Mode::User));
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn msr_with_zero_mask_in_user_mode_is_flagged() {
        // MSR CPSR_(none), R0 in User mode
        let instr = 0b1110_0001_0010_0000_1111_0000_0000_0000;
        let outcome = resolve(instr, Extra::MuxMsrReg, &ctx_in(Mode::User));
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn msr_with_flags_mask_is_linear() {
        // MSR CPSR_f, R0 in Supervisor mode
        let instr = 0b1110_0001_0010_1000_1111_0000_0000_0000;
        assert_eq!(
            resolve(instr, Extra::MuxMsrReg, &ctx_in(Mode::Supervisor)),
            Outcome::linear()
        );
    }

    #[test]
    fn hint_space_nop_and_friends() {
        // MSR-immediate row with a zero mask field: hint space
        for op in 0..=4 {
            let instr = 0xE320_F000 | op;
            assert_eq!(
                resolve(instr, Extra::MuxMsrImmHints, &ctx_in(Mode::User)),
                Outcome::linear()
            );
        }
        // DBG #0
        assert_eq!(
            resolve(0xE320_F0F0, Extra::MuxMsrImmHints, &ctx_in(Mode::User)),
            Outcome::linear()
        );
        // Undefined hint
        assert_eq!(
            resolve(0xE320_F017, Extra::MuxMsrImmHints, &ctx_in(Mode::User)),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn wfe_wfi_pair() {
        assert_eq!(
            resolve(0xE320_F002, Extra::MuxWfeWfi, &ctx_in(Mode::User)),
            Outcome::linear()
        );
        assert_eq!(
            resolve(0xE320_F003, Extra::MuxWfeWfi, &ctx_in(Mode::User)),
            Outcome::linear()
        );
        assert_eq!(
            resolve(0xE320_F009, Extra::MuxWfeWfi, &ctx_in(Mode::User)),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn vector_type_field_splits_the_groups() {
        // VST with a reserved type
        let instr = 0xF40F_0B00;
        assert_eq!(
            resolve(instr, Extra::MuxVstType, &ctx_in(Mode::User)),
            Outcome::UNDEFINED
        );
    }

    #[test]
    fn vmovl_with_zero_imm3_is_undefined() {
        // imm3 (bits 21-19) = 0
        let instr = 0xF280_0A10;
        assert_eq!(
            resolve(instr, Extra::MuxVshllVmovl, &ctx_in(Mode::User)),
            Outcome::UNDEFINED
        );
    }
}
