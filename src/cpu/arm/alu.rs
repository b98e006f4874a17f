//! # Data-Processing Instructions
//!
//! The three operand-2 encodings (rotated immediate, register shifted by an
//! immediate, register shifted by a register) and the shift/rotate family
//! that shares the MOV opcode slot.
//!
//! Only a PC destination can change control flow. A PC destination with the
//! S bit set is not a flag-setting operation but an **exception return**:
//! CPSR is restored from SPSR and the computed value becomes the new PC,
//! with legality gated by the current mode.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;
use crate::cpu::cpu_modes::Mode;

/// Where a privilege-violating exception return is guessed to trap.
const SVC_VECTOR: u32 = 0x8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AluOp {
    And,
    Eor,
    Sub,
    Rsb,
    Add,
    Adc,
    Sbc,
    Rsc,
    Tst,
    Teq,
    Cmp,
    Cmn,
    Orr,
    Mov,
    Bic,
    Mvn,
}

impl AluOp {
    const fn is_test(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    fn apply(self, a: u32, b: u32, carry: u32) -> u32 {
        match self {
            Self::And | Self::Tst => a & b,
            Self::Eor | Self::Teq => a ^ b,
            Self::Sub | Self::Cmp => a.wrapping_sub(b),
            Self::Rsb => b.wrapping_sub(a),
            Self::Add | Self::Cmn => a.wrapping_add(b),
            Self::Adc => a.wrapping_add(b).wrapping_add(carry),
            Self::Sbc => a.wrapping_add(!b).wrapping_add(carry),
            Self::Rsc => (!a).wrapping_add(b).wrapping_add(carry),
            Self::Orr => a | b,
            Self::Mov => b,
            Self::Bic => a & !b,
            Self::Mvn => !b,
        }
    }
}

/// Exception return: CPSR←SPSR, PC←result. User/System have no SPSR, so the
/// privilege violation is guessed to trap through the SVC vector; Hyp mode
/// makes these encodings UNDEFINED. Otherwise SPSR's T bit selects the
/// instruction set of the return target.
pub(super) fn exception_return(ctx: &CpuContext, result: u32) -> Outcome {
    match ctx.mode() {
        Mode::User | Mode::System => Outcome::arm(SVC_VECTOR).unpredictable(),
        Mode::Hyp => Outcome::UNDEFINED,
        _ => {
            if ctx.spsr().state_bit() {
                Outcome::thumb(result)
            } else {
                Outcome::arm(result & !3)
            }
        }
    }
}

fn finish(instr: u32, ctx: &CpuContext, result: u32) -> Outcome {
    if instr.get_bit(20) {
        exception_return(ctx, result)
    } else {
        Outcome::classify(result)
    }
}

/// Operand 2 for the register-shifted-by-immediate forms, including the
/// LSR/ASR #32 and RRX readings of a zero shift amount. The load/store
/// register-offset forms use the same encoding.
pub(super) fn shifted_register_operand(instr: u32, ctx: &CpuContext) -> u32 {
    let rm = instr.get_bits(0..=3);
    let value = ctx.operand(rm);
    let amount = instr.get_bits(7..=11);
    match instr.get_bits(5..=6) {
        0b00 => value << amount,
        // LSR #0 encodes LSR #32
        0b01 => {
            if amount == 0 {
                0
            } else {
                value >> amount
            }
        }
        // ASR #0 encodes ASR #32
        0b10 => {
            let amount = if amount == 0 { 31 } else { amount };
            ((value as i32) >> amount) as u32
        }
        // ROR #0 encodes RRX
        0b11 => {
            if amount == 0 {
                (value >> 1) | (ctx.carry() << 31)
            } else {
                value.rotate_right(amount)
            }
        }
        _ => unreachable!(),
    }
}

fn imm_op(extra: Extra) -> Option<AluOp> {
    use Extra::{
        AdcImm, AddImm, AndImm, BicImm, CmnImm, CmpImm, EorImm, MovImm, MvnImm, OrrImm, RetAdcImm,
        RetAddImm, RetAndImm, RetBicImm, RetEorImm, RetMovImm, RetMvnImm, RetOrrImm, RetRsbImm,
        RetRscImm, RetSbcImm, RetSubImm, RsbImm, RscImm, SbcImm, SubImm, TeqImm, TstImm,
    };
    Some(match extra {
        AndImm | RetAndImm => AluOp::And,
        EorImm | RetEorImm => AluOp::Eor,
        SubImm | RetSubImm => AluOp::Sub,
        RsbImm | RetRsbImm => AluOp::Rsb,
        AddImm | RetAddImm => AluOp::Add,
        AdcImm | RetAdcImm => AluOp::Adc,
        SbcImm | RetSbcImm => AluOp::Sbc,
        RscImm | RetRscImm => AluOp::Rsc,
        TstImm => AluOp::Tst,
        TeqImm => AluOp::Teq,
        CmpImm => AluOp::Cmp,
        CmnImm => AluOp::Cmn,
        OrrImm | RetOrrImm => AluOp::Orr,
        MovImm | RetMovImm => AluOp::Mov,
        BicImm | RetBicImm => AluOp::Bic,
        MvnImm | RetMvnImm => AluOp::Mvn,
        _ => return None,
    })
}

fn reg_op(extra: Extra) -> Option<AluOp> {
    use Extra::{
        AdcReg, AddReg, AndReg, BicReg, CmnReg, CmpReg, EorReg, MvnReg, OrrReg, RetAdcReg,
        RetAddReg, RetAndReg, RetBicReg, RetEorReg, RetMvnReg, RetOrrReg, RetRsbReg, RetRscReg,
        RetSbcReg, RetSubReg, RsbReg, RscReg, SbcReg, SubReg, TeqReg, TstReg,
    };
    Some(match extra {
        AndReg | RetAndReg => AluOp::And,
        EorReg | RetEorReg => AluOp::Eor,
        SubReg | RetSubReg => AluOp::Sub,
        RsbReg | RetRsbReg => AluOp::Rsb,
        AddReg | RetAddReg => AluOp::Add,
        AdcReg | RetAdcReg => AluOp::Adc,
        SbcReg | RetSbcReg => AluOp::Sbc,
        RscReg | RetRscReg => AluOp::Rsc,
        TstReg => AluOp::Tst,
        TeqReg => AluOp::Teq,
        CmpReg => AluOp::Cmp,
        CmnReg => AluOp::Cmn,
        OrrReg | RetOrrReg => AluOp::Orr,
        BicReg | RetBicReg => AluOp::Bic,
        MvnReg | RetMvnReg => AluOp::Mvn,
        _ => return None,
    })
}

fn rsr_op(extra: Extra) -> Option<AluOp> {
    use Extra::{
        AdcRsr, AddRsr, AndRsr, BicRsr, CmnRsr, CmpRsr, EorRsr, MvnRsr, OrrRsr, RsbRsr, RscRsr,
        SbcRsr, SubRsr, TeqRsr, TstRsr,
    };
    Some(match extra {
        AndRsr => AluOp::And,
        EorRsr => AluOp::Eor,
        SubRsr => AluOp::Sub,
        RsbRsr => AluOp::Rsb,
        AddRsr => AluOp::Add,
        AdcRsr => AluOp::Adc,
        SbcRsr => AluOp::Sbc,
        RscRsr => AluOp::Rsc,
        TstRsr => AluOp::Tst,
        TeqRsr => AluOp::Teq,
        CmpRsr => AluOp::Cmp,
        CmnRsr => AluOp::Cmn,
        OrrRsr => AluOp::Orr,
        BicRsr => AluOp::Bic,
        MvnRsr => AluOp::Mvn,
        _ => return None,
    })
}

/// Data-processing with a rotated 8-bit immediate, plus the ADR forms.
pub(super) fn next_address_imm(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let imm = instr.get_bits(0..=7);
    let rot = instr.get_bits(8..=11) * 2;
    let op2 = imm.rotate_right(rot);

    if matches!(extra, Extra::AdrAdd | Extra::AdrSub) {
        let rd = instr.get_bits(12..=15);
        if rd != 15 {
            return Outcome::linear();
        }
        let base = ctx.operand(15) & !3;
        let target = if extra == Extra::AdrAdd {
            base.wrapping_add(op2)
        } else {
            base.wrapping_sub(op2)
        };
        return Outcome::classify(target);
    }

    let op =
        imm_op(extra).unwrap_or_else(|| unreachable!("{extra:?} is not an immediate ALU tag"));
    if op.is_test() {
        return Outcome::linear();
    }
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let a = ctx.operand(instr.get_bits(16..=19));
    finish(instr, ctx, op.apply(a, op2, ctx.carry()))
}

/// Data-processing with a register operand 2 shifted by an immediate.
pub(super) fn next_address_reg(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let op = reg_op(extra).unwrap_or_else(|| unreachable!("{extra:?} is not a register ALU tag"));
    if op.is_test() {
        return Outcome::linear();
    }
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let a = ctx.operand(instr.get_bits(16..=19));
    let b = shifted_register_operand(instr, ctx);
    finish(instr, ctx, op.apply(a, b, ctx.carry()))
}

/// Data-processing with a register operand 2 shifted by a register.
/// A PC destination is UNPREDICTABLE here; the computed value is still the
/// best guess for the jump target.
pub(super) fn next_address_rsr(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let op = rsr_op(extra)
        .unwrap_or_else(|| unreachable!("{extra:?} is not a register-shifted ALU tag"));
    if op.is_test() {
        return Outcome::linear();
    }
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let a = ctx.operand(instr.get_bits(16..=19));
    let value = ctx.operand(instr.get_bits(0..=3));
    let amount = ctx.operand(instr.get_bits(8..=11)) & 0x1F;
    let b = if amount == 0 {
        value
    } else {
        match instr.get_bits(5..=6) {
            0b00 => value << amount,
            0b01 => value >> amount,
            0b10 => ((value as i32) >> amount) as u32,
            0b11 => value.rotate_right(amount),
            _ => unreachable!(),
        }
    };
    Outcome::classify(op.apply(a, b, ctx.carry())).unpredictable()
}

/// The MOV/shift/rotate family (data-processing opcode 0b1101), after the
/// mux has resolved the shared encodings into concrete tags.
pub(super) fn next_address_shift(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let value = ctx.operand(instr.get_bits(0..=3));
    let imm = instr.get_bits(7..=11);
    use Extra::{
        AsrImm, AsrReg, LslImm, LslReg, LsrImm, LsrReg, MovReg, RetAsrImm, RetLslImm, RetLsrImm,
        RetMovPc, RetRorImm, RetRrxPc, RorImm, RorReg, RrxReg,
    };
    let result = match extra {
        MovReg | RetMovPc => value,
        LslImm | RetLslImm => value << imm,
        // LSR #0 encodes LSR #32
        LsrImm | RetLsrImm => {
            if imm == 0 {
                0
            } else {
                value >> imm
            }
        }
        // ASR #0 encodes ASR #32
        AsrImm | RetAsrImm => {
            let amount = if imm == 0 { 31 } else { imm };
            ((value as i32) >> amount) as u32
        }
        RorImm | RetRorImm => value.rotate_right(imm),
        RrxReg | RetRrxPc => (value >> 1) | (ctx.carry() << 31),
        LslReg | LsrReg | AsrReg | RorReg => {
            let amount = ctx.operand(instr.get_bits(8..=11));
            let result = match extra {
                LslReg => {
                    if amount > 31 {
                        0
                    } else {
                        value << amount
                    }
                }
                LsrReg => {
                    if amount > 31 {
                        0
                    } else {
                        value >> amount
                    }
                }
                AsrReg => ((value as i32) >> (amount & 0x1F)) as u32,
                RorReg => value.rotate_right(amount & 0x1F),
                _ => unreachable!(),
            };
            // Shift-by-register can never write the PC architecturally.
            return Outcome::classify(result).unpredictable();
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the shift family"),
    };
    finish(instr, ctx, result)
}
