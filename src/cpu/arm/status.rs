//! # Status-Register Transfer: CPS and the Banked MSR/MRS Forms
//!
//! None of these change control flow directly, but the legality matrix over
//! current mode, security state and the addressed bank decides between a
//! plain linear outcome and an UNPREDICTABLE one — and a banked MRS with a
//! PC destination hands the banked value to the PC.
//!
//! The plain MSR/MRS register forms are multiplexed encodings and live in
//! the [mux](super::mux); this module owns CPS and the SYSm-addressed forms.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;
use crate::cpu::cpu_modes::Mode;

/// A banked register selected by the SYSm field: a general register of a
/// specific mode bank, or that mode's SPSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BankedRegister {
    Reg { mode: Mode, index: u32 },
    Spsr(Mode),
}

/// Decodes SYSm (bits 19-16 and the R-extension bit 8) into the addressed
/// bank. Returns `None` for the reserved slots, which are UNPREDICTABLE.
fn decode_sysm(instr: u32) -> Option<BankedRegister> {
    let sysm = instr.get_bits(16..=19) | (instr.get_bit_as::<u32>(8) << 4);
    let code = sysm & 0b111;
    let spsr = instr.get_bit(22);

    let (mode, index) = match sysm.get_bits(3..=4) {
        // 0b00xxx: User R8-R14
        0b00 => (Mode::User, code + 8),
        // 0b01xxx: FIQ R8-R14
        0b01 => (Mode::Fiq, code + 8),
        // 0b10xxx: LR/SP pairs of IRQ, SVC, ABT, UND
        0b10 => {
            let mode = match code >> 1 {
                0 => Mode::Irq,
                1 => Mode::Supervisor,
                2 => Mode::Abort,
                _ => Mode::Undefined,
            };
            (mode, if code & 1 == 0 { 14 } else { 13 })
        }
        // 0b11xxx: Monitor and Hyp
        0b11 => match code {
            4 => (Mode::Monitor, 14),
            5 => (Mode::Monitor, 13),
            6 => (Mode::Hyp, 14),
            7 => (Mode::Hyp, 13),
            _ => return None,
        },
        _ => unreachable!(),
    };
    if index == 15 {
        return None;
    }
    if spsr {
        if index != 14 {
            return None;
        }
        return Some(BankedRegister::Spsr(mode));
    }
    Some(BankedRegister::Reg { mode, index })
}

fn banked_value(ctx: &CpuContext, banked: BankedRegister) -> u32 {
    match banked {
        BankedRegister::Spsr(mode) => ctx.bank.spsr(mode).unwrap_or_default().raw(),
        BankedRegister::Reg { mode, index } => match index {
            13 => ctx.bank.sp(mode),
            14 => ctx.bank.lr(mode),
            8..=12 => {
                if mode == Mode::Fiq {
                    ctx.bank.fiq_reg(index)
                } else {
                    ctx.reg(index)
                }
            }
            _ => unreachable!("SYSm never selects R{index}"),
        },
    }
}

/// Whether the current mode may touch the addressed bank at all. Accessing
/// the current mode's own bank through SYSm, Hyp's bank from elsewhere, or
/// Monitor/FIQ banks from the wrong security state is UNPREDICTABLE.
fn banked_access_violation(ctx: &CpuContext, target: Mode) -> bool {
    let current = ctx.mode();
    if current == Mode::User {
        return true;
    }
    if target == current {
        return true;
    }
    match target {
        Mode::Hyp => current != Mode::Monitor,
        Mode::Monitor => current != Mode::Monitor && !ctx.secure,
        Mode::Fiq => !ctx.secure && ctx.nsacr.get_bit(19),
        _ => false,
    }
}

fn next_address_cps(instr: u32, ctx: &CpuContext) -> Outcome {
    // CPS never redirects execution; everything below only grades the guess.
    let outcome = Outcome::linear();
    if ctx.mode() == Mode::User {
        // NOP from user code.
        return outcome;
    }

    let mode_field = instr.get_bits(0..=4);
    let change_mode = instr.get_bit(17);
    let imod = instr.get_bits(18..=19);
    if (!change_mode && mode_field != 0) || imod == 0b01 || (imod == 0 && !change_mode) {
        return outcome.unpredictable();
    }
    // imod<1> set requires mask bits, and mask bits require imod<1>.
    let masks = instr.get_bits(6..=8);
    if instr.get_bit(19) != (masks != 0) {
        return outcome.unpredictable();
    }

    if change_mode {
        let violation = match Mode::try_from(mode_field) {
            Ok(Mode::Monitor) => !ctx.secure,
            Ok(Mode::Fiq) => !ctx.secure && ctx.nsacr.get_bit(19),
            Ok(Mode::Hyp) => {
                if ctx.mode() == Mode::Monitor {
                    !ctx.scr.get_bit(0)
                } else {
                    ctx.mode() != Mode::Hyp
                }
            }
            Ok(_) => false,
            Err(reason) => {
                tracing::debug!("CPS to invalid mode 0b{mode_field:05b}: {reason}");
                true
            }
        };
        return outcome.unpredictable_if(violation);
    }
    outcome
}

pub(super) fn next_address(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    match extra {
        Extra::Cps => next_address_cps(instr, ctx),
        Extra::MsrBanked | Extra::MrsBanked => {
            let Some(banked) = decode_sysm(instr) else {
                return Outcome::linear().unpredictable();
            };
            let target = match banked {
                BankedRegister::Reg { mode, .. } | BankedRegister::Spsr(mode) => mode,
            };
            if banked_access_violation(ctx, target) {
                return Outcome::linear().unpredictable();
            }
            if extra == Extra::MsrBanked {
                return Outcome::linear();
            }
            let rd = instr.get_bits(12..=15);
            if rd == 15 {
                // The banked value lands in the PC. A status-style read, so
                // no Thumb classification games: report it as an ARM target.
                return Outcome::arm(banked_value(ctx, banked)).unpredictable();
            }
            Outcome::linear()
        }
        _ => unreachable!("extra tag {extra:?} does not belong to the status family"),
    }
}
