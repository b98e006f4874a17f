//! # Block Data Transfer
//!
//! LDM/STM in all four address modes, the user-bank and exception-return
//! forms (S bit), and the single-register PUSH/POP encodings that live in
//! the single-transfer space.
//!
//! Bits 24-20 are B (before), I (increment), S (user bank / CPSR restore),
//! W (writeback), L (load). A load whose register list includes the PC takes
//! the value from the list's final slot; writeback to a PC base is evaluated
//! only when the PC is not separately loaded.

use crate::bitwise::Bits;
use crate::cpu::arm::alu::exception_return;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::{CpuContext, Memory};
use crate::cpu::cpu_modes::Mode;

/// Address of the slot the PC occupies in the transfer, given base value,
/// B/I bits and the number of listed registers. The PC is always the
/// highest-numbered register, so it sits at the highest address.
fn pc_slot_address(base: u32, before: bool, increment: bool, count: u32) -> u32 {
    match (before, increment) {
        // IA: base .. base + 4*(count-1)
        (false, true) => base.wrapping_add(4 * (count - 1)),
        // IB: base + 4 .. base + 4*count
        (true, true) => base.wrapping_add(4 * count),
        // DA: base - 4*(count-1) .. base
        (false, false) => base,
        // DB: base - 4*count .. base - 4
        (true, false) => base.wrapping_sub(4),
    }
}

pub(super) fn next_address(
    instr: u32,
    extra: Extra,
    ctx: &CpuContext,
    mem: &dyn Memory,
) -> Outcome {
    match extra {
        Extra::PopReg => {
            // LDR Rt, [SP], #4
            let rt = instr.get_bits(12..=15);
            if rt == 15 {
                let sp = ctx.reg(13);
                return Outcome::classify(mem.read_word(sp));
            }
            Outcome::linear().unpredictable_if(rt == 13)
        }
        Extra::PushReg => {
            // STR Rt, [SP, #-4]!
            let rt = instr.get_bits(12..=15);
            Outcome::linear().unpredictable_if(rt == 13)
        }
        Extra::Ldstm => next_address_multiple(instr, ctx, mem),
        _ => unreachable!("extra tag {extra:?} does not belong to the block transfer family"),
    }
}

fn next_address_multiple(instr: u32, ctx: &CpuContext, mem: &dyn Memory) -> Outcome {
    let before = instr.get_bit(24);
    let increment = instr.get_bit(23);
    let user_or_return = instr.get_bit(22);
    let wback = instr.get_bit(21);
    let load = instr.get_bit(20);
    let rn = instr.get_bits(16..=19);
    let count = instr.get_bits(0..=15).count_ones();

    let mut unp = rn == 15 || count == 0;
    // SP misuse: SP in the list of a stack operation, or a one-register
    // PUSH/POP spelled as LDM/STM.
    unp |= rn == 13 && (instr.get_bit(13) || count < 2);

    let pc_loaded = load && instr.get_bit(15);
    // The S bit selects the user bank unless this is a PC-loading LDM, where
    // it requests the CPSR restore of an exception return.
    let user_bank = user_or_return && !pc_loaded;

    let outcome = if pc_loaded && !(wback && rn == 15) {
        let base = ctx.operand(rn);
        let loaded = mem.read_word(pc_slot_address(base, before, increment, count));
        if user_or_return {
            exception_return(ctx, loaded)
        } else {
            Outcome::classify(loaded)
        }
    } else if wback && rn == 15 {
        // Writeback overwrites any value popped into the PC.
        let base = ctx.operand(15);
        let written = if increment {
            base.wrapping_add(4 * count)
        } else {
            base.wrapping_sub(4 * count)
        };
        Outcome::classify(written)
    } else {
        Outcome::linear()
    };

    // User-bank transfers are UNPREDICTABLE outside exception modes and
    // UNDEFINED in Hyp; UNDEFINED dominates the unpredictable markings.
    if user_bank || (user_or_return && pc_loaded) {
        if ctx.mode() == Mode::Hyp {
            return Outcome::UNDEFINED;
        }
        unp |= user_bank && ctx.mode().is_user_or_system();
    }

    outcome.unpredictable_if(unp)
}
