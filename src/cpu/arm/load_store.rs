//! # Single, Dual, Halfword and Exclusive Load/Store, and SWP
//!
//! Loads reach the PC two ways: the PC as transfer register Rt receives the
//! loaded value, and the PC as base register Rn receives the written-back
//! address in the indexed forms. When both would write the PC the writeback
//! wins (it is architecturally committed after the load). Stores only matter
//! through base writeback.
//!
//! Shared field layout: Rn bits 19-16, Rt bits 15-12, Rm bits 3-0;
//! P bit 24, U bit 23, W bit 21, L bit 20.

use crate::arith::{signed_byte, signed_half};
use crate::bitwise::Bits;
use crate::cpu::arm::alu::shifted_register_operand;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::{CpuContext, Memory};
use crate::cpu::cpu_modes::Mode;

/// LDR/STR word and byte, all addressing modes, including the unprivileged
/// (LDRT/STRT/LDRBT/STRBT) forms.
pub(super) fn next_address_word_byte(
    instr: u32,
    extra: Extra,
    ctx: &CpuContext,
    mem: &dyn Memory,
) -> Outcome {
    let rn = instr.get_bits(16..=19);
    let rt = instr.get_bits(12..=15);
    let p = instr.get_bit(24);
    let u = instr.get_bit(23);
    let byte = instr.get_bit(22);
    let w = instr.get_bit(21);
    let load = instr.get_bit(20);
    let wback = !p || w;

    let register_form = extra == Extra::LdstReg;
    let mut unp = wback && rn == rt;
    if register_form {
        unp |= instr.get_bits(0..=3) == 15;
    }

    if rn != 15 && rt != 15 {
        return Outcome::linear().unpredictable_if(unp);
    }

    let offset = if register_form {
        shifted_register_operand(instr, ctx)
    } else {
        instr.get_bits(0..=11)
    };
    let base = ctx.operand(rn);
    let indexed = if u {
        base.wrapping_add(offset)
    } else {
        base.wrapping_sub(offset)
    };
    let effective = if p { indexed } else { base };

    if wback && rn == 15 {
        // Base writeback lands in the PC; it overwrites any loaded value.
        return Outcome::classify(indexed).unpredictable();
    }
    if load && rt == 15 {
        let value = if byte {
            u32::from(mem.read_byte(effective))
        } else {
            mem.read_word(effective)
        };
        // LDRB into the PC is UNPREDICTABLE; plain LDR PC is a defined jump.
        return Outcome::classify(value).unpredictable_if(byte || unp);
    }
    Outcome::linear().unpredictable_if(unp)
}

/// LDRD/STRD. Rt must be even and Rt2 = Rt + 1; a transfer pair ending at
/// the PC loads it from the second word.
pub(super) fn next_address_dual(instr: u32, ctx: &CpuContext, mem: &dyn Memory) -> Outcome {
    let rn = instr.get_bits(16..=19);
    let rt = instr.get_bits(12..=15);
    let p = instr.get_bit(24);
    let u = instr.get_bit(23);
    let imm_form = instr.get_bit(22);
    let w = instr.get_bit(21);
    let store = instr.get_bit(5);
    let wback = !p || w;

    // P=0 W=1 is the unprivileged slot, which does not exist for LDRD/STRD.
    if !p && w {
        return Outcome::UNDEFINED;
    }

    let mut unp = rt & 1 != 0 || rt == 14 || (wback && (rn == rt || rn == rt + 1));
    let offset = if imm_form {
        instr.get_masked(0x0000_0F0F)
    } else {
        let rm = instr.get_bits(0..=3);
        unp |= rm == 15 || rm == rt || rm == rt + 1;
        ctx.reg(rm)
    };

    if rn != 15 && rt != 15 && rt != 14 {
        return Outcome::linear().unpredictable_if(unp);
    }

    if rn == 15 {
        // Doubleword accesses force word alignment on the PC-relative base.
        let base = ctx.operand(15) & !3;
        let indexed = if u {
            base.wrapping_add(offset)
        } else {
            base.wrapping_sub(offset)
        } & !3;
        if wback {
            return Outcome::classify(indexed).unpredictable();
        }
        if store {
            return Outcome::linear().unpredictable_if(unp);
        }
        let outcome = match rt {
            15 => Outcome::classify(mem.read_word(indexed)),
            14 => Outcome::classify(mem.read_word(indexed.wrapping_add(4))),
            _ => Outcome::linear(),
        };
        return outcome.unpredictable_if(unp);
    }

    // Rn is not the PC, so Rt or Rt2 is.
    if store {
        return Outcome::linear().unpredictable_if(unp);
    }
    let base = ctx.operand(rn);
    let address = if p {
        if u {
            base.wrapping_add(offset)
        } else {
            base.wrapping_sub(offset)
        }
    } else {
        base
    };
    let outcome = match rt {
        15 => Outcome::classify(mem.read_word(address)),
        14 => Outcome::classify(mem.read_word(address.wrapping_add(4))),
        _ => Outcome::linear(),
    };
    outcome.unpredictable_if(unp)
}

/// LDRH/STRH/LDRSB/LDRSH and their unprivileged forms; `extra` selects the
/// transfer width and extension.
pub(super) fn next_address_half_signed(
    instr: u32,
    extra: Extra,
    ctx: &CpuContext,
    mem: &dyn Memory,
) -> Outcome {
    let rn = instr.get_bits(16..=19);
    let rt = instr.get_bits(12..=15);
    let p = instr.get_bit(24);
    let u = instr.get_bit(23);
    let imm_form = instr.get_bit(22);
    let w = instr.get_bit(21);
    let load = instr.get_bit(20);
    let wback = !p || w;

    // These transfers never legally name the PC as Rt.
    let mut unp = rt == 15 || (wback && rn == rt);
    // The unprivileged forms are UNPREDICTABLE in Hyp mode.
    unp |= !p && w && ctx.mode() == Mode::Hyp;

    let offset = if imm_form {
        instr.get_masked(0x0000_0F0F)
    } else {
        let rm = instr.get_bits(0..=3);
        unp |= rm == 15;
        ctx.operand(rm)
    };

    if rn != 15 && rt != 15 {
        return Outcome::linear().unpredictable_if(unp);
    }

    let base = ctx.operand(rn);
    let indexed = if u {
        base.wrapping_add(offset)
    } else {
        base.wrapping_sub(offset)
    };
    let effective = if p { indexed } else { base };

    if wback && rn == 15 {
        return Outcome::classify(indexed).unpredictable();
    }
    if load && rt == 15 {
        let value = match extra {
            Extra::LdstHalf => u32::from(mem.read_half_word(effective)),
            Extra::LdstSignedByte => signed_byte(u32::from(mem.read_byte(effective))) as u32,
            Extra::LdstSignedHalf => signed_half(u32::from(mem.read_half_word(effective))) as u32,
            _ => unreachable!("extra tag {extra:?} does not belong to the halfword family"),
        };
        return Outcome::classify(value).unpredictable();
    }
    Outcome::linear().unpredictable_if(unp)
}

/// LDREX/STREX in all widths. Stores never branch: the status result is
/// assumed successful. Loads only matter when the transfer register pair
/// reaches the PC, which is itself UNPREDICTABLE.
pub(super) fn next_address_exclusive(
    instr: u32,
    extra: Extra,
    ctx: &CpuContext,
    mem: &dyn Memory,
) -> Outcome {
    let rn = instr.get_bits(16..=19);
    let load = matches!(
        extra,
        Extra::Ldrex | Extra::Ldrexb | Extra::Ldrexh | Extra::Ldrexd
    );

    if load {
        let rt = instr.get_bits(12..=15);
        let mut unp = rn == 15;
        if extra == Extra::Ldrexd {
            unp |= rt & 1 != 0 || rt == 14;
        }
        if rt == 15 || (extra == Extra::Ldrexd && rt == 14) {
            let base = ctx.reg(rn) & !3;
            let value = match extra {
                Extra::Ldrex => mem.read_word(base),
                Extra::Ldrexb => u32::from(mem.read_byte(base)),
                Extra::Ldrexh => u32::from(mem.read_half_word(base)),
                Extra::Ldrexd => {
                    if rt == 15 {
                        mem.read_word(base)
                    } else {
                        mem.read_word(base.wrapping_add(4))
                    }
                }
                _ => unreachable!(),
            };
            return Outcome::classify(value).unpredictable();
        }
        return Outcome::linear().unpredictable_if(unp);
    }

    // Store-exclusive: Rd (status) bits 15-12, Rt bits 3-0.
    let rd = instr.get_bits(12..=15);
    let rt = instr.get_bits(0..=3);
    let mut unp = rn == 15 || rd == 15 || rt == 15 || rd == rn || rd == rt;
    if extra == Extra::Strexd {
        unp |= rt & 1 != 0 || rt == 14 || rd == rt + 1;
    }
    Outcome::linear().unpredictable_if(unp)
}

/// SWP/SWPB. The destination receives the value previously in memory.
pub(super) fn next_address_swap(instr: u32, ctx: &CpuContext, mem: &dyn Memory) -> Outcome {
    let rn = instr.get_bits(16..=19);
    let rt = instr.get_bits(12..=15);
    let rt2 = instr.get_bits(0..=3);
    let byte = instr.get_bit(22);

    let unp = rn == 15 || rt == 15 || rt2 == 15 || rn == rt || rn == rt2;
    if rt != 15 {
        return Outcome::linear().unpredictable_if(unp);
    }
    let address = ctx.reg(rn);
    let value = if byte {
        u32::from(mem.read_byte(address))
    } else {
        mem.read_word(address)
    };
    Outcome::classify(value).unpredictable()
}
