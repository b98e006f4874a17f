//! # Decode Table and Primary Dispatcher
//!
//! An ordered table of `(data, mask, extra, handler)` rows. Dispatch scans
//! the table in order and the **first** row whose masked bits match wins, so
//! order encodes priority: rows in the unconditional (cond = 0b1111) space
//! come first, and within a family more specific patterns precede more
//! general ones (the PC-destination rows of the data-processing ops, the
//! literal forms of LDC, the RRX reading of a zero rotate).
//!
//! The table is built once, at compile time, and never mutated. Handlers are
//! enumerated rather than stored as function pointers so the dispatch match
//! is checked for exhaustiveness by the compiler.

use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::arm::{
    alu, block_transfer, branch, coprocessor, exception, hints, load_store, misc_data, multiply,
    mux, pack, parallel, saturate, status, vector,
};
use crate::cpu::condition::Condition;
use crate::cpu::context::{CpuContext, Memory};

/// Which instruction-class handler a row delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Secondary dispatch for multiplexed encodings.
    Mux,
    Branch,
    Coproc,
    Div,
    Mac,
    MacLong,
    MiscData,
    Pack,
    Parallel,
    Saturate,
    Shift,
    AluImm,
    AluReg,
    AluRsr,
    Exception,
    WordByte,
    Dual,
    HalfSigned,
    Exclusive,
    Swap,
    BlockTransfer,
    Hints,
    Status,
    VectorData,
    VectorLdstElem,
    VectorLdstExt,
    VectorXfer,
}

/// One decode-table row: `instr & mask == data` selects it.
#[derive(Debug, Clone, Copy)]
pub struct DecodeEntry {
    pub data: u32,
    pub mask: u32,
    pub extra: Extra,
    pub handler: Handler,
}

const fn row(data: u32, mask: u32, extra: Extra, handler: Handler) -> DecodeEntry {
    DecodeEntry {
        data,
        mask,
        extra,
        handler,
    }
}

use Extra as E;
use Handler as H;

/// The ARM decode table. See the module docs for the ordering rules.
#[rustfmt::skip]
pub static DECODE_TABLE: &[DecodeEntry] = &[
    // ---- unconditional space (cond = 1111) ----
    row(0xF101_0000, 0xFFFF_FDFF, E::Setend, H::Hints),
    row(0xF100_0000, 0xFFF1_0020, E::Cps, H::Status),
    row(0xF57F_F01F, 0xFFFF_FFFF, E::Clrex, H::Hints),
    row(0xF57F_F040, 0xFFFF_FFF0, E::Dsb, H::Hints),
    row(0xF57F_F050, 0xFFFF_FFF0, E::Dmb, H::Hints),
    row(0xF57F_F060, 0xFFFF_FFF0, E::Isb, H::Hints),
    row(0xF450_F000, 0xFF70_F000, E::PliImm, H::Hints),
    row(0xF55F_F000, 0xFF7F_F000, E::PldLit, H::Hints),
    row(0xF510_F000, 0xFF30_F000, E::PldImm, H::Hints),
    row(0xF650_F000, 0xFF70_F010, E::PliReg, H::Hints),
    row(0xF710_F000, 0xFF30_F010, E::PldReg, H::Hints),
    row(0xF810_0A00, 0xFE50_FFFF, E::Rfe, H::Exception),
    row(0xF84D_0500, 0xFE5F_FFE0, E::Srs, H::Exception),
    row(0xFA00_0000, 0xFE00_0000, E::BranchLinkExchangeImm, H::Branch),
    // coprocessor, unconditional forms
    row(0xFC40_0000, 0xFFF0_0000, E::Mcrr2, H::Coproc),
    row(0xFC50_0000, 0xFFF0_0000, E::Mrrc2, H::Coproc),
    row(0xFC1F_0000, 0xFE1F_0000, E::Ldc2Lit, H::Coproc),
    row(0xFC10_0000, 0xFE10_0000, E::Ldc2, H::Coproc),
    row(0xFC00_0000, 0xFE10_0000, E::Stc2, H::Coproc),
    row(0xFE00_0010, 0xFF10_0010, E::Mcr2, H::Coproc),
    row(0xFE10_0010, 0xFF10_0010, E::Mrc2, H::Coproc),
    row(0xFE00_0000, 0xFF00_0010, E::Cdp2, H::Coproc),
    // Advanced SIMD data-processing
    row(0xF220_0110, 0xFFB0_0F10, E::MuxVorrVmovReg, H::Mux),
    row(0xF200_0110, 0xFE80_0F10, E::VBits, H::VectorData),
    row(0xF280_0030, 0xFEB8_00B0, E::MuxVbicVmvn, H::Mux),
    row(0xF280_0810, 0xFE80_0FD0, E::MuxVshrn, H::Mux),
    row(0xF280_0850, 0xFE80_0FD0, E::MuxVrshrn, H::Mux),
    row(0xF280_0A10, 0xFE80_0FD0, E::MuxVshllVmovl, H::Mux),
    row(0xF200_0810, 0xFE80_0F10, E::VComp, H::VectorData),
    row(0xF200_0910, 0xFE80_0F10, E::VMac, H::VectorData),
    row(0xF200_0800, 0xFE80_0F10, E::VPar, H::VectorData),
    row(0xF200_0410, 0xFE80_0E10, E::VShift, H::VectorData),
    row(0xF280_0010, 0xFE80_0010, E::MuxVorrVmovVshr, H::Mux),
    row(0xF200_0000, 0xFE00_0000, E::VMisc, H::VectorData),
    // Advanced SIMD element and structure load/store
    row(0xF4A0_0C00, 0xFFB0_0F00, E::Vld1All, H::VectorLdstElem),
    row(0xF4A0_0D00, 0xFFB0_0F00, E::Vld2All, H::VectorLdstElem),
    row(0xF4A0_0E00, 0xFFB0_0F00, E::Vld3All, H::VectorLdstElem),
    row(0xF4A0_0F00, 0xFFB0_0F00, E::Vld4All, H::VectorLdstElem),
    row(0xF4A0_0000, 0xFFB0_0300, E::Vld1One, H::VectorLdstElem),
    row(0xF4A0_0100, 0xFFB0_0300, E::Vld2One, H::VectorLdstElem),
    row(0xF4A0_0200, 0xFFB0_0300, E::Vld3One, H::VectorLdstElem),
    row(0xF4A0_0300, 0xFFB0_0300, E::Vld4One, H::VectorLdstElem),
    row(0xF480_0000, 0xFFB0_0300, E::Vst1One, H::VectorLdstElem),
    row(0xF480_0100, 0xFFB0_0300, E::Vst2One, H::VectorLdstElem),
    row(0xF480_0200, 0xFFB0_0300, E::Vst3One, H::VectorLdstElem),
    row(0xF480_0300, 0xFFB0_0300, E::Vst4One, H::VectorLdstElem),
    row(0xF420_0000, 0xFFB0_0000, E::MuxVldType, H::Mux),
    row(0xF400_0000, 0xFFB0_0000, E::MuxVstType, H::Mux),
    // everything else in the 1111 space is UNDEFINED; this stops the scan
    // from drifting into the wildcard-condition rows below
    row(0xF000_0000, 0xF000_0000, E::Udf, H::Exception),

    // ---- miscellaneous control space (bits 27-23 = 00010, S clear) ----
    row(0x012F_FF10, 0x0FFF_FFF0, E::BranchExchangeReg, H::Branch),
    row(0x012F_FF30, 0x0FFF_FFF0, E::BranchLinkExchangeReg, H::Branch),
    row(0x012F_FF20, 0x0FFF_FFF0, E::BranchJazelleReg, H::Branch),
    row(0x016F_0F10, 0x0FFF_0FF0, E::Clz, H::MiscData),
    row(0xE120_0070, 0xFFF0_00F0, E::Bkpt, H::Exception),
    row(0xE140_0070, 0xFFF0_00F0, E::Hvc, H::Exception),
    row(0x0160_006E, 0x0FFF_FFFF, E::Eret, H::Exception),
    row(0x0160_0070, 0x0FFF_FFF0, E::Smc, H::Exception),
    row(0x0100_0050, 0x0FF0_0FF0, E::Qadd, H::Saturate),
    row(0x0120_0050, 0x0FF0_0FF0, E::Qsub, H::Saturate),
    row(0x0140_0050, 0x0FF0_0FF0, E::Qdadd, H::Saturate),
    row(0x0160_0050, 0x0FF0_0FF0, E::Qdsub, H::Saturate),
    row(0x0100_0080, 0x0FF0_0090, E::SmlaHalf, H::Mac),
    row(0x0120_0080, 0x0FF0_00B0, E::SmlaWordHalf, H::Mac),
    row(0x0120_00A0, 0x0FF0_00B0, E::SmulWordHalf, H::Mac),
    row(0x0140_0080, 0x0FF0_0090, E::SmlalHalf, H::MacLong),
    row(0x0160_0080, 0x0FF0_0090, E::SmulHalf, H::Mac),
    row(0x010F_0000, 0x0FBF_0FFF, E::MuxMrsReg, H::Mux),
    row(0x0120_F000, 0x0FB0_FFF0, E::MuxMsrReg, H::Mux),
    row(0x0100_0200, 0x0FB0_0EFF, E::MrsBanked, H::Status),
    row(0x0120_F200, 0x0FB0_FEF0, E::MsrBanked, H::Status),
    row(0x0100_0090, 0x0FB0_0FF0, E::Swp, H::Swap),

    // ---- synchronization (bits 27-23 = 00011, bits 7-4 = 1001) ----
    row(0x0180_0F90, 0x0FF0_0FF0, E::Strex, H::Exclusive),
    row(0x0190_0F9F, 0x0FF0_0FFF, E::Ldrex, H::Exclusive),
    row(0x01A0_0F90, 0x0FF0_0FF0, E::Strexd, H::Exclusive),
    row(0x01B0_0F9F, 0x0FF0_0FFF, E::Ldrexd, H::Exclusive),
    row(0x01C0_0F90, 0x0FF0_0FF0, E::Strexb, H::Exclusive),
    row(0x01D0_0F9F, 0x0FF0_0FFF, E::Ldrexb, H::Exclusive),
    row(0x01E0_0F90, 0x0FF0_0FF0, E::Strexh, H::Exclusive),
    row(0x01F0_0F9F, 0x0FF0_0FFF, E::Ldrexh, H::Exclusive),

    // ---- multiply (bits 27-24 = 0000, bits 7-4 = 1001) ----
    row(0x0000_0090, 0x0FE0_00F0, E::Mul, H::Mac),
    row(0x0020_0090, 0x0FE0_00F0, E::Mla, H::Mac),
    row(0x0040_0090, 0x0FF0_00F0, E::Umaal, H::MacLong),
    row(0x0060_0090, 0x0FF0_00F0, E::Mls, H::Mac),
    row(0x0080_0090, 0x0FE0_00F0, E::Umull, H::MacLong),
    row(0x00A0_0090, 0x0FE0_00F0, E::Umlal, H::MacLong),
    row(0x00C0_0090, 0x0FE0_00F0, E::Smull, H::MacLong),
    row(0x00E0_0090, 0x0FE0_00F0, E::Smlal, H::MacLong),

    // ---- halfword, signed and dual transfers (bit 7 = 1, bit 4 = 1) ----
    row(0x0040_00D0, 0x0E50_00F0, E::LdstDual, H::Dual),
    row(0x0000_00D0, 0x0E50_00F0, E::LdstDual, H::Dual),
    row(0x0040_00F0, 0x0E50_00F0, E::LdstDual, H::Dual),
    row(0x0000_00F0, 0x0E50_00F0, E::LdstDual, H::Dual),
    row(0x0050_00B0, 0x0E50_00F0, E::LdstHalf, H::HalfSigned),
    row(0x0010_00B0, 0x0E50_00F0, E::LdstHalf, H::HalfSigned),
    row(0x0040_00B0, 0x0E50_00F0, E::LdstHalf, H::HalfSigned),
    row(0x0000_00B0, 0x0E50_00F0, E::LdstHalf, H::HalfSigned),
    row(0x0050_00D0, 0x0E50_00F0, E::LdstSignedByte, H::HalfSigned),
    row(0x0010_00D0, 0x0E50_00F0, E::LdstSignedByte, H::HalfSigned),
    row(0x0050_00F0, 0x0E50_00F0, E::LdstSignedHalf, H::HalfSigned),
    row(0x0010_00F0, 0x0E50_00F0, E::LdstSignedHalf, H::HalfSigned),

    // ---- data-processing specials ----
    row(0x0300_0000, 0x0FF0_0000, E::Movw, H::MiscData),
    row(0x0340_0000, 0x0FF0_0000, E::Movt, H::MiscData),
    row(0x0320_F004, 0x0FFF_FFFF, E::Sev, H::Hints),
    row(0x0320_F0F0, 0x0FFF_FFF0, E::Dbg, H::Hints),
    row(0x0320_0000, 0x0FB0_0000, E::MuxMsrImmHints, H::Mux),
    row(0x028F_0000, 0x0FFF_0000, E::AdrAdd, H::AluImm),
    row(0x024F_0000, 0x0FFF_0000, E::AdrSub, H::AluImm),
    // shift/rotate family (op 1101); PC rows first, zero-amount cases are
    // multiplexed with MOV and RRX
    row(0x01A0_F000, 0x0FEF_F070, E::MuxLslMovPc, H::Mux),
    row(0x01A0_0000, 0x0FEF_0070, E::MuxLslMov, H::Mux),
    row(0x01A0_0010, 0x0FEF_00F0, E::LslReg, H::Shift),
    row(0x01A0_F020, 0x0FEF_F070, E::RetLsrImm, H::Shift),
    row(0x01A0_0020, 0x0FEF_0070, E::LsrImm, H::Shift),
    row(0x01A0_0030, 0x0FEF_00F0, E::LsrReg, H::Shift),
    row(0x01A0_F040, 0x0FEF_F070, E::RetAsrImm, H::Shift),
    row(0x01A0_0040, 0x0FEF_0070, E::AsrImm, H::Shift),
    row(0x01A0_0050, 0x0FEF_00F0, E::AsrReg, H::Shift),
    row(0x01A0_F060, 0x0FEF_FFF0, E::RetRrxPc, H::Shift),
    row(0x01A0_F060, 0x0FEF_F070, E::RetRorImm, H::Shift),
    row(0x01A0_0060, 0x0FEF_0070, E::MuxRorRrx, H::Mux),
    row(0x01A0_0070, 0x0FEF_00F0, E::RorReg, H::Shift),

    // ---- media: parallel add/subtract ----
    row(0x0610_0F10, 0x0FF0_0FF0, E::Sadd16, H::Parallel),
    row(0x0610_0F30, 0x0FF0_0FF0, E::Sasx, H::Parallel),
    row(0x0610_0F50, 0x0FF0_0FF0, E::Ssax, H::Parallel),
    row(0x0610_0F70, 0x0FF0_0FF0, E::Ssub16, H::Parallel),
    row(0x0610_0F90, 0x0FF0_0FF0, E::Sadd8, H::Parallel),
    row(0x0610_0FF0, 0x0FF0_0FF0, E::Ssub8, H::Parallel),
    row(0x0620_0F10, 0x0FF0_0FF0, E::Qadd16, H::Parallel),
    row(0x0620_0F30, 0x0FF0_0FF0, E::Qasx, H::Parallel),
    row(0x0620_0F50, 0x0FF0_0FF0, E::Qsax, H::Parallel),
    row(0x0620_0F70, 0x0FF0_0FF0, E::Qsub16, H::Parallel),
    row(0x0620_0F90, 0x0FF0_0FF0, E::Qadd8, H::Parallel),
    row(0x0620_0FF0, 0x0FF0_0FF0, E::Qsub8, H::Parallel),
    row(0x0630_0F10, 0x0FF0_0FF0, E::Shadd16, H::Parallel),
    row(0x0630_0F30, 0x0FF0_0FF0, E::Shasx, H::Parallel),
    row(0x0630_0F50, 0x0FF0_0FF0, E::Shsax, H::Parallel),
    row(0x0630_0F70, 0x0FF0_0FF0, E::Shsub16, H::Parallel),
    row(0x0630_0F90, 0x0FF0_0FF0, E::Shadd8, H::Parallel),
    row(0x0630_0FF0, 0x0FF0_0FF0, E::Shsub8, H::Parallel),
    row(0x0650_0F10, 0x0FF0_0FF0, E::Uadd16, H::Parallel),
    row(0x0650_0F30, 0x0FF0_0FF0, E::Uasx, H::Parallel),
    row(0x0650_0F50, 0x0FF0_0FF0, E::Usax, H::Parallel),
    row(0x0650_0F70, 0x0FF0_0FF0, E::Usub16, H::Parallel),
    row(0x0650_0F90, 0x0FF0_0FF0, E::Uadd8, H::Parallel),
    row(0x0650_0FF0, 0x0FF0_0FF0, E::Usub8, H::Parallel),
    row(0x0660_0F10, 0x0FF0_0FF0, E::Uqadd16, H::Parallel),
    row(0x0660_0F30, 0x0FF0_0FF0, E::Uqasx, H::Parallel),
    row(0x0660_0F50, 0x0FF0_0FF0, E::Uqsax, H::Parallel),
    row(0x0660_0F70, 0x0FF0_0FF0, E::Uqsub16, H::Parallel),
    row(0x0660_0F90, 0x0FF0_0FF0, E::Uqadd8, H::Parallel),
    row(0x0660_0FF0, 0x0FF0_0FF0, E::Uqsub8, H::Parallel),
    row(0x0670_0F10, 0x0FF0_0FF0, E::Uhadd16, H::Parallel),
    row(0x0670_0F30, 0x0FF0_0FF0, E::Uhasx, H::Parallel),
    row(0x0670_0F50, 0x0FF0_0FF0, E::Uhsax, H::Parallel),
    row(0x0670_0F70, 0x0FF0_0FF0, E::Uhsub16, H::Parallel),
    row(0x0670_0F90, 0x0FF0_0FF0, E::Uhadd8, H::Parallel),
    row(0x0670_0FF0, 0x0FF0_0FF0, E::Uhsub8, H::Parallel),

    // ---- media: pack, extend, select, reverse, saturate ----
    row(0x0680_0FB0, 0x0FF0_0FF0, E::Sel, H::MiscData),
    row(0x0680_0010, 0x0FF0_0030, E::Pkh, H::Pack),
    row(0x068F_0070, 0x0FFF_03F0, E::Sxtb16, H::Pack),
    row(0x0680_0070, 0x0FF0_03F0, E::Sxtab16, H::Pack),
    row(0x06AF_0070, 0x0FFF_03F0, E::Sxtb, H::Pack),
    row(0x06A0_0070, 0x0FF0_03F0, E::Sxtab, H::Pack),
    row(0x06BF_0070, 0x0FFF_03F0, E::Sxth, H::Pack),
    row(0x06B0_0070, 0x0FF0_03F0, E::Sxtah, H::Pack),
    row(0x06CF_0070, 0x0FFF_03F0, E::Uxtb16, H::Pack),
    row(0x06C0_0070, 0x0FF0_03F0, E::Uxtab16, H::Pack),
    row(0x06EF_0070, 0x0FFF_03F0, E::Uxtb, H::Pack),
    row(0x06E0_0070, 0x0FF0_03F0, E::Uxtab, H::Pack),
    row(0x06FF_0070, 0x0FFF_03F0, E::Uxth, H::Pack),
    row(0x06F0_0070, 0x0FF0_03F0, E::Uxtah, H::Pack),
    row(0x06BF_0F30, 0x0FFF_0FF0, E::Rev, H::MiscData),
    row(0x06BF_0FB0, 0x0FFF_0FF0, E::Rev16, H::MiscData),
    row(0x06FF_0F30, 0x0FFF_0FF0, E::Rbit, H::MiscData),
    row(0x06FF_0FB0, 0x0FFF_0FF0, E::Revsh, H::MiscData),
    row(0x06A0_0F30, 0x0FF0_0FF0, E::Ssat16, H::Saturate),
    row(0x06A0_0010, 0x0FE0_0030, E::Ssat, H::Saturate),
    row(0x06E0_0F30, 0x0FF0_0FF0, E::Usat16, H::Saturate),
    row(0x06E0_0030, 0x0FE0_0030, E::Usat, H::Saturate),

    // ---- media: signed multiplies, divides, bitfields ----
    row(0xE7F0_00F0, 0xFFF0_00F0, E::Udf, H::Exception),
    row(0x0700_F010, 0x0FF0_F0D0, E::Smuad, H::Mac),
    row(0x0700_F050, 0x0FF0_F0D0, E::Smusd, H::Mac),
    row(0x0700_0010, 0x0FF0_00D0, E::Smlad, H::Mac),
    row(0x0700_0050, 0x0FF0_00D0, E::Smlsd, H::Mac),
    row(0x0710_F010, 0x0FF0_F0F0, E::Sdiv, H::Div),
    row(0x0730_F010, 0x0FF0_F0F0, E::Udiv, H::Div),
    row(0x0740_0010, 0x0FF0_00D0, E::Smlald, H::MacLong),
    row(0x0740_0050, 0x0FF0_00D0, E::Smlsld, H::MacLong),
    row(0x0750_F010, 0x0FF0_F0D0, E::Smmul, H::Mac),
    row(0x0750_0010, 0x0FF0_00D0, E::Smmla, H::Mac),
    row(0x0750_00D0, 0x0FF0_00D0, E::Smmls, H::Mac),
    row(0x0780_F010, 0x0FF0_F0F0, E::Usad8, H::MiscData),
    row(0x0780_0010, 0x0FF0_00F0, E::Usada8, H::MiscData),
    row(0x07A0_0050, 0x0FE0_0070, E::Sbfx, H::MiscData),
    row(0x07C0_001F, 0x0FE0_007F, E::Bfc, H::MiscData),
    row(0x07C0_0010, 0x0FE0_0070, E::Bfi, H::MiscData),
    row(0x07E0_0050, 0x0FE0_0070, E::Ubfx, H::MiscData),

    // ---- single-register PUSH/POP, then the general load/store space ----
    row(0x049D_0004, 0x0FFF_0FFF, E::PopReg, H::BlockTransfer),
    row(0x052D_0004, 0x0FFF_0FFF, E::PushReg, H::BlockTransfer),
    row(0x0400_0000, 0x0E00_0000, E::LdstImm, H::WordByte),
    row(0x0600_0000, 0x0E00_0010, E::LdstReg, H::WordByte),

    // ---- block transfer and branch ----
    row(0x0800_0000, 0x0E00_0000, E::Ldstm, H::BlockTransfer),
    row(0x0A00_0000, 0x0F00_0000, E::BranchImm, H::Branch),
    row(0x0B00_0000, 0x0F00_0000, E::BranchLinkImm, H::Branch),

    // ---- VFP/ASIMD through the coprocessor space (coproc 10/11) ----
    row(0x0C40_0A10, 0x0FE0_0FD0, E::VmovTwoSingles, H::VectorXfer),
    row(0x0C40_0B10, 0x0FE0_0FD0, E::VmovDoubleword, H::VectorXfer),
    row(0x0D2D_0A00, 0x0FBF_0E00, E::Vpush, H::VectorLdstExt),
    row(0x0CBD_0A00, 0x0FBF_0E00, E::Vpop, H::VectorLdstExt),
    row(0x0D10_0A00, 0x0F30_0E00, E::Vldr, H::VectorLdstExt),
    row(0x0D00_0A00, 0x0F30_0E00, E::Vstr, H::VectorLdstExt),
    row(0x0C10_0A00, 0x0E10_0E00, E::Vldm, H::VectorLdstExt),
    row(0x0C00_0A00, 0x0E10_0E00, E::Vstm, H::VectorLdstExt),
    row(0x0EF1_0A10, 0x0FFF_0FFF, E::VmrsFpscr, H::VectorXfer),
    row(0x0EF0_0A10, 0x0FF0_0FFF, E::VmrsReg, H::VectorXfer),
    row(0x0EE1_0A10, 0x0FFF_0FFF, E::VmsrFpscr, H::VectorXfer),
    row(0x0EE0_0A10, 0x0FF0_0FFF, E::VmsrReg, H::VectorXfer),
    row(0x0E00_0A10, 0x0FE0_0F70, E::VmovSingle, H::VectorXfer),
    row(0x0E80_0B10, 0x0F90_0F50, E::Vdup, H::VectorXfer),
    row(0x0E10_0B10, 0x0F10_0F10, E::VmovFromScalar, H::VectorXfer),
    row(0x0E00_0B10, 0x0F90_0F10, E::VmovToScalar, H::VectorXfer),
    row(0x0E00_0A00, 0x0F00_0E10, E::FpData, H::VectorData),

    // ---- generic coprocessor ----
    row(0x0C40_0000, 0x0FF0_0000, E::Mcrr, H::Coproc),
    row(0x0C50_0000, 0x0FF0_0000, E::Mrrc, H::Coproc),
    row(0x0C1F_0000, 0x0E1F_0000, E::LdcLit, H::Coproc),
    row(0x0C10_0000, 0x0E10_0000, E::Ldc, H::Coproc),
    row(0x0C00_0000, 0x0E10_0000, E::Stc, H::Coproc),
    row(0x0E00_0010, 0x0F10_0010, E::Mcr, H::Coproc),
    row(0x0E10_0010, 0x0F10_0010, E::Mrc, H::Coproc),
    row(0x0E00_0000, 0x0F00_0010, E::Cdp, H::Coproc),

    // ---- data-processing, most general masks last ----
    // AND
    row(0x0200_F000, 0x0FE0_F000, E::RetAndImm, H::AluImm),
    row(0x0200_0000, 0x0FE0_0000, E::AndImm, H::AluImm),
    row(0x0000_F000, 0x0FE0_F010, E::RetAndReg, H::AluReg),
    row(0x0000_0000, 0x0FE0_0010, E::AndReg, H::AluReg),
    row(0x0000_0010, 0x0FE0_0090, E::AndRsr, H::AluRsr),
    // EOR
    row(0x0220_F000, 0x0FE0_F000, E::RetEorImm, H::AluImm),
    row(0x0220_0000, 0x0FE0_0000, E::EorImm, H::AluImm),
    row(0x0020_F000, 0x0FE0_F010, E::RetEorReg, H::AluReg),
    row(0x0020_0000, 0x0FE0_0010, E::EorReg, H::AluReg),
    row(0x0020_0010, 0x0FE0_0090, E::EorRsr, H::AluRsr),
    // SUB
    row(0x0240_F000, 0x0FE0_F000, E::RetSubImm, H::AluImm),
    row(0x0240_0000, 0x0FE0_0000, E::SubImm, H::AluImm),
    row(0x0040_F000, 0x0FE0_F010, E::RetSubReg, H::AluReg),
    row(0x0040_0000, 0x0FE0_0010, E::SubReg, H::AluReg),
    row(0x0040_0010, 0x0FE0_0090, E::SubRsr, H::AluRsr),
    // RSB
    row(0x0260_F000, 0x0FE0_F000, E::RetRsbImm, H::AluImm),
    row(0x0260_0000, 0x0FE0_0000, E::RsbImm, H::AluImm),
    row(0x0060_F000, 0x0FE0_F010, E::RetRsbReg, H::AluReg),
    row(0x0060_0000, 0x0FE0_0010, E::RsbReg, H::AluReg),
    row(0x0060_0010, 0x0FE0_0090, E::RsbRsr, H::AluRsr),
    // ADD
    row(0x0280_F000, 0x0FE0_F000, E::RetAddImm, H::AluImm),
    row(0x0280_0000, 0x0FE0_0000, E::AddImm, H::AluImm),
    row(0x0080_F000, 0x0FE0_F010, E::RetAddReg, H::AluReg),
    row(0x0080_0000, 0x0FE0_0010, E::AddReg, H::AluReg),
    row(0x0080_0010, 0x0FE0_0090, E::AddRsr, H::AluRsr),
    // ADC
    row(0x02A0_F000, 0x0FE0_F000, E::RetAdcImm, H::AluImm),
    row(0x02A0_0000, 0x0FE0_0000, E::AdcImm, H::AluImm),
    row(0x00A0_F000, 0x0FE0_F010, E::RetAdcReg, H::AluReg),
    row(0x00A0_0000, 0x0FE0_0010, E::AdcReg, H::AluReg),
    row(0x00A0_0010, 0x0FE0_0090, E::AdcRsr, H::AluRsr),
    // SBC
    row(0x02C0_F000, 0x0FE0_F000, E::RetSbcImm, H::AluImm),
    row(0x02C0_0000, 0x0FE0_0000, E::SbcImm, H::AluImm),
    row(0x00C0_F000, 0x0FE0_F010, E::RetSbcReg, H::AluReg),
    row(0x00C0_0000, 0x0FE0_0010, E::SbcReg, H::AluReg),
    row(0x00C0_0010, 0x0FE0_0090, E::SbcRsr, H::AluRsr),
    // RSC
    row(0x02E0_F000, 0x0FE0_F000, E::RetRscImm, H::AluImm),
    row(0x02E0_0000, 0x0FE0_0000, E::RscImm, H::AluImm),
    row(0x00E0_F000, 0x0FE0_F010, E::RetRscReg, H::AluReg),
    row(0x00E0_0000, 0x0FE0_0010, E::RscReg, H::AluReg),
    row(0x00E0_0010, 0x0FE0_0090, E::RscRsr, H::AluRsr),
    // TST/TEQ/CMP/CMN (S always set; no destination)
    row(0x0310_0000, 0x0FF0_0000, E::TstImm, H::AluImm),
    row(0x0110_0000, 0x0FF0_0010, E::TstReg, H::AluReg),
    row(0x0110_0010, 0x0FF0_0090, E::TstRsr, H::AluRsr),
    row(0x0330_0000, 0x0FF0_0000, E::TeqImm, H::AluImm),
    row(0x0130_0000, 0x0FF0_0010, E::TeqReg, H::AluReg),
    row(0x0130_0010, 0x0FF0_0090, E::TeqRsr, H::AluRsr),
    row(0x0350_0000, 0x0FF0_0000, E::CmpImm, H::AluImm),
    row(0x0150_0000, 0x0FF0_0010, E::CmpReg, H::AluReg),
    row(0x0150_0010, 0x0FF0_0090, E::CmpRsr, H::AluRsr),
    row(0x0370_0000, 0x0FF0_0000, E::CmnImm, H::AluImm),
    row(0x0170_0000, 0x0FF0_0010, E::CmnReg, H::AluReg),
    row(0x0170_0010, 0x0FF0_0090, E::CmnRsr, H::AluRsr),
    // ORR
    row(0x0380_F000, 0x0FE0_F000, E::RetOrrImm, H::AluImm),
    row(0x0380_0000, 0x0FE0_0000, E::OrrImm, H::AluImm),
    row(0x0180_F000, 0x0FE0_F010, E::RetOrrReg, H::AluReg),
    row(0x0180_0000, 0x0FE0_0010, E::OrrReg, H::AluReg),
    row(0x0180_0010, 0x0FE0_0090, E::OrrRsr, H::AluRsr),
    // MOV (immediate; the register form is the shift family above)
    row(0x03A0_F000, 0x0FE0_F000, E::RetMovImm, H::AluImm),
    row(0x03A0_0000, 0x0FE0_0000, E::MovImm, H::AluImm),
    // BIC
    row(0x03C0_F000, 0x0FE0_F000, E::RetBicImm, H::AluImm),
    row(0x03C0_0000, 0x0FE0_0000, E::BicImm, H::AluImm),
    row(0x01C0_F000, 0x0FE0_F010, E::RetBicReg, H::AluReg),
    row(0x01C0_0000, 0x0FE0_0010, E::BicReg, H::AluReg),
    row(0x01C0_0010, 0x0FE0_0090, E::BicRsr, H::AluRsr),
    // MVN
    row(0x03E0_F000, 0x0FE0_F000, E::RetMvnImm, H::AluImm),
    row(0x03E0_0000, 0x0FE0_0000, E::MvnImm, H::AluImm),
    row(0x01E0_F000, 0x0FE0_F010, E::RetMvnReg, H::AluReg),
    row(0x01E0_0000, 0x0FE0_0010, E::MvnReg, H::AluReg),
    row(0x01E0_0010, 0x0FE0_0090, E::MvnRsr, H::AluRsr),

    // ---- supervisor call ----
    row(0x0F00_0000, 0x0F00_0000, E::Svc, H::Exception),
];

/// Predicts every address execution can legally reach after the instruction
/// at the context's PC.
///
/// The condition field is evaluated first: a failing condition means the
/// instruction has no effect, so the outcome is `Linear` no matter what the
/// encoding would otherwise do. Then the decode table is scanned in order;
/// no match means the encoding is UNDEFINED.
pub fn dispatch(instr: u32, ctx: &CpuContext, mem: &dyn Memory) -> Outcome {
    let condition = Condition::from(instr.get_bits(28..=31) as u8);
    if !ctx.cpsr().can_execute(condition) {
        return Outcome::linear();
    }

    for (index, entry) in DECODE_TABLE.iter().enumerate() {
        if instr & entry.mask == entry.data {
            tracing::trace!(
                "decode table hit: index {index}, instr 0x{instr:08X}, mask 0x{:08X}, data 0x{:08X}, extra {:?}",
                entry.mask,
                entry.data,
                entry.extra,
            );
            return run(entry, instr, ctx, mem);
        }
    }
    tracing::debug!("no decode table row matches 0x{instr:08X}");
    Outcome::UNDEFINED
}

fn run(entry: &DecodeEntry, instr: u32, ctx: &CpuContext, mem: &dyn Memory) -> Outcome {
    let extra = entry.extra;
    match entry.handler {
        Handler::Mux => mux::resolve(instr, extra, ctx),
        Handler::Branch => branch::next_address(instr, extra, ctx),
        Handler::Coproc => coprocessor::next_address(instr, extra),
        Handler::Div => multiply::next_address_div(instr, extra, ctx),
        Handler::Mac => multiply::next_address_mac(instr, extra, ctx),
        Handler::MacLong => multiply::next_address_mac_long(instr, extra, ctx),
        Handler::MiscData => misc_data::next_address(instr, extra, ctx),
        Handler::Pack => pack::next_address(instr, extra, ctx),
        Handler::Parallel => parallel::next_address(instr, extra, ctx),
        Handler::Saturate => saturate::next_address(instr, extra, ctx),
        Handler::Shift => alu::next_address_shift(instr, extra, ctx),
        Handler::AluImm => alu::next_address_imm(instr, extra, ctx),
        Handler::AluReg => alu::next_address_reg(instr, extra, ctx),
        Handler::AluRsr => alu::next_address_rsr(instr, extra, ctx),
        Handler::Exception => exception::next_address(instr, extra, ctx, mem),
        Handler::WordByte => load_store::next_address_word_byte(instr, extra, ctx, mem),
        Handler::Dual => load_store::next_address_dual(instr, ctx, mem),
        Handler::HalfSigned => load_store::next_address_half_signed(instr, extra, ctx, mem),
        Handler::Exclusive => load_store::next_address_exclusive(instr, extra, ctx, mem),
        Handler::Swap => load_store::next_address_swap(instr, ctx, mem),
        Handler::BlockTransfer => block_transfer::next_address(instr, extra, ctx, mem),
        Handler::Hints => hints::next_address(instr, extra),
        Handler::Status => status::next_address(instr, extra, ctx),
        Handler::VectorData => vector::next_address_data(instr, extra),
        Handler::VectorLdstElem => vector::next_address_ldst_elem(instr, extra, ctx),
        Handler::VectorLdstExt => vector::next_address_ldst_ext(instr, extra, ctx),
        Handler::VectorXfer => vector::next_address_xfer(instr, extra, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::context::testing::TestBus;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::psr::Psr;
    use pretty_assertions::assert_eq;

    fn ctx_at(pc: u32) -> CpuContext {
        let mut ctx = CpuContext::default();
        ctx.cpsr = Psr::from(u32::from(Mode::Supervisor));
        ctx.regs.set_register_at(15, pc);
        ctx
    }

    /// Every row must only fix bits its mask actually covers.
    #[test]
    fn rows_are_well_formed() {
        for (index, entry) in DECODE_TABLE.iter().enumerate() {
            assert_eq!(
                entry.data & !entry.mask,
                0,
                "row {index} ({:?}) fixes bits outside its mask",
                entry.extra
            );
        }
    }

    #[test]
    fn branch_forward_scenario() {
        // B #+32 words at PC = 0x1000
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        assert_eq!(
            dispatch(0xEA00_0008, &ctx, &bus),
            Outcome::arm(0x1000 + 8 + 32)
        );
    }

    #[test]
    fn mov_pc_lr_scenario() {
        // MOV PC, LR with LR = 0x2001 -> Thumb target, bit 0 stripped
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(14, 0x2001);
        let bus = TestBus::default();
        assert_eq!(dispatch(0xE1A0_F00E, &ctx, &bus), Outcome::thumb(0x2000));
    }

    #[test]
    fn sdiv_by_zero_scenario() {
        // SDIV PC, R0, R1 with R1 = 0 -> quotient forced to zero
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(0, 1234);
        ctx.regs.set_register_at(1, 0);
        let bus = TestBus::default();
        assert_eq!(dispatch(0xE71F_F110, &ctx, &bus), Outcome::arm(0));
    }

    #[test]
    fn ldm_with_pc_scenario() {
        // LDMIA R0, {R1, PC}: PC comes from the second slot
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(0, 0x8000);
        let bus = TestBus::with_words(&[(0x8000, 1), (0x8004, 0x0000_5000)]);
        assert_eq!(dispatch(0xE890_8002, &ctx, &bus), Outcome::arm(0x5000));

        // A misaligned loaded value is flagged
        let bus = TestBus::with_words(&[(0x8000, 1), (0x8004, 0x0000_5002)]);
        let outcome = dispatch(0xE890_8002, &ctx, &bus);
        assert_eq!(outcome.address(), Some(0x5002));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn reserved_coprocessor_scenario() {
        // MCR/MRC/LDC against coprocessors 8, 9, 12, 13 are UNDEFINED
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        for coproc in [8, 9, 12, 13] {
            let mrc = 0xEE10_0010 | (coproc << 8);
            assert_eq!(dispatch(mrc, &ctx, &bus), Outcome::UNDEFINED);
            let ldc = 0xED90_0000 | (coproc << 8);
            assert_eq!(dispatch(ldc, &ctx, &bus), Outcome::UNDEFINED);
        }
    }

    #[test]
    fn msr_in_user_mode_scenario() {
        // MSR CPSR, R0 with a zero mask field in User mode
        let mut ctx = ctx_at(0x1000);
        ctx.cpsr = Psr::from(u32::from(Mode::User));
        let bus = TestBus::default();
        let outcome = dispatch(0xE120_F000, &ctx, &bus);
        assert!(outcome.is_linear());
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn condition_failure_dominates() {
        // BEQ with Z clear: linear, whatever the offset says
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        assert_eq!(dispatch(0x0A00_0008, &ctx, &bus), Outcome::linear());
        // Even an otherwise-UNDEFINED encoding is skipped
        assert_eq!(dispatch(0x0710_0110, &ctx, &bus), Outcome::linear());
    }

    #[test]
    fn condition_pass_executes() {
        let mut ctx = ctx_at(0x1000);
        ctx.cpsr = Psr::from((1 << 30) | u32::from(Mode::Supervisor)); // Z set
        let bus = TestBus::default();
        assert_eq!(
            dispatch(0x0A00_0008, &ctx, &bus),
            Outcome::arm(0x1000 + 8 + 32)
        );
    }

    #[test]
    fn unmatched_encoding_is_undefined() {
        // A hole in the media space
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        assert_eq!(dispatch(0xE610_0010, &ctx, &bus), Outcome::UNDEFINED);
    }

    #[test]
    fn undefined_space_in_uncond_region_stays_undefined() {
        // An arbitrary unallocated 0b1111 encoding must not fall into the
        // wildcard-condition rows
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        assert_eq!(dispatch(0xF000_0000, &ctx, &bus), Outcome::UNDEFINED);
    }

    #[test]
    fn dispatch_is_deterministic() {
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(0, 0x8000);
        let bus = TestBus::with_words(&[(0x8000, 0x1234)]);
        let first = dispatch(0xE890_8001, &ctx, &bus);
        let second = dispatch(0xE890_8001, &ctx, &bus);
        assert_eq!(first, second);
    }

    #[test]
    fn first_match_wins_for_ror_rrx() {
        // ROR PC, R0 with a zero amount is RRX; with a non-zero amount ROR
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(0, 0x10);
        ctx.cpsr = Psr::from((1 << 29) | u32::from(Mode::Supervisor));
        let bus = TestBus::default();
        // RRX PC, R0: carry lands in bit 31
        assert_eq!(
            dispatch(0xE1A0_F060, &ctx, &bus),
            Outcome::arm(0x8000_0008)
        );
        // ROR PC, R1, #4
        ctx.regs.set_register_at(1, 0x40);
        assert_eq!(dispatch(0xE1A0_F261, &ctx, &bus), Outcome::arm(0x4));
    }

    #[test]
    fn blx_immediate_switches_to_thumb() {
        let ctx = ctx_at(0x1000);
        let bus = TestBus::default();
        // BLX #+8 (H = 0)
        assert_eq!(dispatch(0xFA00_0002, &ctx, &bus), Outcome::thumb(0x1010));
    }

    #[test]
    fn bx_register_scenario() {
        let mut ctx = ctx_at(0x1000);
        ctx.regs.set_register_at(2, 0x4001);
        let bus = TestBus::default();
        assert_eq!(dispatch(0xE12F_FF12, &ctx, &bus), Outcome::thumb(0x4000));
    }

    #[test]
    fn table_is_exposed_for_inspection() {
        assert!(decode_table().len() > 200);
    }
}

/// Read-only view of the decode table, for the monitor's dump commands.
#[must_use]
pub fn decode_table() -> &'static [DecodeEntry] {
    DECODE_TABLE
}
