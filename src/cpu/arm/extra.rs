//! # Decode Tags
//!
//! Every decode-table row carries an [`Extra`] tag. Most tags name the exact
//! instruction variant the row matched; the `Mux*` tags mark multiplexed
//! encodings — bit patterns shared by several instructions — which the
//! [resolver](super::mux) narrows down with further field tests before
//! delegating to a class handler with a resolved tag.
//!
//! The set is closed: extending the instruction set means adding tags and
//! table rows, never changing the meaning of existing ones.

use serde::{Deserialize, Serialize};

/// Decode-table row tag. Grouped by the handler family that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extra {
    // ---- multiplexed encodings, resolved by the mux ----
    /// VBIC (imm) / VMVN (imm), split on cmode.
    MuxVbicVmvn,
    /// WFE / WFI hint pair.
    MuxWfeWfi,
    /// VSHRN / VQSHR{U}N (imm).
    MuxVshrn,
    /// VRSHRN / VQRSHR{U}N (imm).
    MuxVrshrn,
    /// VSHLL / VMOVL, split on the imm3 field.
    MuxVshllVmovl,
    /// VORR (imm) / VMOV (imm) / VSHR (imm), split on cmode and bit 7.
    MuxVorrVmovVshr,
    /// VORR (reg) / VMOV (reg), same-register forms.
    MuxVorrVmovReg,
    /// LSL (imm) / MOV (reg), split on the shift amount.
    MuxLslMov,
    /// LSL (imm) / MOV (reg) with PC destination; S=1 is an exception return.
    MuxLslMovPc,
    /// ROR (imm) / RRX, split on the shift amount.
    MuxRorRrx,
    /// MSR (register), mode-dependent legality.
    MuxMsrReg,
    /// MRS (register), mode-dependent legality.
    MuxMrsReg,
    /// MSR (immediate) / hint space (NOP/YIELD/WFE/WFI/SEV/DBG).
    MuxMsrImmHints,
    /// VST1-4 (multiple structures), split on the type field.
    MuxVstType,
    /// VLD1-4 (multiple structures), split on the type field.
    MuxVldType,

    // ---- branch ----
    BranchImm,
    BranchLinkImm,
    BranchLinkExchangeImm,
    BranchExchangeReg,
    BranchLinkExchangeReg,
    BranchJazelleReg,

    // ---- coprocessor ----
    Mcrr,
    Mcrr2,
    Mcr,
    Mcr2,
    Mrrc,
    Mrrc2,
    Mrc,
    Mrc2,
    Ldc,
    Ldc2,
    LdcLit,
    Ldc2Lit,
    Stc,
    Stc2,
    Cdp,
    Cdp2,

    // ---- divide ----
    Sdiv,
    Udiv,

    // ---- 32-bit multiply / multiply-accumulate ----
    Mul,
    Mla,
    Mls,
    SmulHalf,
    SmlaHalf,
    SmulWordHalf,
    SmlaWordHalf,
    Smmul,
    Smmla,
    Smmls,
    Smuad,
    Smusd,
    Smlad,
    Smlsd,

    // ---- 64-bit multiply-accumulate ----
    SmlalHalf,
    Smlal,
    Smull,
    Umaal,
    Umlal,
    Umull,
    Smlald,
    Smlsld,

    // ---- miscellaneous data-processing ----
    Movw,
    Movt,
    Clz,
    Bfc,
    Bfi,
    Rbit,
    Rev,
    Rev16,
    Revsh,
    Sbfx,
    Ubfx,
    Sel,
    Usad8,
    Usada8,

    // ---- pack / extend ----
    Pkh,
    Sxtb,
    Sxtb16,
    Sxth,
    Sxtab,
    Sxtab16,
    Sxtah,
    Uxtb,
    Uxtb16,
    Uxth,
    Uxtab,
    Uxtab16,
    Uxtah,

    // ---- parallel add/subtract ----
    Sadd16,
    Ssub16,
    Sasx,
    Ssax,
    Sadd8,
    Ssub8,
    Qadd16,
    Qsub16,
    Qasx,
    Qsax,
    Qadd8,
    Qsub8,
    Shadd16,
    Shsub16,
    Shasx,
    Shsax,
    Shadd8,
    Shsub8,
    Uadd16,
    Usub16,
    Uasx,
    Usax,
    Uadd8,
    Usub8,
    Uqadd16,
    Uqsub16,
    Uqasx,
    Uqsax,
    Uqadd8,
    Uqsub8,
    Uhadd16,
    Uhsub16,
    Uhasx,
    Uhsax,
    Uhadd8,
    Uhsub8,

    // ---- saturating ----
    Qadd,
    Qsub,
    Qdadd,
    Qdsub,
    Ssat,
    Ssat16,
    Usat,
    Usat16,

    // ---- shift/rotate and register move (data-processing op 0b1101) ----
    /// MOV (register), resolved from [`Extra::MuxLslMov`].
    MovReg,
    /// MOV with PC destination and S=1: exception return.
    RetMovPc,
    LslImm,
    RetLslImm,
    LsrImm,
    RetLsrImm,
    AsrImm,
    RetAsrImm,
    /// ROR (imm), resolved from [`Extra::MuxRorRrx`].
    RorImm,
    RetRorImm,
    /// RRX, resolved from [`Extra::MuxRorRrx`].
    RrxReg,
    RetRrxPc,
    LslReg,
    LsrReg,
    AsrReg,
    RorReg,

    // ---- data-processing, register-shifted operand 2 ----
    AndReg,
    EorReg,
    SubReg,
    RsbReg,
    AddReg,
    AdcReg,
    SbcReg,
    RscReg,
    TstReg,
    TeqReg,
    CmpReg,
    CmnReg,
    OrrReg,
    BicReg,
    MvnReg,
    RetAndReg,
    RetEorReg,
    RetSubReg,
    RetRsbReg,
    RetAddReg,
    RetAdcReg,
    RetSbcReg,
    RetRscReg,
    RetOrrReg,
    RetBicReg,
    RetMvnReg,

    // ---- data-processing, register-shifted-by-register operand 2 ----
    AndRsr,
    EorRsr,
    SubRsr,
    RsbRsr,
    AddRsr,
    AdcRsr,
    SbcRsr,
    RscRsr,
    TstRsr,
    TeqRsr,
    CmpRsr,
    CmnRsr,
    OrrRsr,
    BicRsr,
    MvnRsr,

    // ---- data-processing, immediate operand 2 ----
    AndImm,
    EorImm,
    SubImm,
    RsbImm,
    AddImm,
    AdcImm,
    SbcImm,
    RscImm,
    TstImm,
    TeqImm,
    CmpImm,
    CmnImm,
    OrrImm,
    MovImm,
    BicImm,
    MvnImm,
    /// ADR, add form (ADD Rd, PC, #imm).
    AdrAdd,
    /// ADR, subtract form (SUB Rd, PC, #imm).
    AdrSub,
    RetAndImm,
    RetEorImm,
    RetSubImm,
    RetRsbImm,
    RetAddImm,
    RetAdcImm,
    RetSbcImm,
    RetRscImm,
    RetOrrImm,
    RetMovImm,
    RetBicImm,
    RetMvnImm,

    // ---- exception generation / return ----
    Svc,
    Hvc,
    Smc,
    Bkpt,
    Udf,
    Eret,
    Rfe,
    Srs,

    // ---- load/store ----
    /// LDR/STR word or byte, immediate offset forms (incl. the *T variants).
    LdstImm,
    /// LDR/STR word or byte, register offset forms.
    LdstReg,
    /// LDRD/STRD.
    LdstDual,
    /// LDRH/STRH (incl. LDRHT/STRHT).
    LdstHalf,
    /// LDRSB (incl. LDRSBT).
    LdstSignedByte,
    /// LDRSH (incl. LDRSHT).
    LdstSignedHalf,
    Ldrex,
    Ldrexb,
    Ldrexh,
    Ldrexd,
    Strex,
    Strexb,
    Strexh,
    Strexd,
    Swp,

    // ---- block transfer ----
    Ldstm,
    /// POP {Rt} single-register encoding (LDR Rt, [SP], #4).
    PopReg,
    /// PUSH {Rt} single-register encoding (STR Rt, [SP, #-4]!).
    PushReg,

    // ---- status register ----
    Cps,
    MsrBanked,
    MrsBanked,

    // ---- hints, barriers, preload ----
    Sev,
    Dbg,
    Setend,
    Clrex,
    Dmb,
    Dsb,
    Isb,
    PldImm,
    PldLit,
    PldReg,
    PliImm,
    PliReg,

    // ---- VFP / Advanced SIMD ----
    /// VFP data-processing placeholder: no control-flow effect.
    FpData,
    /// ASIMD bitwise ops placeholder (VAND/VBIC/VEOR/VORN/VBIF/VBIT/VBSL...).
    VBits,
    /// ASIMD comparison placeholder.
    VComp,
    /// ASIMD multiply-accumulate placeholder.
    VMac,
    /// ASIMD miscellaneous placeholder.
    VMisc,
    /// ASIMD parallel arithmetic placeholder.
    VPar,
    /// ASIMD shift placeholder.
    VShift,
    Vld1Mult,
    Vld2Mult,
    Vld3Mult,
    Vld4Mult,
    Vst1Mult,
    Vst2Mult,
    Vst3Mult,
    Vst4Mult,
    Vld1One,
    Vld2One,
    Vld3One,
    Vld4One,
    Vst1One,
    Vst2One,
    Vst3One,
    Vst4One,
    Vld1All,
    Vld2All,
    Vld3All,
    Vld4All,
    Vldm,
    Vstm,
    Vldr,
    Vstr,
    Vpop,
    Vpush,
    /// VMOV between two ARM registers and a doubleword register.
    VmovDoubleword,
    /// VMOV between two ARM registers and two single registers.
    VmovTwoSingles,
    /// VMOV between one ARM register and a single register.
    VmovSingle,
    /// VMOV ARM register to scalar lane.
    VmovToScalar,
    /// VMOV scalar lane to ARM register.
    VmovFromScalar,
    Vdup,
    VmrsFpscr,
    VmrsReg,
    VmsrFpscr,
    VmsrReg,
}
