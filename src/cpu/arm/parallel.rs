//! # Parallel Add/Subtract
//!
//! The six prefix variants (S, Q, SH, U, UQ, UH) of the six lane operations
//! (ADD16, SUB16, ASX, SAX, ADD8, SUB8). Lanes are unpacked to plain signed
//! arithmetic, combined, then clamped or halved per variant and reassembled.
//!
//! Field layout: Rn bits 19-16, Rd bits 15-12, Rm bits 3-0. A PC destination
//! is UNPREDICTABLE; the packed result is the flagged best guess.

use crate::arith::{
    high_half, low_half, pack_bytes, pack_halves, signed_byte, signed_saturate, unsigned_saturate,
};
use crate::bitwise::Bits;
use crate::cpu::arm::extra::Extra;
use crate::cpu::arm::outcome::Outcome;
use crate::cpu::context::CpuContext;

/// How a variant folds the full-precision lane result back to lane width.
#[derive(Clone, Copy)]
enum Fold {
    /// Plain modular arithmetic (S and U prefixes).
    Wrap,
    /// Signed saturation (Q prefix).
    SatSigned,
    /// Unsigned saturation (UQ prefix).
    SatUnsigned,
    /// Halve the true result (SH and UH prefixes).
    Halve,
}

impl Fold {
    fn apply16(self, lane: i32) -> i32 {
        match self {
            Self::Wrap => lane,
            Self::SatSigned => signed_saturate(lane, 16),
            Self::SatUnsigned => unsigned_saturate(i64::from(lane), 16) as i32,
            Self::Halve => lane >> 1,
        }
    }

    fn apply8(self, lane: i32) -> i32 {
        match self {
            Self::Wrap => lane,
            Self::SatSigned => signed_saturate(lane, 8),
            Self::SatUnsigned => unsigned_saturate(i64::from(lane), 8) as i32,
            Self::Halve => lane >> 1,
        }
    }
}

fn halves(value: u32, signed: bool) -> (i32, i32) {
    if signed {
        (high_half(value), low_half(value))
    } else {
        ((value >> 16) as i32, (value & 0xFFFF) as i32)
    }
}

fn bytes(value: u32, signed: bool) -> [i32; 4] {
    let mut out = [0; 4];
    for (lane, slot) in out.iter_mut().enumerate() {
        let raw = (value >> (8 * lane)) & 0xFF;
        *slot = if signed { signed_byte(raw) } else { raw as i32 };
    }
    out
}

pub(super) fn next_address(instr: u32, extra: Extra, ctx: &CpuContext) -> Outcome {
    let rd = instr.get_bits(12..=15);
    if rd != 15 {
        return Outcome::linear();
    }

    let n = ctx.operand(instr.get_bits(16..=19));
    let m = ctx.operand(instr.get_bits(0..=3));

    use Extra::{
        Qadd8, Qadd16, Qasx, Qsax, Qsub8, Qsub16, Sadd8, Sadd16, Sasx, Shadd8, Shadd16, Shasx,
        Shsax, Shsub8, Shsub16, Ssax, Ssub8, Ssub16, Uadd8, Uadd16, Uasx, Uhadd8, Uhadd16, Uhasx,
        Uhsax, Uhsub8, Uhsub16, Uqadd8, Uqadd16, Uqasx, Uqsax, Uqsub8, Uqsub16, Usax, Usub8,
        Usub16,
    };

    let (fold, signed) = match extra {
        Sadd16 | Ssub16 | Sasx | Ssax | Sadd8 | Ssub8 => (Fold::Wrap, true),
        Qadd16 | Qsub16 | Qasx | Qsax | Qadd8 | Qsub8 => (Fold::SatSigned, true),
        Shadd16 | Shsub16 | Shasx | Shsax | Shadd8 | Shsub8 => (Fold::Halve, true),
        Uadd16 | Usub16 | Uasx | Usax | Uadd8 | Usub8 => (Fold::Wrap, false),
        Uqadd16 | Uqsub16 | Uqasx | Uqsax | Uqadd8 | Uqsub8 => (Fold::SatUnsigned, false),
        Uhadd16 | Uhsub16 | Uhasx | Uhsax | Uhadd8 | Uhsub8 => (Fold::Halve, false),
        _ => unreachable!("extra tag {extra:?} does not belong to the parallel family"),
    };

    let result = match extra {
        Sadd16 | Qadd16 | Shadd16 | Uadd16 | Uqadd16 | Uhadd16 => {
            let (nh, nl) = halves(n, signed);
            let (mh, ml) = halves(m, signed);
            pack_halves(fold.apply16(nh + mh), fold.apply16(nl + ml))
        }
        Ssub16 | Qsub16 | Shsub16 | Usub16 | Uqsub16 | Uhsub16 => {
            let (nh, nl) = halves(n, signed);
            let (mh, ml) = halves(m, signed);
            pack_halves(fold.apply16(nh - mh), fold.apply16(nl - ml))
        }
        // ASX: exchange halves of Rm, add high, subtract low
        Sasx | Qasx | Shasx | Uasx | Uqasx | Uhasx => {
            let (nh, nl) = halves(n, signed);
            let (mh, ml) = halves(m, signed);
            pack_halves(fold.apply16(nh + ml), fold.apply16(nl - mh))
        }
        // SAX: exchange halves of Rm, subtract high, add low
        Ssax | Qsax | Shsax | Usax | Uqsax | Uhsax => {
            let (nh, nl) = halves(n, signed);
            let (mh, ml) = halves(m, signed);
            pack_halves(fold.apply16(nh - ml), fold.apply16(nl + mh))
        }
        Sadd8 | Qadd8 | Shadd8 | Uadd8 | Uqadd8 | Uhadd8 => {
            let nb = bytes(n, signed);
            let mb = bytes(m, signed);
            pack_bytes(
                fold.apply8(nb[3] + mb[3]),
                fold.apply8(nb[2] + mb[2]),
                fold.apply8(nb[1] + mb[1]),
                fold.apply8(nb[0] + mb[0]),
            )
        }
        Ssub8 | Qsub8 | Shsub8 | Usub8 | Uqsub8 | Uhsub8 => {
            let nb = bytes(n, signed);
            let mb = bytes(m, signed);
            pack_bytes(
                fold.apply8(nb[3] - mb[3]),
                fold.apply8(nb[2] - mb[2]),
                fold.apply8(nb[1] - mb[1]),
                fold.apply8(nb[0] - mb[0]),
            )
        }
        _ => unreachable!(),
    };
    Outcome::classify(result).unpredictable()
}
