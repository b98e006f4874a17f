//! # Program Status Registers (CPSR and SPSR)
//!
//! The PSR holds the condition flags (N, Z, C, V), the sticky-saturation Q
//! flag, the SIMD GE lane flags and the control bits (mode, state, masks).
//!
//! ```text
//! 31 30 29 28 27  26-25 24 23-20 19-16 15-10  9 8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──┬─────┬──┬─────┬─────┬─────┬─┬─┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │ IT  │J │ Res │ GE  │ IT  │E│A│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴─────┴──┴─────┴─────┴─────┴─┴─┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`can_execute`](Psr::can_execute)
//! - **GE (16-19)**: per-byte-lane flags consumed by SEL
//! - **T bit (5)**: ARM (0) or Thumb (1) state
//! - **Mode (0-4)**: see [`cpu_modes`](super::cpu_modes)

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

/// Program Status Register (CPSR or SPSR).
///
/// Wraps a raw `u32` and provides type-safe read accessors for each field.
/// The prediction engine only ever reads PSR state; writes stay with the
/// monitor that owns the context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    pub(crate) fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),                         // Equal (Z=1)
            NE => !self.zero_flag(),                        // Not equal (Z=0)
            CS => self.carry_flag(),                        // Unsigned higher or same (C=1)
            CC => !self.carry_flag(),                       // Unsigned lower (C=0)
            MI => self.sign_flag(),                         // Negative (N=1)
            PL => !self.sign_flag(),                        // Positive or zero (N=0)
            VS => self.overflow_flag(),                     // Overflow (V=1)
            VC => !self.overflow_flag(),                    // No overflow (V=0)
            HI => self.carry_flag() && !self.zero_flag(),   // Unsigned higher (C=1 and Z=0)
            LS => !self.carry_flag() || self.zero_flag(),   // Unsigned lower or same (C=0 or Z=1)
            GE => self.sign_flag() == self.overflow_flag(), // Greater or equal (N=V)
            LT => self.sign_flag() != self.overflow_flag(), // Less than (N<>V)
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()), // Greater than (Z=0 and N=V)
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()), // Less or equal (Z=1 or N<>V)
            AL => true, // Always (the "AL" suffix can be omitted)
            NV => true, // 0b1111 selects the unconditional space, never skipped
        }
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// Q => Bit 27, (1=Sticky Overflow)
    #[must_use]
    pub fn sticky_overflow(self) -> bool {
        self.0.get_bit(27)
    }

    /// `GE[n]` => Bits 16+n, per-byte-lane greater-or-equal flags set by the
    /// parallel add/subtract family and consumed by SEL.
    #[must_use]
    pub fn ge_flag(self, lane: u8) -> bool {
        debug_assert!(lane < 4);
        self.0.get_bit(16 + lane)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0
    ///
    /// NOTE: saved/handed-over PSR images sometimes carry invalid mode values
    /// (a zeroed SPSR is common). Supervisor is returned as a safe default so
    /// prediction can proceed.
    #[must_use]
    pub fn mode(self) -> Mode {
        let mode_bits = self.0 & 0b11111;
        Mode::try_from(mode_bits).unwrap_or_else(|_| {
            tracing::debug!(
                "invalid mode bits 0b{:05b} in PSR=0x{:08X}, defaulting to Supervisor",
                mode_bits,
                self.0
            );
            Mode::Supervisor
        })
    }

    /// The raw 32-bit image, for MRS-style whole-register reads.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Psr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Psr> for u32 {
    fn from(psr: Psr) -> Self {
        psr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const N: u32 = 1 << 31;
    const Z: u32 = 1 << 30;
    const C: u32 = 1 << 29;
    const V: u32 = 1 << 28;

    #[test]
    fn flag_accessors() {
        let psr = Psr::from(N | C);
        assert!(psr.sign_flag());
        assert!(!psr.zero_flag());
        assert!(psr.carry_flag());
        assert!(!psr.overflow_flag());
    }

    #[test]
    fn condition_evaluation() {
        let psr = Psr::from(Z);
        assert!(psr.can_execute(Condition::EQ));
        assert!(!psr.can_execute(Condition::NE));
        assert!(psr.can_execute(Condition::LS));
        assert!(psr.can_execute(Condition::AL));

        let psr = Psr::from(N | V);
        assert!(psr.can_execute(Condition::GE));
        assert!(psr.can_execute(Condition::GT));
        assert!(!psr.can_execute(Condition::LT));

        let psr = Psr::from(N);
        assert!(psr.can_execute(Condition::LT));
        assert!(psr.can_execute(Condition::LE));
        assert!(!psr.can_execute(Condition::GT));
    }

    #[test]
    fn ge_lanes() {
        let psr = Psr::from(0b1010 << 16);
        assert!(!psr.ge_flag(0));
        assert!(psr.ge_flag(1));
        assert!(!psr.ge_flag(2));
        assert!(psr.ge_flag(3));
    }

    #[test]
    fn mode_and_state() {
        let psr = Psr::from(0b10011 | (1 << 5));
        assert_eq!(psr.mode(), Mode::Supervisor);
        assert!(psr.state_bit());
    }

    #[test]
    fn invalid_mode_defaults_to_supervisor() {
        let psr = Psr::from(0);
        assert_eq!(psr.mode(), Mode::Supervisor);
    }
}
