//! # Prediction Outcome
//!
//! Every handler returns an [`Outcome`]: where execution can legally go
//! next, or the architectural classification that says it cannot be known.
//! Outcomes are values, not errors — UNDEFINED and UNPREDICTABLE are results
//! the monitor must act on, not failures to recover from.

use serde::{Deserialize, Serialize};

/// The control-flow effect of one instruction.
///
/// `Linear` means the instruction does not redirect execution; the caller
/// computes the linear successor itself (it knows the instruction size).
/// `Arm`/`Thumb` carry the predicted fetch address and instruction set.
/// The `unpredictable` overlay marks a best-effort guess where the
/// architecture permits several behaviors; `Undefined` carries no address
/// at all and dominates any later unpredictable marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Fall through to the next instruction.
    Linear { unpredictable: bool },
    /// Next fetch at `address`, decoded as ARM.
    Arm { address: u32, unpredictable: bool },
    /// Next fetch at `address`, decoded as Thumb.
    Thumb { address: u32, unpredictable: bool },
    /// Architecturally UNDEFINED encoding; no address is produced.
    Undefined,
}

impl Outcome {
    pub const UNDEFINED: Self = Self::Undefined;

    pub const fn linear() -> Self {
        Self::Linear {
            unpredictable: false,
        }
    }

    pub const fn arm(address: u32) -> Self {
        Self::Arm {
            address,
            unpredictable: false,
        }
    }

    /// A Thumb-state target. Bit 0 is an interworking selector, not part of
    /// the fetch address, and is always stripped.
    pub const fn thumb(address: u32) -> Self {
        Self::Thumb {
            address: address & !1,
            unpredictable: false,
        }
    }

    /// Classifies a computed branch target by its low bits: bit 0 set picks
    /// Thumb state; a word-aligned value stays ARM; a halfword-aligned value
    /// without bit 0 is not a valid target in either state, so it is reported
    /// as Thumb with the unpredictable overlay.
    pub const fn classify(address: u32) -> Self {
        if address & 1 != 0 {
            Self::thumb(address)
        } else if address & 3 == 0 {
            Self::arm(address)
        } else {
            Self::Thumb {
                address,
                unpredictable: true,
            }
        }
    }

    /// Marks the outcome as an architectural best-effort guess. UNDEFINED
    /// dominates: once an encoding is undefined no amount of operand
    /// inspection may soften it to a flagged guess.
    #[must_use]
    pub const fn unpredictable(self) -> Self {
        match self {
            Self::Linear { .. } => Self::Linear {
                unpredictable: true,
            },
            Self::Arm { address, .. } => Self::Arm {
                address,
                unpredictable: true,
            },
            Self::Thumb { address, .. } => Self::Thumb {
                address,
                unpredictable: true,
            },
            Self::Undefined => Self::Undefined,
        }
    }

    /// Marks unpredictable only when `flag` holds, for the declarative
    /// per-field trigger checks the handlers accumulate.
    #[must_use]
    pub const fn unpredictable_if(self, flag: bool) -> Self {
        if flag { self.unpredictable() } else { self }
    }

    /// The predicted fetch address, when one exists.
    #[must_use]
    pub const fn address(self) -> Option<u32> {
        match self {
            Self::Arm { address, .. } | Self::Thumb { address, .. } => Some(address),
            Self::Linear { .. } | Self::Undefined => None,
        }
    }

    #[must_use]
    pub const fn is_unpredictable(self) -> bool {
        match self {
            Self::Linear { unpredictable }
            | Self::Arm { unpredictable, .. }
            | Self::Thumb { unpredictable, .. } => unpredictable,
            Self::Undefined => false,
        }
    }

    #[must_use]
    pub const fn is_linear(self) -> bool {
        matches!(self, Self::Linear { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_by_low_bits() {
        assert_eq!(Outcome::classify(0x2000), Outcome::arm(0x2000));
        assert_eq!(Outcome::classify(0x2001), Outcome::thumb(0x2000));
        assert_eq!(
            Outcome::classify(0x2002),
            Outcome::Thumb {
                address: 0x2002,
                unpredictable: true
            }
        );
    }

    #[test]
    fn thumb_strips_interworking_bit() {
        assert_eq!(
            Outcome::thumb(0x2001),
            Outcome::Thumb {
                address: 0x2000,
                unpredictable: false
            }
        );
    }

    #[test]
    fn undefined_dominates_unpredictable() {
        assert_eq!(Outcome::UNDEFINED.unpredictable(), Outcome::Undefined);
        assert!(!Outcome::UNDEFINED.is_unpredictable());
    }

    #[test]
    fn unpredictable_overlay_preserves_address() {
        let outcome = Outcome::arm(0x1234).unpredictable();
        assert_eq!(outcome.address(), Some(0x1234));
        assert!(outcome.is_unpredictable());
    }

    #[test]
    fn conditional_marking() {
        assert!(!Outcome::linear().unpredictable_if(false).is_unpredictable());
        assert!(Outcome::linear().unpredictable_if(true).is_unpredictable());
    }
}
