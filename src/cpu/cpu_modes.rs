use serde::{Deserialize, Serialize};

/// `ARMv7-A` processor modes, as encoded in CPSR bits 4-0.
///
/// The mode gates the legality of status-register access, exception-return
/// instruction variants and banked-register transfers.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum Mode {
    /// The normal ARM program execution state.
    User = 0b10000,

    /// Designed to support a data transfer or channel process.
    Fiq = 0b10001,

    /// Used for general-purpose interrupt handling.
    Irq = 0b10010,

    /// Protected mode for the operating system.
    Supervisor = 0b10011,

    /// Secure Monitor mode (Security Extensions).
    Monitor = 0b10110,

    /// Entered after a data or instruction prefetch abort.
    Abort = 0b10111,

    /// Hypervisor mode (Virtualization Extensions).
    Hyp = 0b11010,

    /// Entered when an undefined instruction is executed.
    Undefined = 0b11011,

    /// A privileged user mode for the operating system.
    System = 0b11111,
}

impl Mode {
    /// User and System share the user register bank and have no SPSR, which
    /// makes several exception-return and banked-access forms UNPREDICTABLE.
    pub fn is_user_or_system(self) -> bool {
        matches!(self, Self::User | Self::System)
    }

    pub fn is_privileged(self) -> bool {
        self != Self::User
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10110 => Ok(Self::Monitor),
            0b10111 => Ok(Self::Abort),
            0b11010 => Ok(Self::Hyp),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(String::from("Unexpected value for Mode")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_roundtrip() {
        for mode in [
            Mode::User,
            Mode::Fiq,
            Mode::Irq,
            Mode::Supervisor,
            Mode::Monitor,
            Mode::Abort,
            Mode::Hyp,
            Mode::Undefined,
            Mode::System,
        ] {
            assert_eq!(Mode::try_from(u32::from(mode)), Ok(mode));
        }
    }

    #[test]
    fn invalid_mode_bits() {
        assert!(Mode::try_from(0b00000).is_err());
        assert!(Mode::try_from(0b10100).is_err());
    }

    #[test]
    fn privilege_classes() {
        assert!(Mode::User.is_user_or_system());
        assert!(Mode::System.is_user_or_system());
        assert!(!Mode::Hyp.is_user_or_system());
        assert!(!Mode::User.is_privileged());
        assert!(Mode::System.is_privileged());
    }
}
