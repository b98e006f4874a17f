//! # Banked Registers for Exception Modes
//!
//! Storage for registers that are swapped when changing CPU modes.
//! See [`cpu_modes`](super::cpu_modes) for the mode encodings.
//!
//! Each exception mode has its own R13 (SP), R14 (LR), and SPSR.
//! FIQ additionally banks R8-R12. Hyp mode has no banked LR but carries
//! `ELR_hyp`, the exception return address used by ERET.

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::Psr;

/// Storage for banked registers across all CPU modes.
///
/// The banked MSR/MRS instruction forms address these directly, and the
/// exception-return paths read the per-mode SPSR images. The monitor fills
/// this in from its saved context; the engine only reads.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterBank {
    // FIQ mode banked registers
    /// R8 for FIQ mode.
    pub r8_fiq: u32,
    /// R9 for FIQ mode.
    pub r9_fiq: u32,
    /// R10 for FIQ mode.
    pub r10_fiq: u32,
    /// R11 for FIQ mode.
    pub r11_fiq: u32,
    /// R12 for FIQ mode.
    pub r12_fiq: u32,
    /// R13 (SP) for FIQ mode.
    pub r13_fiq: u32,
    /// R14 (LR) for FIQ mode.
    pub r14_fiq: u32,

    // User/System bank (shared)
    /// R13 (SP) for User/System mode.
    pub r13_usr: u32,
    /// R14 (LR) for User/System mode.
    pub r14_usr: u32,

    // Supervisor mode banked registers
    /// R13 (SP) for Supervisor mode.
    pub r13_svc: u32,
    /// R14 (LR) for Supervisor mode.
    pub r14_svc: u32,

    // Abort mode banked registers
    /// R13 (SP) for Abort mode.
    pub r13_abt: u32,
    /// R14 (LR) for Abort mode.
    pub r14_abt: u32,

    // IRQ mode banked registers
    /// R13 (SP) for IRQ mode.
    pub r13_irq: u32,
    /// R14 (LR) for IRQ mode.
    pub r14_irq: u32,

    // Undefined mode banked registers
    /// R13 (SP) for Undefined instruction mode.
    pub r13_und: u32,
    /// R14 (LR) for Undefined instruction mode.
    pub r14_und: u32,

    // Monitor mode banked registers (Security Extensions)
    /// R13 (SP) for Monitor mode.
    pub r13_mon: u32,
    /// R14 (LR) for Monitor mode.
    pub r14_mon: u32,

    // Hyp mode (Virtualization Extensions)
    /// R13 (SP) for Hyp mode. Hyp has no banked LR.
    pub r13_hyp: u32,
    /// Exception return address for Hyp mode, target of ERET.
    pub elr_hyp: u32,

    // Saved Program Status Registers (one per exception mode)
    /// SPSR for FIQ mode.
    pub spsr_fiq: Psr,
    /// SPSR for Supervisor mode.
    pub spsr_svc: Psr,
    /// SPSR for Abort mode.
    pub spsr_abt: Psr,
    /// SPSR for IRQ mode.
    pub spsr_irq: Psr,
    /// SPSR for Undefined mode.
    pub spsr_und: Psr,
    /// SPSR for Monitor mode.
    pub spsr_mon: Psr,
    /// SPSR for Hyp mode.
    pub spsr_hyp: Psr,
}

impl RegisterBank {
    /// Banked SP for `mode`.
    pub fn sp(&self, mode: Mode) -> u32 {
        match mode {
            Mode::User | Mode::System => self.r13_usr,
            Mode::Fiq => self.r13_fiq,
            Mode::Irq => self.r13_irq,
            Mode::Supervisor => self.r13_svc,
            Mode::Abort => self.r13_abt,
            Mode::Undefined => self.r13_und,
            Mode::Monitor => self.r13_mon,
            Mode::Hyp => self.r13_hyp,
        }
    }

    /// Banked LR for `mode`. Hyp mode returns `ELR_hyp`, the only
    /// link-register-shaped state it has.
    pub fn lr(&self, mode: Mode) -> u32 {
        match mode {
            Mode::User | Mode::System => self.r14_usr,
            Mode::Fiq => self.r14_fiq,
            Mode::Irq => self.r14_irq,
            Mode::Supervisor => self.r14_svc,
            Mode::Abort => self.r14_abt,
            Mode::Undefined => self.r14_und,
            Mode::Monitor => self.r14_mon,
            Mode::Hyp => self.elr_hyp,
        }
    }

    /// FIQ's extra banked general registers R8-R12 (index 8..=12).
    pub fn fiq_reg(&self, index: u32) -> u32 {
        match index {
            8 => self.r8_fiq,
            9 => self.r9_fiq,
            10 => self.r10_fiq,
            11 => self.r11_fiq,
            12 => self.r12_fiq,
            _ => panic!("register R{index} is not FIQ-banked"),
        }
    }

    /// Banked SPSR for `mode`; `None` for User/System which have none.
    pub fn spsr(&self, mode: Mode) -> Option<Psr> {
        match mode {
            Mode::User | Mode::System => None,
            Mode::Fiq => Some(self.spsr_fiq),
            Mode::Irq => Some(self.spsr_irq),
            Mode::Supervisor => Some(self.spsr_svc),
            Mode::Abort => Some(self.spsr_abt),
            Mode::Undefined => Some(self.spsr_und),
            Mode::Monitor => Some(self.spsr_mon),
            Mode::Hyp => Some(self.spsr_hyp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn banked_by_mode() {
        let bank = RegisterBank {
            r13_svc: 0x1000,
            r14_irq: 0x2000,
            elr_hyp: 0x3000,
            ..Default::default()
        };
        assert_eq!(bank.sp(Mode::Supervisor), 0x1000);
        assert_eq!(bank.lr(Mode::Irq), 0x2000);
        assert_eq!(bank.lr(Mode::Hyp), 0x3000);
    }

    #[test]
    fn user_and_system_share_the_bank() {
        let bank = RegisterBank {
            r13_usr: 0xAAAA,
            ..Default::default()
        };
        assert_eq!(bank.sp(Mode::User), bank.sp(Mode::System));
    }

    #[test]
    fn spsr_missing_for_user() {
        let bank = RegisterBank::default();
        assert!(bank.spsr(Mode::User).is_none());
        assert!(bank.spsr(Mode::Fiq).is_some());
    }
}
