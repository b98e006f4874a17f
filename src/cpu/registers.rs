//! # ARM Register File
//!
//! The 16 general-purpose registers visible at any time.
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer (by convention)
//! - **R14 (LR)**: Link register (return address)
//! - **R15 (PC)**: Program counter; reads as current instruction + 8 in ARM
//!   state due to pipelining
//!
//! For register banking by mode, see [`register_bank`](super::register_bank).

use serde::{Deserialize, Serialize};

/// Stack Pointer register index.
pub const REG_SP: u32 = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: u32 = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: u32 = 0xF;

/// The 16 general-purpose registers visible to the CPU in the current mode.
///
/// This is a snapshot captured by the monitor at the trap point; the
/// prediction engine reads it but never writes back. R15 holds the address
/// of the instruction being decoded — the "+8 pipeline bias" that software
/// observes when reading PC is applied by the engine, not stored here.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    pub fn new(values: [u32; 16]) -> Self {
        Self(values)
    }

    pub const fn program_counter(&self) -> u32 {
        self.0[15]
    }

    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        self.0[reg] = new_value;
    }

    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_write() {
        let mut regs = Registers::default();
        regs.set_register_at(3, 0xCAFE);
        assert_eq!(regs.register_at(3), 0xCAFE);
        regs.set_register_at(15, 0x8000);
        assert_eq!(regs.program_counter(), 0x8000);
    }

    #[test]
    #[should_panic]
    fn invalid_index() {
        let mut regs = Registers::default();
        regs.set_register_at(16, 0);
    }
}
