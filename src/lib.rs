//! # armstep
//!
//! Instruction-level next-address prediction for a bare-metal ARM debug
//! monitor. Given the 32-bit encoding at the PC and a snapshot of processor
//! state, [`cpu::arm::dispatch`] reports every address execution can legally
//! reach next, so the monitor can plant a temporary breakpoint and
//! single-step without hardware support.

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod arith;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod bitwise;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::unreadable_literal)]
pub mod cpu;

pub use cpu::arm::{Extra, Outcome, dispatch};
pub use cpu::context::{CpuContext, Memory};
