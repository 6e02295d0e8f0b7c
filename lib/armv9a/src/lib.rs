#![no_std]
#![warn(rust_2018_idioms)]

#[macro_use]
pub mod r#macro;

pub mod asm;
pub mod mmio;
pub mod regs;

pub use regs::*;
pub use tock_registers::{register_bitfields, LocalRegisterCopy};

pub const fn bits_in_reg(mask: u64, val: u64) -> u64 {
    (val << (mask.trailing_zeros())) & mask
}
