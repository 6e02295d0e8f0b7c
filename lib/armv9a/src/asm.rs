//! Barriers and maintenance instructions that have no register interface.
//!
//! FEAT_RME operations are emitted through their `sys` encodings so the
//! crate assembles without RME-aware tooling.

#[cfg(target_arch = "aarch64")]
use core::arch::asm;

macro_rules! sys_op {
    ($(#[$attr:meta])* $name:ident, $insn:literal) => {
        $(#[$attr])*
        #[inline(always)]
        pub fn $name() {
            #[cfg(target_arch = "aarch64")]
            // SAFETY: barriers and broadcast invalidations take no operands.
            unsafe {
                asm!($insn, options(nostack))
            };

            #[cfg(not(target_arch = "aarch64"))]
            unimplemented!($insn)
        }
    };
    ($(#[$attr:meta])* $name:ident, $insn:literal, operand) => {
        $(#[$attr])*
        #[inline(always)]
        pub fn $name(operand: u64) {
            #[cfg(target_arch = "aarch64")]
            // SAFETY: maintenance by address does not change memory contents.
            unsafe {
                asm!(concat!($insn, ", {}"), in(reg) operand, options(nostack))
            };

            #[cfg(not(target_arch = "aarch64"))]
            {
                let _ = operand;
                unimplemented!($insn)
            }
        }
    };
}

sys_op!(dsb_sy, "dsb sy");
sys_op!(dsb_ish, "dsb ish");
sys_op!(isb, "isb");
sys_op!(tlbi_alle3, "tlbi alle3");
sys_op!(
    /// TLBI PAALLOS
    tlbi_paallos,
    "sys #6, c8, c1, #4"
);
sys_op!(
    /// Operand is the VA shifted right by 12.
    tlbi_vae3,
    "tlbi vae3",
    operand
);
sys_op!(dc_civac, "dc civac", operand);
sys_op!(
    /// DC CIPAPA
    dc_cipapa,
    "sys #6, c7, c14, #1",
    operand
);
sys_op!(
    /// DC CIPAE
    dc_cipae,
    "sys #4, c7, c14, #0",
    operand
);
sys_op!(at_s1e3r_raw, "at s1e3r", operand);
sys_op!(at_s1e3w_raw, "at s1e3w", operand);

/// Masks D, A, I and F at the current exception level.
#[inline(always)]
pub fn mask_daif() {
    #[cfg(target_arch = "aarch64")]
    // SAFETY: only PSTATE.DAIF is changed.
    unsafe {
        asm!("msr daifset, #0xf", options(nomem, nostack))
    };

    #[cfg(not(target_arch = "aarch64"))]
    unimplemented!("msr daifset")
}
