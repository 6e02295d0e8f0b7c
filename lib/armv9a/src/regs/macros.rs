// Raw accessors used by the tock-registers `Readable`/`Writeable` impls.
// Off target the accessors panic, so host builds can link code that names
// a system register without ever touching one.

macro_rules! sys_coproc_read_raw {
    ($width:ty, $asm_reg_name:tt, $asm_width:tt) => {
        #[inline]
        fn get(&self) -> $width {
            #[cfg(target_arch = "aarch64")]
            {
                let reg;
                // SAFETY: a system register read has no memory side effects.
                unsafe {
                    core::arch::asm!(
                        concat!("mrs {reg:", $asm_width, "}, ", $asm_reg_name),
                        reg = out(reg) reg,
                        options(nomem, nostack)
                    );
                }
                reg
            }

            #[cfg(not(target_arch = "aarch64"))]
            unimplemented!(concat!("mrs ", $asm_reg_name))
        }
    };
}

macro_rules! sys_coproc_write_raw {
    ($width:ty, $asm_reg_name:tt, $asm_width:tt) => {
        #[inline]
        fn set(&self, value: $width) {
            #[cfg(target_arch = "aarch64")]
            // SAFETY: callers own the EL3 register state they are editing.
            unsafe {
                core::arch::asm!(
                    concat!("msr ", $asm_reg_name, ", {reg:", $asm_width, "}"),
                    reg = in(reg) value,
                    options(nomem, nostack)
                );
            }

            #[cfg(not(target_arch = "aarch64"))]
            {
                let _ = value;
                unimplemented!(concat!("msr ", $asm_reg_name))
            }
        }
    };
}

/// Declares a 64-bit system register as a tock-registers interface.
macro_rules! define_sys_register {
    ($reg:ident, $encoding:tt, [$($fields:tt)*]) => {
        #[allow(non_snake_case)]
        pub mod $reg {
            use tock_registers::{
                interfaces::{Readable, Writeable},
                register_bitfields,
            };

            register_bitfields! {u64,
                pub $reg [ $($fields)* ]
            }

            pub struct Reg;

            impl Readable for Reg {
                type T = u64;
                type R = $reg::Register;

                sys_coproc_read_raw!(u64, $encoding, "x");
            }

            impl Writeable for Reg {
                type T = u64;
                type R = $reg::Register;

                sys_coproc_write_raw!(u64, $encoding, "x");
            }

            pub use $reg::*;
        }
    };
}
