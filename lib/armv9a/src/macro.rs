#[macro_export]
macro_rules! define_mask {
    ($end:expr, $beg:expr) => {
        ((1 << $end) - (1 << $beg) + (1 << $end))
    };
}

#[macro_export]
macro_rules! define_bitfield {
    ($field:ident, [$($end:tt - $beg:tt)|*]) => {
        #[allow(non_upper_case_globals)]
        pub const $field: u64 = $( $crate::define_mask!($end, $beg) )|*;
    };
}

/// Declares a `u64` newtype together with the masks of its fields.
///
/// The masks are associated constants, so `Desc::AF` is both the mask and
/// the argument to the accessors.
#[macro_export]
macro_rules! define_bits {
    ($name:ident) => { $crate::define_bits!($name,); };
    ($name:ident, $($field:ident [$($end:tt - $beg:tt)|*]),*) => {
        #[derive(Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name(u64);

        impl $name {
            $( $crate::define_bitfield!($field, [$($end - $beg)|*]); )*

            pub const fn new(data: u64) -> $name {
                $name(data)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            pub fn set(&mut self, val: u64) -> &mut Self {
                self.0 = val;
                self
            }

            pub fn get_masked(&self, mask: u64) -> u64 {
                self.0 & mask
            }

            pub fn get_masked_value(&self, mask: u64) -> u64 {
                (self.0 & mask) >> (mask.trailing_zeros())
            }

            pub fn set_masked(&mut self, mask: u64, val: u64) -> &mut Self {
                self.0 = (self.0 & !mask) | (val & mask);
                self
            }

            pub fn set_masked_value(&mut self, mask: u64, val: u64) -> &mut Self {
                self.0 = (self.0 & !mask) | ((val << (mask.trailing_zeros())) & mask);
                self
            }

            pub fn set_bits(&mut self, mask: u64) -> &mut Self {
                self.0 |= mask;
                self
            }

            pub fn clear_bits(&mut self, mask: u64) -> &mut Self {
                self.0 &= !mask;
                self
            }

            pub fn is_set(&self, mask: u64) -> bool {
                self.0 & mask == mask
            }
        }

        impl From<u64> for $name {
            fn from(val: u64) -> Self {
                Self(val)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:#018x})", stringify!($name), self.0)
            }
        }
    };
}
