#[macro_export]
macro_rules! define_interface {
    (service {$($variant:ident = $val:expr),*,}) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
        pub struct ServiceId(u64);

        impl ServiceId {
            $(pub const $variant: ServiceId = ServiceId($val);)*

            pub const ALL: &'static [ServiceId] = &[$(ServiceId::$variant),*];

            /// Returns `None` for identifiers outside the catalog.
            pub fn decode(raw: u64) -> Option<ServiceId> {
                Self::ALL.iter().copied().find(|id| id.0 == raw)
            }

            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        pub fn to_str(code: u64) -> &'static str {
            $(if code == $val {
                return stringify!($variant);
            })*
            "UNDEFINED"
        }
    };
}

/// Fails the build if the `#[repr(C)]` layout of `$ty` drifts from `$size`.
#[macro_export]
macro_rules! const_assert_size {
    ($ty:ty, $size:expr) => {
        const _: () = assert!(core::mem::size_of::<$ty>() == $size);
    };
}
