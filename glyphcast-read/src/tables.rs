//! The various font tables

/// Generates accessors for the big-endian fields of a packed record.
///
/// `$src` names the field holding the record, or is `self` for the record
/// type itself; each listed field becomes a public method returning the
/// native value.
macro_rules! record_getters {
    (self; $( $(#[$attr:meta])* $name:ident: $ty:ty ),* $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(&self) -> $ty {
                self.$name.get()
            }
        )*
    };
    ($src:ident; $( $(#[$attr:meta])* $name:ident: $ty:ty ),* $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(&self) -> $ty {
                self.$src.$name.get()
            }
        )*
    };
}

/// Defines a newtype over an integer with named flag constants.
///
/// Unknown bits are dropped when reading.
macro_rules! flags {
    ($(#[$outer:meta])* $name:ident($bits:ty) { $( $(#[$inner:meta])* const $flag:ident = $value:expr; )* }) => {
        $(#[$outer])*
        #[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name($bits);

        impl $name {
            $( $(#[$inner])* pub const $flag: Self = Self($value); )*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> $bits {
                self.0
            }

            pub const fn from_bits_truncate(bits: $bits) -> Self {
                Self(bits & (0 $( | $value )*))
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut first = true;
                $(
                    if self.contains(Self::$flag) && $value != 0 {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        first = false;
                        f.write_str(stringify!($flag))?;
                    }
                )*
                if first {
                    write!(f, "{:#x}", self.0)?;
                }
                Ok(())
            }
        }

        impl ::types::raw::Scalar for $name {
            type Raw = <$bits as ::types::raw::Scalar>::Raw;
            fn to_raw(self) -> Self::Raw {
                ::types::raw::Scalar::to_raw(self.0)
            }
            fn from_raw(raw: Self::Raw) -> Self {
                Self::from_bits_truncate(<$bits as ::types::raw::Scalar>::from_raw(raw))
            }
        }
    };
}

pub mod cff;
pub mod cmap;
pub mod directory;
pub mod gasp;
pub mod glyf;
pub mod head;
pub mod hvhea;
pub mod hvmtx;
pub mod kern;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;
pub mod postscript;
