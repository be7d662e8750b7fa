//! Fixed-point numerical types.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

// shared between Fixed and F2Dot14
macro_rules! fixed_impl {
    ($name:ident, $bits:literal, $fract_bits:literal, $ty:ty) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[doc = concat!(stringify!($bits), "-bit signed fixed point number with ", stringify!($fract_bits), " bits of fraction." )]
        pub struct $name($ty);

        impl $name {
            /// Minimum value.
            pub const MIN: Self = Self(<$ty>::MIN);

            /// Maximum value.
            pub const MAX: Self = Self(<$ty>::MAX);

            /// This type's smallest representable value
            pub const EPSILON: Self = Self(1);

            /// Representation of 0.0.
            pub const ZERO: Self = Self(0);

            /// Representation of 1.0.
            pub const ONE: Self = Self(1 << $fract_bits);

            const INT_MASK: $ty = !0 << $fract_bits;
            const ROUND: $ty = 1 << ($fract_bits - 1);
            const FRACT_BITS: usize = $fract_bits;

            /// Creates a new fixed point value from the underlying bit representation.
            #[inline(always)]
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Returns the underlying bit representation of the value.
            #[inline(always)]
            pub const fn to_bits(self) -> $ty {
                self.0
            }

            /// Returns the nearest integer value.
            pub fn round(self) -> Self {
                Self(self.0.wrapping_add(Self::ROUND) & Self::INT_MASK)
            }

            /// Returns the absolute value of the number.
            pub fn abs(self) -> Self {
                Self(self.0.wrapping_abs())
            }

            /// Returns the largest integer less than or equal to the number.
            pub fn floor(self) -> Self {
                Self(self.0 & Self::INT_MASK)
            }

            /// Returns the fractional part of the number.
            pub fn fract(self) -> Self {
                Self(self.0 - self.floor().0)
            }

            /// Wrapping addition.
            pub fn wrapping_add(self, other: Self) -> Self {
                Self(self.0.wrapping_add(other.0))
            }

            /// Saturating addition.
            pub fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }

            /// Wrapping subtraction.
            pub fn wrapping_sub(self, other: Self) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }
        }

        // Arithmetic wraps rather than panicking: charstrings and composite
        // transforms are font controlled.
        impl Add for $name {
            type Output = Self;
            #[inline(always)]
            fn add(self, other: Self) -> Self {
                Self(self.0.wrapping_add(other.0))
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, other: Self) {
                *self = *self + other;
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline(always)]
            fn sub(self, other: Self) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, other: Self) {
                *self = *self - other;
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline(always)]
            fn neg(self) -> Self {
                Self(self.0.wrapping_neg())
            }
        }

        impl Mul for $name {
            type Output = Self;
            #[inline(always)]
            fn mul(self, other: Self) -> Self {
                let wide = (self.0 as i64) * (other.0 as i64);
                let rounded = (wide + ((1i64 << $fract_bits) >> 1)) >> $fract_bits;
                Self(rounded as $ty)
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, other: Self) {
                *self = *self * other;
            }
        }

        impl Div for $name {
            type Output = Self;
            #[inline(always)]
            fn div(self, other: Self) -> Self {
                if other.0 == 0 {
                    return if self.0 < 0 { Self::MIN } else { Self::MAX };
                }
                let wide = ((self.0 as i64) << $fract_bits) / other.0 as i64;
                Self(wide.clamp(<$ty>::MIN as i64, <$ty>::MAX as i64) as $ty)
            }
        }

        impl DivAssign for $name {
            fn div_assign(&mut self, other: Self) {
                *self = *self / other;
            }
        }

        impl crate::raw::Scalar for $name {
            type Raw = <$ty as crate::raw::Scalar>::Raw;

            fn to_raw(self) -> Self::Raw {
                crate::raw::Scalar::to_raw(self.0)
            }

            #[inline(always)]
            fn from_raw(raw: Self::Raw) -> Self {
                Self(<$ty as crate::raw::Scalar>::from_raw(raw))
            }
        }
    };
}

/// Float conversion methods.
///
/// Each type converts to a float wide enough to round-trip without error.
macro_rules! float_conv {
    ($name:ident, $to:ident, $from:ident, $ty:ty) => {
        impl $name {
            #[doc = concat!("Creates a fixed point value from a ", stringify!($ty), ".")]
            ///
            /// This operation is lossy; the float will be rounded to the nearest
            /// representable value.
            pub fn $from(x: $ty) -> Self {
                Self((x * Self::ONE.0 as $ty).round() as _)
            }

            #[doc = concat!("Returns the value as an ", stringify!($ty), ".")]
            ///
            /// This operation is lossless: all representable values can be
            /// round-tripped.
            pub fn $to(self) -> $ty {
                let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as $ty;
                let fract = (self.0 & !Self::INT_MASK) as $ty / Self::ONE.0 as $ty;
                int + fract
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.$to().fmt(f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.$to().fmt(f)
            }
        }
    };
}

fixed_impl!(F2Dot14, 16, 14, i16);
fixed_impl!(Fixed, 32, 16, i32);
float_conv!(F2Dot14, to_f32, from_f32, f32);
float_conv!(Fixed, to_f64, from_f64, f64);

impl Fixed {
    /// Creates a 16.16 fixed point value from a 32-bit integer.
    ///
    /// Values outside the 16-bit integer range wrap.
    #[inline(always)]
    pub const fn from_i32(i: i32) -> Self {
        Self(i.wrapping_shl(16))
    }

    /// Converts a 16.16 fixed point value to a 32-bit integer, rounding
    /// to the nearest value.
    #[inline(always)]
    pub const fn to_i32(self) -> i32 {
        self.0.wrapping_add(0x8000) >> 16
    }

    /// Returns the value as an `f32`.
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

impl F2Dot14 {
    /// Converts a 2.14 value to 16.16, without loss.
    pub const fn to_fixed(self) -> Fixed {
        Fixed(self.0 as i32 * 4)
    }
}

#[cfg(test)]
mod tests {
    #![allow(overflowing_literals)]
    use super::*;

    #[test]
    fn f2dot14_floats() {
        assert_eq!(F2Dot14(0x7fff), F2Dot14::from_f32(1.999939));
        assert_eq!(F2Dot14(0x7000), F2Dot14::from_f32(1.75));
        assert_eq!(F2Dot14(0x0001), F2Dot14::from_f32(0.0000610356));
        assert_eq!(F2Dot14(0x0000), F2Dot14::from_f32(0.0));
        assert_eq!(F2Dot14(0xffff), F2Dot14::from_f32(-0.000061));
        assert_eq!(F2Dot14(0x8000), F2Dot14::from_f32(-2.0));
    }

    #[test]
    fn fixed_integer_conversions() {
        assert_eq!(Fixed::from_i32(3).to_bits(), 0x30000);
        assert_eq!(Fixed::from_i32(-2).to_i32(), -2);
        assert_eq!(Fixed::from_f64(1.5).to_i32(), 2);
        assert_eq!(Fixed::from_f64(-12.5).to_f64(), -12.5);
    }

    #[test]
    fn fixed_mul_div() {
        let a = Fixed::from_f64(1.5);
        let b = Fixed::from_i32(4);
        assert_eq!(a * b, Fixed::from_i32(6));
        assert_eq!(b / a, Fixed::from_bits(0x2AAAA));
        assert_eq!(a / Fixed::ZERO, Fixed::MAX);
    }

    #[test]
    fn f2dot14_to_fixed() {
        assert_eq!(F2Dot14::from_f32(0.5).to_fixed(), Fixed::from_f64(0.5));
        assert_eq!(F2Dot14::from_f32(-2.0).to_fixed(), Fixed::from_i32(-2));
    }
}
