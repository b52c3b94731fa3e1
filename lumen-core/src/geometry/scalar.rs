//! Numeric coordinate trait

use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

/// Coordinate type usable in [`Point`](super::Point), [`Size`](super::Size)
/// and [`Rect`](super::Rect)
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Additive identity
    const ZERO: Self;

    /// Smaller of two values (NaN-free inputs assumed for floats)
    #[inline]
    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Larger of two values
    #[inline]
    fn max_of(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Addition clamped to the type's range (plain addition for floats)
    fn sat_add(self, other: Self) -> Self;

    /// Subtraction clamped to the type's range (plain subtraction for floats)
    fn sat_sub(self, other: Self) -> Self;

    /// Multiplication clamped to the type's range (plain product for floats)
    fn sat_mul(self, other: Self) -> Self;

    /// Lossy conversion used for ratios
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    (int: $($t:ty),*) => {
        $(
            impl Scalar for $t {
                const ZERO: Self = 0;

                #[inline]
                fn sat_add(self, other: Self) -> Self {
                    self.saturating_add(other)
                }

                #[inline]
                fn sat_sub(self, other: Self) -> Self {
                    self.saturating_sub(other)
                }

                #[inline]
                fn sat_mul(self, other: Self) -> Self {
                    self.saturating_mul(other)
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
    (float: $($t:ty),*) => {
        $(
            impl Scalar for $t {
                const ZERO: Self = 0.0;

                #[inline]
                fn sat_add(self, other: Self) -> Self {
                    self + other
                }

                #[inline]
                fn sat_sub(self, other: Self) -> Self {
                    self - other
                }

                #[inline]
                fn sat_mul(self, other: Self) -> Self {
                    self * other
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_scalar!(int: i16, i32, i64);
impl_scalar!(float: f32, f64);
