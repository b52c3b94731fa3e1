//! 2D point

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::Scalar;

/// A point in image coordinates (x grows right, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point<T = i32> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    /// Create a new point
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Scalar> Point<T> {
    /// Dot product
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(self, other: Self) -> T {
        self.x * other.y - self.y * other.x
    }
}

impl Point<i32> {
    /// The origin
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Widen to `i64` for fixed-point work
    pub fn to_i64(self) -> Point<i64> {
        Point::new(self.x as i64, self.y as i64)
    }

    /// Convert to a float point
    pub fn to_f32(self) -> Point<f32> {
        Point::new(self.x as f32, self.y as f32)
    }
}

impl Point<f32> {
    /// Round to the nearest integer point (halves away from zero)
    pub fn round(self) -> Point<i32> {
        Point::new(round_f32(self.x), round_f32(self.y))
    }
}

/// Round half away from zero without `std`
pub fn round_f32(v: f32) -> i32 {
    if v >= 0.0 {
        (v + 0.5) as i32
    } else {
        (v - 0.5) as i32
    }
}

/// Floor without `std`
pub(crate) fn floor_f32(v: f32) -> i32 {
    let t = v as i32;
    if (t as f32) > v {
        t - 1
    } else {
        t
    }
}

/// Ceil without `std`
pub(crate) fn ceil_f32(v: f32) -> i32 {
    let t = v as i32;
    if (t as f32) < v {
        t + 1
    } else {
        t
    }
}

impl<T: Scalar> Add for Point<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Scalar> Sub for Point<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Scalar> AddAssign for Point<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Scalar> SubAssign for Point<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Scalar> Neg for Point<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<T: Scalar> Mul<T> for Point<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl<T> From<(T, T)> for Point<T> {
    fn from((x, y): (T, T)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point<i32>> for Point<i64> {
    fn from(p: Point<i32>) -> Self {
        p.to_i64()
    }
}
