//! Axis-aligned rectangle
//!
//! Rects are top-left anchored and half-open: a rect covers
//! `[x, x + width) × [y, y + height)`. Union and intersection normalize to
//! the all-zero rect whenever the result would be empty. Integer edges
//! saturate at the type's range, so every operator is total.

use core::ops::{Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub};

use super::{Point, Scalar, Size};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect<T = i32> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    /// Create a new rect
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T: Scalar> Rect<T> {
    /// The all-zero rect
    pub fn zero() -> Self {
        Self::new(T::ZERO, T::ZERO, T::ZERO, T::ZERO)
    }

    /// Create a rect from its origin and size
    pub fn from_origin_size(origin: Point<T>, size: Size<T>) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Smallest rect spanning two corner points (`br` is exclusive)
    pub fn from_points(a: Point<T>, b: Point<T>) -> Self {
        let x = a.x.min_of(b.x);
        let y = a.y.min_of(b.y);
        Self::new(x, y, a.x.max_of(b.x).sat_sub(x), a.y.max_of(b.y).sat_sub(y))
    }

    /// Top-left corner
    pub fn tl(&self) -> Point<T> {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner (exclusive)
    pub fn br(&self) -> Point<T> {
        Point::new(self.right(), self.bottom())
    }

    /// Exclusive right edge
    fn right(&self) -> T {
        self.x.sat_add(self.width)
    }

    /// Exclusive bottom edge
    fn bottom(&self) -> T {
        self.y.sat_add(self.height)
    }

    /// Size of the rect
    pub fn size(&self) -> Size<T> {
        Size::new(self.width, self.height)
    }

    /// `width * height`
    pub fn area(&self) -> T {
        self.width.sat_mul(self.height)
    }

    /// True if width or height is not positive
    pub fn is_empty(&self) -> bool {
        self.width <= T::ZERO || self.height <= T::ZERO
    }

    /// Half-open containment test
    pub fn contains(&self, pt: Point<T>) -> bool {
        self.x <= pt.x && pt.x < self.right() && self.y <= pt.y && pt.y < self.bottom()
    }

    /// True if `other` lies entirely inside this rect
    ///
    /// Empty rects are contained in everything.
    pub fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grow (or shrink, for negative `d`) by `d` on every side
    pub fn inflate(&self, d: T) -> Self {
        let grow = d.sat_add(d);
        Self::new(self.x.sat_sub(d), self.y.sat_sub(d), self.width.sat_add(grow), self.height.sat_add(grow))
    }
}

impl<T: Scalar> BitAnd for Rect<T> {
    type Output = Self;

    /// Intersection
    fn bitand(self, rhs: Self) -> Self {
        let mut r = self;
        r &= rhs;
        r
    }
}

impl<T: Scalar> BitAndAssign for Rect<T> {
    fn bitand_assign(&mut self, rhs: Self) {
        if self.is_empty() || rhs.is_empty() {
            *self = Self::zero();
            return;
        }
        let x1 = self.x.max_of(rhs.x);
        let y1 = self.y.max_of(rhs.y);
        let x2 = self.right().min_of(rhs.right());
        let y2 = self.bottom().min_of(rhs.bottom());
        // Compare edges before subtracting so disjoint rects never produce
        // a negative or wrapped extent.
        if x2 <= x1 || y2 <= y1 {
            *self = Self::zero();
        } else {
            *self = Self::new(x1, y1, x2.sat_sub(x1), y2.sat_sub(y1));
        }
    }
}

impl<T: Scalar> BitOr for Rect<T> {
    type Output = Self;

    /// Bounding union
    fn bitor(self, rhs: Self) -> Self {
        let mut r = self;
        r |= rhs;
        r
    }
}

impl<T: Scalar> BitOrAssign for Rect<T> {
    fn bitor_assign(&mut self, rhs: Self) {
        if self.is_empty() {
            *self = if rhs.is_empty() { Self::zero() } else { rhs };
            return;
        }
        if rhs.is_empty() {
            return;
        }
        let x1 = self.x.min_of(rhs.x);
        let y1 = self.y.min_of(rhs.y);
        let x2 = self.right().max_of(rhs.right());
        let y2 = self.bottom().max_of(rhs.bottom());
        *self = Self::new(x1, y1, x2.sat_sub(x1), y2.sat_sub(y1));
    }
}

impl<T: Scalar> Add<Point<T>> for Rect<T> {
    type Output = Self;

    fn add(self, rhs: Point<T>) -> Self {
        Self::new(self.x.sat_add(rhs.x), self.y.sat_add(rhs.y), self.width, self.height)
    }
}

impl<T: Scalar> Sub<Point<T>> for Rect<T> {
    type Output = Self;

    fn sub(self, rhs: Point<T>) -> Self {
        Self::new(self.x.sat_sub(rhs.x), self.y.sat_sub(rhs.y), self.width, self.height)
    }
}

impl Rect<i32> {
    /// Area widened to `i64`
    pub fn area_i64(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }
}
