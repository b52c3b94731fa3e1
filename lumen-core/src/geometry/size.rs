//! 2D size

use super::Scalar;

/// Width and height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size<T = i32> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    /// Create a new size
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl<T: Scalar> Size<T> {
    /// `width * height`
    pub fn area(&self) -> T {
        self.width * self.height
    }

    /// `width / height`, or 0 for a zero height
    pub fn aspect_ratio(&self) -> f64 {
        let h = self.height.to_f64();
        if h == 0.0 {
            0.0
        } else {
            self.width.to_f64() / h
        }
    }

    /// True if either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= T::ZERO || self.height <= T::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_values() {
        let s = Size::new(16, 8);
        assert_eq!(s.area(), 128);
        assert_eq!(s.aspect_ratio(), 2.0);
        assert!(!s.is_empty());
        assert!(Size::new(0, 8).is_empty());
        assert_eq!(Size::new(4, 0).aspect_ratio(), 0.0);
    }
}
