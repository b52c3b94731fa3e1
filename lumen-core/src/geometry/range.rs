//! Half-open integer interval used for row/column slicing

/// `[start, end)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Range {
    pub start: i32,
    pub end: i32,
}

impl Range {
    /// Create a new range
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Sentinel meaning "the whole axis"
    pub const fn all() -> Self {
        Self::new(i32::MIN, i32::MAX)
    }

    /// True for the [`Range::all`] sentinel
    pub fn is_all(&self) -> bool {
        *self == Self::all()
    }

    /// Number of elements, 0 for inverted ranges
    pub fn size(&self) -> i32 {
        if self.end > self.start {
            self.end.saturating_sub(self.start)
        } else {
            0
        }
    }

    /// True if the range holds no elements
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Clamp to `[0, len)`
    pub fn clamp_to(&self, len: i32) -> Self {
        let start = self.start.clamp(0, len);
        let end = self.end.clamp(start, len);
        Self::new(start, end)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::all()
    }
}

impl From<core::ops::Range<i32>> for Range {
    fn from(r: core::ops::Range<i32>) -> Self {
        Self::new(r.start, r.end)
    }
}
