//! Dirty-region tracking
//!
//! Every drawing call reports the rectangle it touched. Rectangles that
//! mostly overlap an existing entry are merged into it; the rest are kept
//! separately up to [`MAX_DIRTY_RECTS`]. When the list is full, or the
//! tracked area reaches the frame area, the tracker collapses to a single
//! full-frame rectangle until it is reset.

use heapless::Vec;
use lumen_core::{Rect, Size};

/// Rectangles tracked before collapsing to the full frame
pub const MAX_DIRTY_RECTS: usize = 10;

/// Coalescing accumulator of changed regions
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    rects: Vec<Rect<i32>, MAX_DIRTY_RECTS>,
    frame: Rect<i32>,
    /// Sum of tracked areas (overlaps counted twice)
    covered: i64,
    overflow: bool,
}

impl DirtyTracker {
    /// Empty tracker for a frame of `size`
    pub fn new(size: Size<i32>) -> Self {
        Self {
            rects: Vec::new(),
            frame: Rect::from_origin_size(lumen_core::Point::ORIGIN, size),
            covered: 0,
            overflow: false,
        }
    }

    /// The full frame rectangle
    pub fn frame(&self) -> Rect<i32> {
        self.frame
    }

    /// True once the tracker reports the whole frame
    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// True if nothing changed since the last reset
    pub fn is_empty(&self) -> bool {
        !self.overflow && self.rects.is_empty()
    }

    /// Record a changed rectangle
    pub fn add(&mut self, rect: Rect<i32>) {
        if self.overflow {
            return;
        }
        let rect = rect & self.frame;
        if rect.is_empty() {
            return;
        }
        let area = rect.area_i64();

        // Best merge: union at least half filled, smallest growth
        let mut best: Option<(usize, i64)> = None;
        for (i, r) in self.rects.iter().enumerate() {
            let existing = r.area_i64();
            let union = (*r | rect).area_i64();
            if 2 * (existing + area) > union {
                let growth = union - existing;
                if best.map_or(true, |(_, g)| growth < g) {
                    best = Some((i, growth));
                }
            }
        }

        match best {
            Some((i, growth)) => {
                self.rects[i] |= rect;
                self.covered += growth;
            }
            None => {
                if self.rects.push(rect).is_err() {
                    debug!("Dirty list full, redrawing whole frame");
                    self.collapse();
                    return;
                }
                self.covered += area;
            }
        }

        if self.covered >= self.frame.area_i64() {
            self.collapse();
        }
    }

    fn collapse(&mut self) {
        self.overflow = true;
        self.rects.clear();
        self.covered = self.frame.area_i64();
    }

    /// Regions to flush: the tracked list, or the whole frame after
    /// overflow
    pub fn rects(&self) -> &[Rect<i32>] {
        if self.overflow {
            core::slice::from_ref(&self.frame)
        } else {
            &self.rects
        }
    }

    /// Smallest rectangle covering every reported region
    pub fn bounding_box(&self) -> Option<Rect<i32>> {
        let bbox = self.rects().iter().fold(Rect::zero(), |acc, r| acc | *r);
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Forget every region
    pub fn reset(&mut self) {
        self.rects.clear();
        self.covered = 0;
        self.overflow = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Point;
    use proptest::prelude::*;

    fn tracker() -> DirtyTracker {
        DirtyTracker::new(Size::new(64, 48))
    }

    #[test]
    fn test_overlapping_rects_merge() {
        let mut d = tracker();
        d.add(Rect::new(0, 0, 4, 4));
        d.add(Rect::new(2, 2, 4, 4));
        assert_eq!(d.rects(), &[Rect::new(0, 0, 6, 6)]);
    }

    #[test]
    fn test_distant_rects_stay_separate() {
        let mut d = tracker();
        d.add(Rect::new(0, 0, 4, 4));
        d.add(Rect::new(40, 30, 4, 4));
        assert_eq!(d.rects().len(), 2);
        assert_eq!(d.bounding_box(), Some(Rect::new(0, 0, 44, 34)));
    }

    #[test]
    fn test_merge_picks_smallest_growth() {
        let mut d = tracker();
        d.add(Rect::new(0, 0, 10, 10));
        d.add(Rect::new(30, 0, 10, 10));
        d.add(Rect::new(31, 1, 10, 10));
        assert_eq!(d.rects(), &[Rect::new(0, 0, 10, 10), Rect::new(30, 0, 11, 11)]);
    }

    #[test]
    fn test_contained_rect_is_absorbed() {
        let mut d = tracker();
        d.add(Rect::new(10, 10, 20, 20));
        d.add(Rect::new(12, 12, 2, 2));
        assert_eq!(d.rects(), &[Rect::new(10, 10, 20, 20)]);
    }

    #[test]
    fn test_clipped_and_empty_ignored() {
        let mut d = tracker();
        d.add(Rect::new(-10, -10, 5, 5));
        d.add(Rect::new(3, 3, 0, 9));
        assert!(d.is_empty());
        d.add(Rect::new(60, 40, 10, 10));
        assert_eq!(d.rects(), &[Rect::new(60, 40, 4, 8)]);
    }

    #[test]
    fn test_full_list_overflows_to_frame() {
        let mut d = tracker();
        for i in 0..MAX_DIRTY_RECTS as i32 {
            d.add(Rect::new(i * 6, (i % 2) * 20, 2, 2));
        }
        assert!(!d.is_overflowed());
        assert_eq!(d.rects().len(), MAX_DIRTY_RECTS);
        d.add(Rect::new(1, 40, 2, 2));
        assert!(d.is_overflowed());
        assert_eq!(d.rects(), &[Rect::new(0, 0, 64, 48)]);
        // further adds change nothing
        d.add(Rect::new(5, 5, 1, 1));
        assert_eq!(d.rects(), &[Rect::new(0, 0, 64, 48)]);
    }

    #[test]
    fn test_covering_frame_overflows() {
        let mut d = tracker();
        d.add(Rect::new(0, 0, 64, 48));
        assert!(d.is_overflowed());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut d = tracker();
        d.add(Rect::new(1, 1, 3, 3));
        d.reset();
        assert!(d.rects().is_empty());
        d.reset();
        assert!(d.rects().is_empty());
        assert_eq!(d.bounding_box(), None);
    }

    fn rect_strategy() -> impl Strategy<Value = Rect<i32>> {
        (-10i32..70, -10i32..55, 0i32..20, 0i32..20).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_never_under_reports(rects in proptest::collection::vec(rect_strategy(), 1..30)) {
            let mut d = tracker();
            for r in &rects {
                d.add(*r);
            }
            let frame = d.frame();
            for r in &rects {
                let r = *r & frame;
                for y in r.y..r.y + r.height {
                    for x in r.x..r.x + r.width {
                        let p = Point::new(x, y);
                        prop_assert!(d.rects().iter().any(|t| t.contains(p)), "{:?} lost", p);
                    }
                }
            }
            if d.is_overflowed() {
                prop_assert_eq!(d.rects(), &[frame][..]);
            }
        }
    }
}
