//! Rotated rectangle

use super::point::{ceil_f32, floor_f32};
use super::{Point, Rect, Size};
use crate::trig::sin_cos_deg;

/// A rectangle rotated about its center
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotatedRect {
    /// Center of the rectangle
    pub center: Point<f32>,
    /// Width and height before rotation
    pub size: Size<f32>,
    /// Clockwise rotation in degrees (y axis points down)
    pub angle: f32,
}

impl RotatedRect {
    /// Create a new rotated rect
    pub const fn new(center: Point<f32>, size: Size<f32>, angle: f32) -> Self {
        Self {
            center,
            size,
            angle,
        }
    }

    /// The four corners: bottom-left, top-left, top-right, bottom-right
    /// (names refer to the unrotated rect)
    pub fn points(&self) -> [Point<f32>; 4] {
        let (sin, cos) = sin_cos_deg(self.angle);
        let a = sin * 0.5;
        let b = cos * 0.5;
        let (cx, cy) = (self.center.x, self.center.y);
        let (w, h) = (self.size.width, self.size.height);

        let p0 = Point::new(cx - a * h - b * w, cy + b * h - a * w);
        let p1 = Point::new(cx + a * h - b * w, cy - b * h - a * w);
        let p2 = Point::new(2.0 * cx - p0.x, 2.0 * cy - p0.y);
        let p3 = Point::new(2.0 * cx - p1.x, 2.0 * cy - p1.y);
        [p0, p1, p2, p3]
    }

    /// Integer bounding box including every pixel touched by a corner
    pub fn bounding_rect(&self) -> Rect<i32> {
        let (min, max) = self.extent();
        let x = floor_f32(min.x);
        let y = floor_f32(min.y);
        Rect::new(x, y, ceil_f32(max.x) - x + 1, ceil_f32(max.y) - y + 1)
    }

    /// Exact float bounding box
    pub fn bounding_rect_f32(&self) -> Rect<f32> {
        let (min, max) = self.extent();
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    fn extent(&self) -> (Point<f32>, Point<f32>) {
        let pts = self.points();
        let mut min = pts[0];
        let mut max = pts[0];
        for p in &pts[1..] {
            min.x = if p.x < min.x { p.x } else { min.x };
            min.y = if p.y < min.y { p.y } else { min.y };
            max.x = if p.x > max.x { p.x } else { max.x };
            max.y = if p.y > max.y { p.y } else { max.y };
        }
        (min, max)
    }
}
