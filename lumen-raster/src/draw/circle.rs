//! Midpoint circle

use lumen_core::{ImageMut, Point};

use super::ellipse::{ellipse_q16, MAX_AXIS};
use super::line::{LineType, XY_SHIFT};

/// Writes one octant step of the circle, clipping only when asked to
struct Plotter<'i, 'a> {
    img: &'i mut ImageMut<'a>,
    color: u16,
    fill: bool,
    clip: bool,
    w: i64,
    h: i64,
}

impl Plotter<'_, '_> {
    /// Two points (stroke) or the span between them (fill) on row `y`
    fn pair(&mut self, y: i64, x1: i64, x2: i64) {
        if !self.clip {
            if self.fill {
                self.img.hline(y as usize, x1 as usize, x2 as usize, self.color);
            } else {
                self.img.set_pixel(x1 as usize, y as usize, self.color);
                self.img.set_pixel(x2 as usize, y as usize, self.color);
            }
            return;
        }
        if y < 0 || y >= self.h || x1 >= self.w || x2 < 0 {
            return;
        }
        if self.fill {
            self.img
                .hline(y as usize, x1.max(0) as usize, x2.min(self.w - 1) as usize, self.color);
        } else {
            if x1 >= 0 {
                self.img.set_pixel(x1 as usize, y as usize, self.color);
            }
            if x2 < self.w {
                self.img.set_pixel(x2 as usize, y as usize, self.color);
            }
        }
    }
}

/// One-pixel or filled circle with 8-connected outline
///
/// The radius is clamped to [`MAX_AXIS`], like ellipse axes.
pub fn circle_simple(img: &mut ImageMut<'_>, center: Point<i32>, radius: i32, color: u16, fill: bool) {
    if radius < 0 {
        return;
    }
    let radius = (radius as i64).min(MAX_AXIS);
    let (w, h) = (img.width() as i64, img.height() as i64);
    let (cx, cy) = (center.x as i64, center.y as i64);
    if cx + radius < 0 || cx - radius >= w || cy + radius < 0 || cy - radius >= h {
        return;
    }
    let inside = cx >= radius && cx < w - radius && cy >= radius && cy < h - radius;
    let mut plot = Plotter {
        img,
        color,
        fill,
        clip: !inside,
        w,
        h,
    };

    let mut err = 0;
    let mut dx = radius;
    let mut dy = 0;
    let mut plus = 1;
    let mut minus = (radius << 1) - 1;

    while dx >= dy {
        let (x11, x12) = (cx - dx, cx + dx);
        let (x21, x22) = (cx - dy, cx + dy);
        let (y11, y12) = (cy - dy, cy + dy);
        let (y21, y22) = (cy - dx, cy + dx);

        if inside || (x11 < w && x12 >= 0 && y21 < h && y22 >= 0) {
            plot.pair(y11, x11, x12);
            plot.pair(y12, x11, x12);
            plot.pair(y21, x21, x22);
            plot.pair(y22, x21, x22);
        }

        dy += 1;
        err += plus;
        plus += 2;
        if err > 0 {
            err -= minus;
            dx -= 1;
            minus -= 2;
        }
    }
}

/// Circle outline of any thickness, or a filled disc when `thickness < 0`
///
/// Thick and 4-connected circles are drawn as polygonal ellipses.
pub fn circle(img: &mut ImageMut<'_>, center: Point<i32>, radius: i32, color: u16, thickness: i32, line_type: LineType) {
    if radius < 0 {
        return;
    }
    if thickness > 1 || line_type != LineType::Eight {
        let c = Point::new((center.x as i64) << XY_SHIFT, (center.y as i64) << XY_SHIFT);
        let r = (radius as i64).min(MAX_AXIS) << XY_SHIFT;
        ellipse_q16(img, c, (r, r), 0, 0, 360, color, thickness, line_type);
    } else {
        circle_simple(img, center, radius, color, thickness < 0);
    }
}
