//! Line scan conversion
//!
//! Integer lines use an error-term DDA along the major axis. Sub-pixel
//! outlines (polygon edges produced by tessellation) use `line2`, which
//! steps the minor axis in Q16 fixed point. Thick lines become a filled
//! quadrilateral with optional round caps.

use lumen_core::trig::isqrt;
use lumen_core::{ImageMut, Point, Size};

use super::circle::circle_simple;
use super::poly::fill_convex;

/// Fractional bits of sub-pixel coordinates
pub const XY_SHIFT: u32 = 16;
/// 1.0 in Q16
pub const XY_ONE: i64 = 1 << XY_SHIFT;

/// Thickness value meaning "filled"
pub const FILLED: i32 = -1;

/// Largest accepted stroke thickness
pub const MAX_THICKNESS: i32 = 32767;

/// Cap flag: round cap at the first endpoint
pub const CAP_START: u8 = 0x1;
/// Cap flag: round cap at the second endpoint
pub const CAP_END: u8 = 0x2;

/// Pixel connectivity of aliased lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineType {
    /// Steps may only move horizontally or vertically
    Four,
    /// Steps may move diagonally
    #[default]
    Eight,
}

/// Clip the segment `p1`-`p2` to `[0, size)`
///
/// Returns the clipped endpoints, or `None` if no part of the segment lies
/// inside.
pub fn clip_line(size: Size<i64>, p1: Point<i64>, p2: Point<i64>) -> Option<(Point<i64>, Point<i64>)> {
    if size.width <= 0 || size.height <= 0 {
        return None;
    }
    let right = size.width - 1;
    let bottom = size.height - 1;
    let (mut x1, mut y1, mut x2, mut y2) = (p1.x, p1.y, p2.x, p2.y);

    let code = |x: i64, y: i64| -> u8 {
        (x < 0) as u8 | ((x > right) as u8) << 1 | ((y < 0) as u8) << 2 | ((y > bottom) as u8) << 3
    };
    let mut c1 = code(x1, y1);
    let mut c2 = code(x2, y2);

    if c1 & c2 == 0 && c1 | c2 != 0 {
        if c1 & 12 != 0 {
            let a = if c1 < 8 { 0 } else { bottom };
            x1 += ((a - y1) as f64 * (x2 - x1) as f64 / (y2 - y1) as f64) as i64;
            y1 = a;
            c1 = code(x1, y1) & 3;
        }
        if c2 & 12 != 0 {
            let a = if c2 < 8 { 0 } else { bottom };
            x2 += ((a - y2) as f64 * (x2 - x1) as f64 / (y2 - y1) as f64) as i64;
            y2 = a;
            c2 = code(x2, y2) & 3;
        }
        if c1 & c2 == 0 && c1 | c2 != 0 {
            if c1 != 0 {
                let a = if c1 == 1 { 0 } else { right };
                y1 += ((a - x1) as f64 * (y2 - y1) as f64 / (x2 - x1) as f64) as i64;
                x1 = a;
                c1 = 0;
            }
            if c2 != 0 {
                let a = if c2 == 1 { 0 } else { right };
                y2 += ((a - x2) as f64 * (y2 - y1) as f64 / (x2 - x1) as f64) as i64;
                x2 = a;
                c2 = 0;
            }
        }
    }

    (c1 | c2 == 0).then(|| (Point::new(x1, y1), Point::new(x2, y2)))
}

/// Pixels of an aliased line from `p1` to `p2`, clipped to an image size
///
/// Visits the endpoints and everything between them in order from `p1`.
#[derive(Debug, Clone)]
pub struct LineIterator {
    pos: Point<i32>,
    err: i64,
    plus_delta: i64,
    minus_delta: i64,
    plus_step: Point<i32>,
    minus_step: Point<i32>,
    count: i64,
}

impl LineIterator {
    pub fn new(size: Size<i32>, p1: Point<i32>, p2: Point<i32>, line_type: LineType) -> Self {
        let bounds = Size::new(size.width as i64, size.height as i64);
        let inside = |p: Point<i32>| p.x >= 0 && p.y >= 0 && p.x < size.width && p.y < size.height;
        let (a, b) = if inside(p1) && inside(p2) {
            (p1.to_i64(), p2.to_i64())
        } else {
            match clip_line(bounds, p1.to_i64(), p2.to_i64()) {
                Some(clipped) => clipped,
                None => return Self::empty(),
            }
        };

        let mut dx = b.x - a.x;
        let mut dy = b.y - a.y;
        let sx = if dx < 0 { -1 } else { 1 };
        let sy = if dy < 0 { -1 } else { 1 };
        dx = dx.abs();
        dy = dy.abs();

        let mut major = Point::new(sx, 0);
        let mut minor = Point::new(0, sy);
        if dy > dx {
            core::mem::swap(&mut dx, &mut dy);
            core::mem::swap(&mut major, &mut minor);
        }

        let pos = Point::new(a.x as i32, a.y as i32);
        match line_type {
            LineType::Eight => Self {
                pos,
                err: dx - 2 * dy,
                plus_delta: 2 * dx,
                minus_delta: -2 * dy,
                plus_step: minor,
                minus_step: major,
                count: dx + 1,
            },
            LineType::Four => Self {
                pos,
                err: 0,
                plus_delta: 2 * dx + 2 * dy,
                minus_delta: -2 * dy,
                plus_step: minor - major,
                minus_step: major,
                count: dx + dy + 1,
            },
        }
    }

    fn empty() -> Self {
        Self {
            pos: Point::ORIGIN,
            err: 0,
            plus_delta: 0,
            minus_delta: 0,
            plus_step: Point::ORIGIN,
            minus_step: Point::ORIGIN,
            count: 0,
        }
    }

    /// Pixels left to visit
    pub fn remaining(&self) -> usize {
        self.count.max(0) as usize
    }
}

impl Iterator for LineIterator {
    type Item = Point<i32>;

    fn next(&mut self) -> Option<Point<i32>> {
        if self.count <= 0 {
            return None;
        }
        self.count -= 1;
        let current = self.pos;
        if self.err < 0 {
            self.err += self.minus_delta + self.plus_delta;
            self.pos += self.minus_step + self.plus_step;
        } else {
            self.err += self.minus_delta;
            self.pos += self.minus_step;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for LineIterator {}

/// Aliased one-pixel line
pub fn line(img: &mut ImageMut<'_>, p1: Point<i32>, p2: Point<i32>, color: u16, line_type: LineType) {
    for p in LineIterator::new(img.size(), p1, p2, line_type) {
        img.set_pixel(p.x as usize, p.y as usize, color);
    }
}

/// One-pixel line between Q16 endpoints
pub fn line2(img: &mut ImageMut<'_>, p1: Point<i64>, p2: Point<i64>, color: u16) {
    let (w, h) = (img.width(), img.height());
    let scaled = Size::new((w as i64) << XY_SHIFT, (h as i64) << XY_SHIFT);
    let Some((mut a, mut b)) = clip_line(scaled, p1, p2) else {
        return;
    };

    let ax = (b.x - a.x).abs();
    let ay = (b.y - a.y).abs();
    let x_major = ax > ay;
    // Walk the major axis in increasing order
    if (x_major && b.x < a.x) || (!x_major && b.y < a.y) {
        core::mem::swap(&mut a, &mut b);
    }

    let mut put = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && x < w as i64 && y < h as i64 {
            img.set_pixel(x as usize, y as usize, color);
        }
    };
    let half = XY_ONE >> 1;
    put((b.x + half) >> XY_SHIFT, (b.y + half) >> XY_SHIFT);

    if x_major {
        let step = ((b.y - a.y) << XY_SHIFT) / (ax | 1);
        let mut x = (a.x + half) >> XY_SHIFT;
        let mut y = a.y + half;
        for _ in 0..=((b.x - a.x) >> XY_SHIFT) {
            put(x, y >> XY_SHIFT);
            x += 1;
            y += step;
        }
    } else {
        let step = ((b.x - a.x) << XY_SHIFT) / (ay | 1);
        let mut x = a.x + half;
        let mut y = (a.y + half) >> XY_SHIFT;
        for _ in 0..=((b.y - a.y) >> XY_SHIFT) {
            put(x >> XY_SHIFT, y);
            x += step;
            y += 1;
        }
    }
}

/// Round a Q16 value to the nearest pixel
#[inline]
pub(crate) fn q16_round(v: i64) -> i64 {
    (v + (XY_ONE >> 1)) >> XY_SHIFT
}

/// Line of any thickness between endpoints carrying `shift` fractional bits
///
/// `caps` selects which endpoints get a round cap (`CAP_START`, `CAP_END`).
#[allow(clippy::too_many_arguments)]
pub fn thick_line(
    img: &mut ImageMut<'_>,
    p0: Point<i64>,
    p1: Point<i64>,
    color: u16,
    thickness: i32,
    line_type: LineType,
    caps: u8,
    shift: u32,
) {
    let up = XY_SHIFT - shift;
    let mut p0 = Point::new(p0.x << up, p0.y << up);
    let p1 = Point::new(p1.x << up, p1.y << up);

    if thickness <= 1 {
        if line_type == LineType::Four || shift == 0 {
            let a = Point::new(q16_round(p0.x) as i32, q16_round(p0.y) as i32);
            let b = Point::new(q16_round(p1.x) as i32, q16_round(p1.y) as i32);
            line(img, a, b, color, line_type);
        } else {
            line2(img, p0, p1, color);
        }
        return;
    }

    let thickness = thickness.min(MAX_THICKNESS) as i64;
    let odd = thickness & 1;
    let half = (thickness << (XY_SHIFT - 1)) + odd * (XY_ONE >> 1);

    let mut dx = p0.x - p1.x;
    let mut dy = p1.y - p0.y;
    if dx != 0 || dy != 0 {
        let (mut sx, mut sy) = (dx, dy);
        while sx.abs() > (1 << 30) || sy.abs() > (1 << 30) {
            sx >>= 1;
            sy >>= 1;
        }
        let len = isqrt((sx * sx + sy * sy) as u64) as i64;
        let len = len.max(1);
        let scale = |v: i64| {
            let num = v * half;
            if num >= 0 {
                (num + len / 2) / len
            } else {
                (num - len / 2) / len
            }
        };
        dx = scale(sx);
        dy = scale(sy);
        let dp = Point::new(dy, dx);
        let quad = [
            Point::new(p0.x + dp.x, p0.y + dp.y),
            Point::new(p0.x - dp.x, p0.y - dp.y),
            Point::new(p1.x - dp.x, p1.y - dp.y),
            Point::new(p1.x + dp.x, p1.y + dp.y),
        ];
        fill_convex(img, &quad, color, line_type, XY_SHIFT);
    }

    let radius = ((thickness << (XY_SHIFT - 1)) + (XY_ONE >> 1)) >> XY_SHIFT;
    for flag in [CAP_START, CAP_END] {
        if caps & flag != 0 {
            let center = Point::new(q16_round(p0.x) as i32, q16_round(p0.y) as i32);
            circle_simple(img, center, radius as i32, color, true);
        }
        p0 = p1;
    }
}
