//! Point markers

use heapless::Vec;
use lumen_core::{ImageMut, Point};

use super::line::{thick_line, LineType, CAP_END, CAP_START};

/// Marker shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MarkerType {
    /// `+`
    #[default]
    Cross = 0,
    /// `x`
    TiltedCross = 1,
    /// `+` and `x` combined
    Star = 2,
    /// Square rotated by 45 degrees
    Diamond = 3,
    /// Axis-aligned square outline
    Square = 4,
    /// Triangle pointing up
    TriangleUp = 5,
    /// Triangle pointing down
    TriangleDown = 6,
}

impl MarkerType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Cross),
            1 => Some(Self::TiltedCross),
            2 => Some(Self::Star),
            3 => Some(Self::Diamond),
            4 => Some(Self::Square),
            5 => Some(Self::TriangleUp),
            6 => Some(Self::TriangleDown),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Line segments making up the marker at `position`
    ///
    /// `size` is the full extent; every vertex lies within `size / 2` of
    /// `position` on both axes.
    pub fn segments(self, position: Point<i32>, size: i32) -> Vec<(Point<i32>, Point<i32>), 4> {
        let s = size / 2;
        let (x, y) = (position.x, position.y);
        let p = Point::new;
        let mut out = Vec::new();
        let mut seg = |a: Point<i32>, b: Point<i32>| {
            let _ = out.push((a, b));
        };
        match self {
            Self::Cross => {
                seg(p(x - s, y), p(x + s, y));
                seg(p(x, y - s), p(x, y + s));
            }
            Self::TiltedCross => {
                seg(p(x - s, y - s), p(x + s, y + s));
                seg(p(x + s, y - s), p(x - s, y + s));
            }
            Self::Star => {
                seg(p(x - s, y), p(x + s, y));
                seg(p(x, y - s), p(x, y + s));
                seg(p(x - s, y - s), p(x + s, y + s));
                seg(p(x + s, y - s), p(x - s, y + s));
            }
            Self::Diamond => {
                seg(p(x, y - s), p(x + s, y));
                seg(p(x + s, y), p(x, y + s));
                seg(p(x, y + s), p(x - s, y));
                seg(p(x - s, y), p(x, y - s));
            }
            Self::Square => {
                seg(p(x - s, y - s), p(x + s, y - s));
                seg(p(x + s, y - s), p(x + s, y + s));
                seg(p(x + s, y + s), p(x - s, y + s));
                seg(p(x - s, y + s), p(x - s, y - s));
            }
            Self::TriangleUp => {
                seg(p(x - s, y + s), p(x + s, y + s));
                seg(p(x + s, y + s), p(x, y - s));
                seg(p(x, y - s), p(x - s, y + s));
            }
            Self::TriangleDown => {
                seg(p(x - s, y - s), p(x + s, y - s));
                seg(p(x + s, y - s), p(x, y + s));
                seg(p(x, y + s), p(x - s, y - s));
            }
        }
        out
    }
}

/// Draw `marker` centered on `position`
pub fn draw_marker(
    img: &mut ImageMut<'_>,
    position: Point<i32>,
    color: u16,
    marker: MarkerType,
    size: i32,
    thickness: i32,
    line_type: LineType,
) {
    for (a, b) in marker.segments(position, size) {
        thick_line(img, a.into(), b.into(), color, thickness, line_type, CAP_START | CAP_END, 0);
    }
}
