//! Ellipses and elliptic arcs as polygon approximations
//!
//! Vertices are generated in Q16 from the Q14 sine table, then stroked as a
//! polyline, filled as a convex polygon (full turn) or filled through the
//! edge table with the center appended (pie slice).

use heapless::Vec;
use lumen_core::trig::{cos_q14, sin_q14, TRIG_SHIFT};
use lumen_core::geometry::round_f32;
use lumen_core::{ImageMut, Point, RotatedRect, Size};

use super::line::{LineType, XY_ONE, XY_SHIFT};
use super::poly::{collect_poly_edges, fill_convex, fill_edge_collection, polyline, EdgeList};

/// Vertex capacity: a full turn at the finest step, the closing vertex and
/// the pie center
pub const MAX_ELLIPSE_POINTS: usize = 80;

/// Largest semi-axis in pixels
pub const MAX_AXIS: i64 = 0x7FFF;

/// Ellipse vertices in Q16
pub type EllipsePoints = Vec<Point<i64>, MAX_ELLIPSE_POINTS>;

/// Angular step in degrees for an ellipse whose larger semi-axis is
/// `max_axis` pixels
pub fn arc_step(max_axis: i64) -> i32 {
    match max_axis {
        i64::MIN..=2 => 90,
        3..=9 => 30,
        10..=14 => 18,
        _ => 5,
    }
}

/// Bring an arc into `[0, 360]`: endpoints ordered, shifted by whole turns,
/// and clamped to one turn
pub fn normalize_arc(arc_start: i32, arc_end: i32) -> (i32, i32) {
    let (mut start, mut end) = if arc_start > arc_end {
        (arc_end as i64, arc_start as i64)
    } else {
        (arc_start as i64, arc_end as i64)
    };
    if start < 0 {
        let turns = (-start + 359) / 360;
        start += turns * 360;
        end += turns * 360;
    }
    if end > 360 {
        let turns = (end - 360 + 359) / 360;
        start -= turns * 360;
        end -= turns * 360;
    }
    if end - start > 360 {
        (0, 360)
    } else {
        (start as i32, end as i32)
    }
}

/// Vertices of an elliptic arc
///
/// `center` and `axes` are Q16; `angle`, the arc bounds and `step` are in
/// degrees. Consecutive duplicates are dropped.
pub fn ellipse_points(
    center: Point<i64>,
    axes: (i64, i64),
    angle: i32,
    arc_start: i32,
    arc_end: i32,
    step: i32,
    out: &mut EllipsePoints,
) {
    let angle = angle.rem_euclid(360);
    let (start, end) = normalize_arc(arc_start, arc_end);
    let sin_r = sin_q14(angle) as i64;
    let cos_r = cos_q14(angle) as i64;
    let shift = 2 * TRIG_SHIFT;
    let half = 1i64 << (shift - 1);
    let step = step.max(1);

    let mut i = start;
    while i < end + step {
        let mut a = i.min(end);
        if a < 0 {
            a += 360;
        }
        let xr = axes.0 * cos_q14(a) as i64;
        let yr = axes.1 * sin_q14(a) as i64;
        let p = Point::new(
            center.x + ((xr * cos_r - yr * sin_r + half) >> shift),
            center.y + ((xr * sin_r + yr * cos_r + half) >> shift),
        );
        if out.last() != Some(&p) && out.push(p).is_err() {
            break;
        }
        i += step;
    }
}

/// Ellipse or arc with Q16 center and semi-axes
#[allow(clippy::too_many_arguments)]
pub fn ellipse_q16(
    img: &mut ImageMut<'_>,
    center: Point<i64>,
    axes: (i64, i64),
    angle: i32,
    arc_start: i32,
    arc_end: i32,
    color: u16,
    thickness: i32,
    line_type: LineType,
) {
    let limit = MAX_AXIS << XY_SHIFT;
    let axes = (axes.0.abs().min(limit), axes.1.abs().min(limit));
    let step = arc_step((axes.0.max(axes.1) + (XY_ONE >> 1)) >> XY_SHIFT);

    let mut v = EllipsePoints::new();
    ellipse_points(center, axes, angle, arc_start, arc_end, step, &mut v);
    if v.len() == 1 {
        let only = v[0];
        let _ = v.push(only);
    }
    if v.is_empty() {
        return;
    }

    if thickness >= 0 {
        polyline(img, &v, false, color, thickness, line_type, XY_SHIFT);
    } else if arc_end as i64 - arc_start as i64 >= 360 {
        fill_convex(img, &v, color, line_type, XY_SHIFT);
    } else {
        let _ = v.push(center);
        let mut edges = EdgeList::new();
        collect_poly_edges(img, &v, color, line_type, XY_SHIFT, &mut edges);
        fill_edge_collection(img, &mut edges, color);
    }
}

/// Ellipse or arc with integer center and semi-axes
#[allow(clippy::too_many_arguments)]
pub fn ellipse(
    img: &mut ImageMut<'_>,
    center: Point<i32>,
    axes: Size<i32>,
    angle: i32,
    arc_start: i32,
    arc_end: i32,
    color: u16,
    thickness: i32,
    line_type: LineType,
) {
    if axes.width < 0 || axes.height < 0 {
        return;
    }
    let c = Point::new((center.x as i64) << XY_SHIFT, (center.y as i64) << XY_SHIFT);
    let a = ((axes.width as i64) << XY_SHIFT, (axes.height as i64) << XY_SHIFT);
    ellipse_q16(img, c, a, angle, arc_start, arc_end, color, thickness, line_type);
}

fn to_q16(v: f32) -> i64 {
    let q = v as f64 * XY_ONE as f64;
    if q >= 0.0 {
        (q + 0.5) as i64
    } else {
        (q - 0.5) as i64
    }
}

/// Ellipse inscribed in a rotated rectangle
pub fn ellipse_box(img: &mut ImageMut<'_>, rect: &RotatedRect, color: u16, thickness: i32, line_type: LineType) {
    let center = Point::new(to_q16(rect.center.x), to_q16(rect.center.y));
    let axes = (to_q16(rect.size.width * 0.5), to_q16(rect.size.height * 0.5));
    ellipse_q16(img, center, axes, round_f32(rect.angle), 0, 360, color, thickness, line_type);
}
