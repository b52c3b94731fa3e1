//! Polygon and polyline rasterization
//!
//! Vertices carry `shift` fractional bits and are widened to Q16 internally.
//! Any slice of `Point<i32>` or `Point<i64>` is accepted.

use heapless::Vec;
use lumen_core::{ImageMut, Point};

use super::line::{line, line2, q16_round, thick_line, LineType, XY_ONE, XY_SHIFT};

/// Capacity of the edge table used by the general polygon fill
pub const MAX_POLY_EDGES: usize = 256;

/// One non-horizontal polygon edge in scanline form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PolyEdge {
    /// First scanline covered
    pub y0: i32,
    /// Scanline where the edge stops (exclusive)
    pub y1: i32,
    /// Q16 x at `y0`
    pub x: i64,
    /// Q16 x increment per scanline
    pub dx: i64,
}

/// Fixed-capacity edge table
pub type EdgeList = Vec<PolyEdge, MAX_POLY_EDGES>;

#[inline]
fn vertex<P: Copy + Into<Point<i64>>>(v: &[P], i: usize) -> Point<i64> {
    v[i].into()
}

/// Outline from `a` to `b` (Q16), integer or fixed-point depending on `shift`
fn outline(img: &mut ImageMut<'_>, a: Point<i64>, b: Point<i64>, color: u16, line_type: LineType, shift: u32) {
    if shift == 0 {
        let a = Point::new((a.x >> XY_SHIFT) as i32, (a.y >> XY_SHIFT) as i32);
        let b = Point::new((b.x >> XY_SHIFT) as i32, (b.y >> XY_SHIFT) as i32);
        line(img, a, b, color, line_type);
    } else {
        line2(img, a, b, color);
    }
}

#[derive(Debug, Clone, Copy)]
struct Walker {
    idx: usize,
    di: usize,
    x: i64,
    dx: i64,
    ye: i64,
}

/// Fill a convex polygon
///
/// Two edge walkers leave the topmost vertex in opposite directions and
/// advance in lock-step; each scanline is filled between them. The outline
/// is drawn separately so edge pixels match `line`/`line2` exactly.
pub fn fill_convex<P>(img: &mut ImageMut<'_>, v: &[P], color: u16, line_type: LineType, shift: u32)
where
    P: Copy + Into<Point<i64>>,
{
    let npts = v.len();
    if npts == 0 || shift > XY_SHIFT {
        return;
    }
    let (w, h) = (img.width() as i64, img.height() as i64);
    let delta = (1i64 << shift) >> 1;
    let up = XY_SHIFT - shift;

    let first = vertex(v, 0);
    let (mut xmin, mut xmax, mut ymin, mut ymax) = (first.x, first.x, first.y, first.y);
    let mut imin = 0;
    let last = vertex(v, npts - 1);
    let mut p0 = Point::new(last.x << up, last.y << up);

    for i in 0..npts {
        let p = vertex(v, i);
        if p.y < ymin {
            ymin = p.y;
            imin = i;
        }
        ymax = ymax.max(p.y);
        xmax = xmax.max(p.x);
        xmin = xmin.min(p.x);

        let p = Point::new(p.x << up, p.y << up);
        outline(img, p0, p, color, line_type, shift);
        p0 = p;
    }

    let xmin = (xmin + delta) >> shift;
    let xmax = (xmax + delta) >> shift;
    let ymin = (ymin + delta) >> shift;
    let ymax = (ymax + delta) >> shift;
    if npts < 3 || xmax < 0 || ymax < 0 || xmin >= w || ymin >= h {
        return;
    }
    let ymax = ymax.min(h - 1);

    let start = Walker {
        idx: imin,
        di: 1,
        x: -XY_ONE,
        dx: 0,
        ye: ymin,
    };
    let mut walkers = [start, Walker { di: npts - 1, ..start }];
    let mut edges = npts as i64;
    let mut y = ymin;

    loop {
        for e in walkers.iter_mut() {
            if y < e.ye {
                continue;
            }
            let mut idx0 = e.idx;
            let mut idx = (idx0 + e.di) % npts;
            loop {
                let more = edges > 0;
                edges -= 1;
                if !more {
                    break;
                }
                let ty = (vertex(v, idx).y + delta) >> shift;
                if ty > y {
                    let xs = vertex(v, idx0).x << up;
                    let xe = vertex(v, idx).x << up;
                    e.ye = ty;
                    e.dx = ((xe - xs) * 2 + (ty - y)) / (2 * (ty - y));
                    e.x = xs;
                    e.idx = idx;
                    break;
                }
                idx0 = idx;
                idx = (idx + e.di) % npts;
            }
        }

        if edges < 0 {
            break;
        }

        if y >= 0 {
            let [a, b] = walkers;
            let (left, right) = if a.x > b.x { (b.x, a.x) } else { (a.x, b.x) };
            let x1 = (left + (XY_ONE >> 1)) >> XY_SHIFT;
            let x2 = (right + (XY_ONE >> 1)) >> XY_SHIFT;
            if x2 >= 0 && x1 < w {
                img.hline(y as usize, x1.max(0) as usize, x2.min(w - 1) as usize, color);
            }
        }

        for e in walkers.iter_mut() {
            e.x += e.dx;
        }
        y += 1;
        if y > ymax {
            break;
        }
    }
}

/// Append the edges of one closed contour to `edges` and draw its outline
///
/// Horizontal edges are skipped. Edges that do not fit are dropped with a
/// warning.
pub fn collect_poly_edges<P>(
    img: &mut ImageMut<'_>,
    v: &[P],
    color: u16,
    line_type: LineType,
    shift: u32,
    edges: &mut EdgeList,
) where
    P: Copy + Into<Point<i64>>,
{
    let Some(&last) = v.last() else {
        return;
    };
    if shift > XY_SHIFT {
        return;
    }
    let delta = (1i64 << shift) >> 1;
    let up = XY_SHIFT - shift;
    // x to Q16, y to whole scanlines
    let scan = |p: P| {
        let p: Point<i64> = p.into();
        Point::new(p.x << up, (p.y + delta) >> shift)
    };

    let mut pt0 = scan(last);
    let mut dropped = 0u32;
    for &p in v {
        let pt1 = scan(p);
        let a = Point::new(q16_round(pt0.x) as i32, pt0.y as i32);
        let b = Point::new(q16_round(pt1.x) as i32, pt1.y as i32);
        line(img, a, b, color, line_type);

        if pt0.y != pt1.y {
            let (top, bottom) = if pt0.y < pt1.y { (pt0, pt1) } else { (pt1, pt0) };
            let edge = PolyEdge {
                y0: top.y as i32,
                y1: bottom.y as i32,
                x: top.x,
                dx: (pt1.x - pt0.x) / (pt1.y - pt0.y),
            };
            if edges.push(edge).is_err() {
                dropped += 1;
            }
        }
        pt0 = pt1;
    }

    if dropped > 0 {
        warn!("Polygon edge table full, dropped {} edges", dropped);
    }
}

/// Fill the interior of a collected edge table with the even-odd rule
pub fn fill_edge_collection(img: &mut ImageMut<'_>, edges: &mut [PolyEdge], color: u16) {
    if edges.len() < 2 {
        return;
    }
    let (w, h) = (img.width(), img.height());

    let mut y_min = i32::MAX;
    let mut y_max = i32::MIN;
    let mut x_min = i64::MAX;
    let mut x_max = i64::MIN;
    for e in edges.iter() {
        let x_end = e.x + (e.y1 - e.y0) as i64 * e.dx;
        y_min = y_min.min(e.y0);
        y_max = y_max.max(e.y1);
        x_min = x_min.min(e.x).min(x_end);
        x_max = x_max.max(e.x).max(x_end);
    }
    if y_max < 0 || y_min >= h || x_max < 0 || x_min >= (w as i64) << XY_SHIFT {
        return;
    }

    edges.sort_unstable_by(|a, b| (a.y0, a.x, a.dx).cmp(&(b.y0, b.x, b.dx)));

    let y_max = y_max.min(h);
    let mut active: Vec<usize, MAX_POLY_EDGES> = Vec::new();
    let mut next = 0;
    let mut y = edges[0].y0;

    while y < y_max {
        active.retain(|&i| edges[i].y1 != y);

        while next < edges.len() && edges[next].y0 == y {
            let x = edges[next].x;
            let pos = active
                .iter()
                .position(|&i| edges[i].x >= x)
                .unwrap_or(active.len());
            if active.push(next).is_ok() {
                active[pos..].rotate_right(1);
            }
            next += 1;
        }

        if y >= 0 {
            for pair in active.chunks_exact(2) {
                let (a, b) = (edges[pair[0]].x, edges[pair[1]].x);
                let (left, right) = if a > b { (b, a) } else { (a, b) };
                let x1 = (left + XY_ONE - 1) >> XY_SHIFT;
                let x2 = right >> XY_SHIFT;
                if x1 < w as i64 && x2 >= 0 {
                    img.hline(y as usize, x1.max(0) as usize, x2.min(w as i64 - 1) as usize, color);
                }
            }
        }

        for &i in active.iter() {
            edges[i].x += edges[i].dx;
        }

        // Crossings move by at most a few places per scanline
        let mut swapped = true;
        while swapped {
            swapped = false;
            for k in 1..active.len() {
                if edges[active[k - 1]].x > edges[active[k]].x {
                    active.swap(k - 1, k);
                    swapped = true;
                }
            }
        }

        y += 1;
    }
}

/// Fill any number of contours as one even-odd region
pub fn fill_poly<P>(img: &mut ImageMut<'_>, contours: &[&[P]], color: u16, line_type: LineType, shift: u32)
where
    P: Copy + Into<Point<i64>>,
{
    let mut edges = EdgeList::new();
    for contour in contours {
        collect_poly_edges(img, contour, color, line_type, shift, &mut edges);
    }
    fill_edge_collection(img, &mut edges, color);
}

/// Connected line segments through `v`, closing back to the first vertex
/// when `closed`
pub fn polyline<P>(
    img: &mut ImageMut<'_>,
    v: &[P],
    closed: bool,
    color: u16,
    thickness: i32,
    line_type: LineType,
    shift: u32,
) where
    P: Copy + Into<Point<i64>>,
{
    let count = v.len();
    if count == 0 {
        return;
    }
    let first = if closed { count - 1 } else { 0 };
    let mut p0 = vertex(v, first);
    // Open polylines get a cap at the very first vertex as well
    let mut caps = if closed { 2 } else { 3 };
    for i in (!closed as usize)..count {
        let p = vertex(v, i);
        thick_line(img, p0, p, color, thickness, line_type, caps, shift);
        p0 = p;
        caps = 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::PixelFormat;

    const W: usize = 16;

    fn filled(buf: &[u8]) -> usize {
        buf.iter().filter(|&&b| b != 0).count()
    }

    #[test]
    fn test_convex_square_exact() {
        let mut buf = [0u8; W * W];
        let mut img = ImageMut::new(&mut buf, W, W, PixelFormat::Rgb332).unwrap();
        let pts = [Point::new(2, 2), Point::new(6, 2), Point::new(6, 5), Point::new(2, 5)];
        fill_convex(&mut img, &pts, 9, LineType::Eight, 0);
        for y in 0..W {
            for x in 0..W {
                let inside = (2..=6).contains(&x) && (2..=5).contains(&y);
                assert_eq!(img.pixel(x, y), if inside { 9 } else { 0 }, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_convex_triangle_partly_outside() {
        let mut buf = [0u8; W * W];
        let mut img = ImageMut::new(&mut buf, W, W, PixelFormat::Rgb332).unwrap();
        let pts = [Point::new(-8, -8), Point::new(20, 2), Point::new(2, 20)];
        fill_convex(&mut img, &pts, 1, LineType::Eight, 0);
        assert_eq!(img.pixel(0, 0), 1);
        assert_eq!(img.pixel(5, 5), 1);
        assert_eq!(img.pixel(15, 15), 0);
    }

    #[test]
    fn test_general_fill_matches_convex_on_square() {
        let pts = [Point::new(3, 1), Point::new(10, 1), Point::new(10, 7), Point::new(3, 7)];
        let mut a_buf = [0u8; W * W];
        let mut b_buf = [0u8; W * W];
        {
            let mut a = ImageMut::new(&mut a_buf, W, W, PixelFormat::Rgb332).unwrap();
            fill_convex(&mut a, &pts, 5, LineType::Eight, 0);
        }
        {
            let mut b = ImageMut::new(&mut b_buf, W, W, PixelFormat::Rgb332).unwrap();
            let contour: &[Point] = &pts;
            fill_poly(&mut b, &[contour], 5, LineType::Eight, 0);
        }
        assert_eq!(a_buf, b_buf);
        assert_eq!(filled(&a_buf), 8 * 7);
    }

    #[test]
    fn test_even_odd_hole() {
        let mut buf = [0u8; W * W];
        let mut img = ImageMut::new(&mut buf, W, W, PixelFormat::Rgb332).unwrap();
        let outer = [Point::new(1, 1), Point::new(14, 1), Point::new(14, 14), Point::new(1, 14)];
        let inner = [Point::new(5, 5), Point::new(10, 5), Point::new(10, 10), Point::new(5, 10)];
        fill_poly(&mut img, &[&outer[..], &inner[..]], 3, LineType::Eight, 0);
        assert_eq!(img.pixel(2, 2), 3);
        assert_eq!(img.pixel(12, 12), 3);
        assert_eq!(img.pixel(7, 7), 0);
        // hole outline itself is drawn
        assert_eq!(img.pixel(5, 7), 3);
    }

    #[test]
    fn test_concave_notch() {
        // "U" shape opening upwards
        let mut buf = [0u8; W * W];
        let mut img = ImageMut::new(&mut buf, W, W, PixelFormat::Rgb332).unwrap();
        let u = [
            Point::new(1, 1),
            Point::new(4, 1),
            Point::new(4, 10),
            Point::new(10, 10),
            Point::new(10, 1),
            Point::new(13, 1),
            Point::new(13, 13),
            Point::new(1, 13),
        ];
        fill_poly(&mut img, &[&u[..]], 1, LineType::Eight, 0);
        assert_eq!(img.pixel(2, 5), 1);
        assert_eq!(img.pixel(12, 5), 1);
        assert_eq!(img.pixel(7, 5), 0);
        assert_eq!(img.pixel(7, 12), 1);
    }

    #[test]
    fn test_edge_table_overflow_is_bounded() {
        let mut buf = [0u8; W * W];
        let mut img = ImageMut::new(&mut buf, W, W, PixelFormat::Rgb332).unwrap();
        let mut edges = EdgeList::new();
        let zigzag: heapless::Vec<Point, 300> = (0..300)
            .map(|i| Point::new(i % W as i32, (i % 2) * 4))
            .collect();
        collect_poly_edges(&mut img, &zigzag, 1, LineType::Eight, 0, &mut edges);
        assert_eq!(edges.len(), MAX_POLY_EDGES);
        fill_edge_collection(&mut img, &mut edges, 1);
    }

    #[test]
    fn test_open_and_closed_polyline() {
        let pts = [Point::new(1, 1), Point::new(8, 1), Point::new(8, 8)];
        let mut open_buf = [0u8; W * W];
        let mut closed_buf = [0u8; W * W];
        {
            let mut img = ImageMut::new(&mut open_buf, W, W, PixelFormat::Rgb332).unwrap();
            polyline(&mut img, &pts, false, 1, 1, LineType::Eight, 0);
        }
        {
            let mut img = ImageMut::new(&mut closed_buf, W, W, PixelFormat::Rgb332).unwrap();
            polyline(&mut img, &pts, true, 1, 1, LineType::Eight, 0);
        }
        assert_eq!(filled(&open_buf), 15);
        // closing diagonal adds (2,2)..(7,7)
        assert_eq!(filled(&closed_buf), 21);
        assert_eq!(closed_buf[4 * W + 4], 1);
        assert_eq!(open_buf[4 * W + 4], 0);
    }
}
