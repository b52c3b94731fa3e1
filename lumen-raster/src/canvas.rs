//! Drawing surface with dirty-region tracking

use lumen_core::trig::{cos_q14, sin_q14, TRIG_SHIFT};
use lumen_core::{Accelerator, ImageMut, ImageRef, Point, Rect, RotatedRect, Size, SoftwareOnly};
use lumen_font::{Font, FontStorage, TextLayout, TextStyle};

use crate::dirty::DirtyTracker;
use crate::draw::{self, LineType, MarkerType};
use crate::draw::ellipse::MAX_AXIS;
use crate::draw::line::{CAP_END, CAP_START, MAX_THICKNESS};

/// Rasterizer over a borrowed image view
///
/// Every drawing call clips to the view and records the touched area in a
/// [`DirtyTracker`]. Fills, copies and blends are offered to the
/// accelerator `A` first. Colors are raw values in the view's pixel format.
pub struct Canvas<'a, A: Accelerator = SoftwareOnly> {
    image: ImageMut<'a>,
    accel: A,
    dirty: DirtyTracker,
}

impl<'a> Canvas<'a> {
    /// Canvas drawing everything in software
    pub fn new(image: ImageMut<'a>) -> Self {
        Self::with_accelerator(image, SoftwareOnly)
    }
}

/// Pixels a stroke of `thickness` extends past its centerline
fn stroke_margin(thickness: i32) -> i64 {
    if thickness > 1 {
        (thickness.min(MAX_THICKNESS) as i64 + 1) / 2
    } else {
        0
    }
}

/// Inclusive bounding box of `points`
fn extent<P: Copy + Into<Point<i64>>>(points: &[P]) -> Option<(Point<i64>, Point<i64>)> {
    let (first, rest) = points.split_first()?;
    let first: Point<i64> = (*first).into();
    Some(rest.iter().fold((first, first), |(lo, hi), p| {
        let p: Point<i64> = (*p).into();
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

impl<'a, A: Accelerator> Canvas<'a, A> {
    /// Canvas using `accel` for fills, copies and blends
    pub fn with_accelerator(image: ImageMut<'a>, accel: A) -> Self {
        let dirty = DirtyTracker::new(image.size());
        Self {
            image,
            accel,
            dirty,
        }
    }

    pub fn image(&self) -> ImageRef<'_> {
        self.image.view()
    }

    /// Mutable access to the pixels; changes made here are not tracked
    pub fn image_mut(&mut self) -> &mut ImageMut<'a> {
        &mut self.image
    }

    pub fn accelerator_mut(&mut self) -> &mut A {
        &mut self.accel
    }

    /// Give the view and the accelerator back
    pub fn release(self) -> (ImageMut<'a>, A) {
        (self.image, self.accel)
    }

    pub fn size(&self) -> Size<i32> {
        self.image.size()
    }

    // --- dirty regions ---

    /// Regions changed since the last reset
    pub fn dirty_rects(&self) -> &[Rect<i32>] {
        self.dirty.rects()
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn reset_dirty_rects(&mut self) {
        self.dirty.reset();
    }

    /// Record a change made outside the canvas
    pub fn mark_dirty(&mut self, rect: Rect<i32>) {
        self.dirty.add(rect);
    }

    /// Mark the inclusive box `lo..=hi` grown by `margin`, clipped to the view
    fn mark_box(&mut self, lo: Point<i64>, hi: Point<i64>, margin: i64) {
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        let x0 = lo.x.saturating_sub(margin).max(0);
        let y0 = lo.y.saturating_sub(margin).max(0);
        let x1 = hi.x.saturating_add(margin + 1).min(w);
        let y1 = hi.y.saturating_add(margin + 1).min(h);
        if x1 > x0 && y1 > y0 {
            self.dirty
                .add(Rect::new(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32));
        }
    }

    fn mark_points<P: Copy + Into<Point<i64>>>(&mut self, points: &[P], margin: i64) {
        if let Some((lo, hi)) = extent(points) {
            self.mark_box(lo, hi, margin);
        }
    }

    fn mark_ellipse(&mut self, center: Point<i32>, axes: (i64, i64), angle: i32, thickness: i32) {
        let (aw, ah) = (axes.0.abs().min(MAX_AXIS), axes.1.abs().min(MAX_AXIS));
        let s = (sin_q14(angle) as i64).abs();
        let c = (cos_q14(angle) as i64).abs();
        let round_up = (1 << TRIG_SHIFT) - 1;
        let ex = (aw * c + ah * s + round_up) >> TRIG_SHIFT;
        let ey = (aw * s + ah * c + round_up) >> TRIG_SHIFT;
        let center = center.to_i64();
        // polygon vertices round to the nearest pixel
        let margin = stroke_margin(thickness) + 1;
        self.mark_box(
            Point::new(center.x - ex, center.y - ey),
            Point::new(center.x + ex, center.y + ey),
            margin,
        );
    }

    // --- primitives ---

    /// Fill the whole view
    pub fn fill(&mut self, color: u16) {
        let bounds = self.image.bounds();
        if let Some(area) = draw::fill_rect(&mut self.accel, &mut self.image, bounds, color) {
            self.dirty.add(area);
        }
    }

    pub fn draw_pixel(&mut self, p: Point<i32>, color: u16) {
        if self.image.bounds().contains(p) {
            self.image.set_pixel(p.x as usize, p.y as usize, color);
            self.dirty.add(Rect::new(p.x, p.y, 1, 1));
        }
    }

    /// Line segment with round caps when thicker than one pixel
    pub fn line(&mut self, p1: Point<i32>, p2: Point<i32>, color: u16, thickness: i32, line_type: LineType) {
        let (a, b) = (p1.to_i64(), p2.to_i64());
        draw::thick_line(&mut self.image, a, b, color, thickness, line_type, CAP_START | CAP_END, 0);
        self.mark_points(&[a, b], stroke_margin(thickness));
    }

    /// Rectangle outline, or filled with [`FILLED`](crate::FILLED)
    pub fn rectangle(&mut self, rect: Rect<i32>, color: u16, thickness: i32) {
        if rect.is_empty() {
            return;
        }
        let br = rect.br() - Point::new(1, 1);
        self.rectangle_points(rect.tl(), br, color, thickness);
    }

    /// Rectangle with inclusive opposite corners `p1` and `p2`
    pub fn rectangle_points(&mut self, p1: Point<i32>, p2: Point<i32>, color: u16, thickness: i32) {
        let (a, b) = (p1.to_i64(), p2.to_i64());
        if thickness < 0 {
            let lo = Point::new(a.x.min(b.x), a.y.min(b.y));
            let hi = Point::new(a.x.max(b.x), a.y.max(b.y));
            let (w, h) = (self.image.width() as i64, self.image.height() as i64);
            let x0 = lo.x.max(0);
            let y0 = lo.y.max(0);
            let x1 = (hi.x + 1).min(w);
            let y1 = (hi.y + 1).min(h);
            if x1 > x0 && y1 > y0 {
                let rect = Rect::new(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32);
                if let Some(area) = draw::fill_rect(&mut self.accel, &mut self.image, rect, color) {
                    self.dirty.add(area);
                }
            }
            return;
        }
        let pts = [a, Point::new(b.x, a.y), b, Point::new(a.x, b.y)];
        draw::polyline(&mut self.image, &pts, true, color, thickness, LineType::Eight, 0);
        self.mark_points(&pts, stroke_margin(thickness));
    }

    pub fn circle(&mut self, center: Point<i32>, radius: i32, color: u16, thickness: i32, line_type: LineType) {
        if radius < 0 {
            return;
        }
        draw::circle(&mut self.image, center, radius, color, thickness, line_type);
        let r = radius as i64;
        self.mark_ellipse(center, (r, r), 0, thickness);
    }

    /// Elliptic arc from `arc_start` to `arc_end` degrees on an ellipse
    /// rotated by `angle` degrees; a full filled turn is a solid ellipse and
    /// a partial one is a pie slice
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
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
        draw::ellipse(&mut self.image, center, axes, angle, arc_start, arc_end, color, thickness, line_type);
        let axes = (axes.width as i64, axes.height as i64);
        self.mark_ellipse(center, axes, angle.rem_euclid(360), thickness);
    }

    /// Ellipse inscribed in `rect`
    pub fn ellipse_box(&mut self, rect: &RotatedRect, color: u16, thickness: i32, line_type: LineType) {
        draw::ellipse_box(&mut self.image, rect, color, thickness, line_type);
        let bounds = rect.bounding_rect();
        let margin = stroke_margin(thickness) + 1;
        let lo = bounds.tl().to_i64();
        let hi = bounds.br().to_i64();
        self.mark_box(lo, hi, margin);
    }

    pub fn polyline(&mut self, points: &[Point<i32>], closed: bool, color: u16, thickness: i32, line_type: LineType) {
        draw::polyline(&mut self.image, points, closed, color, thickness, line_type, 0);
        self.mark_points(points, stroke_margin(thickness));
    }

    /// Fill the even-odd interior of any number of contours
    pub fn fill_poly(&mut self, contours: &[&[Point<i32>]], color: u16, line_type: LineType) {
        draw::fill_poly(&mut self.image, contours, color, line_type, 0);
        for contour in contours {
            self.mark_points(contour, 0);
        }
    }

    /// Fill a convex polygon (faster than [`fill_poly`](Self::fill_poly))
    pub fn fill_convex_poly(&mut self, points: &[Point<i32>], color: u16, line_type: LineType) {
        draw::fill_convex(&mut self.image, points, color, line_type, 0);
        self.mark_points(points, 0);
    }

    pub fn draw_marker(
        &mut self,
        position: Point<i32>,
        color: u16,
        marker: MarkerType,
        size: i32,
        thickness: i32,
        line_type: LineType,
    ) {
        draw::draw_marker(&mut self.image, position, color, marker, size, thickness, line_type);
        let s = (size / 2).unsigned_abs() as i64;
        let p = position.to_i64();
        self.mark_box(
            Point::new(p.x - s, p.y - s),
            Point::new(p.x + s, p.y + s),
            stroke_margin(thickness),
        );
    }

    // --- bitmaps and text ---

    /// Copy `src` with its top-left corner at `offset`
    pub fn draw_bitmap(&mut self, src: &ImageRef<'_>, offset: Point<i32>) {
        if let Some(area) = draw::draw_bitmap(&mut self.accel, &mut self.image, src, offset) {
            self.dirty.add(area);
        }
    }

    /// Composite an ARGB1555 bitmap over a 16-bit view
    pub fn draw_bitmap_alpha(&mut self, src: &ImageRef<'_>, offset: Point<i32>) {
        if let Some(area) = draw::draw_bitmap_alpha(&mut self.accel, &mut self.image, src, offset) {
            self.dirty.add(area);
        }
    }

    /// Draw `text` with its first line's top-left corner at `origin`
    ///
    /// Returns how much of the text fit. A font error is logged and reported
    /// as an empty layout.
    pub fn put_text<S: FontStorage, const N: usize, const B: usize>(
        &mut self,
        font: &Font<S, N, B>,
        text: impl AsRef<[u8]>,
        origin: Point<i32>,
        style: &TextStyle,
    ) -> TextLayout {
        match font.draw_text(&mut self.image, origin, text.as_ref(), style) {
            Ok(layout) => {
                self.dirty.add(layout.bounds);
                layout
            }
            Err(e) => {
                warn!("Text not drawn: {}", e);
                // glyphs before the failing one may already be on screen,
                // possibly on wrapped lines below the origin
                let (w, h) = (self.image.width(), self.image.height());
                self.dirty.add(Rect::new(0, origin.y, w, h.saturating_sub(origin.y)));
                TextLayout::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FILLED;
    use lumen_core::{AccelError, PixelFormat};
    use lumen_font::{BlobWriter, FontKind};
    use proptest::prelude::*;

    const W: usize = 20;

    fn canvas(buf: &mut [u8]) -> Canvas<'_> {
        Canvas::new(ImageMut::new(buf, W, W, PixelFormat::Rgb565).unwrap())
    }

    /// Accelerator that is always busy
    struct Busy;

    impl Accelerator for Busy {
        fn fill(&mut self, _: &mut ImageMut<'_>, _: u16) -> Result<(), AccelError> {
            Err(AccelError::Busy)
        }

        fn copy(&mut self, _: &ImageRef<'_>, _: &mut ImageMut<'_>) -> Result<(), AccelError> {
            Err(AccelError::Busy)
        }

        fn blend_argb1555(&mut self, _: &ImageRef<'_>, _: &mut ImageMut<'_>) -> Result<(), AccelError> {
            Err(AccelError::Transfer)
        }
    }

    #[test]
    fn test_filled_rectangle() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(10, 10, 5, 5), 0xFFFF, FILLED);
        assert_eq!(c.image().pixel(12, 12), 0xFFFF);
        assert_eq!(c.image().pixel(14, 14), 0xFFFF);
        assert_eq!(c.image().pixel(15, 15), 0);
        assert_eq!(c.image().pixel(0, 0), 0);
        assert_eq!(c.dirty_rects(), &[Rect::new(10, 10, 5, 5)]);
    }

    #[test]
    fn test_rectangle_outline() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(2, 3, 4, 5), 1, 1);
        let img = c.image();
        assert_eq!(img.pixel(2, 3), 1);
        assert_eq!(img.pixel(5, 3), 1);
        assert_eq!(img.pixel(5, 7), 1);
        assert_eq!(img.pixel(2, 7), 1);
        assert_eq!(img.pixel(3, 5), 0);
        assert_eq!(img.pixel(6, 3), 0);
        assert_eq!(c.dirty_rects(), &[Rect::new(2, 3, 4, 5)]);
    }

    #[test]
    fn test_line_writes_exact_pixels() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.line(Point::new(0, 0), Point::new(4, 0), 0xFFFF, 1, LineType::Eight);
        let img = c.image();
        for x in 0..W {
            for y in 0..W {
                let on = y == 0 && x <= 4;
                assert_eq!(img.pixel(x, y), if on { 0xFFFF } else { 0 });
            }
        }
        assert_eq!(c.dirty_rects(), &[Rect::new(0, 0, 5, 1)]);
    }

    #[test]
    fn test_busy_accelerator_falls_back() {
        let mut a_buf = [0u8; W * W * 2];
        let mut b_buf = [0u8; W * W * 2];
        let src_px = [0xAAu8; 3 * 3 * 2];
        let src = ImageRef::new(&src_px, 3, 3, PixelFormat::Rgb565).unwrap();
        {
            let mut c = Canvas::with_accelerator(ImageMut::new(&mut a_buf, W, W, PixelFormat::Rgb565).unwrap(), Busy);
            c.fill(0x1111);
            c.rectangle(Rect::new(1, 1, 6, 6), 0x2222, FILLED);
            c.draw_bitmap(&src, Point::new(8, 8));
            c.draw_bitmap_alpha(&src, Point::new(12, 2));
        }
        {
            let mut c = canvas(&mut b_buf);
            c.fill(0x1111);
            c.rectangle(Rect::new(1, 1, 6, 6), 0x2222, FILLED);
            c.draw_bitmap(&src, Point::new(8, 8));
            c.draw_bitmap_alpha(&src, Point::new(12, 2));
        }
        assert_eq!(a_buf, b_buf);
    }

    #[test]
    fn test_dirty_merge_and_reset() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(0, 0, 4, 4), 1, FILLED);
        c.rectangle(Rect::new(2, 2, 4, 4), 1, FILLED);
        assert_eq!(c.dirty_rects(), &[Rect::new(0, 0, 6, 6)]);
        c.reset_dirty_rects();
        assert!(c.dirty_rects().is_empty());
        c.reset_dirty_rects();
        assert!(c.dirty_rects().is_empty());
    }

    #[test]
    fn test_fill_reports_whole_frame() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.draw_pixel(Point::new(3, 3), 1);
        c.fill(7);
        assert!(c.dirty().is_overflowed());
        assert_eq!(c.dirty_rects(), &[Rect::new(0, 0, W as i32, W as i32)]);
    }

    #[test]
    fn test_offscreen_draws_are_not_dirty() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.draw_pixel(Point::new(-1, 3), 1);
        c.line(Point::new(-10, -5), Point::new(-2, -8), 1, 3, LineType::Eight);
        c.circle(Point::new(100, 100), 4, 1, FILLED, LineType::Eight);
        assert!(c.dirty_rects().is_empty());
        drop(c);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_put_text_marks_layout() {
        let mut blob_buf = [0u8; 1024];
        let mut w = BlobWriter::new(&mut blob_buf, FontKind::SingleByte, 4).unwrap();
        w.add_opaque(b'?' as u32, 2, 4, &[1; 8]).unwrap();
        w.add_opaque(b'i' as u32, 1, 4, &[1, 0, 1, 1]).unwrap();
        let blob = w.finish();
        let font: Font<&[u8], 0, 0> = Font::open(blob).unwrap();

        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        let layout = c.put_text(&font, "ii?", Point::new(3, 5), &TextStyle::new(0xFFFF));
        assert_eq!(layout.consumed, 3);
        assert_eq!(layout.bounds, Rect::new(3, 5, 4, 4));
        assert_eq!(c.dirty_rects(), &[Rect::new(3, 5, 4, 4)]);
        assert_eq!(c.image().pixel(3, 5), 0xFFFF);
        assert_eq!(c.image().pixel(3, 6), 0);
        assert_eq!(c.image().pixel(6, 8), 0xFFFF);
    }

    #[test]
    fn test_rectangles_near_coordinate_limits() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(i32::MAX - 2, 0, 10, 10), 0xFFFF, FILLED);
        c.rectangle(Rect::new(i32::MAX - 2, 0, 10, 10), 0xFFFF, 3);
        c.rectangle(Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX), 0xFFFF, FILLED);
        assert!(c.dirty_rects().is_empty());

        c.rectangle(Rect::new(-5, -5, i32::MAX, 8), 0xFFFF, FILLED);
        assert_eq!(c.dirty_rects(), &[Rect::new(0, 0, W as i32, 3)]);
        assert_eq!(c.image().pixel(W - 1, 2), 0xFFFF);
        assert_eq!(c.image().pixel(0, 3), 0);
    }

    #[test]
    fn test_huge_circles_do_not_overflow() {
        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        c.circle(Point::new(5, 5), 1 << 30, 0xFFFF, 1, LineType::Eight);
        c.circle(Point::new(5, 5), i32::MAX, 0xFFFF, 1, LineType::Eight);
        assert_eq!(c.image().pixel(5, 5), 0);

        c.circle(Point::new(5, 5), i32::MAX, 0xFFFF, FILLED, LineType::Eight);
        assert_eq!(c.image().pixel(19, 19), 0xFFFF);
        assert_eq!(c.dirty_rects(), &[Rect::new(0, 0, W as i32, W as i32)]);
    }

    #[test]
    fn test_put_text_marks_glyphs_below_cell() {
        let mut blob_buf = [0u8; 1024];
        let mut w = BlobWriter::new(&mut blob_buf, FontKind::SingleByte, 4).unwrap();
        w.add_opaque(b'i' as u32, 1, 8, &[1; 8]).unwrap();
        let font: Font<&[u8], 0, 0> = Font::open(w.finish()).unwrap();

        let mut buf = [0u8; W * W * 2];
        let mut c = canvas(&mut buf);
        let layout = c.put_text(&font, "i", Point::new(3, 5), &TextStyle::new(0xFFFF));
        assert_eq!(layout.bounds, Rect::new(3, 5, 1, 8));
        assert_eq!(c.image().pixel(3, 12), 0xFFFF);
        assert!(c.dirty_rects().iter().any(|r| r.contains(Point::new(3, 12))));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Line(Point, Point, i32),
        Rect(Rect, i32),
        Circle(Point, i32, i32),
        Ellipse(Point, Size, i32, i32, i32, i32),
        Marker(Point, u8, i32, i32),
    }

    fn coord() -> impl Strategy<Value = Point> {
        (-10i32..30, -10i32..30).prop_map(|(x, y)| Point::new(x, y))
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (coord(), coord(), -1i32..7).prop_map(|(a, b, t)| Op::Line(a, b, t.max(1))),
            (coord(), 0i32..15, 0i32..15, -1i32..5).prop_map(|(p, w, h, t)| Op::Rect(Rect::new(p.x, p.y, w, h), t)),
            (coord(), 0i32..12, -1i32..6).prop_map(|(p, r, t)| Op::Circle(p, r, t)),
            (coord(), 0i32..12, 0i32..12, 0i32..360, -400i32..400, -1i32..5)
                .prop_map(|(p, w, h, a, e, t)| Op::Ellipse(p, Size::new(w, h), a, 0, e, t)),
            (coord(), 0u8..7, 0i32..12, 1i32..4).prop_map(|(p, m, s, t)| Op::Marker(p, m, s, t)),
        ]
    }

    proptest! {
        #[test]
        fn prop_drawn_pixels_are_reported(ops in proptest::collection::vec(op(), 1..6)) {
            let mut buf = [0u8; W * W * 2];
            let mut c = canvas(&mut buf);
            for op in ops {
                match op {
                    Op::Line(a, b, t) => c.line(a, b, 0xFFFF, t, LineType::Eight),
                    Op::Rect(r, t) => c.rectangle(r, 0xFFFF, t),
                    Op::Circle(p, r, t) => c.circle(p, r, 0xFFFF, t, LineType::Eight),
                    Op::Ellipse(p, axes, angle, s, e, t) => c.ellipse(p, axes, angle, s, e, 0xFFFF, t, LineType::Eight),
                    Op::Marker(p, m, s, t) => {
                        let marker = MarkerType::from_u8(m).unwrap_or_default();
                        c.draw_marker(p, 0xFFFF, marker, s, t, LineType::Eight)
                    }
                }
            }
            let img = c.image();
            for y in 0..W {
                for x in 0..W {
                    if img.pixel(x, y) != 0 {
                        let p = Point::new(x as i32, y as i32);
                        prop_assert!(c.dirty_rects().iter().any(|r| r.contains(p)), "{:?} not reported", p);
                    }
                }
            }
        }
    }
}
