//! Block transfers: solid fills, bitmap copies and ARGB1555 compositing
//!
//! Each operation offers the work to the accelerator first and falls back
//! to the software path when it declines. Both paths clip identically.

use lumen_core::color::{argb1555_is_opaque, argb1555_to_rgb565};
use lumen_core::{Accelerator, ImageMut, ImageRef, PixelFormat, Point, Rect};

/// Fill `rect` clipped to `dst`; returns the filled area
pub fn fill_rect<A: Accelerator>(accel: &mut A, dst: &mut ImageMut<'_>, rect: Rect<i32>, color: u16) -> Option<Rect<i32>> {
    let area = rect & dst.bounds();
    if area.is_empty() {
        return None;
    }
    let mut target = dst.sub_view_mut(area);
    if let Err(e) = accel.fill(&mut target, color) {
        trace!("Fill falls back to software: {}", e);
        target.fill(color);
    }
    Some(area)
}

/// Destination and source rects of `src` placed at `offset` over `dst`
fn overlap(dst: &ImageMut<'_>, src: &ImageRef<'_>, offset: Point<i32>) -> Option<(Rect<i32>, Rect<i32>)> {
    let placed = Rect::from_origin_size(offset, src.size());
    let area = placed & dst.bounds();
    if area.is_empty() {
        return None;
    }
    Some((area, area - offset))
}

/// Copy `src` into `dst` with its top-left corner at `offset`
///
/// Only the overlap is written. Mismatched formats copy nothing. Returns
/// the written area.
pub fn draw_bitmap<A: Accelerator>(
    accel: &mut A,
    dst: &mut ImageMut<'_>,
    src: &ImageRef<'_>,
    offset: Point<i32>,
) -> Option<Rect<i32>> {
    if src.format() != dst.format() {
        debug!("Bitmap format mismatch, skipped");
        return None;
    }
    let (area, from) = overlap(dst, src, offset)?;
    let src = src.sub_view(from);
    let mut target = dst.sub_view_mut(area);
    if let Err(e) = accel.copy(&src, &mut target) {
        trace!("Copy falls back to software: {}", e);
        target.copy_from(&src);
    }
    Some(area)
}

/// Composite an ARGB1555 bitmap over an RGB565 view
///
/// Source pixels with bit 15 set are repacked to RGB565 and written;
/// the rest leave the destination untouched. Both views must be 16-bit,
/// anything else draws nothing. Returns the affected area.
pub fn draw_bitmap_alpha<A: Accelerator>(
    accel: &mut A,
    dst: &mut ImageMut<'_>,
    src: &ImageRef<'_>,
    offset: Point<i32>,
) -> Option<Rect<i32>> {
    if src.format() != PixelFormat::Rgb565 || dst.format() != PixelFormat::Rgb565 {
        debug!("Alpha bitmap needs 16-bit views, skipped");
        return None;
    }
    let (area, from) = overlap(dst, src, offset)?;
    let src = src.sub_view(from);
    let mut target = dst.sub_view_mut(area);
    if let Err(e) = accel.blend_argb1555(&src, &mut target) {
        trace!("Blend falls back to software: {}", e);
        for y in 0..src.rows() {
            for x in 0..src.cols() {
                let p = src.pixel(x, y);
                if argb1555_is_opaque(p) {
                    target.set_pixel(x, y, argb1555_to_rgb565(p));
                }
            }
        }
    }
    Some(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::AccelError;
    use lumen_core::SoftwareOnly;

    /// Engine that fills with a marker color so tests can tell who did the work
    struct Marking {
        calls: usize,
    }

    impl Accelerator for Marking {
        fn fill(&mut self, dst: &mut ImageMut<'_>, color: u16) -> Result<(), AccelError> {
            self.calls += 1;
            dst.fill(color);
            Ok(())
        }
    }

    fn img16(buf: &mut [u8], w: usize, h: usize) -> ImageMut<'_> {
        ImageMut::new(buf, h, w, PixelFormat::Rgb565).unwrap()
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut buf = [0u8; 8 * 8 * 2];
        let mut img = img16(&mut buf, 8, 8);
        let area = fill_rect(&mut SoftwareOnly, &mut img, Rect::new(6, -2, 5, 4), 0x1234);
        assert_eq!(area, Some(Rect::new(6, 0, 2, 2)));
        assert_eq!(img.pixel(6, 0), 0x1234);
        assert_eq!(img.pixel(7, 1), 0x1234);
        assert_eq!(img.pixel(5, 0), 0);
        assert_eq!(img.pixel(6, 2), 0);
        assert_eq!(fill_rect(&mut SoftwareOnly, &mut img, Rect::new(9, 9, 3, 3), 1), None);
    }

    #[test]
    fn test_accelerator_and_software_agree() {
        let mut a_buf = [0u8; 8 * 8 * 2];
        let mut b_buf = [0u8; 8 * 8 * 2];
        let mut engine = Marking { calls: 0 };
        fill_rect(&mut engine, &mut img16(&mut a_buf, 8, 8), Rect::new(1, 2, 3, 4), 0xF800);
        fill_rect(&mut SoftwareOnly, &mut img16(&mut b_buf, 8, 8), Rect::new(1, 2, 3, 4), 0xF800);
        assert_eq!(engine.calls, 1);
        assert_eq!(a_buf, b_buf);
    }

    #[test]
    fn test_bitmap_negative_offset() {
        let src_buf: [u8; 4] = [1, 2, 3, 4];
        let src = ImageRef::new(&src_buf, 2, 2, PixelFormat::Rgb332).unwrap();
        let mut buf = [0u8; 9];
        let mut dst = ImageMut::new(&mut buf, 3, 3, PixelFormat::Rgb332).unwrap();
        let area = draw_bitmap(&mut SoftwareOnly, &mut dst, &src, Point::new(-1, 2));
        assert_eq!(area, Some(Rect::new(0, 2, 1, 1)));
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 2, 0, 0]);
    }

    #[test]
    fn test_extreme_offsets_draw_nothing() {
        let src_buf = [0xFFu8; 8];
        let src = ImageRef::new(&src_buf, 2, 2, PixelFormat::Rgb565).unwrap();
        let mut buf = [0u8; 4 * 4 * 2];
        let mut dst = img16(&mut buf, 4, 4);
        for offset in [Point::new(i32::MAX - 1, 0), Point::new(i32::MIN, i32::MIN), Point::new(0, i32::MAX)] {
            assert_eq!(draw_bitmap(&mut SoftwareOnly, &mut dst, &src, offset), None);
            assert_eq!(draw_bitmap_alpha(&mut SoftwareOnly, &mut dst, &src, offset), None);
        }
        assert_eq!(fill_rect(&mut SoftwareOnly, &mut dst, Rect::new(i32::MAX - 2, 0, 10, 10), 1), None);
        assert_eq!(buf, [0; 4 * 4 * 2]);
    }

    #[test]
    fn test_bitmap_format_mismatch_noop() {
        let src_buf = [0xFFu8; 8];
        let src = ImageRef::new(&src_buf, 2, 2, PixelFormat::Rgb565).unwrap();
        let mut buf = [0u8; 4];
        let mut dst = ImageMut::new(&mut buf, 2, 2, PixelFormat::Rgb332).unwrap();
        assert_eq!(draw_bitmap(&mut SoftwareOnly, &mut dst, &src, Point::ORIGIN), None);
        assert_eq!(draw_bitmap_alpha(&mut SoftwareOnly, &mut dst, &src, Point::ORIGIN), None);
        assert_eq!(buf, [0; 4]);
    }

    #[test]
    fn test_alpha_skips_transparent() {
        // opaque white, transparent red
        let pixels: [u16; 2] = [0xFFFF, 0x7C00];
        let mut src_buf = [0u8; 4];
        src_buf[..2].copy_from_slice(&pixels[0].to_le_bytes());
        src_buf[2..].copy_from_slice(&pixels[1].to_le_bytes());
        let src = ImageRef::new(&src_buf, 1, 2, PixelFormat::Rgb565).unwrap();
        let mut buf = [0u8; 2 * 2 * 2];
        let mut dst = img16(&mut buf, 2, 2);
        dst.fill(0x0841);
        let area = draw_bitmap_alpha(&mut SoftwareOnly, &mut dst, &src, Point::new(0, 1));
        assert_eq!(area, Some(Rect::new(0, 1, 2, 1)));
        assert_eq!(dst.pixel(0, 1), argb1555_to_rgb565(0xFFFF));
        assert_eq!(dst.pixel(1, 1), 0x0841);
        assert_eq!(dst.pixel(0, 0), 0x0841);
    }
}
