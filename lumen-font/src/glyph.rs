//! Glyph bytecode decoder
//!
//! A glyph is a run-length program over its `width × height` pixels. The
//! first byte selects the variant (1 = opaque, 2 = anti-aliased); each
//! following byte packs an opcode in the top 3 bits and a count `n` in the
//! low 5 bits:
//!
//! | op | opaque                         | anti-aliased                      |
//! |----|--------------------------------|-----------------------------------|
//! | 0  | n+1 background                 | same                              |
//! | 1  | n+1 foreground                 | same                              |
//! | 2  | n background, 1 foreground     | n background, 1 pixel α=next&7    |
//! | 3  | n background, 2 foreground     | n background, 2 pixels from next  |
//! | 4  | n background, 3 foreground     | same                              |
//! | 5  | n background, next+1 foreground| same                              |
//! | 6  | ((n<<8)\|next)+1 background    | same                              |
//! | 7  | end, rest is background        | same                              |
//!
//! A program that runs out of bytes ends as if it had read op 7.

use lumen_core::color::ALPHA_MAX;
use lumen_core::{ImageMut, Point};

use crate::header::ScanOrder;
use crate::FontError;

/// Variant tag: one bit per pixel
pub const TAG_OPAQUE: u8 = 1;
/// Variant tag: 3-bit alpha for edge pixels
pub const TAG_ANTIALIASED: u8 = 2;

pub const OP_BG: u8 = 0;
pub const OP_FG: u8 = 1;
pub const OP_BG_FG1: u8 = 2;
pub const OP_BG_FG2: u8 = 3;
pub const OP_BG_FG3: u8 = 4;
pub const OP_BG_FG_LONG: u8 = 5;
pub const OP_BG_LONG: u8 = 6;
pub const OP_END: u8 = 7;

/// Largest count a single op byte carries
pub const MAX_SHORT_RUN: usize = 0x1F;

/// Location and size of one glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphAddress {
    /// Character code the glyph was resolved for
    pub code: u32,
    /// Absolute byte offset inside the blob
    pub offset: u32,
    /// Bytecode length, 0 for a glyph that draws nothing
    pub length: u16,
    pub width: u8,
    pub height: u8,
    /// Bytes are held by the glyph cache
    pub cached: bool,
}

impl GlyphAddress {
    /// Zero-sized glyph for codes with no usable bitmap
    pub fn empty(code: u32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// True if drawing the glyph paints nothing
    pub fn is_empty(&self) -> bool {
        self.length == 0 || self.width == 0 || self.height == 0
    }
}

/// Foreground and optional background for glyph painting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphColors {
    pub fg: u16,
    /// `None` leaves background pixels untouched and blends edge pixels
    /// against what is already in the destination
    pub bg: Option<u16>,
}

/// Visits glyph pixels in storage order
struct Cursor {
    col: i32,
    row: i32,
    width: i32,
    height: i32,
    order: ScanOrder,
    remaining: usize,
}

impl Cursor {
    fn new(width: u8, height: u8, order: ScanOrder) -> Self {
        Self {
            col: 0,
            row: 0,
            width: width as i32,
            height: height as i32,
            order,
            remaining: width as usize * height as usize,
        }
    }

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let pos = (self.col, self.row);
        match self.order {
            ScanOrder::RowMajor => {
                self.col += 1;
                if self.col == self.width {
                    self.col = 0;
                    self.row += 1;
                }
            }
            ScanOrder::ColumnMajor => {
                self.row += 1;
                if self.row == self.height {
                    self.row = 0;
                    self.col += 1;
                }
            }
        }
        Some(pos)
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Background,
    Foreground,
    Alpha(u8),
}

struct Painter<'d, 'a> {
    dst: &'d mut ImageMut<'a>,
    origin: Point<i32>,
    colors: GlyphColors,
    cursor: Cursor,
}

impl Painter<'_, '_> {
    fn run(&mut self, paint: Paint, count: usize) {
        for _ in 0..count {
            let Some((cx, cy)) = self.cursor.next() else {
                return;
            };
            self.paint(Point::new(self.origin.x + cx, self.origin.y + cy), paint);
        }
    }

    fn paint(&mut self, pt: Point<i32>, paint: Paint) {
        if !self.dst.bounds().contains(pt) {
            return;
        }
        let (x, y) = (pt.x as usize, pt.y as usize);
        let color = match (paint, self.colors.bg) {
            (Paint::Background, None) => return,
            (Paint::Background, Some(bg)) => bg,
            (Paint::Foreground, _) | (Paint::Alpha(ALPHA_MAX), _) => self.colors.fg,
            (Paint::Alpha(a), bg) => {
                let under = bg.unwrap_or_else(|| self.dst.pixel(x, y));
                self.dst.format().blend(self.colors.fg, under, a)
            }
        };
        self.dst.set_pixel(x, y, color);
    }

    fn finish(&mut self) {
        let rest = self.cursor.remaining;
        self.run(Paint::Background, rest);
    }
}

/// Execute a glyph program into `dst` with its top-left corner at `origin`
///
/// Pixels falling outside `dst` are skipped.
pub fn render_bytecode(
    code: &[u8],
    width: u8,
    height: u8,
    order: ScanOrder,
    dst: &mut ImageMut<'_>,
    origin: Point<i32>,
    colors: GlyphColors,
) -> Result<(), FontError> {
    let (&tag, mut ops) = code.split_first().ok_or(FontError::BadGlyph)?;
    let antialiased = match tag {
        TAG_OPAQUE => false,
        TAG_ANTIALIASED => true,
        _ => return Err(FontError::BadGlyph),
    };
    let mut painter = Painter {
        dst,
        origin,
        colors,
        cursor: Cursor::new(width, height, order),
    };

    while painter.cursor.remaining > 0 {
        let Some((&b, rest)) = ops.split_first() else {
            break;
        };
        ops = rest;
        let op = b >> 5;
        let n = (b & 0x1F) as usize;
        match op {
            OP_BG => painter.run(Paint::Background, n + 1),
            OP_FG => painter.run(Paint::Foreground, n + 1),
            OP_BG_FG1 | OP_BG_FG2 if antialiased => {
                let Some((&levels, rest)) = ops.split_first() else {
                    break;
                };
                ops = rest;
                painter.run(Paint::Background, n);
                if op == OP_BG_FG2 {
                    painter.run(Paint::Alpha((levels >> 4) & 0x7), 1);
                }
                painter.run(Paint::Alpha(levels & 0x7), 1);
            }
            OP_BG_FG1 | OP_BG_FG2 | OP_BG_FG3 => {
                painter.run(Paint::Background, n);
                painter.run(Paint::Foreground, (op - OP_BG_FG1 + 1) as usize);
            }
            OP_BG_FG_LONG => {
                let Some((&extra, rest)) = ops.split_first() else {
                    break;
                };
                ops = rest;
                painter.run(Paint::Background, n);
                painter.run(Paint::Foreground, extra as usize + 1);
            }
            OP_BG_LONG => {
                let Some((&low, rest)) = ops.split_first() else {
                    break;
                };
                ops = rest;
                painter.run(Paint::Background, ((n << 8) | low as usize) + 1);
            }
            _ => break,
        }
    }
    painter.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::PixelFormat;

    const FG: u16 = 0xFF;
    const BG: u16 = 0x11;

    fn colors() -> GlyphColors {
        GlyphColors {
            fg: FG,
            bg: Some(BG),
        }
    }

    fn render(code: &[u8], w: u8, h: u8, order: ScanOrder, buf: &mut [u8]) {
        let mut img = ImageMut::new(buf, h as usize, w as usize, PixelFormat::Rgb332).unwrap();
        render_bytecode(code, w, h, order, &mut img, Point::ORIGIN, colors()).unwrap();
    }

    #[test]
    fn test_opaque_ops() {
        // 2 bg, 1 fg via op2, 3 fg via op1, rest bg via end
        let code = [TAG_OPAQUE, (OP_BG_FG1 << 5) | 2, (OP_FG << 5) | 2, OP_END << 5];
        let mut buf = [0u8; 8];
        render(&code, 4, 2, ScanOrder::RowMajor, &mut buf);
        assert_eq!(buf, [BG as u8, BG as u8, 0xFF, 0xFF, 0xFF, 0xFF, BG as u8, BG as u8]);
    }

    #[test]
    fn test_long_runs() {
        let code = [TAG_OPAQUE, (OP_BG_LONG << 5), 2, (OP_BG_FG_LONG << 5) | 1, 1];
        let mut buf = [0u8; 8];
        render(&code, 8, 1, ScanOrder::RowMajor, &mut buf);
        let b = BG as u8;
        assert_eq!(buf, [b, b, b, b, 0xFF, 0xFF, b, b]);
    }

    #[test]
    fn test_column_major_cursor() {
        // 3 fg fill the first column of a 2x3 glyph
        let code = [TAG_OPAQUE, (OP_FG << 5) | 2];
        let mut buf = [0u8; 6];
        render(&code, 2, 3, ScanOrder::ColumnMajor, &mut buf);
        let b = BG as u8;
        assert_eq!(buf, [0xFF, b, 0xFF, b, 0xFF, b]);
    }

    #[test]
    fn test_truncated_stream_ends_glyph() {
        let code = [TAG_OPAQUE, (OP_BG_FG_LONG << 5) | 1];
        let mut buf = [0u8; 4];
        render(&code, 4, 1, ScanOrder::RowMajor, &mut buf);
        assert_eq!(buf, [BG as u8; 4]);
    }

    #[test]
    fn test_antialiased_levels() {
        // one bg, then alpha 7 and alpha 0
        let code = [TAG_ANTIALIASED, (OP_BG_FG2 << 5) | 1, 0x70];
        let mut buf = [0u8; 3];
        render(&code, 3, 1, ScanOrder::RowMajor, &mut buf);
        assert_eq!(buf, [BG as u8, FG as u8, BG as u8]);
    }

    #[test]
    fn test_transparent_blend_uses_destination() {
        let code = [TAG_ANTIALIASED, (OP_BG << 5), (OP_BG_FG1 << 5), 4];
        let mut buf = [0x00u8, 0x00];
        {
            let mut img = ImageMut::new(&mut buf, 1, 2, PixelFormat::Rgb332).unwrap();
            img.set_pixel(0, 0, 0x42);
            let colors = GlyphColors { fg: 0xE0, bg: None };
            render_bytecode(&code, 2, 1, ScanOrder::RowMajor, &mut img, Point::ORIGIN, colors)
                .unwrap();
        }
        // background untouched; red 7 * 4 / 7 = 4 over black
        assert_eq!(buf, [0x42, 4 << 5]);
    }

    #[test]
    fn test_clipped_at_destination_edge() {
        let code = [TAG_OPAQUE, (OP_FG << 5) | 3];
        let mut buf = [0u8; 4];
        let mut img = ImageMut::new(&mut buf, 2, 2, PixelFormat::Rgb332).unwrap();
        render_bytecode(&code, 2, 2, ScanOrder::RowMajor, &mut img, Point::new(1, 1), colors())
            .unwrap();
        assert_eq!(buf, [0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_bad_tag() {
        let mut buf = [0u8; 1];
        let mut img = ImageMut::new(&mut buf, 1, 1, PixelFormat::Rgb332).unwrap();
        assert_eq!(
            render_bytecode(&[9], 1, 1, ScanOrder::RowMajor, &mut img, Point::ORIGIN, colors()),
            Err(FontError::BadGlyph)
        );
    }
}
