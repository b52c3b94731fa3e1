//! Font handle and text layout

use lumen_core::{ImageError, ImageMut, PixelFormat, Point, Rect};

use crate::cache::{CacheError, GlyphCache};
use crate::charmap::{FontKind, FALLBACK_CODE};
use crate::glyph::{render_bytecode, GlyphAddress, GlyphColors};
use crate::header::{FontHeader, MapEntry, HEADER_SIZE};
use crate::source::{checked_range, FontStorage, StorageError};
use crate::{FontError, MAX_GLYPH_BYTES};

/// Colors and layout limits for drawing text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    /// Foreground color
    pub fg: u16,
    /// Background color; `None` draws transparently
    pub bg: Option<u16>,
    /// Wrap lines that would grow wider than this many pixels
    pub wrap_width: Option<i32>,
    /// Stop before a line that would end below this many pixels
    pub max_height: Option<i32>,
}

impl TextStyle {
    /// Transparent text in `fg`, no wrapping, no height limit
    pub const fn new(fg: u16) -> Self {
        Self {
            fg,
            bg: None,
            wrap_width: None,
            max_height: None,
        }
    }

    pub const fn with_background(mut self, bg: u16) -> Self {
        self.bg = Some(bg);
        self
    }

    pub const fn with_wrap_width(mut self, width: i32) -> Self {
        self.wrap_width = Some(width);
        self
    }

    pub const fn with_max_height(mut self, height: i32) -> Self {
        self.max_height = Some(height);
        self
    }

    fn colors(&self) -> GlyphColors {
        GlyphColors {
            fg: self.fg,
            bg: self.bg,
        }
    }
}

/// Result of measuring or drawing a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextLayout {
    /// Area covered by the consumed text
    pub bounds: Rect<i32>,
    /// Bytes of input consumed; draw from here to continue on a new page
    pub consumed: usize,
    /// Characters consumed, including line breaks
    pub chars: usize,
    /// Lines used
    pub lines: usize,
}

/// Bitmap font read from a blob
///
/// `N` and `B` size the glyph cache (entries and bytecode bytes); a font
/// that is never precached can use zero for both.
pub struct Font<S, const N: usize = 32, const B: usize = 2048> {
    storage: S,
    header: FontHeader,
    cache: GlyphCache<N, B>,
}

impl<S: FontStorage, const N: usize, const B: usize> Font<S, N, B> {
    /// Open a font, validating its header
    pub fn open(storage: S) -> Result<Self, FontError> {
        let mut raw = [0u8; HEADER_SIZE];
        storage.read(0, &mut raw)?;
        let header = FontHeader::parse(&raw)?;
        debug!(
            "font: kind={} cell={} data={}",
            header.kind.as_u8(),
            header.cell_height,
            header.data_base
        );
        Ok(Self {
            storage,
            header,
            cache: GlyphCache::new(),
        })
    }

    pub fn header(&self) -> &FontHeader {
        &self.header
    }

    pub fn kind(&self) -> FontKind {
        self.header.kind
    }

    /// Line height in pixels
    pub fn line_height(&self) -> i32 {
        self.header.cell_height as i32
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Decode the first character of `text`: `(code, bytes)`
    pub fn next_code(&self, text: &[u8]) -> Option<(u32, usize)> {
        self.header.kind.next_code(text)
    }

    fn read_entry(&self, index: u32) -> Result<MapEntry, FontError> {
        let offset = self
            .header
            .entry_offset(index)
            .ok_or(FontError::BadHeader)?;
        let mut raw = [0u8; MapEntry::SIZE];
        self.storage.read(offset, &mut raw)?;
        Ok(MapEntry::parse(&raw))
    }

    /// Locate the glyph for `code`, falling back to '?'
    ///
    /// A font with no '?' glyph yields an empty address, which draws
    /// nothing and advances by zero.
    pub fn glyph_address(&self, code: u32) -> Result<GlyphAddress, FontError> {
        for candidate in [code, FALLBACK_CODE] {
            if let Some(addr) = self.cache.lookup(candidate) {
                return Ok(addr);
            }
            let Some(index) = self.header.kind.map_index(candidate) else {
                continue;
            };
            let entry = self.read_entry(index)?;
            if entry.is_missing() {
                continue;
            }
            if entry.length as usize > MAX_GLYPH_BYTES {
                return Err(FontError::GlyphTooLarge);
            }
            let offset = self
                .header
                .data_base
                .checked_add(entry.offset)
                .ok_or(FontError::Storage(StorageError::OutOfBounds))?;
            return Ok(GlyphAddress {
                code: candidate,
                offset,
                length: entry.length,
                width: entry.width,
                height: entry.height,
                cached: false,
            });
        }
        trace!("font: no glyph for {=u32:x}", code);
        Ok(GlyphAddress::empty(code))
    }

    fn read_glyph(&self, addr: &GlyphAddress, buf: &mut [u8; MAX_GLYPH_BYTES]) -> Result<usize, FontError> {
        let len = addr.length as usize;
        let bytes = buf.get_mut(..len).ok_or(FontError::GlyphTooLarge)?;
        self.storage.read(addr.offset, bytes)?;
        Ok(len)
    }

    /// Run `f` over the glyph's bytecode
    ///
    /// Cached glyphs and memory-resident blobs are borrowed in place; other
    /// storage is read into a stack buffer.
    pub fn with_glyph<R>(
        &self,
        addr: &GlyphAddress,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, FontError> {
        if addr.cached {
            if let Some(bytes) = self.cache.bytes(addr.code) {
                return Ok(f(bytes));
            }
        }
        if let Some(blob) = self.storage.as_slice() {
            let range = checked_range(addr.offset, addr.length as usize, self.storage.len())?;
            let bytes = blob
                .get(range)
                .ok_or(FontError::Storage(StorageError::OutOfBounds))?;
            return Ok(f(bytes));
        }
        let mut buf = [0u8; MAX_GLYPH_BYTES];
        let len = self.read_glyph(addr, &mut buf)?;
        Ok(f(&buf[..len]))
    }

    fn render_address(
        &self,
        addr: &GlyphAddress,
        dst: &mut ImageMut<'_>,
        origin: Point<i32>,
        style: &TextStyle,
    ) -> Result<(), FontError> {
        if addr.is_empty() {
            return Ok(());
        }
        let order = self.header.scan_order();
        self.with_glyph(addr, |code| {
            render_bytecode(code, addr.width, addr.height, order, dst, origin, style.colors())
        })?
    }

    /// Draw one glyph with its top-left corner at `origin`
    pub fn render_glyph(
        &self,
        code: u32,
        dst: &mut ImageMut<'_>,
        origin: Point<i32>,
        style: &TextStyle,
    ) -> Result<GlyphAddress, FontError> {
        let addr = self.glyph_address(code)?;
        self.render_address(&addr, dst, origin, style)?;
        Ok(addr)
    }

    /// Decode one glyph into `buf`, returning a view of exactly its size
    ///
    /// Background pixels are only written when the style has a background.
    pub fn decode_glyph<'b>(
        &self,
        code: u32,
        buf: &'b mut [u8],
        format: PixelFormat,
        style: &TextStyle,
    ) -> Result<ImageMut<'b>, FontError> {
        let addr = self.glyph_address(code)?;
        let mut view = ImageMut::new(buf, addr.height as usize, addr.width as usize, format)
            .map_err(|e: ImageError| {
                warn!("font: glyph buffer rejected: {}", e);
                FontError::BufferTooSmall
            })?;
        self.render_address(&addr, &mut view, Point::ORIGIN, style)?;
        Ok(view)
    }

    /// Lay out `text` without drawing
    pub fn measure(&self, text: &[u8], style: &TextStyle) -> Result<TextLayout, FontError> {
        self.layout(text, Point::ORIGIN, style, None)
    }

    /// Draw `text` starting at `origin` (top-left of the first line)
    ///
    /// Lines wrap at the style's wrap width and at the right edge of `dst`;
    /// drawing stops before a line that would cross the style's maximum
    /// height or the bottom of `dst`.
    pub fn draw_text(
        &self,
        dst: &mut ImageMut<'_>,
        origin: Point<i32>,
        text: &[u8],
        style: &TextStyle,
    ) -> Result<TextLayout, FontError> {
        self.layout(text, origin, style, Some(dst))
    }

    fn layout(
        &self,
        text: &[u8],
        origin: Point<i32>,
        style: &TextStyle,
        mut dst: Option<&mut ImageMut<'_>>,
    ) -> Result<TextLayout, FontError> {
        let line_h = self.line_height();
        let mut max_h = style.max_height.unwrap_or(i32::MAX);
        let mut wrap = style.wrap_width;
        if let Some(img) = dst.as_deref() {
            max_h = max_h.min(img.height().saturating_sub(origin.y));
            let room = img.width().saturating_sub(origin.x);
            wrap = Some(wrap.map_or(room, |w| w.min(room)));
        }
        if line_h > max_h {
            return Ok(TextLayout {
                bounds: Rect::new(origin.x, origin.y, 0, 0),
                ..TextLayout::default()
            });
        }

        let mut pos = 0;
        let mut chars = 0;
        let mut x = 0;
        let mut y = 0;
        let mut widest = 0;
        // glyphs may be taller than the cell
        let mut bottom = 0;
        let fits_another_line = |y: i32| y + 2 * line_h <= max_h;

        while let Some((code, len)) = self.next_code(&text[pos..]) {
            match code {
                0x0D => {}
                0x0A => {
                    if !fits_another_line(y) {
                        pos += len;
                        chars += 1;
                        break;
                    }
                    x = 0;
                    y += line_h;
                }
                _ => {
                    let addr = self.glyph_address(code)?;
                    let w = addr.width as i32;
                    if wrap.is_some_and(|ww| x > 0 && x + w > ww) {
                        if !fits_another_line(y) {
                            break;
                        }
                        x = 0;
                        y += line_h;
                    }
                    if let Some(img) = dst.as_deref_mut() {
                        let at = Point::new(origin.x.saturating_add(x), origin.y.saturating_add(y));
                        self.render_address(&addr, img, at, style)?;
                    }
                    x += w;
                    widest = widest.max(x);
                    bottom = bottom.max(y + addr.height as i32);
                }
            }
            pos += len;
            chars += 1;
        }

        let lines = if pos == 0 { 0 } else { (y / line_h) as usize + 1 };
        Ok(TextLayout {
            bounds: Rect::new(origin.x, origin.y, widest, bottom.max(lines as i32 * line_h)),
            consumed: pos,
            chars,
            lines,
        })
    }

    /// Copy the glyphs used by `text` into the cache
    ///
    /// Returns how many glyphs were added. Stops with
    /// [`FontError::CacheFull`] once the cache cannot take the next glyph;
    /// glyphs added before that stay cached.
    pub fn precache(&mut self, text: &[u8]) -> Result<usize, FontError> {
        let mut pos = 0;
        let mut added = 0;
        let mut buf = [0u8; MAX_GLYPH_BYTES];
        while let Some((code, len)) = self.next_code(&text[pos..]) {
            pos += len;
            if code == 0x0A || code == 0x0D {
                continue;
            }
            let addr = self.glyph_address(code)?;
            if addr.cached || addr.is_empty() {
                continue;
            }
            let n = self.read_glyph(&addr, &mut buf)?;
            match self.cache.insert(addr, &buf[..n]) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(CacheError::NoSlot | CacheError::NoSpace) => {
                    warn!("font: glyph cache full after {} glyphs", self.cache.len());
                    return Err(FontError::CacheFull);
                }
            }
        }
        debug!("font: cached {} glyphs, {} bytes", added, self.cache.bytes_used());
        Ok(added)
    }

    /// Drop every cached glyph
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached glyphs
    pub fn cached_glyphs(&self) -> usize {
        self.cache.len()
    }
}
