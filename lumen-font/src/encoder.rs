//! Glyph and blob encoder
//!
//! Produces the bytecode that [`crate::glyph`] decodes, and lays out whole
//! font blobs in a caller buffer. Used by font tooling and by tests that
//! need a known blob.

use crate::charmap::FontKind;
use crate::glyph::{
    MAX_SHORT_RUN, OP_BG_FG1, OP_BG_FG3, OP_BG_FG_LONG, OP_BG_LONG, OP_END, OP_FG, TAG_ANTIALIASED,
    TAG_OPAQUE,
};
use crate::header::{FontHeader, MapEntry, ScanOrder, FLAG_COLUMN_MAJOR, HEADER_SIZE};
use crate::{FontError, MAX_GLYPH_BYTES};

/// Longest background run one op-6 pair can express
const MAX_LONG_BG: usize = 32 << 8;
/// Longest foreground run one op-5 pair can express
const MAX_LONG_FG: usize = 256;

struct Out<'o> {
    buf: &'o mut [u8],
    len: usize,
}

impl Out<'_> {
    fn push(&mut self, b: u8) -> Result<(), FontError> {
        let slot = self.buf.get_mut(self.len).ok_or(FontError::BufferTooSmall)?;
        *slot = b;
        self.len += 1;
        Ok(())
    }

    fn op(&mut self, op: u8, n: usize) -> Result<(), FontError> {
        debug_assert!(n <= MAX_SHORT_RUN);
        self.push((op << 5) | n as u8)
    }

    /// Emit background runs until fewer than 32 remain; returns the rest
    fn long_background(&mut self, mut run: usize) -> Result<usize, FontError> {
        while run > MAX_SHORT_RUN {
            let chunk = run.min(MAX_LONG_BG);
            let v = chunk - 1;
            self.op(OP_BG_LONG, v >> 8)?;
            self.push(v as u8)?;
            run -= chunk;
        }
        Ok(run)
    }

    /// Emit `bg` background pixels followed by up to 256 of `fg` foreground
    /// pixels; returns how many foreground pixels were consumed
    fn background_then_foreground(&mut self, bg: usize, fg: usize) -> Result<usize, FontError> {
        let n = self.long_background(bg)?;
        let take = fg.min(MAX_LONG_FG);
        match take {
            1..=3 => self.op(OP_BG_FG1 + (take as u8 - 1), n)?,
            _ if n == 0 && take <= MAX_SHORT_RUN + 1 => self.op(OP_FG, take - 1)?,
            _ => {
                self.op(OP_BG_FG_LONG, n)?;
                self.push((take - 1) as u8)?;
            }
        }
        Ok(take)
    }
}

fn run_len(pixels: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    pixels[from..].iter().take_while(|&&p| pred(p)).count()
}

fn pixel_count(pixels: &[u8], width: u8, height: u8) -> Result<usize, FontError> {
    let total = width as usize * height as usize;
    if pixels.len() < total {
        return Err(FontError::BufferTooSmall);
    }
    Ok(total)
}

/// Encode a one-bit glyph
///
/// `pixels` holds `width × height` entries in scan order, non-zero meaning
/// foreground. Returns the number of bytes written to `out`.
pub fn encode_opaque(pixels: &[u8], width: u8, height: u8, out: &mut [u8]) -> Result<usize, FontError> {
    let total = pixel_count(pixels, width, height)?;
    let pixels = &pixels[..total];
    let mut out = Out { buf: out, len: 0 };
    out.push(TAG_OPAQUE)?;

    let mut i = 0;
    while i < total {
        let bg = run_len(pixels, i, |p| p == 0);
        if i + bg == total {
            break;
        }
        let fg = run_len(pixels, i + bg, |p| p != 0);
        let taken = out.background_then_foreground(bg, fg)?;
        i += bg + taken;
    }
    out.op(OP_END, 0)?;
    Ok(out.len)
}

/// Encode an anti-aliased glyph
///
/// `levels` holds `width × height` alpha levels (0..=7) in scan order; 0 is
/// background, 7 is solid foreground.
pub fn encode_antialiased(
    levels: &[u8],
    width: u8,
    height: u8,
    out: &mut [u8],
) -> Result<usize, FontError> {
    let total = pixel_count(levels, width, height)?;
    let levels = &levels[..total];
    let mut out = Out { buf: out, len: 0 };
    out.push(TAG_ANTIALIASED)?;

    let mut i = 0;
    while i < total {
        let bg = run_len(levels, i, |p| p == 0);
        if i + bg == total {
            break;
        }
        let start = i + bg;
        let solid = run_len(levels, start, |p| p >= 7);
        if solid >= 3 {
            // solid runs encode exactly as in the opaque variant
            let n = out.long_background(bg)?;
            let take = solid.min(MAX_LONG_FG);
            if take == 3 {
                out.op(OP_BG_FG3, n)?;
            } else if n == 0 && take <= MAX_SHORT_RUN + 1 {
                out.op(OP_FG, take - 1)?;
            } else {
                out.op(OP_BG_FG_LONG, n)?;
                out.push((take - 1) as u8)?;
            }
            i = start + take;
            continue;
        }

        let n = out.long_background(bg)?;
        let first = levels[start].min(7);
        match levels.get(start + 1) {
            Some(&second) if second != 0 => {
                out.op(OP_BG_FG1 + 1, n)?;
                out.push((first << 4) | second.min(7))?;
                i = start + 2;
            }
            _ => {
                out.op(OP_BG_FG1, n)?;
                out.push(first)?;
                i = start + 1;
            }
        }
    }
    out.op(OP_END, 0)?;
    Ok(out.len)
}

/// Lays out a complete font blob in a caller buffer
///
/// The character map is sized for every code of the font kind and starts
/// zeroed (every glyph missing). Glyph bytecode is appended to the data
/// section in the order glyphs are added.
pub struct BlobWriter<'b> {
    buf: &'b mut [u8],
    header: FontHeader,
    data_len: u32,
}

impl<'b> BlobWriter<'b> {
    /// Start a blob with row-major glyphs
    pub fn new(buf: &'b mut [u8], kind: FontKind, cell_height: u8) -> Result<Self, FontError> {
        Self::with_order(buf, kind, cell_height, ScanOrder::RowMajor)
    }

    /// Start a blob with an explicit glyph scan order
    pub fn with_order(
        buf: &'b mut [u8],
        kind: FontKind,
        cell_height: u8,
        order: ScanOrder,
    ) -> Result<Self, FontError> {
        let map_base = HEADER_SIZE as u32;
        let data_base = map_base + kind.entry_count() * MapEntry::SIZE as u32;
        let map = buf
            .get_mut(HEADER_SIZE..data_base as usize)
            .ok_or(FontError::BufferTooSmall)?;
        map.fill(0);
        let flags = match order {
            ScanOrder::RowMajor => 0,
            ScanOrder::ColumnMajor => FLAG_COLUMN_MAJOR,
        };
        let header = FontHeader {
            cell_height,
            entry_len: MapEntry::SIZE as u8,
            flags,
            kind,
            data_base,
            map_base,
        };
        buf[..HEADER_SIZE].copy_from_slice(&header.encode());
        Ok(Self {
            buf,
            header,
            data_len: 0,
        })
    }

    pub fn header(&self) -> &FontHeader {
        &self.header
    }

    /// Store already-encoded glyph bytecode for `code`
    pub fn add_glyph(&mut self, code: u32, width: u8, height: u8, bytecode: &[u8]) -> Result<(), FontError> {
        if bytecode.len() > MAX_GLYPH_BYTES {
            return Err(FontError::GlyphTooLarge);
        }
        let index = self.header.kind.map_index(code).ok_or(FontError::UnmappedCode)?;
        let entry_at = self
            .header
            .entry_offset(index)
            .ok_or(FontError::BufferTooSmall)? as usize;
        let start = (self.header.data_base + self.data_len) as usize;
        self.buf
            .get_mut(start..start + bytecode.len())
            .ok_or(FontError::BufferTooSmall)?
            .copy_from_slice(bytecode);
        let entry = MapEntry {
            offset: self.data_len,
            length: bytecode.len() as u16,
            width,
            height,
        };
        self.buf[entry_at..entry_at + MapEntry::SIZE].copy_from_slice(&entry.encode());
        self.data_len += bytecode.len() as u32;
        Ok(())
    }

    /// Encode and store a one-bit glyph
    pub fn add_opaque(&mut self, code: u32, width: u8, height: u8, pixels: &[u8]) -> Result<(), FontError> {
        let mut scratch = [0u8; MAX_GLYPH_BYTES];
        let len = encode_opaque(pixels, width, height, &mut scratch).map_err(|_| FontError::GlyphTooLarge)?;
        self.add_glyph(code, width, height, &scratch[..len])
    }

    /// Encode and store an anti-aliased glyph
    pub fn add_antialiased(
        &mut self,
        code: u32,
        width: u8,
        height: u8,
        levels: &[u8],
    ) -> Result<(), FontError> {
        let mut scratch = [0u8; MAX_GLYPH_BYTES];
        let len =
            encode_antialiased(levels, width, height, &mut scratch).map_err(|_| FontError::GlyphTooLarge)?;
        self.add_glyph(code, width, height, &scratch[..len])
    }

    /// Finish the blob, returning the bytes written
    pub fn finish(self) -> &'b [u8] {
        let end = (self.header.data_base + self.data_len) as usize;
        let buf: &'b [u8] = self.buf;
        &buf[..end]
    }
}
