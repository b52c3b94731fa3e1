//! Font blob header
//!
//! Header format (16 bytes, little-endian):
//! - SIGNATURE (4 bytes): `b"LMFT"`
//! - CELL HEIGHT (1 byte): line height in pixels
//! - ENTRY LEN (1 byte): bytes per character-map entry (at least 8)
//! - FLAGS (1 byte): bit 0 set = glyphs are scanned column by column
//! - KIND (1 byte): character-map strategy, see [`FontKind`]
//! - DATA BASE (4 bytes): offset of the glyph data section
//! - MAP BASE (4 bytes): offset of the character map
//!
//! Each character-map entry starts with:
//! - OFFSET (4 bytes): glyph offset relative to DATA BASE
//! - LENGTH (2 bytes): glyph byte length, 0 for a missing glyph
//! - WIDTH (1 byte), HEIGHT (1 byte)

use crate::charmap::FontKind;
use crate::FontError;

/// Blob signature
pub const FONT_SIGNATURE: [u8; 4] = *b"LMFT";

/// Header size in bytes
pub const HEADER_SIZE: usize = 16;

/// Minimum character-map entry size in bytes
pub const MIN_ENTRY_LEN: u8 = 8;

/// Glyphs are stored column-major (cursor wraps at the glyph height)
pub const FLAG_COLUMN_MAJOR: u8 = 0x01;

/// Order in which the glyph cursor visits pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOrder {
    /// Left to right, wrapping to the next row at the glyph width
    RowMajor,
    /// Top to bottom, wrapping to the next column at the glyph height
    ColumnMajor,
}

/// Parsed font header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FontHeader {
    /// Line height in pixels
    pub cell_height: u8,
    /// Bytes per character-map entry
    pub entry_len: u8,
    /// Raw flag byte
    pub flags: u8,
    /// Character-map strategy
    pub kind: FontKind,
    /// Offset of the glyph data section
    pub data_base: u32,
    /// Offset of the character map
    pub map_base: u32,
}

impl FontHeader {
    /// Parse a header from its 16 bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self, FontError> {
        if bytes[0..4] != FONT_SIGNATURE {
            return Err(FontError::BadSignature);
        }
        let kind = FontKind::from_u8(bytes[7]).ok_or(FontError::UnknownKind)?;
        let entry_len = bytes[5];
        if entry_len < MIN_ENTRY_LEN {
            return Err(FontError::BadHeader);
        }
        Ok(Self {
            cell_height: bytes[4],
            entry_len,
            flags: bytes[6],
            kind,
            data_base: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            map_base: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }

    /// Serialize into 16 bytes
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&FONT_SIGNATURE);
        out[4] = self.cell_height;
        out[5] = self.entry_len;
        out[6] = self.flags;
        out[7] = self.kind.as_u8();
        out[8..12].copy_from_slice(&self.data_base.to_le_bytes());
        out[12..16].copy_from_slice(&self.map_base.to_le_bytes());
        out
    }

    /// Pixel visiting order for glyph bitmaps
    pub fn scan_order(&self) -> ScanOrder {
        if self.flags & FLAG_COLUMN_MAJOR != 0 {
            ScanOrder::ColumnMajor
        } else {
            ScanOrder::RowMajor
        }
    }

    /// Blob offset of the character-map entry at `index`
    pub fn entry_offset(&self, index: u32) -> Option<u32> {
        index
            .checked_mul(self.entry_len as u32)
            .and_then(|rel| self.map_base.checked_add(rel))
    }
}

/// One character-map entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MapEntry {
    /// Glyph offset relative to the data section
    pub offset: u32,
    /// Glyph byte length, 0 when the glyph is missing
    pub length: u16,
    pub width: u8,
    pub height: u8,
}

impl MapEntry {
    /// Size of the encoded entry prefix
    pub const SIZE: usize = 8;

    /// Parse the first 8 bytes of an entry
    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            length: u16::from_le_bytes([bytes[4], bytes[5]]),
            width: bytes[6],
            height: bytes[7],
        }
    }

    /// Serialize into 8 bytes
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.offset.to_le_bytes());
        out[4..6].copy_from_slice(&self.length.to_le_bytes());
        out[6] = self.width;
        out[7] = self.height;
        out
    }

    /// True if the font has no glyph for this slot
    pub fn is_missing(&self) -> bool {
        self.length == 0
    }
}
