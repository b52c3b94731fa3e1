//! Character-map strategies
//!
//! A font blob carries one of three code layouts. Each maps a character
//! code to an index into the blob's character map and knows how many bytes
//! of a text string make up one code.

/// Code substituted for anything the font cannot resolve
pub const FALLBACK_CODE: u32 = b'?' as u32;

/// Code returned for malformed UTF-8; folds to the fallback glyph
pub const REPLACEMENT_CODE: u32 = 0xFFFD;

/// First printable single-byte code
pub const ASCII_FIRST: u32 = 0x20;
/// Last single-byte code with a map entry
pub const ASCII_LAST: u32 = 0x7F;
/// Entries in the single-byte block
pub const ASCII_ENTRIES: u32 = ASCII_LAST - ASCII_FIRST + 1;

pub const GB2312_LEAD_FIRST: u8 = 0xA1;
pub const GB2312_LEAD_LAST: u8 = 0xF7;
pub const GB2312_TRAIL_FIRST: u8 = 0xA1;
pub const GB2312_TRAIL_LAST: u8 = 0xFE;
/// Trail bytes per lead byte
pub const GB2312_ROW: u32 = (GB2312_TRAIL_LAST - GB2312_TRAIL_FIRST) as u32 + 1;
/// Index of the single-byte block appended after the double-byte block
pub const GB2312_ASCII_BASE: u32 = (GB2312_LEAD_LAST - GB2312_LEAD_FIRST) as u32 * GB2312_ROW + GB2312_ROW;

/// Highest code point a Unicode font maps
pub const UNICODE_LAST: u32 = 0xD7AF;

/// Character-map layout of a font blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FontKind {
    /// Codes 0x20..=0x7F, one byte per character
    SingleByte = 0,
    /// GB2312 double-byte codes followed by a single-byte block
    Gb2312 = 1,
    /// Code points 0..=0xD7AF, text decoded as UTF-8
    Unicode = 2,
}

impl FontKind {
    /// Get the kind as its header byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a kind from its header byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FontKind::SingleByte),
            1 => Some(FontKind::Gb2312),
            2 => Some(FontKind::Unicode),
            _ => None,
        }
    }

    /// Number of character-map entries a blob of this kind carries
    pub fn entry_count(self) -> u32 {
        match self {
            FontKind::SingleByte => ASCII_ENTRIES,
            FontKind::Gb2312 => GB2312_ASCII_BASE + ASCII_ENTRIES,
            FontKind::Unicode => UNICODE_LAST + 1,
        }
    }

    /// Character-map index of `code`, or `None` if the layout has no slot
    pub fn map_index(self, code: u32) -> Option<u32> {
        match self {
            FontKind::SingleByte => ascii_index(code),
            FontKind::Gb2312 => {
                if code < 0x80 {
                    return ascii_index(code).map(|i| GB2312_ASCII_BASE + i);
                }
                let [lead, trail] = u16::try_from(code).ok()?.to_le_bytes();
                if !(GB2312_LEAD_FIRST..=GB2312_LEAD_LAST).contains(&lead)
                    || !(GB2312_TRAIL_FIRST..=GB2312_TRAIL_LAST).contains(&trail)
                {
                    return None;
                }
                Some((lead - GB2312_LEAD_FIRST) as u32 * GB2312_ROW + (trail - GB2312_TRAIL_FIRST) as u32)
            }
            FontKind::Unicode => (code <= UNICODE_LAST).then_some(code),
        }
    }

    /// Index of `code`, folding unmapped codes to the fallback
    pub fn map_index_or_fallback(self, code: u32) -> u32 {
        self.map_index(code)
            .or_else(|| self.map_index(FALLBACK_CODE))
            .unwrap_or(0)
    }

    /// Decode the first character of `text`
    ///
    /// Returns the code and the number of bytes it occupies, or `None` for
    /// empty input. Malformed input always consumes at least one byte.
    pub fn next_code(self, text: &[u8]) -> Option<(u32, usize)> {
        let first = *text.first()?;
        Some(match self {
            FontKind::SingleByte => (first as u32, 1),
            FontKind::Gb2312 => match text.get(1) {
                Some(&second) if first >= 0x80 => (u16::from_le_bytes([first, second]) as u32, 2),
                _ => (first as u32, 1),
            },
            FontKind::Unicode => decode_utf8(text),
        })
    }
}

fn ascii_index(code: u32) -> Option<u32> {
    (ASCII_FIRST..=ASCII_LAST)
        .contains(&code)
        .then(|| code - ASCII_FIRST)
}

fn decode_utf8(text: &[u8]) -> (u32, usize) {
    let len = match text[0] {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (REPLACEMENT_CODE, 1),
    };
    let Some(bytes) = text.get(..len) else {
        return (REPLACEMENT_CODE, 1);
    };
    match core::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) {
        Some(c) => (c as u32, len),
        None => (REPLACEMENT_CODE, 1),
    }
}
