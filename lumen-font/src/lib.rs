//! Lumen Font
//!
//! Bitmap fonts stored as compact run-length bytecode:
//! - Blob header and character-map entries
//! - Character-map strategies (single byte, GB2312, Unicode)
//! - Storage abstraction with a zero-copy path for memory-mapped blobs
//! - Glyph decoder, glyph cache and text layout
//! - Encoder for building blobs

#![no_std]
#![deny(unsafe_code)]

// libtest and proptest need the std macros
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod cache;
pub mod charmap;
pub mod encoder;
pub mod font;
pub mod glyph;
pub mod header;
pub mod source;

pub use cache::GlyphCache;
pub use charmap::FontKind;
pub use encoder::{encode_antialiased, encode_opaque, BlobWriter};
pub use font::{Font, TextLayout, TextStyle};
pub use glyph::GlyphAddress;
pub use header::{FontHeader, ScanOrder};
pub use source::{FontStorage, StorageError};

/// Largest glyph program the decoder accepts, in bytes
pub const MAX_GLYPH_BYTES: usize = 1024;

/// Errors from opening a font or decoding glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontError {
    /// Blob does not start with the font signature
    BadSignature,
    /// Header fields are inconsistent
    BadHeader,
    /// Unknown character-map kind
    UnknownKind,
    /// Glyph program is malformed
    BadGlyph,
    /// Glyph program exceeds [`MAX_GLYPH_BYTES`]
    GlyphTooLarge,
    /// Caller buffer cannot hold the result
    BufferTooSmall,
    /// Glyph cache cannot take another glyph
    CacheFull,
    /// Code has no slot in the font's character map
    UnmappedCode,
    /// Reading the blob failed
    Storage(StorageError),
}

impl From<StorageError> for FontError {
    fn from(e: StorageError) -> Self {
        FontError::Storage(e)
    }
}
