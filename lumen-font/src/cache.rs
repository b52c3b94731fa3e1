//! Fixed-capacity glyph cache
//!
//! Holds up to `N` glyphs whose bytecode totals at most `B` bytes. Entries
//! stay sorted by code so lookups are a binary search. The cache is only
//! filled on request (`Font::precache`), never as a side effect of drawing.

use heapless::Vec;

use crate::glyph::GlyphAddress;

/// Why a glyph could not be cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheError {
    /// Entry table is full
    NoSlot,
    /// Byte pool is exhausted
    NoSpace,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    addr: GlyphAddress,
    start: usize,
}

/// Sorted glyph cache with a shared byte pool
#[derive(Debug)]
pub struct GlyphCache<const N: usize, const B: usize> {
    entries: Vec<Entry, N>,
    bytes: Vec<u8, B>,
}

impl<const N: usize, const B: usize> Default for GlyphCache<N, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const B: usize> GlyphCache<N, B> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            bytes: Vec::new(),
        }
    }

    /// Number of cached glyphs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of the pool in use
    pub fn bytes_used(&self) -> usize {
        self.bytes.len()
    }

    fn position(&self, code: u32) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&code, |e| e.addr.code)
    }

    /// Address of a cached glyph, marked `cached`
    pub fn lookup(&self, code: u32) -> Option<GlyphAddress> {
        let i = self.position(code).ok()?;
        Some(self.entries[i].addr)
    }

    /// Bytecode of a cached glyph
    pub fn bytes(&self, code: u32) -> Option<&[u8]> {
        let e = &self.entries[self.position(code).ok()?];
        self.bytes.get(e.start..e.start + e.addr.length as usize)
    }

    /// Cache `code`'s glyph; returns `false` if it was already present
    pub fn insert(&mut self, addr: GlyphAddress, code: &[u8]) -> Result<bool, CacheError> {
        let pos = match self.position(addr.code) {
            Ok(_) => return Ok(false),
            Err(pos) => pos,
        };
        if self.entries.is_full() {
            return Err(CacheError::NoSlot);
        }
        let start = self.bytes.len();
        self.bytes
            .extend_from_slice(code)
            .map_err(|_| CacheError::NoSpace)?;
        let entry = Entry {
            addr: GlyphAddress {
                length: code.len() as u16,
                cached: true,
                ..addr
            },
            start,
        };
        // Append then rotate into sorted position
        let _ = self.entries.push(entry);
        self.entries[pos..].rotate_right(1);
        Ok(true)
    }

    /// Drop every cached glyph
    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes.clear();
    }
}
