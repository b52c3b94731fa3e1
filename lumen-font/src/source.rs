//! Font blob storage
//!
//! Fonts are read through [`FontStorage`] so a blob can live in external
//! flash as well as in memory-mapped storage. Every read is bounds-checked
//! here; the decoder never indexes past what the storage hands back.

/// Errors from reading a font blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Requested range extends past the end of the blob
    OutOfBounds,
    /// Underlying device reported a read failure
    Read,
}

/// Random-access font blob
pub trait FontStorage {
    /// Total blob size in bytes
    fn len(&self) -> u32;

    /// True if the blob holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `offset`
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Whole blob when it is memory-resident, enabling zero-copy glyph access
    fn as_slice(&self) -> Option<&[u8]> {
        None
    }
}

/// Byte range `offset..offset + len` if it lies inside a blob of `total` bytes
pub(crate) fn checked_range(
    offset: u32,
    len: usize,
    total: u32,
) -> Result<core::ops::Range<usize>, StorageError> {
    let start = offset as usize;
    let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
    if end > total as usize {
        return Err(StorageError::OutOfBounds);
    }
    Ok(start..end)
}

impl FontStorage for [u8] {
    fn len(&self) -> u32 {
        <[u8]>::len(self) as u32
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = checked_range(offset, buf.len(), FontStorage::len(self))?;
        buf.copy_from_slice(&self[range]);
        Ok(())
    }

    fn as_slice(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<const N: usize> FontStorage for [u8; N] {
    fn len(&self) -> u32 {
        N as u32
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        self[..].read(offset, buf)
    }

    fn as_slice(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<S: FontStorage + ?Sized> FontStorage for &S {
    fn len(&self) -> u32 {
        (**self).len()
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(offset, buf)
    }

    fn as_slice(&self) -> Option<&[u8]> {
        (**self).as_slice()
    }
}
