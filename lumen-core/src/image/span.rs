//! Horizontal span fill
//!
//! Writes one element, then keeps doubling the initialized prefix with
//! `copy_within` (1, 2, 4, … elements per copy) until the run is complete.
//! The per-pixel cost is paid once regardless of element size.

use crate::color::PixelFormat;

/// Fill `bytes` (a whole number of elements) with `color`
pub fn fill_bytes(bytes: &mut [u8], color: u16, format: PixelFormat) {
    let es = format.elem_size();
    if bytes.len() < es {
        return;
    }
    format.store(&mut bytes[..es], color);
    let len = bytes.len() - bytes.len() % es;
    let mut filled = es;
    while filled < len {
        let n = filled.min(len - filled);
        bytes.copy_within(0..n, filled);
        filled += n;
    }
}

/// Fill elements `x1..=x2` of a row slice with `color`
///
/// Callers clip `x1`/`x2` to the row first; an inverted span writes nothing.
#[inline]
pub fn fill_span(row: &mut [u8], x1: usize, x2: usize, color: u16, format: PixelFormat) {
    if x2 < x1 {
        return;
    }
    let es = format.elem_size();
    fill_bytes(&mut row[x1 * es..(x2 + 1) * es], color, format);
}
