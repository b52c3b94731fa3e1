//! Pixel formats and color math
//!
//! Two element layouts are supported:
//!
//! | Format   | Bytes | Bits (r/g/b) |
//! |----------|-------|--------------|
//! | `Rgb332` | 1     | 3/3/2        |
//! | `Rgb565` | 2     | 5/6/5        |
//!
//! Colors travel through the API as raw `u16` values; 8-bit formats use the
//! low byte. Bitmaps with transparency use ARGB1555 where bit 15 set means
//! the pixel is opaque.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of alpha levels used by anti-aliased glyphs (0..=7)
pub const ALPHA_MAX: u8 = 7;

/// ARGB1555 opaque flag
pub const ARGB1555_OPAQUE: u16 = 0x8000;

/// Element layout of an image view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    /// 1 byte per pixel, 3/3/2 packed
    Rgb332,
    /// 2 bytes per pixel (little-endian), 5/6/5 packed
    Rgb565,
}

impl PixelFormat {
    /// Bytes per element
    pub const fn elem_size(self) -> usize {
        match self {
            PixelFormat::Rgb332 => 1,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// Mask of valid color bits
    pub const fn mask(self) -> u16 {
        match self {
            PixelFormat::Rgb332 => 0x00FF,
            PixelFormat::Rgb565 => 0xFFFF,
        }
    }

    /// Pack 8-bit channels into this format
    pub const fn from_rgb888(self, r: u8, g: u8, b: u8) -> u16 {
        match self {
            PixelFormat::Rgb332 => rgb332(r, g, b) as u16,
            PixelFormat::Rgb565 => rgb565(r, g, b),
        }
    }

    /// Write `color` into one element's bytes
    #[inline]
    pub fn store(self, dst: &mut [u8], color: u16) {
        match self {
            PixelFormat::Rgb332 => dst[0] = color as u8,
            PixelFormat::Rgb565 => dst[..2].copy_from_slice(&color.to_le_bytes()),
        }
    }

    /// Read one element
    #[inline]
    pub fn load(self, src: &[u8]) -> u16 {
        match self {
            PixelFormat::Rgb332 => src[0] as u16,
            PixelFormat::Rgb565 => u16::from_le_bytes([src[0], src[1]]),
        }
    }

    /// Blend `fg` over `bg` at `alpha` in 0..=7, per channel at native depth
    pub fn blend(self, fg: u16, bg: u16, alpha: u8) -> u16 {
        match self {
            PixelFormat::Rgb332 => blend_rgb332(fg as u8, bg as u8, alpha) as u16,
            PixelFormat::Rgb565 => blend_rgb565(fg, bg, alpha),
        }
    }
}

/// Pack 8-bit channels into RGB332
pub const fn rgb332(r: u8, g: u8, b: u8) -> u8 {
    (r & 0xE0) | ((g & 0xE0) >> 3) | (b >> 6)
}

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Blend a single channel: `(fg * a + bg * (7 - a)) / 7`
#[inline]
const fn mix(fg: u16, bg: u16, alpha: u16) -> u16 {
    (fg * alpha + bg * (ALPHA_MAX as u16 - alpha)) / ALPHA_MAX as u16
}

/// Blend two RGB332 colors at alpha 0..=7
pub const fn blend_rgb332(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = (if alpha > ALPHA_MAX { ALPHA_MAX } else { alpha }) as u16;
    let (fg, bg) = (fg as u16, bg as u16);
    let r = mix((fg >> 5) & 0x7, (bg >> 5) & 0x7, a);
    let g = mix((fg >> 2) & 0x7, (bg >> 2) & 0x7, a);
    let b = mix(fg & 0x3, bg & 0x3, a);
    ((r << 5) | (g << 2) | b) as u8
}

/// Blend two RGB565 colors at alpha 0..=7
pub const fn blend_rgb565(fg: u16, bg: u16, alpha: u8) -> u16 {
    let a = (if alpha > ALPHA_MAX { ALPHA_MAX } else { alpha }) as u16;
    let r = mix((fg >> 11) & 0x1F, (bg >> 11) & 0x1F, a);
    let g = mix((fg >> 5) & 0x3F, (bg >> 5) & 0x3F, a);
    let b = mix(fg & 0x1F, bg & 0x1F, a);
    (r << 11) | (g << 5) | b
}

/// Repack ARGB1555 into RGB565, replicating the green MSB into the new LSB
pub const fn argb1555_to_rgb565(p: u16) -> u16 {
    let r = (p >> 10) & 0x1F;
    let g = (p >> 5) & 0x1F;
    let b = p & 0x1F;
    (r << 11) | (((g << 1) | (g >> 4)) << 5) | b
}

/// True if an ARGB1555 pixel is opaque
pub const fn argb1555_is_opaque(p: u16) -> bool {
    p & ARGB1555_OPAQUE != 0
}

/// Reduce RGB565 to RGB332 by truncating each channel
pub const fn rgb565_to_rgb332(p: u16) -> u8 {
    let r = (p >> 13) & 0x7;
    let g = (p >> 8) & 0x7;
    let b = (p >> 3) & 0x3;
    ((r << 5) | (g << 2) | b) as u8
}

const fn expand(v: u16, from_bits: u32, to_bits: u32) -> u16 {
    // Bit replication, exact for the endpoints
    let max_from = (1u16 << from_bits) - 1;
    let max_to = (1u16 << to_bits) - 1;
    (v * max_to + max_from / 2) / max_from
}

const fn build_rgb332_to_565() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let p = i as u16;
        let r = expand((p >> 5) & 0x7, 3, 5);
        let g = expand((p >> 2) & 0x7, 3, 6);
        let b = expand(p & 0x3, 2, 5);
        table[i] = (r << 11) | (g << 5) | b;
        i += 1;
    }
    table
}

/// RGB332 → RGB565 expansion, built at compile time
pub static RGB332_TO_RGB565: [u16; 256] = build_rgb332_to_565();

/// Expand RGB332 to RGB565
#[inline]
pub fn rgb332_to_rgb565(p: u8) -> u16 {
    RGB332_TO_RGB565[p as usize]
}

/// Common colors for both formats
pub mod named {
    use super::PixelFormat;

    /// Black in any format
    pub const BLACK: u16 = 0x0000;

    /// White for `format`
    pub const fn white(format: PixelFormat) -> u16 {
        format.mask()
    }

    /// Pure red for `format`
    pub const fn red(format: PixelFormat) -> u16 {
        format.from_rgb888(0xFF, 0, 0)
    }

    /// Pure green for `format`
    pub const fn green(format: PixelFormat) -> u16 {
        format.from_rgb888(0, 0xFF, 0)
    }

    /// Pure blue for `format`
    pub const fn blue(format: PixelFormat) -> u16 {
        format.from_rgb888(0, 0, 0xFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        assert_eq!(rgb565(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(rgb565(0xFF, 0, 0), 0xF800);
        assert_eq!(rgb565(0, 0xFF, 0), 0x07E0);
        assert_eq!(rgb332(0xFF, 0xFF, 0xFF), 0xFF);
        assert_eq!(rgb332(0, 0, 0xFF), 0x03);
        assert_eq!(named::red(PixelFormat::Rgb332), 0xE0);
    }

    #[test]
    fn test_blend_endpoints() {
        for fmt in [PixelFormat::Rgb332, PixelFormat::Rgb565] {
            let fg = named::red(fmt);
            let bg = named::blue(fmt);
            assert_eq!(fmt.blend(fg, bg, 7), fg);
            assert_eq!(fmt.blend(fg, bg, 0), bg);
        }
    }

    #[test]
    fn test_blend_midpoint_per_channel() {
        // 31 * 4 / 7 = 17 in red, 0 elsewhere
        assert_eq!(blend_rgb565(0xF800, 0x0000, 4), 17 << 11);
        // green 63 * 3 / 7 = 27, blue from bg 31 * 4 / 7 = 17
        assert_eq!(blend_rgb565(0x07E0, 0x001F, 3), (27 << 5) | 17);
        // red 7 * 5 / 7 = 5, blue 3 * 2 / 7 = 0
        assert_eq!(blend_rgb332(0xE0, 0x03, 5), 5 << 5);
    }

    #[test]
    fn test_argb1555_repack() {
        assert_eq!(argb1555_to_rgb565(0xFFFF), 0xFFFF);
        assert_eq!(argb1555_to_rgb565(0x8000), 0x0000);
        assert_eq!(argb1555_to_rgb565(0xFC00), 0xF800);
        assert_eq!(argb1555_to_rgb565(0x83E0), 0x07E0);
        assert!(argb1555_is_opaque(0x8001));
        assert!(!argb1555_is_opaque(0x7FFF));
    }

    #[test]
    fn test_332_565_tables() {
        assert_eq!(rgb332_to_rgb565(0x00), 0x0000);
        assert_eq!(rgb332_to_rgb565(0xFF), 0xFFFF);
        assert_eq!(rgb332_to_rgb565(0xE0), 0xF800);
        for p in 0..=255u8 {
            assert_eq!(rgb565_to_rgb332(rgb332_to_rgb565(p)), p);
        }
    }

    #[test]
    fn test_load_store() {
        let mut buf = [0u8; 2];
        PixelFormat::Rgb565.store(&mut buf, 0xABCD);
        assert_eq!(buf, [0xCD, 0xAB]);
        assert_eq!(PixelFormat::Rgb565.load(&buf), 0xABCD);
        PixelFormat::Rgb332.store(&mut buf, 0x1F3);
        assert_eq!(buf[0], 0xF3);
    }
}
