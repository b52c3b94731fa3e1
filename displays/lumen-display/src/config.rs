//! Panel configuration
//!
//! Describes the framebuffer a panel is driven from. Boards ship it either
//! as TOML text:
//!
//! ```toml
//! [panel]
//! width = 240
//! height = 135
//! format = "Rgb565"
//! max_flush_regions = 4
//! ```
//!
//! or as the compact postcard encoding produced by [`PanelConfig::to_slice`].

use lumen_core::{ImageError, ImageMut, PixelFormat};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest encoded size of a [`PanelConfig`] in postcard form
pub const MAX_ENCODED_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroSize,
    /// Explicit stride shorter than one row of pixels
    StrideTooSmall,
    /// `max_flush_regions` is zero
    NoFlushRegions,
    /// Frame buffer does not fit the configured view
    Image(ImageError),
    /// TOML parsing failed
    TomlParse,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Binary deserialization failed
    Deserialize,
    /// Output buffer too small for the binary form
    Serialize,
}

impl From<ImageError> for ConfigError {
    fn from(e: ImageError) -> Self {
        ConfigError::Image(e)
    }
}

/// Framebuffer layout of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Pixel format of the frame buffer
    #[cfg_attr(feature = "serde", serde(default = "default_format"))]
    pub format: PixelFormat,
    /// Row stride in bytes (0 = tightly packed)
    #[cfg_attr(feature = "serde", serde(default))]
    pub stride_bytes: u32,
    /// Windows written per flush before coalescing to a bounding box
    #[cfg_attr(feature = "serde", serde(default = "default_max_flush_regions"))]
    pub max_flush_regions: u8,
}

#[cfg(feature = "serde")]
fn default_format() -> PixelFormat {
    PixelFormat::Rgb565
}

#[cfg(feature = "serde")]
fn default_max_flush_regions() -> u8 {
    4
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            format: PixelFormat::Rgb565,
            stride_bytes: 0,
            max_flush_regions: 4,
        }
    }
}

impl PanelConfig {
    /// Effective row stride in bytes
    pub fn stride(&self) -> usize {
        if self.stride_bytes == 0 {
            self.width as usize * self.format.elem_size()
        } else {
            self.stride_bytes as usize
        }
    }

    /// Bytes a frame buffer needs for this panel
    pub fn frame_len(&self) -> usize {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        (self.height as usize - 1) * self.stride() + self.width as usize * self.format.elem_size()
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.stride() < self.width as usize * self.format.elem_size() {
            return Err(ConfigError::StrideTooSmall);
        }
        if self.max_flush_regions == 0 {
            return Err(ConfigError::NoFlushRegions);
        }
        Ok(())
    }

    /// View over `buf` laid out as this panel's frame buffer
    pub fn image_mut<'a>(&self, buf: &'a mut [u8]) -> Result<ImageMut<'a>, ConfigError> {
        self.validate()?;
        let view = ImageMut::with_stride(
            buf,
            self.height as usize,
            self.width as usize,
            self.format,
            self.stride(),
        )?;
        Ok(view)
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct PanelFile {
    panel: PanelConfig,
}

#[cfg(feature = "serde")]
impl PanelConfig {
    /// Parse and validate the `[panel]` table of a TOML document
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let file: PanelFile = toml::from_str(input).map_err(|_| {
            warn!("Panel config TOML rejected");
            ConfigError::TomlParse
        })?;
        file.panel.validate()?;
        debug!("Panel {}x{}", file.panel.width, file.panel.height);
        Ok(file.panel)
    }

    /// [`from_toml`](Self::from_toml) over raw bytes read from storage
    pub fn from_toml_bytes(input: &[u8]) -> Result<Self, ConfigError> {
        let text = core::str::from_utf8(input).map_err(|_| ConfigError::InvalidUtf8)?;
        Self::from_toml(text)
    }

    /// Decode and validate the postcard form
    pub fn from_bytes(input: &[u8]) -> Result<Self, ConfigError> {
        let config: PanelConfig = postcard::from_bytes(input).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_full() {
        let cfg = PanelConfig::from_toml(
            r#"
            # ST7789 in landscape
            [panel]
            width = 240
            height = 135
            format = "Rgb332"
            stride_bytes = 256
            max_flush_regions = 6
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg,
            PanelConfig {
                width: 240,
                height: 135,
                format: PixelFormat::Rgb332,
                stride_bytes: 256,
                max_flush_regions: 6,
            }
        );
        assert_eq!(cfg.stride(), 256);
    }

    #[test]
    fn test_from_toml_defaults() {
        let cfg = PanelConfig::from_toml("[panel]\nwidth = 128\nheight = 64\n").unwrap();
        assert_eq!(cfg.format, PixelFormat::Rgb565);
        assert_eq!(cfg.stride_bytes, 0);
        assert_eq!(cfg.stride(), 256);
        assert_eq!(cfg.max_flush_regions, 4);
    }

    #[test]
    fn test_from_toml_errors() {
        assert_eq!(PanelConfig::from_toml("[panel]\nwidth = 10\n"), Err(ConfigError::TomlParse));
        assert_eq!(PanelConfig::from_toml("[panel]\nwidth = \"wide\"\nheight = 2\n"), Err(ConfigError::TomlParse));
        assert_eq!(
            PanelConfig::from_toml("[panel]\nwidth = 0\nheight = 2\n"),
            Err(ConfigError::ZeroSize)
        );
        assert_eq!(
            PanelConfig::from_toml("[panel]\nwidth = 10\nheight = 2\nstride_bytes = 8\n"),
            Err(ConfigError::StrideTooSmall)
        );
        assert_eq!(PanelConfig::from_toml_bytes(&[0xFF, 0xFE]), Err(ConfigError::InvalidUtf8));
    }

    #[test]
    fn test_postcard_roundtrip() {
        let cfg = PanelConfig {
            width: 480,
            height: 320,
            format: PixelFormat::Rgb565,
            stride_bytes: 1024,
            max_flush_regions: 10,
        };
        let mut buf = [0u8; MAX_ENCODED_LEN];
        let used = cfg.to_slice(&mut buf).unwrap().len();
        assert!(used <= MAX_ENCODED_LEN);
        assert_eq!(PanelConfig::from_bytes(&buf[..used]), Ok(cfg));
        assert_eq!(PanelConfig::from_bytes(&buf[..2]), Err(ConfigError::Deserialize));

        let mut tiny = [0u8; 2];
        assert_eq!(cfg.to_slice(&mut tiny).map(|b| b.len()), Err(ConfigError::Serialize));
    }

    #[test]
    fn test_image_mut_layout() {
        let cfg = PanelConfig {
            width: 3,
            height: 2,
            format: PixelFormat::Rgb565,
            stride_bytes: 8,
            max_flush_regions: 1,
        };
        assert_eq!(cfg.frame_len(), 14);
        let mut buf = [0u8; 14];
        let mut img = cfg.image_mut(&mut buf).unwrap();
        img.set_pixel(0, 1, 0xABCD);
        assert_eq!(img.stride(), 8);
        assert_eq!(buf[8..10], [0xCD, 0xAB]);

        let mut short = [0u8; 13];
        assert_eq!(
            cfg.image_mut(&mut short).map(|v| v.cols()),
            Err(ConfigError::Image(ImageError::BufferTooSmall))
        );
        let bad = PanelConfig { max_flush_regions: 0, ..cfg };
        assert_eq!(bad.image_mut(&mut buf).map(|v| v.cols()), Err(ConfigError::NoFlushRegions));
    }
}
