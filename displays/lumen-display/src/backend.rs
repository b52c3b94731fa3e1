//! Display transport trait
//!
//! The boundary between rendered pixels and the physical panel. A
//! transport knows how to push one rectangular window of pixels over SPI,
//! a parallel bus, DMA or whatever else the board wires up; everything
//! above it works in framebuffer coordinates only.

use lumen_core::{ImageRef, Rect, Size};

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Communication error with the panel
    Communication,
    /// Region lies outside the panel or does not match the pixel view
    InvalidRegion,
    /// Panel not initialized or still busy
    NotReady,
    /// Pixel format not accepted by the panel
    UnsupportedFormat,
}

/// Panel transport
///
/// Implementations write pixels; they never read back and never keep the
/// borrowed view past the call.
pub trait DisplayTransport {
    /// Push `pixels` to the panel window at `area`
    ///
    /// `pixels` has exactly `area.width × area.height` elements. Rows are
    /// `pixels.stride()` bytes apart, which is usually the full frame
    /// stride rather than the region width.
    fn write_region(&mut self, area: Rect<i32>, pixels: &ImageRef<'_>) -> Result<(), TransportError>;

    /// Panel size in pixels
    fn dimensions(&self) -> Size<i32>;

    /// Check if the panel accepts writes
    fn is_ready(&self) -> bool;
}

impl<T: DisplayTransport + ?Sized> DisplayTransport for &mut T {
    fn write_region(&mut self, area: Rect<i32>, pixels: &ImageRef<'_>) -> Result<(), TransportError> {
        (**self).write_region(area, pixels)
    }

    fn dimensions(&self) -> Size<i32> {
        (**self).dimensions()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}
