//! Optional blit accelerator (DMA2D-style engines)

use crate::image::{ImageMut, ImageRef};

/// Errors an accelerator can report
///
/// Any error makes the caller fall back to the software path, so an
/// accelerator may decline work it cannot do exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelError {
    /// Operation or geometry not supported by this engine
    Unsupported,
    /// Engine is busy with another transfer
    Busy,
    /// Transfer started but reported a fault
    Transfer,
}

/// Hardware fill/copy/blend engine
///
/// Implementations run synchronously: they start the transfer and busy-poll
/// the completion flag before returning. Results must be pixel-identical to
/// the software paths (same clipping, same color math). Every method
/// defaults to [`AccelError::Unsupported`].
pub trait Accelerator {
    /// Fill every element of `dst` with `color`
    fn fill(&mut self, dst: &mut ImageMut<'_>, color: u16) -> Result<(), AccelError> {
        let _ = (dst, color);
        Err(AccelError::Unsupported)
    }

    /// Copy `src` into `dst`; both have the same size and format
    fn copy(&mut self, src: &ImageRef<'_>, dst: &mut ImageMut<'_>) -> Result<(), AccelError> {
        let _ = (src, dst);
        Err(AccelError::Unsupported)
    }

    /// Composite an ARGB1555 `src` over an RGB565 `dst` of the same size,
    /// skipping pixels whose opaque bit is clear
    fn blend_argb1555(
        &mut self,
        src: &ImageRef<'_>,
        dst: &mut ImageMut<'_>,
    ) -> Result<(), AccelError> {
        let _ = (src, dst);
        Err(AccelError::Unsupported)
    }
}

/// Accelerator that declines everything, leaving all work to software
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareOnly;

impl Accelerator for SoftwareOnly {}

impl<A: Accelerator + ?Sized> Accelerator for &mut A {
    fn fill(&mut self, dst: &mut ImageMut<'_>, color: u16) -> Result<(), AccelError> {
        (**self).fill(dst, color)
    }

    fn copy(&mut self, src: &ImageRef<'_>, dst: &mut ImageMut<'_>) -> Result<(), AccelError> {
        (**self).copy(src, dst)
    }

    fn blend_argb1555(
        &mut self,
        src: &ImageRef<'_>,
        dst: &mut ImageMut<'_>,
    ) -> Result<(), AccelError> {
        (**self).blend_argb1555(src, dst)
    }
}
