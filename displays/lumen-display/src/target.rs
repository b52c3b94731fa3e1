//! `embedded-graphics` adapter
//!
//! Lets e-g primitives, fonts and images draw through a [`Canvas`] so the
//! changed pixels end up in its dirty list like any native draw call.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size as EgSize};
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::Pixel;
use embedded_graphics::primitives::Rectangle;
use lumen_core::color::rgb565_to_rgb332;
use lumen_core::{Accelerator, PixelFormat, Point, Rect};
use lumen_raster::{Canvas, FILLED};

/// `DrawTarget` over a borrowed canvas
pub struct CanvasTarget<'c, 'a, A: Accelerator> {
    canvas: &'c mut Canvas<'a, A>,
}

impl<'c, 'a, A: Accelerator> CanvasTarget<'c, 'a, A> {
    pub fn new(canvas: &'c mut Canvas<'a, A>) -> Self {
        Self { canvas }
    }

    pub fn canvas(&mut self) -> &mut Canvas<'a, A> {
        self.canvas
    }

    /// Raw value of `color` in the canvas pixel format
    fn raw(&self, color: Rgb565) -> u16 {
        let raw = color.into_storage();
        match self.canvas.image().format() {
            PixelFormat::Rgb565 => raw,
            PixelFormat::Rgb332 => rgb565_to_rgb332(raw) as u16,
        }
    }
}

impl<A: Accelerator> OriginDimensions for CanvasTarget<'_, '_, A> {
    fn size(&self) -> EgSize {
        let size = self.canvas.size();
        EgSize::new(size.width as u32, size.height as u32)
    }
}

impl<A: Accelerator> DrawTarget for CanvasTarget<'_, '_, A> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.canvas.image().bounds();
        let mut touched = Rect::zero();
        for Pixel(p, color) in pixels {
            let p = Point::new(p.x, p.y);
            if !bounds.contains(p) {
                continue;
            }
            let raw = self.raw(color);
            self.canvas.image_mut().set_pixel(p.x as usize, p.y as usize, raw);
            touched |= Rect::new(p.x, p.y, 1, 1);
        }
        // one box per batch keeps glyph runs from flooding the tracker
        self.canvas.mark_dirty(touched);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let rect = Rect::new(
            area.top_left.x,
            area.top_left.y,
            area.size.width.min(i32::MAX as u32) as i32,
            area.size.height.min(i32::MAX as u32) as i32,
        );
        let raw = self.raw(color);
        self.canvas.rectangle(rect, raw, FILLED);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let raw = self.raw(color);
        self.canvas.fill(raw);
        Ok(())
    }
}
