//! Dirty-region presenter
//!
//! Pushes what a [`Canvas`] changed since the last flush to a
//! [`DisplayTransport`]. Regions are written in the order the tracker
//! reports them. The tracker is reset only after every write succeeded,
//! so a failed flush is retried in full on the next call.

use heapless::Vec;
use lumen_core::{Accelerator, Rect};
use lumen_raster::{Canvas, MAX_DIRTY_RECTS};

use crate::backend::{DisplayTransport, TransportError};

/// Flushes canvas changes to a panel
pub struct Presenter<T: DisplayTransport> {
    transport: T,
    max_flush_regions: usize,
}

impl<T: DisplayTransport> Presenter<T> {
    /// Create a presenter writing at most `max_flush_regions` windows per
    /// flush (minimum 1)
    pub fn new(transport: T, max_flush_regions: usize) -> Self {
        Self {
            transport,
            max_flush_regions: max_flush_regions.max(1),
        }
    }

    /// Create a presenter with the limits of a panel configuration
    pub fn from_config(transport: T, config: &crate::config::PanelConfig) -> Self {
        Self::new(transport, config.max_flush_regions as usize)
    }

    /// The wrapped transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The wrapped transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the presenter and return the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Windows a flush of `canvas` would write, clipped to the panel
    ///
    /// More pending regions than `max_flush_regions` coalesce into their
    /// bounding box.
    pub fn plan<A: Accelerator>(&self, canvas: &Canvas<'_, A>) -> Vec<Rect<i32>, MAX_DIRTY_RECTS> {
        let panel = Rect::from_origin_size(lumen_core::Point::ORIGIN, self.transport.dimensions());
        let mut windows = Vec::new();
        let rects = canvas.dirty_rects();

        if rects.len() > self.max_flush_regions {
            if let Some(bbox) = canvas.dirty().bounding_box() {
                push_clipped(&mut windows, bbox & panel);
            }
        } else {
            for r in rects {
                push_clipped(&mut windows, *r & panel);
            }
        }
        windows
    }

    /// Write every dirty region of `canvas` and reset its tracker
    ///
    /// Returns the number of windows written.
    pub fn present<A: Accelerator>(&mut self, canvas: &mut Canvas<'_, A>) -> Result<usize, TransportError> {
        if canvas.dirty().is_empty() {
            return Ok(0);
        }
        if !self.transport.is_ready() {
            debug!("Panel busy, flush deferred");
            return Err(TransportError::NotReady);
        }

        let windows = self.plan(canvas);
        let image = canvas.image();
        for area in &windows {
            let pixels = image.sub_view(*area);
            if let Err(e) = self.transport.write_region(*area, &pixels) {
                warn!("Region write failed: {}", e);
                return Err(e);
            }
        }

        trace!("Flushed {} regions", windows.len());
        canvas.reset_dirty_rects();
        Ok(windows.len())
    }

    /// Write the whole frame regardless of dirty state and reset the
    /// tracker
    pub fn present_all<A: Accelerator>(&mut self, canvas: &mut Canvas<'_, A>) -> Result<(), TransportError> {
        if !self.transport.is_ready() {
            return Err(TransportError::NotReady);
        }
        let panel = Rect::from_origin_size(lumen_core::Point::ORIGIN, self.transport.dimensions());
        let area = canvas.image().bounds() & panel;
        if !area.is_empty() {
            self.transport.write_region(area, &canvas.image().sub_view(area))?;
        }
        canvas.reset_dirty_rects();
        Ok(())
    }
}

fn push_clipped(windows: &mut Vec<Rect<i32>, MAX_DIRTY_RECTS>, area: Rect<i32>) {
    if !area.is_empty() && windows.push(area).is_err() {
        // the tracker never reports more than MAX_DIRTY_RECTS
        warn!("Flush window dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{ImageMut, ImageRef, PixelFormat, Point, Size};
    use lumen_raster::FILLED;

    /// Panel model that keeps a copy of every pixel it receives
    struct Recorder {
        size: Size<i32>,
        pixels: std::vec::Vec<u16>,
        writes: std::vec::Vec<Rect<i32>>,
        ready: bool,
        fail_after: Option<usize>,
    }

    impl Recorder {
        fn new(w: i32, h: i32) -> Self {
            Self {
                size: Size::new(w, h),
                pixels: std::vec![0; (w * h) as usize],
                writes: std::vec::Vec::new(),
                ready: true,
                fail_after: None,
            }
        }

        fn at(&self, x: i32, y: i32) -> u16 {
            self.pixels[(y * self.size.width + x) as usize]
        }
    }

    impl DisplayTransport for Recorder {
        fn write_region(&mut self, area: Rect<i32>, pixels: &ImageRef<'_>) -> Result<(), TransportError> {
            if self.fail_after == Some(self.writes.len()) {
                return Err(TransportError::Communication);
            }
            if pixels.width() != area.width || pixels.height() != area.height {
                return Err(TransportError::InvalidRegion);
            }
            for y in 0..pixels.rows() {
                for x in 0..pixels.cols() {
                    let idx = (area.y + y as i32) * self.size.width + area.x + x as i32;
                    self.pixels[idx as usize] = pixels.pixel(x, y);
                }
            }
            self.writes.push(area);
            Ok(())
        }

        fn dimensions(&self) -> Size<i32> {
            self.size
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    fn canvas(buf: &mut [u8]) -> Canvas<'_> {
        Canvas::new(ImageMut::new(buf, 24, 32, PixelFormat::Rgb565).unwrap())
    }

    #[test]
    fn test_present_writes_dirty_regions_and_resets() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(2, 2, 4, 4), 0xF800, FILLED);
        c.rectangle(Rect::new(20, 15, 3, 3), 0x07E0, FILLED);

        let mut p = Presenter::new(Recorder::new(32, 24), 4);
        assert_eq!(p.present(&mut c), Ok(2));
        assert!(c.dirty_rects().is_empty());

        let panel = p.transport();
        assert_eq!(panel.writes, [Rect::new(2, 2, 4, 4), Rect::new(20, 15, 3, 3)]);
        assert_eq!(panel.at(3, 3), 0xF800);
        assert_eq!(panel.at(21, 16), 0x07E0);
        assert_eq!(panel.at(10, 10), 0);
    }

    #[test]
    fn test_nothing_dirty_writes_nothing() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        let mut p = Presenter::new(Recorder::new(32, 24), 4);
        assert_eq!(p.present(&mut c), Ok(0));
        assert!(p.transport().writes.is_empty());
    }

    #[test]
    fn test_too_many_regions_coalesce() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.draw_pixel(Point::new(1, 1), 0xFFFF);
        c.draw_pixel(Point::new(30, 2), 0xFFFF);
        c.draw_pixel(Point::new(15, 20), 0xFFFF);
        assert_eq!(c.dirty_rects().len(), 3);

        let mut p = Presenter::new(Recorder::new(32, 24), 2);
        assert_eq!(p.present(&mut c), Ok(1));
        assert_eq!(p.transport().writes, [Rect::new(1, 1, 30, 20)]);
        assert_eq!(p.transport().at(30, 2), 0xFFFF);
    }

    #[test]
    fn test_failed_write_keeps_dirty_state() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.draw_pixel(Point::new(1, 1), 0xFFFF);
        c.draw_pixel(Point::new(30, 20), 0xFFFF);

        let mut rec = Recorder::new(32, 24);
        rec.fail_after = Some(1);
        let mut p = Presenter::new(rec, 4);
        assert_eq!(p.present(&mut c), Err(TransportError::Communication));
        assert_eq!(c.dirty_rects().len(), 2);

        p.transport_mut().fail_after = None;
        assert_eq!(p.present(&mut c), Ok(2));
        assert!(c.dirty_rects().is_empty());
    }

    #[test]
    fn test_busy_panel_defers() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.draw_pixel(Point::new(4, 4), 0x1234);
        let mut rec = Recorder::new(32, 24);
        rec.ready = false;
        let mut p = Presenter::new(rec, 4);
        assert_eq!(p.present(&mut c), Err(TransportError::NotReady));
        assert!(!c.dirty().is_empty());
    }

    #[test]
    fn test_regions_clipped_to_smaller_panel() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.rectangle(Rect::new(14, 4, 4, 4), 0xFFFF, FILLED);
        c.draw_pixel(Point::new(30, 20), 0xFFFF);

        let mut p = Presenter::new(Recorder::new(16, 16), 4);
        assert_eq!(p.present(&mut c), Ok(1));
        assert_eq!(p.transport().writes, [Rect::new(14, 4, 2, 4)]);
        assert!(c.dirty_rects().is_empty());
    }

    #[test]
    fn test_present_all_pushes_frame() {
        let mut buf = [0u8; 32 * 24 * 2];
        let mut c = canvas(&mut buf);
        c.fill(0x0101);
        let mut p = Presenter::new(Recorder::new(32, 24), 1);
        assert_eq!(p.present_all(&mut c), Ok(()));
        assert_eq!(p.transport().writes, [Rect::new(0, 0, 32, 24)]);
        assert_eq!(p.transport().at(31, 23), 0x0101);
        assert!(c.dirty_rects().is_empty());
    }
}
