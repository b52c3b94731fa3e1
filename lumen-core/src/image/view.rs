//! Borrowed image views
//!
//! An image view is a rectangular window over caller-owned pixel memory:
//! `rows × cols` elements of one [`PixelFormat`], rows `stride` bytes apart.
//! Views never own or allocate storage. Sub-views borrow the same bytes as
//! their parent, so drawing into a sub-view is drawing into the parent; the
//! borrow checker keeps a parent and a mutable sub-view from being used at
//! the same time.

use crate::color::PixelFormat;
use crate::geometry::{Point, Range, Rect, Size};

use super::span;

/// Errors from constructing a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Stride is shorter than one row of elements
    StrideTooSmall,
    /// Backing slice does not cover every row
    BufferTooSmall,
}

/// Shape of a view, shared by the read-only and mutable flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Layout {
    rows: usize,
    cols: usize,
    format: PixelFormat,
    stride: usize,
}

impl Layout {
    fn new(
        len: usize,
        rows: usize,
        cols: usize,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, ImageError> {
        let layout = Self {
            rows,
            cols,
            format,
            stride,
        };
        if stride < cols * format.elem_size() {
            return Err(ImageError::StrideTooSmall);
        }
        if len < layout.required_len() {
            return Err(ImageError::BufferTooSmall);
        }
        Ok(layout)
    }

    fn empty(format: PixelFormat, stride: usize) -> Self {
        Self {
            rows: 0,
            cols: 0,
            format,
            stride,
        }
    }

    /// Bytes spanned from the first element to the end of the last row
    fn required_len(&self) -> usize {
        if self.rows == 0 || self.cols == 0 {
            0
        } else {
            (self.rows - 1) * self.stride + self.row_bytes()
        }
    }

    fn row_bytes(&self) -> usize {
        self.cols * self.format.elem_size()
    }

    fn bounds(&self) -> Rect<i32> {
        Rect::new(0, 0, self.cols as i32, self.rows as i32)
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.stride + x * self.format.elem_size()
    }

    /// Clip `rect` to the view and compute the byte window of the result
    fn sub(&self, rect: Rect<i32>) -> (core::ops::Range<usize>, Layout) {
        let r = rect & self.bounds();
        if r.is_empty() {
            return (0..0, Self::empty(self.format, self.stride));
        }
        let layout = Self {
            rows: r.height as usize,
            cols: r.width as usize,
            format: self.format,
            stride: self.stride,
        };
        let start = self.offset(r.x as usize, r.y as usize);
        (start..start + layout.required_len(), layout)
    }

    fn range_rect(&self, rows: Range, cols: Range) -> Rect<i32> {
        let rows = rows.clamp_to(self.rows as i32);
        let cols = cols.clamp_to(self.cols as i32);
        Rect::new(cols.start, rows.start, cols.size(), rows.size())
    }
}

macro_rules! view_accessors {
    () => {
        /// Number of rows
        pub fn rows(&self) -> usize {
            self.layout.rows
        }

        /// Number of columns
        pub fn cols(&self) -> usize {
            self.layout.cols
        }

        /// Width in pixels
        pub fn width(&self) -> i32 {
            self.layout.cols as i32
        }

        /// Height in pixels
        pub fn height(&self) -> i32 {
            self.layout.rows as i32
        }

        /// Element format
        pub fn format(&self) -> PixelFormat {
            self.layout.format
        }

        /// Bytes per element
        pub fn elem_size(&self) -> usize {
            self.layout.format.elem_size()
        }

        /// Bytes between the starts of consecutive rows
        pub fn stride(&self) -> usize {
            self.layout.stride
        }

        /// Number of elements
        pub fn total(&self) -> usize {
            self.layout.rows * self.layout.cols
        }

        /// True if rows are packed back to back
        pub fn is_continuous(&self) -> bool {
            self.layout.stride == self.layout.row_bytes()
        }

        /// True if the view has no elements
        pub fn is_empty(&self) -> bool {
            self.total() == 0
        }

        /// `(0, 0, cols, rows)`
        pub fn bounds(&self) -> Rect<i32> {
            self.layout.bounds()
        }

        /// `(cols, rows)`
        pub fn size(&self) -> Size<i32> {
            Size::new(self.width(), self.height())
        }

        /// Raw bytes starting at element (0, 0)
        pub fn as_bytes(&self) -> &[u8] {
            &self.data[..self.layout.required_len()]
        }

        /// Bytes of row `y` (exactly `cols * elem_size` long)
        ///
        /// Panics if `y` is out of range.
        pub fn row(&self, y: usize) -> &[u8] {
            let start = y * self.layout.stride;
            &self.data[start..start + self.layout.row_bytes()]
        }

        /// Read the element at (`x`, `y`)
        ///
        /// Panics if the coordinates are out of range.
        #[inline]
        pub fn pixel(&self, x: usize, y: usize) -> u16 {
            debug_assert!(x < self.layout.cols && y < self.layout.rows);
            self.layout.format.load(&self.data[self.layout.offset(x, y)..])
        }

        /// Read the element at `pt` if it lies inside the view
        pub fn get(&self, pt: Point<i32>) -> Option<u16> {
            if self.bounds().contains(pt) {
                Some(self.pixel(pt.x as usize, pt.y as usize))
            } else {
                None
            }
        }
    };
}

/// Read-only view over pixel memory
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    data: &'a [u8],
    layout: Layout,
}

impl<'a> ImageRef<'a> {
    /// Create a continuous view (`stride = cols * elem_size`)
    pub fn new(
        data: &'a [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
    ) -> Result<Self, ImageError> {
        Self::with_stride(data, rows, cols, format, cols * format.elem_size())
    }

    /// Create a view with an explicit row stride in bytes
    pub fn with_stride(
        data: &'a [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, ImageError> {
        let layout = Layout::new(data.len(), rows, cols, format, stride)?;
        Ok(Self { data, layout })
    }

    view_accessors!();

    /// View of `rect` clipped to this view, sharing storage
    pub fn sub_view(&self, rect: Rect<i32>) -> ImageRef<'a> {
        let (bytes, layout) = self.layout.sub(rect);
        let data: &'a [u8] = self.data;
        ImageRef {
            data: &data[bytes],
            layout,
        }
    }

    /// View of a row range and a column range ([`Range::all`] keeps an axis)
    pub fn sub_range(&self, rows: Range, cols: Range) -> ImageRef<'a> {
        self.sub_view(self.layout.range_rect(rows, cols))
    }

    /// Copy the common top-left area into `dst`
    ///
    /// Both views are clipped to the smaller row and column counts. Views
    /// of different formats copy nothing.
    pub fn copy_to(&self, dst: &mut ImageMut<'_>) {
        if self.format() != dst.format() {
            return;
        }
        let rows = self.rows().min(dst.rows());
        let n = self.cols().min(dst.cols()) * self.elem_size();
        for y in 0..rows {
            dst.row_mut(y)[..n].copy_from_slice(&self.row(y)[..n]);
        }
    }
}

/// Mutable view over pixel memory
#[derive(Debug)]
pub struct ImageMut<'a> {
    data: &'a mut [u8],
    layout: Layout,
}

impl<'a> ImageMut<'a> {
    /// Create a continuous view (`stride = cols * elem_size`)
    pub fn new(
        data: &'a mut [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
    ) -> Result<Self, ImageError> {
        Self::with_stride(data, rows, cols, format, cols * format.elem_size())
    }

    /// Create a view with an explicit row stride in bytes
    pub fn with_stride(
        data: &'a mut [u8],
        rows: usize,
        cols: usize,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, ImageError> {
        let layout = Layout::new(data.len(), rows, cols, format, stride)?;
        Ok(Self { data, layout })
    }

    view_accessors!();

    /// Read-only view of the same pixels
    pub fn view(&self) -> ImageRef<'_> {
        ImageRef {
            data: &*self.data,
            layout: self.layout,
        }
    }

    /// Shorter-lived mutable view of the same pixels
    pub fn reborrow(&mut self) -> ImageMut<'_> {
        ImageMut {
            data: &mut *self.data,
            layout: self.layout,
        }
    }

    /// Mutable view of `rect` clipped to this view, sharing storage
    pub fn sub_view_mut(&mut self, rect: Rect<i32>) -> ImageMut<'_> {
        let (bytes, layout) = self.layout.sub(rect);
        ImageMut {
            data: &mut self.data[bytes],
            layout,
        }
    }

    /// Consume the view and narrow it to `rect`
    pub fn into_sub_view(self, rect: Rect<i32>) -> ImageMut<'a> {
        let (bytes, layout) = self.layout.sub(rect);
        let data: &'a mut [u8] = self.data;
        ImageMut {
            data: &mut data[bytes],
            layout,
        }
    }

    /// Mutable view of a row range and a column range
    pub fn sub_range_mut(&mut self, rows: Range, cols: Range) -> ImageMut<'_> {
        let rect = self.layout.range_rect(rows, cols);
        self.sub_view_mut(rect)
    }

    /// Raw bytes starting at element (0, 0)
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.layout.required_len();
        &mut self.data[..len]
    }

    /// Mutable bytes of row `y`
    ///
    /// Panics if `y` is out of range.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.layout.stride;
        let len = self.layout.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Write the element at (`x`, `y`)
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u16) {
        debug_assert!(x < self.layout.cols && y < self.layout.rows);
        let offset = self.layout.offset(x, y);
        self.layout.format.store(&mut self.data[offset..], color);
    }

    /// Write the element at `pt` if it lies inside the view
    pub fn put(&mut self, pt: Point<i32>, color: u16) {
        if self.bounds().contains(pt) {
            self.set_pixel(pt.x as usize, pt.y as usize, color);
        }
    }

    /// Fill elements `x1..=x2` of row `y` (already clipped by the caller)
    #[inline]
    pub fn hline(&mut self, y: usize, x1: usize, x2: usize, color: u16) {
        let format = self.layout.format;
        span::fill_span(self.row_mut(y), x1, x2, color, format);
    }

    /// Assign `color` to every element
    pub fn fill(&mut self, color: u16) {
        let format = self.layout.format;
        if self.is_continuous() {
            let len = self.layout.required_len();
            span::fill_bytes(&mut self.data[..len], color, format);
        } else {
            for y in 0..self.rows() {
                span::fill_bytes(self.row_mut(y), color, format);
            }
        }
    }

    /// Fill `rect` clipped to the view
    pub fn fill_rect(&mut self, rect: Rect<i32>, color: u16) {
        self.sub_view_mut(rect).fill(color);
    }

    /// Copy the common top-left area of `src` into this view
    pub fn copy_from(&mut self, src: &ImageRef<'_>) {
        src.copy_to(self);
    }
}

impl<'a> From<ImageMut<'a>> for ImageRef<'a> {
    fn from(view: ImageMut<'a>) -> Self {
        ImageRef {
            data: view.data,
            layout: view.layout,
        }
    }
}
