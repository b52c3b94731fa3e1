//! Board-agnostic building blocks for the Lumen renderer
//!
//! This crate contains everything the rasterizer needs that does not draw
//! anything by itself:
//!
//! - Geometry value types (points, sizes, rects, rotated rects, ranges)
//! - Borrowed image views over caller-owned pixel memory
//! - The two supported pixel formats and their color math
//! - Fixed-point trigonometry tables
//! - The optional hardware accelerator trait

#![no_std]
#![deny(unsafe_code)]

// libtest and proptest need the std macros
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod color;
pub mod geometry;
pub mod image;
pub mod traits;
pub mod trig;

// Re-export key types
pub use color::PixelFormat;
pub use geometry::{Point, Range, Rect, RotatedRect, Scalar, Size};
pub use image::{ImageError, ImageMut, ImageRef};
pub use traits::{AccelError, Accelerator, SoftwareOnly};
