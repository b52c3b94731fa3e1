//! Lumen Raster
//!
//! Software rasterizer for memory-mapped framebuffers:
//! - Aliased lines (4/8-connected), thick lines with round caps
//! - Circles, ellipses, arcs and pie slices
//! - Convex and general (even-odd) polygon fill, polylines, markers
//! - Bitmap copy and ARGB1555 compositing with an optional accelerator
//! - Text through `lumen-font`
//! - Dirty-region tracking for partial display refresh

#![no_std]
#![deny(unsafe_code)]

// libtest and proptest need the std macros
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod canvas;
pub mod dirty;
pub mod draw;

pub use canvas::Canvas;
pub use dirty::{DirtyTracker, MAX_DIRTY_RECTS};
pub use draw::{LineIterator, LineType, MarkerType, FILLED};
