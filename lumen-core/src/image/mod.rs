//! Image views over caller-owned pixel memory

pub mod span;
pub mod view;

pub use span::{fill_bytes, fill_span};
pub use view::{ImageError, ImageMut, ImageRef};
