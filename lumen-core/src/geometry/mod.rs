//! Geometry value types
//!
//! Pure value algebra over integer and float coordinates. Nothing in here
//! can fail; every operator is total over its domain.

pub mod point;
pub mod range;
pub mod rect;
pub mod rotated;
pub mod scalar;
pub mod size;

pub use point::{round_f32, Point};
pub use range::Range;
pub use rect::Rect;
pub use rotated::RotatedRect;
pub use scalar::Scalar;
pub use size::Size;
