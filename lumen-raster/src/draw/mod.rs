//! Scan-conversion algorithms over an [`ImageMut`](lumen_core::ImageMut)
//!
//! These functions draw and clip but keep no state; [`Canvas`](crate::Canvas)
//! wraps them with dirty tracking and the accelerator.

pub mod blit;
pub mod circle;
pub mod ellipse;
pub mod line;
pub mod marker;
pub mod poly;

pub use blit::{draw_bitmap, draw_bitmap_alpha, fill_rect};
pub use circle::{circle, circle_simple};
pub use ellipse::{ellipse, ellipse_box, ellipse_points, ellipse_q16};
pub use line::{clip_line, line, line2, thick_line, LineIterator, LineType, FILLED, XY_ONE, XY_SHIFT};
pub use marker::{draw_marker, MarkerType};
pub use poly::{collect_poly_edges, fill_convex, fill_edge_collection, fill_poly, polyline, PolyEdge, MAX_POLY_EDGES};
