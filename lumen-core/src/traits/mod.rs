//! Hardware abstraction traits
//!
//! These traits define the seams where board-specific code plugs into
//! the renderer.

pub mod accel;

pub use accel::*;
