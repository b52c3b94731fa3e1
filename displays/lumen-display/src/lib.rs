//! Lumen Display
//!
//! Everything between a rendered [`Canvas`](lumen_raster::Canvas) and the
//! glass:
//! - [`DisplayTransport`]: the board-specific panel writer
//! - [`Presenter`]: pushes only the dirty regions, then resets the tracker
//! - [`PanelConfig`]: frame buffer layout from TOML or postcard
//! - [`CanvasTarget`]: `embedded-graphics` draw target with dirty tracking

#![no_std]
#![deny(unsafe_code)]

// libtest and proptest need the std macros
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod backend;
pub mod config;
pub mod present;
pub mod target;

pub use backend::{DisplayTransport, TransportError};
pub use config::{ConfigError, PanelConfig};
pub use present::Presenter;
pub use target::CanvasTarget;
