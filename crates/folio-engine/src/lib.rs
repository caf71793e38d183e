//! folio engine.
//!
//! An interactive page-curl engine: [`flip`] turns a finger trajectory into
//! fold geometry, shading and page swaps; [`render::flip`] composites the
//! result with wgpu. The remaining modules are the host plumbing (window,
//! GPU device, input, timing, logging) a demo app needs.

pub mod coords;
pub mod core;
pub mod device;
pub mod flip;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
