//! GPU device and surface management for the host window.
//!
//! Owns the wgpu instance, adapter, device and queue, keeps the swapchain
//! configured across resizes, and hands out one encoder per frame.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
