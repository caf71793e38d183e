//! Frame compositor for the page-curl engine.
//!
//! One render pass per frame, loaded on top of whatever the host cleared to:
//! revealed page, opposite page, base shadow, sheet front, edge shadow, sheet
//! back.

mod common;
mod renderer;
mod texture;

pub use renderer::FlipRenderer;
pub use texture::{GpuTexture, GpuTextures};
