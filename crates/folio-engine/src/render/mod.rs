//! GPU rendering.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.
//! - Colors are premultiplied; pipelines blend with `One, OneMinusSrcAlpha`.

mod ctx;
pub mod flip;

pub use ctx::{RenderCtx, RenderTarget};
