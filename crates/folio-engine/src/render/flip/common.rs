//! GPU types shared by the page and shadow pipelines.

use bytemuck::{Pod, Zeroable};

use crate::flip::{CurlVertex, ShadowVertex};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

/// Per-draw parameters, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawParams {
    /// Premultiplied color laid over the texel.
    pub tint: [f32; 4],
    /// x: flip u, y: sample the light texture, z: apply lighting.
    pub flags: [f32; 4],
}

impl DrawParams {
    pub(super) const FLAT: DrawParams = DrawParams { tint: [0.0; 4], flags: [0.0; 4] };

    pub(super) fn lit(use_light: bool) -> Self {
        Self { tint: [0.0; 4], flags: [0.0, flag(use_light), 1.0, 0.0] }
    }

    pub(super) fn back(tint: [f32; 4], flip_u: bool, use_light: bool) -> Self {
        Self { tint, flags: [flag(flip_u), flag(use_light), 1.0, 0.0] }
    }
}

#[inline]
fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

pub(super) fn uniform_min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── vertex layouts ────────────────────────────────────────────────────────

const CURL_ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3, // pos (z = lift)
    1 => Float32x2, // uv
    2 => Float32,   // shade
    3 => Float32    // turn
];

pub(super) fn curl_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<CurlVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CURL_ATTRS,
    }
}

const SHADOW_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x4  // premultiplied color
];

pub(super) fn shadow_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ShadowVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SHADOW_ATTRS,
    }
}

/// Unlit quad over `rect`, as two triangles.
pub(super) fn page_quad(rect: crate::coords::Rect) -> [CurlVertex; 4] {
    let v = |x: f32, y: f32, u: f32, w: f32| CurlVertex { pos: [x, y, 0.0], uv: [u, w], shade: 1.0, turn: 0.0 };
    [
        v(rect.left(), rect.top(), 0.0, 0.0),
        v(rect.right(), rect.top(), 1.0, 0.0),
        v(rect.right(), rect.bottom(), 1.0, 1.0),
        v(rect.left(), rect.bottom(), 0.0, 1.0),
    ]
}

pub(super) const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;

    #[test]
    fn uniforms_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<ViewportUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawParams>() % 16, 0);
    }

    #[test]
    fn page_quad_spans_rect_with_full_uvs() {
        let q = page_quad(Rect::new(400.0, 0.0, 400.0, 600.0));
        assert_eq!(q[0].pos, [400.0, 0.0, 0.0]);
        assert_eq!(q[2].pos, [800.0, 600.0, 0.0]);
        assert_eq!(q[2].uv, [1.0, 1.0]);
    }
}
