use std::ops::Range;

use crate::coords::Rect;
use crate::flip::{CurlVertex, PageBitmap, PageFlip, ShadowVertex, TextureUploader};
use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    DrawParams, QUAD_INDICES, ViewportUniform, curl_vertex_layout, page_quad, premul_alpha_blend,
    shadow_vertex_layout, uniform_min_binding_size,
};
use super::texture::{GpuTexture, GpuTextures, page_sampler, texture_bind_group_layout};

/// Upper bound on page draws per frame (revealed, other, sheet, back).
const MAX_DRAWS: usize = 8;

enum Step<'t> {
    Page { texture: &'t GpuTexture, params: usize, indices: Range<u32> },
    Shadow { vertices: Range<u32> },
}

/// Draws flip frames and idle page frames for a [`PageFlip<GpuTexture>`].
///
/// Reads the engine, never mutates it. GPU buffers grow lazily and are reused
/// across frames.
pub struct FlipRenderer {
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    pipeline_format: Option<wgpu::TextureFormat>,
    page_pipeline: Option<wgpu::RenderPipeline>,
    shadow_pipeline: Option<wgpu::RenderPipeline>,

    frame_layout: Option<wgpu::BindGroupLayout>,
    frame_bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,
    params_ubo: Option<wgpu::Buffer>,
    params_stride: u64,

    /// Bound as the light texture when the engine has none.
    white_light: Option<GpuTexture>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,
    shadow_vbo: Option<wgpu::Buffer>,
    shadow_capacity: usize,

    vertices: Vec<CurlVertex>,
    indices: Vec<u32>,
    shadow_vertices: Vec<ShadowVertex>,
    params: Vec<DrawParams>,

    warned_no_surface: bool,
}

impl FlipRenderer {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            texture_layout: texture_bind_group_layout(device),
            sampler: page_sampler(device),
            pipeline_format: None,
            page_pipeline: None,
            shadow_pipeline: None,
            frame_layout: None,
            frame_bind_group: None,
            viewport_ubo: None,
            params_ubo: None,
            params_stride: 256,
            white_light: None,
            vbo: None,
            vbo_capacity: 0,
            ibo: None,
            ibo_capacity: 0,
            shadow_vbo: None,
            shadow_capacity: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
            shadow_vertices: Vec::new(),
            params: Vec::new(),
            warned_no_surface: false,
        }
    }

    /// Texture uploader whose handles this renderer can sample.
    pub fn uploader<'a>(&'a self, ctx: &RenderCtx<'a>) -> GpuTextures<'a> {
        GpuTextures {
            device: ctx.device,
            queue: ctx.queue,
            layout: &self.texture_layout,
            sampler: &self.sampler,
        }
    }

    /// Draws the turning sheet over the revealed page.
    ///
    /// Falls back to [`FlipRenderer::draw_page_frame`] while no fold exists
    /// yet (a fresh touch that has not picked a direction).
    pub fn draw_flip_frame(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, flip: &PageFlip<GpuTexture>) {
        if !self.check_surface(flip) {
            return;
        }
        let Some(frame) = flip.flip_frame() else {
            self.draw_page_frame(ctx, target, flip);
            return;
        };

        self.begin_batch();
        let use_light = frame.gradient_light.is_some();
        let mut steps = Vec::with_capacity(6);

        if let Some(texture) = frame.revealed {
            let indices = self.push_quad(frame.page.bounds);
            steps.push(Step::Page { texture, params: self.push_params(DrawParams::FLAT), indices });
        }
        if let Some((page, Some(texture))) = frame.other {
            let indices = self.push_quad(page.bounds);
            steps.push(Step::Page { texture, params: self.push_params(DrawParams::FLAT), indices });
        }

        if let Some(vertices) = self.push_shadow(frame.strips.base()) {
            steps.push(Step::Shadow { vertices });
        }

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(frame.mesh.vertices());
        if let Some(texture) = frame.sheet {
            let start = self.indices.len() as u32;
            self.push_indices(base, frame.mesh.flat());
            self.push_indices(base, frame.mesh.curled_front());
            let indices = start..self.indices.len() as u32;
            if !indices.is_empty() {
                steps.push(Step::Page { texture, params: self.push_params(DrawParams::lit(use_light)), indices });
            }
        }

        if let Some(vertices) = self.push_shadow(frame.strips.edge()) {
            steps.push(Step::Shadow { vertices });
        }

        let back = match (frame.back, frame.sheet) {
            (Some(back), _) => Some((back, DrawParams::back([0.0; 4], true, use_light))),
            (None, Some(sheet)) => Some((sheet, DrawParams::back(frame.back_tint.to_array(), false, use_light))),
            (None, None) => None,
        };
        if let Some((texture, params)) = back {
            let start = self.indices.len() as u32;
            self.push_indices(base, frame.mesh.back());
            let indices = start..self.indices.len() as u32;
            if !indices.is_empty() {
                steps.push(Step::Page { texture, params: self.push_params(params), indices });
            }
        }

        self.submit(ctx, target, &steps, frame.gradient_light);
    }

    /// Draws every page flat with its front texture. Unset pages are skipped.
    pub fn draw_page_frame(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, flip: &PageFlip<GpuTexture>) {
        if !self.check_surface(flip) {
            return;
        }

        self.begin_batch();
        let mut steps = Vec::with_capacity(2);
        for (page, texture) in flip.page_frame() {
            let Some(texture) = texture else { continue };
            let indices = self.push_quad(page.bounds);
            steps.push(Step::Page { texture, params: self.push_params(DrawParams::FLAT), indices });
        }
        self.submit(ctx, target, &steps, None);
    }

    fn check_surface(&mut self, flip: &PageFlip<GpuTexture>) -> bool {
        if flip.surface().is_some() {
            return true;
        }
        if !self.warned_no_surface {
            log::debug!("FlipRenderer: no surface laid out yet; skipping draw");
            self.warned_no_surface = true;
        }
        false
    }

    // ── batch building ────────────────────────────────────────────────────

    fn begin_batch(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.shadow_vertices.clear();
        self.params.clear();
    }

    fn push_params(&mut self, params: DrawParams) -> usize {
        if self.params.len() >= MAX_DRAWS {
            log::warn!("FlipRenderer: more than {MAX_DRAWS} draws in one frame; reusing the last slot");
            return MAX_DRAWS - 1;
        }
        self.params.push(params);
        self.params.len() - 1
    }

    fn push_indices(&mut self, base: u32, indices: &[u32]) {
        self.indices.extend(indices.iter().map(|i| base + i));
    }

    fn push_quad(&mut self, rect: Rect) -> Range<u32> {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&page_quad(rect));
        let start = self.indices.len() as u32;
        self.push_indices(base, &QUAD_INDICES);
        start..self.indices.len() as u32
    }

    fn push_shadow(&mut self, strip: &[ShadowVertex]) -> Option<Range<u32>> {
        if strip.is_empty() {
            return None;
        }
        let start = self.shadow_vertices.len() as u32;
        self.shadow_vertices.extend_from_slice(strip);
        Some(start..self.shadow_vertices.len() as u32)
    }

    // ── submission ────────────────────────────────────────────────────────

    fn submit(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        steps: &[Step<'_>],
        light: Option<&GpuTexture>,
    ) {
        if steps.is_empty() {
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_bindings(ctx);
        self.ensure_white_light(ctx);
        self.write_uniforms(ctx);
        self.upload_geometry(ctx);

        let Some(page_pipeline) = self.page_pipeline.as_ref() else { return };
        let Some(shadow_pipeline) = self.shadow_pipeline.as_ref() else { return };
        let Some(frame_bg) = self.frame_bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };
        let Some(shadow_vbo) = self.shadow_vbo.as_ref() else { return };
        let Some(light) = light.or(self.white_light.as_ref()) else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("folio flip pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        for step in steps {
            match step {
                Step::Page { texture, params, indices } => {
                    let offset = (*params as u64 * self.params_stride) as u32;
                    rpass.set_pipeline(page_pipeline);
                    rpass.set_bind_group(0, frame_bg, &[offset]);
                    rpass.set_bind_group(1, texture.bind_group(), &[]);
                    rpass.set_bind_group(2, light.bind_group(), &[]);
                    rpass.set_vertex_buffer(0, vbo.slice(..));
                    rpass.draw_indexed(indices.clone(), 0, 0..1);
                }
                Step::Shadow { vertices } => {
                    rpass.set_pipeline(shadow_pipeline);
                    rpass.set_bind_group(0, frame_bg, &[0]);
                    rpass.set_vertex_buffer(0, shadow_vbo.slice(..));
                    rpass.draw(vertices.clone(), 0..1);
                }
            }
        }
    }

    fn write_uniforms(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(ubo) = self.viewport_ubo.as_ref() {
            let u = ViewportUniform {
                viewport: [ctx.viewport.width.max(1.0), ctx.viewport.height.max(1.0)],
                _pad: [0.0; 2],
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        if let Some(ubo) = self.params_ubo.as_ref() {
            for (i, p) in self.params.iter().enumerate() {
                ctx.queue.write_buffer(ubo, i as u64 * self.params_stride, bytemuck::bytes_of(p));
            }
        }
    }

    fn upload_geometry(&mut self, ctx: &RenderCtx<'_>) {
        ensure_capacity::<CurlVertex>(
            ctx,
            &mut self.vbo,
            &mut self.vbo_capacity,
            self.vertices.len(),
            wgpu::BufferUsages::VERTEX,
            "folio flip vbo",
        );
        ensure_capacity::<u32>(
            ctx,
            &mut self.ibo,
            &mut self.ibo_capacity,
            self.indices.len(),
            wgpu::BufferUsages::INDEX,
            "folio flip ibo",
        );
        ensure_capacity::<ShadowVertex>(
            ctx,
            &mut self.shadow_vbo,
            &mut self.shadow_capacity,
            self.shadow_vertices.len(),
            wgpu::BufferUsages::VERTEX,
            "folio shadow vbo",
        );

        if let Some(vbo) = self.vbo.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertices));
        }
        if let Some(ibo) = self.ibo.as_ref() {
            ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&self.indices));
        }
        if let Some(vbo) = self.shadow_vbo.as_ref()
            && !self.shadow_vertices.is_empty()
        {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.shadow_vertices));
        }
    }

    // ── lazy GPU resources ────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.page_pipeline.is_some() {
            return;
        }

        let frame_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("folio flip frame bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_min_binding_size::<ViewportUniform>(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: uniform_min_binding_size::<DrawParams>(),
                    },
                    count: None,
                },
            ],
        });

        let page_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("folio page pipeline layout"),
            bind_group_layouts: &[&frame_layout, &self.texture_layout, &self.texture_layout],
            immediate_size: 0,
        });
        let shadow_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("folio shadow pipeline layout"),
            bind_group_layouts: &[&frame_layout],
            immediate_size: 0,
        });

        let page_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("folio page shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/page.wgsl").into()),
        });
        let shadow_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("folio shadow shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });

        self.page_pipeline = Some(create_pipeline(
            ctx,
            "folio page pipeline",
            &page_layout,
            &page_shader,
            curl_vertex_layout(),
        ));
        self.shadow_pipeline = Some(create_pipeline(
            ctx,
            "folio shadow pipeline",
            &shadow_layout,
            &shadow_shader,
            shadow_vertex_layout(),
        ));
        log::debug!("FlipRenderer: pipelines built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.frame_layout = Some(frame_layout);
        self.frame_bind_group = None;
        self.viewport_ubo = None;
        self.params_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.frame_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.frame_layout.as_ref() else { return };

        let align = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment).max(1);
        let size = std::mem::size_of::<DrawParams>() as u64;
        self.params_stride = size.div_ceil(align) * align;

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("folio flip viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("folio flip params ubo"),
            size: self.params_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("folio flip frame bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: viewport_ubo.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &params_ubo,
                        offset: 0,
                        size: wgpu::BufferSize::new(size),
                    }),
                },
            ],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.params_ubo = Some(params_ubo);
        self.frame_bind_group = Some(bind_group);
    }

    fn ensure_white_light(&mut self, ctx: &RenderCtx<'_>) {
        if self.white_light.is_some() {
            return;
        }
        let light = {
            let mut uploader = self.uploader(ctx);
            PageBitmap::solid(1, 1, [255; 4]).and_then(|bitmap| uploader.upload(&bitmap))
        };
        match light {
            Ok(texture) => self.white_light = Some(texture),
            Err(err) => log::error!("FlipRenderer: fallback light texture failed: {err}"),
        }
    }
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The back flap is mirrored, so both windings are visible.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Grows `buffer` to hold at least `required` elements of `T`.
fn ensure_capacity<T>(
    ctx: &RenderCtx<'_>,
    buffer: &mut Option<wgpu::Buffer>,
    capacity: &mut usize,
    required: usize,
    usage: wgpu::BufferUsages,
    label: &'static str,
) {
    if required <= *capacity && buffer.is_some() {
        return;
    }
    let new_cap = required.next_power_of_two().max(64);
    *buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (new_cap * std::mem::size_of::<T>()) as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }));
    *capacity = new_cap;
    log::debug!("{label}: grown to {new_cap} elements");
}
