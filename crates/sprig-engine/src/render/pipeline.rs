use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::config::RendererConfig;
use crate::error::{Result, SpriteError};
use crate::sprite::math::{CORNERS, QUAD_INDICES};
use crate::sprite::{FrameSink, SpriteRecord, SpriteUniforms, RECORD_SIZE};

use super::atlas::AtlasTexture;
use super::{RenderCtx, RenderTarget};

// ── blend ─────────────────────────────────────────────────────────────────

// The fragment stage emits premultiplied colour.
fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── corner vertex ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CornerVertex {
    multiplier: [f32; 2], // 0..1
}

impl CornerVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CornerVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

fn corner_vertices() -> [CornerVertex; 4] {
    CORNERS.map(|m| CornerVertex { multiplier: [m.x, m.y] })
}

// ── validation ────────────────────────────────────────────────────────────

fn check_scope(stage: &str, captured: Option<wgpu::Error>) -> Result<()> {
    match captured {
        Some(err) => {
            log::error!("{stage} rejected by the device: {err}");
            Err(SpriteError::ResourceInit(format!("{stage}: {err}")))
        }
        None => Ok(()),
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// GPU objects behind one sprite renderer.
///
/// Created once at setup and released together on drop. The instance buffer
/// is sized for `capacity` records and never reallocated.
pub struct SpritePipeline {
    pipeline: wgpu::RenderPipeline,

    uniform_ubo: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    atlas_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: wgpu::Buffer,
}

impl SpritePipeline {
    pub fn new(ctx: &RenderCtx<'_>, config: &RendererConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(SpriteError::ResourceInit("sprite capacity must be non-zero".into()));
        }
        let instance_bytes = (config.capacity as u64)
            .checked_mul(RECORD_SIZE as u64)
            .filter(|b| *b <= ctx.max_buffer_size())
            .ok_or_else(|| {
                SpriteError::ResourceInit(format!(
                    "capacity {} exceeds the device buffer limit of {} bytes",
                    config.capacity,
                    ctx.max_buffer_size()
                ))
            })?;

        let device = ctx.device;

        // Shader compile and pipeline link failures land in this scope.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprig sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprig uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SpriteUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let atlas_layout = AtlasTexture::bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprig sprite pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &atlas_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprig sprite pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CornerVertex::layout(), SpriteRecord::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
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
                // Rotation and negative sizes flip winding.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        check_scope("sprite shader/pipeline", pollster::block_on(scope.pop()))?;

        let uniform_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprig uniform ubo"),
            contents: bytemuck::bytes_of(&SpriteUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprig uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_ubo.as_entire_binding(),
            }],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprig quad vbo"),
            contents: bytemuck::cast_slice(&corner_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprig quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_vbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprig instance vbo"),
            size: instance_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "sprite pipeline ready: capacity {}, instance buffer {} bytes, format {:?}",
            config.capacity,
            instance_bytes,
            ctx.surface_format
        );

        Ok(Self {
            pipeline,
            uniform_ubo,
            uniform_bind_group,
            atlas_layout,
            sampler: AtlasTexture::sampler(device),
            quad_vbo,
            quad_ibo,
            instance_vbo,
        })
    }

    #[inline]
    pub(super) fn atlas_layout(&self) -> &wgpu::BindGroupLayout {
        &self.atlas_layout
    }

    #[inline]
    pub(super) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &SpriteUniforms) {
        queue.write_buffer(&self.uniform_ubo, 0, bytemuck::bytes_of(uniforms));
    }

    /// Frame sink recording into `target` with `atlas` bound.
    pub fn sink<'a>(
        &'a self,
        queue: &'a wgpu::Queue,
        target: &'a mut RenderTarget<'_>,
        atlas: &'a AtlasTexture,
    ) -> WgpuFrameSink<'a> {
        WgpuFrameSink {
            pipeline: self,
            queue,
            encoder: &mut *target.encoder,
            color_view: target.color_view,
            atlas,
        }
    }
}

// ── frame sink ────────────────────────────────────────────────────────────

/// [`FrameSink`] that records the clear + instanced draw into a wgpu encoder.
///
/// The upload goes through `Queue::write_buffer`, which lands before the
/// encoder's commands execute; one flush per submitted encoder.
pub struct WgpuFrameSink<'a> {
    pipeline: &'a SpritePipeline,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    color_view: &'a wgpu::TextureView,
    atlas: &'a AtlasTexture,
}

impl FrameSink for WgpuFrameSink<'_> {
    fn upload(&mut self, bytes: &[u8]) {
        self.queue.write_buffer(&self.pipeline.instance_vbo, 0, bytes);
    }

    fn draw(&mut self, clear: wgpu::Color, instances: u32) {
        let p = self.pipeline;

        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprig sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if instances == 0 {
            return;
        }

        rpass.set_pipeline(&p.pipeline);
        rpass.set_bind_group(0, &p.uniform_bind_group, &[]);
        rpass.set_bind_group(1, self.atlas.bind_group(), &[]);
        rpass.set_vertex_buffer(0, p.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, p.instance_vbo.slice(..));
        rpass.set_index_buffer(p.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_vertices_follow_shared_multipliers() {
        let v = corner_vertices();
        let m: Vec<[f32; 2]> = v.iter().map(|c| c.multiplier).collect();
        assert_eq!(m, [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(CornerVertex::layout().step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn captured_validation_error_becomes_resource_init() {
        let err = wgpu::Error::Validation {
            source: Box::new(std::fmt::Error),
            description: "entry point vs_main not found".into(),
        };
        match check_scope("sprite shader/pipeline", Some(err)) {
            Err(SpriteError::ResourceInit(msg)) => {
                assert!(msg.starts_with("sprite shader/pipeline"));
                assert!(msg.contains("entry point vs_main not found"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(check_scope("sprite shader/pipeline", None).is_ok());
    }

    #[test]
    fn instance_stream_starts_after_corner_location() {
        let locations: Vec<u32> = SpriteRecord::layout()
            .attributes
            .iter()
            .map(|a| a.shader_location)
            .collect();
        assert_eq!(locations, [1, 2, 3, 4, 5]);
        assert_eq!(CornerVertex::ATTRS[0].shader_location, 0);
    }
}
