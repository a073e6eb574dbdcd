use std::collections::HashMap;

use crate::paint::{BlendFactor, BlendFunc};
use crate::render::{DrawState, DrawUniforms, PipelineKind, PrimitiveKind};

/// Everything a render pipeline bakes in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub kind: PipelineKind,
    pub primitive: PrimitiveKind,
    pub blend: Option<BlendFunc>,
    /// Present only when the frame has a depth attachment.
    pub depth: Option<DepthKey>,
    /// `Some(true)` culls front faces, `Some(false)` back faces.
    pub cull_front: Option<bool>,
    pub front_face_cw: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct DepthKey {
    pub test: bool,
    pub write: bool,
}

impl PipelineKey {
    pub(super) fn new(kind: PipelineKind, primitive: PrimitiveKind, state: &DrawState, has_depth: bool) -> Self {
        Self {
            kind,
            primitive,
            blend: state.blend.then_some(state.blend_func),
            depth: has_depth.then_some(DepthKey {
                test: state.depth_test,
                // Depth writes follow the depth test, as in fixed-function GL.
                write: state.depth_test && state.depth_mask,
            }),
            cull_front: state.cull_face.then_some(state.cull_front),
            front_face_cw: state.front_face_cw,
        }
    }
}

const PLAIN_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
const COLOR_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x4, 2 => Float32x4];
const TEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x2];
const TEX_COLOR_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x2, 2 => Float32x4];

fn vertex_layout(kind: PipelineKind) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match kind {
        PipelineKind::Plain => &PLAIN_ATTRS,
        PipelineKind::VertexColor => &COLOR_ATTRS,
        PipelineKind::Textured | PipelineKind::Text => &TEX_ATTRS,
        PipelineKind::TexturedColor => &TEX_COLOR_ATTRS,
    };
    wgpu::VertexBufferLayout {
        array_stride: (kind.stride() * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn entry_points(kind: PipelineKind) -> (&'static str, &'static str) {
    match kind {
        PipelineKind::Plain => ("vs_plain", "fs_plain"),
        PipelineKind::VertexColor => ("vs_color", "fs_color"),
        PipelineKind::Textured => ("vs_textured", "fs_textured"),
        PipelineKind::Text => ("vs_textured", "fs_text"),
        PipelineKind::TexturedColor => ("vs_textured_color", "fs_textured_color"),
    }
}

fn topology(primitive: PrimitiveKind) -> wgpu::PrimitiveTopology {
    match primitive {
        PrimitiveKind::PointList => wgpu::PrimitiveTopology::PointList,
        PrimitiveKind::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveKind::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveKind::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveKind::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

/// The same factors for color and alpha, like `glBlendFunc`.
fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: factor(func.src),
        dst_factor: factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

/// Shader module, layouts and every pipeline built so far.
pub(super) struct PipelineCache {
    format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    shader: wgpu::ShaderModule,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    untextured_layout: wgpu::PipelineLayout,
    textured_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sextant painter shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/painter.wgsl").into()),
        });
        log_compilation_messages(&shader);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sextant painter uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sextant painter texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let untextured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sextant painter pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            immediate_size: 0,
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sextant painter textured pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        Self {
            format,
            depth_format,
            shader,
            uniform_layout,
            texture_layout,
            untextured_layout,
            textured_layout,
            pipelines: HashMap::new(),
        }
    }

    pub(super) fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    pub(super) fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub(super) fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns the pipeline for `key`, building it on first use.
    pub(super) fn get(&mut self, device: &wgpu::Device, key: PipelineKey) -> &wgpu::RenderPipeline {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.build(device, key);
            log::debug!("PipelineCache: built {:?} ({} cached)", key, self.pipelines.len() + 1);
            self.pipelines.insert(key, pipeline);
        }
        &self.pipelines[&key]
    }

    fn build(&self, device: &wgpu::Device, key: PipelineKey) -> wgpu::RenderPipeline {
        let (vs, fs) = entry_points(key.kind);
        let layout = if key.kind.is_textured() { &self.textured_layout } else { &self.untextured_layout };
        let strip = matches!(key.primitive, PrimitiveKind::LineStrip | PrimitiveKind::TriangleStrip);

        let depth_stencil = match (key.depth, self.depth_format) {
            (Some(d), Some(format)) => Some(wgpu::DepthStencilState {
                format,
                depth_write_enabled: d.write,
                depth_compare: if d.test { wgpu::CompareFunction::Less } else { wgpu::CompareFunction::Always },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            _ => None,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sextant painter pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: &[vertex_layout(key.kind)],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: key.blend.map(blend_state),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology(key.primitive),
                strip_index_format: strip.then_some(wgpu::IndexFormat::Uint16),
                front_face: if key.front_face_cw { wgpu::FrontFace::Cw } else { wgpu::FrontFace::Ccw },
                cull_mode: key.cull_front.map(|front| if front { wgpu::Face::Front } else { wgpu::Face::Back }),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Logs shader compiler output; nothing here aborts.
fn log_compilation_messages(shader: &wgpu::ShaderModule) {
    let info = pollster::block_on(shader.get_compilation_info());
    for msg in &info.messages {
        log::warn!("painter shader {:?}: {}", msg.message_type, msg.message);
    }
}
