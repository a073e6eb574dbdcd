//! wgpu implementation of the painter backend.
//!
//! Draws are immediate: each [`Backend::draw`] uploads into per-frame bump
//! arenas and records one `LoadOp::Load` render pass on the frame encoder.
//! Pipelines are built lazily per fixed-function state and cached.

mod arena;
mod pipelines;

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{ensure, Result};

use crate::coords::Rect;

use super::{
    AlphaImage, Backend, BackendCapabilities, DrawCall, DrawState, DrawUniforms, StateChange,
};
use arena::Arena;
use pipelines::{PipelineCache, PipelineKey};

/// Construction parameters of a [`WgpuBackend`].
#[derive(Debug, Clone)]
pub struct WgpuBackendInit {
    /// Format of the color targets passed to [`WgpuBackend::begin_frame`].
    pub surface_format: wgpu::TextureFormat,
    /// Format of the optional depth attachment.
    pub depth_format: Option<wgpu::TextureFormat>,
    /// Initial vertex arena size in bytes.
    pub vertex_arena_bytes: u64,
    /// Initial index arena size in bytes.
    pub index_arena_bytes: u64,
    /// Initial uniform arena size in bytes.
    pub uniform_arena_bytes: u64,
}

impl Default for WgpuBackendInit {
    fn default() -> Self {
        Self {
            surface_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: None,
            vertex_arena_bytes: 1 << 20,
            index_arena_bytes: 1 << 16,
            uniform_arena_bytes: 1 << 16,
        }
    }
}

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Texture handle of the wgpu backend.
///
/// Clones share the GPU texture; it is released when the last one drops.
#[derive(Debug, Clone)]
pub struct GpuTexture {
    id: u64,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    /// Wraps a caller-owned texture view, e.g. a sprite.
    pub fn from_view(view: wgpu::TextureView, width: u32, height: u32) -> Self {
        Self { id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed), view, width, height }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Targets of the frame being recorded.
struct Frame {
    encoder: wgpu::CommandEncoder,
    color_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    state: DrawState,
    viewport: Rect,

    pipelines: PipelineCache,
    sampler: wgpu::Sampler,

    vertex_arena: Arena,
    index_arena: Arena,
    uniform_arena: Arena,
    uniform_bind_group: Option<(u64, wgpu::BindGroup)>,

    frame: Option<Frame>,

    warned_no_frame: bool,
    warned_depth_without_attachment: bool,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, init: WgpuBackendInit) -> Result<Self> {
        ensure!(
            !init.surface_format.is_depth_stencil_format(),
            "surface format {:?} is a depth format",
            init.surface_format
        );
        if let Some(depth) = init.depth_format {
            ensure!(depth.is_depth_stencil_format(), "depth format {depth:?} has no depth aspect");
        }

        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

        let pipelines = PipelineCache::new(device, init.surface_format, init.depth_format);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sextant painter sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::info!(
            "WgpuBackend: format={:?} depth={:?}",
            init.surface_format,
            init.depth_format
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            state: DrawState::default(),
            viewport: Rect::new(0.0, 0.0, 1.0, 1.0),
            pipelines,
            sampler,
            vertex_arena: Arena::new(
                device,
                "sextant vertex arena",
                wgpu::BufferUsages::VERTEX,
                init.vertex_arena_bytes,
                wgpu::COPY_BUFFER_ALIGNMENT,
            ),
            index_arena: Arena::new(
                device,
                "sextant index arena",
                wgpu::BufferUsages::INDEX,
                init.index_arena_bytes,
                wgpu::COPY_BUFFER_ALIGNMENT,
            ),
            uniform_arena: Arena::new(
                device,
                "sextant uniform arena",
                wgpu::BufferUsages::UNIFORM,
                init.uniform_arena_bytes,
                uniform_alignment,
            ),
            uniform_bind_group: None,
            frame: None,
            warned_no_frame: false,
            warned_depth_without_attachment: false,
        })
    }

    /// Starts recording draws into `color_view` (and `depth_view`).
    ///
    /// An unfinished previous frame is submitted first.
    pub fn begin_frame(&mut self, color_view: &wgpu::TextureView, depth_view: Option<&wgpu::TextureView>) {
        if self.frame.is_some() {
            log::warn!("WgpuBackend: begin_frame without finish_frame; submitting previous frame");
            self.finish_frame();
        }
        self.vertex_arena.reset();
        self.index_arena.reset();
        self.uniform_arena.reset();

        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sextant painter encoder"),
        });
        self.frame = Some(Frame {
            encoder,
            color_view: color_view.clone(),
            depth_view: depth_view.cloned(),
        });
    }

    /// Submits everything recorded since [`begin_frame`](Self::begin_frame).
    pub fn finish_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.queue.submit(Some(frame.encoder.finish()));
        }
    }

    /// Number of pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    fn uniform_bind_group(&mut self) -> wgpu::BindGroup {
        let generation = self.uniform_arena.generation();
        if let Some((g, bg)) = &self.uniform_bind_group {
            if *g == generation {
                return bg.clone();
            }
        }
        let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sextant painter uniform bind group"),
            layout: self.pipelines.uniform_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: self.uniform_arena.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        self.uniform_bind_group = Some((generation, bg.clone()));
        bg
    }

    fn texture_bind_group(&self, texture: &GpuTexture) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sextant painter texture bind group"),
            layout: self.pipelines.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

impl Backend for WgpuBackend {
    type Texture = GpuTexture;

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { wide_lines: false, line_smooth: false }
    }

    fn apply(&mut self, change: StateChange) {
        if let StateChange::DepthTest(true) = change {
            let has_depth = self.frame.as_ref().is_some_and(|f| f.depth_view.is_some());
            if !has_depth && !self.warned_depth_without_attachment {
                log::warn!("WgpuBackend: depth test requested without depth attachment");
                self.warned_depth_without_attachment = true;
            }
        }
        self.state.apply(change);
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn upload_alpha(&mut self, image: &AlphaImage) -> Result<GpuTexture> {
        let max = self.device.limits().max_texture_dimension_2d;
        ensure!(image.width > 0 && image.height > 0, "empty {}x{} image", image.width, image.height);
        ensure!(
            image.width <= max && image.height <= max,
            "{}x{} image exceeds the {max} texel limit",
            image.width,
            image.height
        );
        ensure!(
            image.pixels.len() == image.width as usize * image.height as usize,
            "image data does not match its {}x{} size",
            image.width,
            image.height
        );

        let size = wgpu::Extent3d { width: image.width, height: image.height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sextant text texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture::from_view(view, image.width, image.height))
    }

    fn draw(&mut self, call: &DrawCall<'_, GpuTexture>) {
        let Some(has_depth) = self.frame.as_ref().map(|f| f.depth_view.is_some()) else {
            if !self.warned_no_frame {
                log::warn!("WgpuBackend: draw outside begin_frame/finish_frame; dropped");
                self.warned_no_frame = true;
            }
            return;
        };
        if call.vertex_count == 0 || call.vertices.is_empty() {
            return;
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(call.vertices);
        let vertex_offset = self.vertex_arena.push(&self.device, &self.queue, vertex_bytes);
        let index_range = call.indices.map(|idx| {
            let bytes: &[u8] = bytemuck::cast_slice(idx);
            let offset = self.index_arena.push(&self.device, &self.queue, bytes);
            (offset, bytes.len() as u64, idx.len() as u32)
        });
        let uniform_offset =
            self.uniform_arena.push(&self.device, &self.queue, bytemuck::bytes_of(&call.uniforms));

        let uniform_bg = self.uniform_bind_group();
        let texture_bg = match (call.pipeline.is_textured(), call.texture) {
            (true, Some(t)) => Some(self.texture_bind_group(t)),
            (true, None) => {
                log::warn!("WgpuBackend: textured draw without texture; dropped");
                return;
            }
            (false, _) => None,
        };

        let key = PipelineKey::new(call.pipeline, call.primitive, &self.state, has_depth);
        let pipeline = self.pipelines.get(&self.device, key).clone();
        let vertex_buffer = self.vertex_arena.buffer().clone();
        let index_buffer = self.index_arena.buffer().clone();
        let vp = self.viewport;

        let Some(frame) = self.frame.as_mut() else { return; };
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sextant painter pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: frame.depth_view.as_ref().map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(vp.origin.x, vp.origin.y, vp.size.x.max(1.0), vp.size.y.max(1.0), 0.0, 1.0);
        rpass.set_pipeline(&pipeline);
        rpass.set_bind_group(0, &uniform_bg, &[uniform_offset as u32]);
        if let Some(bg) = &texture_bg {
            rpass.set_bind_group(1, bg, &[]);
        }
        rpass.set_vertex_buffer(0, vertex_buffer.slice(vertex_offset..vertex_offset + vertex_bytes.len() as u64));

        match index_range {
            Some((offset, len, count)) => {
                rpass.set_index_buffer(index_buffer.slice(offset..offset + len), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..count, 0, 0..1);
            }
            None => rpass.draw(0..call.vertex_count, 0..1),
        }
    }
}
