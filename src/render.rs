//! Drawing a frame.
//!
//! A frame is drawn in two steps. [`DrawPlan::build`] turns the active camera,
//! the sky block, the terrain and the instance groups into draw calls plus one
//! instance array of MVP matrices; it touches no GPU state. A [`Renderer`]
//! then executes the plan. [`WgpuRenderer`] does so with one instanced draw
//! per call out of the shared geometry buffer.
//!
//! # Draw order
//!
//! 1. sky block, one instance with identity world transform
//! 2. terrain, likewise
//! 3. one call per non-empty instance group, in model order

use std::{iter, ops::Range};

use crate::{
    batch::InstanceBatches,
    camera::CameraView,
    config::EngineConfig,
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        model::{Model, TextureId, TextureSource, draw_index},
    },
    error::GpuError,
    geometry::{GeometryBuffer, VertexStore, WgpuStore},
    pipelines::shader::Shader,
    resources::texture::{TextureLoader, TextureSet},
    scene::Actor,
};

/// Everything a renderer needs to draw one frame.
pub struct Frame<'a> {
    pub camera: CameraView,
    pub sky_block: &'a Model,
    pub terrain: &'a Model,
    pub models: &'a [Model],
    pub actors: &'a [Box<dyn Actor>],
    pub batches: &'a InstanceBatches,
}

/// Draws frames out of a geometry buffer held in `S`.
pub trait Renderer<S: VertexStore>: TextureLoader {
    fn draw(&mut self, geometry: &GeometryBuffer<S>, frame: &Frame<'_>) -> Result<(), GpuError>;

    /// Called after a recoverable draw error skipped a frame.
    fn recover(&mut self, _error: &GpuError) {}
}

/// One instanced draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub model: String,
    pub texture: Option<TextureId>,
    pub vertices: Range<u32>,
    /// Range into [`DrawPlan::instances`].
    pub instances: Range<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPlan {
    pub calls: Vec<DrawCall>,
    pub instances: Vec<InstanceRaw>,
}

impl DrawPlan {
    pub fn build(frame: &Frame<'_>, aspect: f32, znear: f32, zfar: f32) -> Result<Self, GpuError> {
        let view_proj = frame.camera.view_projection(aspect, znear, zfar);
        let mut plan = DrawPlan::default();

        for model in [frame.sky_block, frame.terrain] {
            plan.push(model, iter::once(view_proj))?;
        }
        for (id, actors) in frame.batches.groups() {
            let model = frame
                .models
                .get(id.0)
                .ok_or_else(|| GpuError::ModelNotLoaded(format!("#{}", id.0)))?;
            let mvps = actors
                .iter()
                .map(|&actor| view_proj * frame.actors[actor].transform().to_matrix());
            plan.push(model, mvps)?;
        }
        Ok(plan)
    }

    fn push(
        &mut self,
        model: &Model,
        mvps: impl Iterator<Item = cgmath::Matrix4<f32>>,
    ) -> Result<(), GpuError> {
        let first = draw_index(self.instances.len() as u64, "instances")?;
        self.instances.extend(mvps.map(InstanceRaw::from));
        let end = draw_index(self.instances.len() as u64, "instances")?;
        self.calls.push(DrawCall {
            model: model.name.clone(),
            texture: model.texture,
            vertices: model.vertex_range()?,
            instances: first..end,
        });
        Ok(())
    }
}

/// Renders into the window surface with the engine's single pipeline.
pub struct WgpuRenderer {
    ctx: Context,
    pipeline: wgpu::RenderPipeline,
    textures: TextureSet,
    instance_buffer: wgpu::Buffer,
    znear: f32,
    zfar: f32,
}

const INSTANCE_SIZE: u64 = std::mem::size_of::<InstanceRaw>() as u64;

fn mk_instance_buffer(device: &wgpu::Device, instances: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: instances.max(1) * INSTANCE_SIZE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl WgpuRenderer {
    pub fn new(ctx: Context, shader: &Shader, config: &EngineConfig) -> Self {
        let textures = TextureSet::new(&ctx.device, &ctx.queue);
        let pipeline = shader.create_program(&ctx.device, textures.layout(), ctx.config.format);
        let instance_buffer = mk_instance_buffer(&ctx.device, 64);
        Self {
            ctx,
            pipeline,
            textures,
            instance_buffer,
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// A store sharing this renderer's device, for the engine's geometry buffer.
    pub fn vertex_store(&self) -> WgpuStore {
        WgpuStore::new(&self.ctx.device, &self.ctx.queue)
    }

    fn upload_instances(&mut self, instances: &[InstanceRaw]) {
        let needed = instances.len() as u64 * INSTANCE_SIZE;
        if needed > self.instance_buffer.size() {
            let count = (instances.len() as u64).next_power_of_two();
            log::debug!("instance buffer grows to {} instances", count);
            self.instance_buffer.destroy();
            self.instance_buffer = mk_instance_buffer(&self.ctx.device, count);
        }
        self.ctx
            .queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
    }
}

impl TextureLoader for WgpuRenderer {
    fn unload_all(&mut self) {
        self.textures.unload_all();
    }

    fn load(&mut self, id: TextureId, source: &TextureSource) -> Result<(), GpuError> {
        self.textures.load(id, source)
    }
}

impl Renderer<WgpuStore> for WgpuRenderer {
    fn draw(
        &mut self,
        geometry: &GeometryBuffer<WgpuStore>,
        frame: &Frame<'_>,
    ) -> Result<(), GpuError> {
        if self.ctx.is_lost() {
            return Err(GpuError::ContextLost);
        }
        geometry.ensure_drawable()?;
        let vertex_buffer = geometry
            .store()
            .buffer()
            .ok_or(GpuError::NotInitialized)?;
        let plan = DrawPlan::build(frame, self.ctx.aspect(), self.znear, self.zfar)?;
        self.upload_instances(&plan.instances);
        let groups = plan
            .calls
            .iter()
            .map(|call| self.textures.bind_group(call.texture))
            .collect::<Result<Vec<_>, _>>()?;

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (call, group) in plan.calls.iter().zip(groups) {
                if call.vertices.is_empty() || call.instances.is_empty() {
                    continue;
                }
                render_pass.set_bind_group(0, group, &[]);
                render_pass.draw(call.vertices.clone(), call.instances.clone());
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn recover(&mut self, error: &GpuError) {
        // Reconfigure the surface if it's lost or outdated
        if let GpuError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) = error {
            self.ctx.reconfigure();
        }
    }
}
