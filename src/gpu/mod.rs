//! wgpu renderer for the storm scene.
//!
//! One render pass per frame, drawn in this order:
//!
//! 1. sky gradient (no depth)
//! 2. opaque ground
//! 3. rain streaks, instanced from the particle field
//! 4. translucent props
//! 5. lightning overlay, only while a flash is active
//!
//! The overlay goes last so it brightens everything drawn before it.

mod pipeline;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::WindowSettings;
use crate::controls::RenderMode;
use crate::error::GpuError;
use crate::mesh::{self, Mesh};
use crate::rain::ParticleField;
use crate::scene::FrameState;
use crate::uniforms::{DropInstance, SceneUniforms};

use pipeline::{Pipelines, ShaderModules};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Half extent of the ground plane, a little wider than the rain volume.
const GROUND_HALF_EXTENT: f32 = 40.0;

/// Uploaded indexed mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

pub(crate) struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    features: wgpu::Features,
    depth_texture: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
    shaders: ShaderModules,
    pipelines: Pipelines,
    ground: GpuMesh,
    props: GpuMesh,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<DropInstance>,
}

impl Renderer {
    /// Set up the device, surface and static geometry.
    ///
    /// `drop_capacity` sizes the rain instance buffer; `ground_level` places
    /// the ground and props at the height where drops recycle.
    pub async fn new(
        window: Arc<Window>,
        settings: &WindowSettings,
        drop_capacity: usize,
        ground_level: f32,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        // Wireframe and point modes are optional
        let features = adapter.features()
            & (wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shaders = ShaderModules::new(&device);
        let pipelines = Pipelines::new(
            &device,
            &shaders,
            &pipeline_layout,
            surface_format,
            RenderMode::Fill,
        );

        let ground = GpuMesh::new(&device, "Ground", &mesh::ground(GROUND_HALF_EXTENT, ground_level));
        let props = GpuMesh::new(&device, "Props", &mesh::translucent_props(ground_level));

        let instance_capacity = drop_capacity.max(1);
        let instance_size = instance_buffer_size(instance_capacity, device.limits().max_buffer_size)?;
        let instance_buffer = create_instance_buffer(&device, instance_size);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            features,
            depth_texture,
            uniform_buffer,
            uniform_bind_group,
            pipeline_layout,
            shaders,
            pipelines,
            ground,
            props,
            instance_buffer,
            instance_capacity,
            instances: Vec::with_capacity(drop_capacity),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Whether the device can draw `mode`.
    pub fn supports(&self, mode: RenderMode) -> bool {
        match mode {
            RenderMode::Fill => true,
            RenderMode::Wireframe => self.features.contains(wgpu::Features::POLYGON_MODE_LINE),
            RenderMode::Points => self.features.contains(wgpu::Features::POLYGON_MODE_POINT),
        }
    }

    fn ensure_mode(&mut self, mode: RenderMode) {
        if self.pipelines.mode == mode || !self.supports(mode) {
            return;
        }
        self.pipelines = Pipelines::new(
            &self.device,
            &self.shaders,
            &self.pipeline_layout,
            self.config.format,
            mode,
        );
    }

    fn upload_rain(&mut self, rain: &ParticleField) {
        let instances = &mut self.instances;
        instances.clear();
        rain.for_each(|position| instances.push(DropInstance::new(position)));

        if self.instances.len() > self.instance_capacity {
            let limit = self.device.limits().max_buffer_size;
            match instance_buffer_size(self.instances.len(), limit) {
                Ok(size) => {
                    self.instance_capacity = self.instances.len();
                    self.instance_buffer = create_instance_buffer(&self.device, size);
                }
                Err(e) => {
                    log::warn!("{}; drawing the first {} drops", e, self.instance_capacity);
                    self.instances.truncate(self.instance_capacity);
                }
            }
        }
        if !self.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }
    }

    pub fn render(
        &mut self,
        frame: &FrameState,
        rain: &ParticleField,
        time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_mode(frame.render_mode);

        let uniforms = SceneUniforms::from_frame(frame, time);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.upload_rain(rain);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            render_pass.set_pipeline(&self.pipelines.sky);
            render_pass.draw(0..3, 0..1);

            render_pass.set_pipeline(&self.pipelines.opaque);
            self.ground.draw(&mut render_pass);

            if !self.instances.is_empty() {
                render_pass.set_pipeline(&self.pipelines.rain);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..self.instances.len() as u32);
            }

            render_pass.set_pipeline(&self.pipelines.translucent);
            self.props.draw(&mut render_pass);

            if frame.flash_active {
                render_pass.set_pipeline(&self.pipelines.flash);
                render_pass.draw(0..3, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Byte size of an instance buffer for `capacity` drops, if the device allows it.
fn instance_buffer_size(capacity: usize, limit: u64) -> Result<wgpu::BufferAddress, GpuError> {
    let requested = (capacity as u64).saturating_mul(std::mem::size_of::<DropInstance>() as u64);
    if requested > limit {
        return Err(GpuError::BufferTooLarge { requested, limit });
    }
    Ok(requested)
}

fn create_instance_buffer(device: &wgpu::Device, size: wgpu::BufferAddress) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Rain Instance Buffer"),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_buffer_size_respects_limit() {
        let limit = wgpu::Limits::default().max_buffer_size;
        assert_eq!(instance_buffer_size(30_000, limit).unwrap(), 30_000 * 16);
        assert_eq!(instance_buffer_size(1 << 24, limit).unwrap(), limit);

        let err = instance_buffer_size((1 << 24) + 1, limit).unwrap_err();
        assert!(matches!(
            err,
            GpuError::BufferTooLarge { requested, limit: l } if requested == limit + 16 && l == limit
        ));
        assert!(instance_buffer_size(usize::MAX, limit).is_err());
    }
}
