//! Render pipelines for one frame: sky, opaque meshes, rain, translucent
//! meshes and the flash overlay.

use crate::controls::RenderMode;
use crate::mesh::Vertex;
use crate::shaders::ShaderKind;
use crate::uniforms::DropInstance;

use super::DEPTH_FORMAT;

/// Compiled shader modules, kept so pipelines can be rebuilt when the render
/// mode changes.
pub(crate) struct ShaderModules {
    sky: wgpu::ShaderModule,
    mesh: wgpu::ShaderModule,
    rain: wgpu::ShaderModule,
    flash: wgpu::ShaderModule,
}

impl ShaderModules {
    pub fn new(device: &wgpu::Device) -> Self {
        let create = |kind: ShaderKind| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kind.label()),
                source: wgpu::ShaderSource::Wgsl(kind.source().into()),
            })
        };
        Self {
            sky: create(ShaderKind::Sky),
            mesh: create(ShaderKind::Mesh),
            rain: create(ShaderKind::Rain),
            flash: create(ShaderKind::Flash),
        }
    }

    fn get(&self, kind: ShaderKind) -> &wgpu::ShaderModule {
        match kind {
            ShaderKind::Sky => &self.sky,
            ShaderKind::Mesh => &self.mesh,
            ShaderKind::Rain => &self.rain,
            ShaderKind::Flash => &self.flash,
        }
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    kind: ShaderKind,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    polygon_mode: wgpu::PolygonMode,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

/// All pipelines used by the frame.
pub(crate) struct Pipelines {
    pub sky: wgpu::RenderPipeline,
    pub opaque: wgpu::RenderPipeline,
    pub rain: wgpu::RenderPipeline,
    pub translucent: wgpu::RenderPipeline,
    pub flash: wgpu::RenderPipeline,
    pub mode: RenderMode,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        modules: &ShaderModules,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
        mode: RenderMode,
    ) -> Self {
        let polygon_mode = match mode {
            RenderMode::Fill => wgpu::PolygonMode::Fill,
            RenderMode::Wireframe => wgpu::PolygonMode::Line,
            RenderMode::Points => wgpu::PolygonMode::Point,
        };

        Self {
            sky: create_pipeline(device, modules, layout, format, PipelineDesc {
                label: "Sky Pipeline",
                kind: ShaderKind::Sky,
                buffers: &[],
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                blend: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
            }),
            opaque: create_pipeline(device, modules, layout, format, PipelineDesc {
                label: "Opaque Mesh Pipeline",
                kind: ShaderKind::Mesh,
                buffers: &[Vertex::layout()],
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode,
                blend: None,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            }),
            rain: create_pipeline(device, modules, layout, format, PipelineDesc {
                label: "Rain Pipeline",
                kind: ShaderKind::Rain,
                buffers: &[DropInstance::layout()],
                cull_mode: None,
                polygon_mode,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Less,
            }),
            translucent: create_pipeline(device, modules, layout, format, PipelineDesc {
                label: "Translucent Mesh Pipeline",
                kind: ShaderKind::Mesh,
                buffers: &[Vertex::layout()],
                cull_mode: None,
                polygon_mode,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Less,
            }),
            flash: create_pipeline(device, modules, layout, format, PipelineDesc {
                label: "Flash Overlay Pipeline",
                kind: ShaderKind::Flash,
                buffers: &[],
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
            }),
            mode,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    modules: &ShaderModules,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    desc: PipelineDesc,
) -> wgpu::RenderPipeline {
    let module = modules.get(desc.kind);
    let (vs_entry, fs_entry) = desc.kind.entry_points();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: desc.polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
