//! GPU-side data layouts.
//!
//! All vectors are padded to `vec4` so the Rust and WGSL layouts match without
//! relying on implicit vec3 alignment rules.

use crate::scene::FrameState;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-frame scene uniforms, bound at group 0 binding 0 in every shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position.
    pub camera_position: [f32; 4],
    /// xyz = unit direction towards the light.
    pub light_direction: [f32; 4],
    /// rgb = directional light colour.
    pub light_color: [f32; 4],
    /// xyz = point light position, w = 1 when enabled.
    pub point_light_position: [f32; 4],
    /// rgb = point light colour.
    pub point_light_color: [f32; 4],
    /// x = constant, y = linear, z = quadratic.
    pub point_light_attenuation: [f32; 4],
    pub time: f32,
    /// 0..1 overlay strength, 0 when no flash is active.
    pub flash_intensity: f32,
    pub _padding: [f32; 2],
}

impl SceneUniforms {
    pub fn from_frame(frame: &FrameState, time: f32) -> Self {
        let light = &frame.light;
        let (point_position, point_color, attenuation) = match light.point_light {
            Some(point) => (
                point.position.extend(1.0),
                point.color.extend(0.0),
                [point.constant, point.linear, point.quadratic, 0.0],
            ),
            None => (Vec3::ZERO.extend(0.0), Vec3::ZERO.extend(0.0), [1.0, 0.0, 0.0, 0.0]),
        };

        Self {
            view_proj: frame.view_proj().to_cols_array_2d(),
            camera_position: frame.camera_position.extend(1.0).to_array(),
            light_direction: light.direction.extend(0.0).to_array(),
            light_color: light.color.extend(1.0).to_array(),
            point_light_position: point_position.to_array(),
            point_light_color: point_color.to_array(),
            point_light_attenuation: attenuation,
            time,
            flash_intensity: if frame.flash_active { frame.flash_intensity } else { 0.0 },
            _padding: [0.0; 2],
        }
    }
}

/// One rain drop instance: translation only.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DropInstance {
    pub position: [f32; 3],
    pub _pad: f32,
}

impl DropInstance {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            _pad: 0.0,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DropInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}
