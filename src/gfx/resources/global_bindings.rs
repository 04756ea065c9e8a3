// src/gfx/resources/global_bindings.rs
//! Per-frame global uniforms
//!
//! One uniform buffer, bound at group 0 of every pipeline, carries the state
//! all passes share: the camera matrices plus the light used for shading and
//! for the shadow projection.

use crate::gfx::camera::CameraUniform;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Matches `GlobalUniform` in the WGSL shaders field for field
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalUniforms {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    _pad: f32,
    light_color: [f32; 3],
    light_intensity: f32,
    light_view_proj: [[f32; 4]; 4],
}

/// Light parameters for shading and shadow mapping
#[derive(Copy, Clone, Debug)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [12.0, 16.0, 8.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// The group-0 bind group shared by every pass
pub struct GlobalBindings {
    layout: BindGroupLayoutWithDesc,
    ubo: UniformBuffer<GlobalUniforms>,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform_buffer())
            .create(device, "Globals Bind Group Layout");

        let ubo = UniformBuffer::new(device, "Global Uniforms");
        let bind_group = BindGroupBuilder::new(&layout)
            .resource(ubo.binding())
            .create(device, "Global Bind Group");

        Self {
            layout,
            ubo,
            bind_group,
        }
    }

    /// Writes this frame's camera and light state
    ///
    /// `light_view_proj` comes from the shadow-light camera, already updated
    /// for the frame.
    pub fn write(
        &mut self,
        queue: &wgpu::Queue,
        camera: CameraUniform,
        light: LightConfig,
        light_view_proj: [[f32; 4]; 4],
    ) {
        self.ubo.write(
            queue,
            &GlobalUniforms {
                view_position: camera.view_position,
                view_proj: camera.view_proj,
                light_position: light.position,
                _pad: 0.0,
                light_color: light.color,
                light_intensity: light.intensity,
                light_view_proj,
            },
        );
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
