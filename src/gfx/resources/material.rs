// src/gfx/resources/material.rs
//! Material system
//!
//! Materials pair a base color with an optional texture. They are stored
//! centrally in [`MaterialManager`] and referenced by name from renderables;
//! unknown names resolve to the default material.

use std::collections::HashMap;
use std::rc::Rc;

use wgpu::Device;

use crate::assets::TextureImage;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::texture_resource::TextureResource;

pub const DEFAULT_MATERIAL: &str = "default";

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    _padding: f32,
}

/// Layout of every material's bind group (group 2 of the geometry pass)
///
/// Created per call; wgpu treats structurally equal layouts as compatible.
pub fn bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform_buffer())
        .next_binding_fragment(binding_types::sampled_texture_2d())
        .next_binding_fragment(binding_types::filtering_sampler())
        .create(device, "Material Bind Group Layout")
}

/// A material's GPU residency: parameters, texture, and the bind group
/// tying them together
struct MaterialGpu {
    ubo: UniformBuffer<MaterialUniform>,
    _texture: TextureResource,
    bind_group: wgpu::BindGroup,
}

/// Material definition with optional texture
///
/// GPU resources are shared by all entities using this material.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub texture: Option<Rc<TextureImage>>,

    gpu: Option<MaterialGpu>,
}

impl Material {
    pub fn new(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            emissive: [0.0, 0.0, 0.0],
            texture: None,
            gpu: None,
        }
    }

    pub fn with_texture(mut self, texture: Rc<TextureImage>) -> Self {
        self.texture = Some(texture);
        self
    }

    fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            emissive: self.emissive,
            _padding: 0.0,
        }
    }

    /// Creates the uniform buffer, texture, and bind group
    ///
    /// Untextured materials get a 1x1 white texture so the geometry shader
    /// can sample unconditionally.
    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        let texture = match &self.texture {
            Some(image) => TextureResource::from_rgba8(
                device,
                queue,
                &image.pixels,
                image.width,
                image.height,
                &format!("{} Texture", self.name),
            ),
            None => TextureResource::from_rgba8(
                device,
                queue,
                &[255, 255, 255, 255],
                1,
                1,
                &format!("{} Texture", self.name),
            ),
        };

        let ubo = UniformBuffer::with_content(
            device,
            &format!("{} Uniforms", self.name),
            &self.uniform(),
        );

        let layout = bind_group_layout(device);
        let bind_group = BindGroupBuilder::new(&layout)
            .resource(ubo.binding())
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, &format!("{} Bind Group", self.name));

        self.gpu = Some(MaterialGpu {
            ubo,
            _texture: texture,
            bind_group,
        });
    }

    /// Pushes changed material parameters to the GPU
    pub fn sync(&mut self, queue: &wgpu::Queue) {
        let uniform = self.uniform();
        if let Some(gpu) = &mut self.gpu {
            gpu.ubo.write(queue, &uniform);
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Centralized material storage
///
/// Always contains a `"default"` material, so lookups can fall back instead
/// of failing.
pub struct MaterialManager {
    materials: HashMap<String, Material>,
}

impl MaterialManager {
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert(
            DEFAULT_MATERIAL.to_string(),
            Material::new(DEFAULT_MATERIAL, [0.8, 0.8, 0.8, 1.0]),
        );
        Self { materials }
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn get_material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    /// Resolves a material name, falling back to the default material
    pub fn resolve(&self, name: &str) -> &Material {
        self.materials
            .get(name)
            .unwrap_or_else(|| &self.materials[DEFAULT_MATERIAL])
    }

    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for material in self.materials.values_mut() {
            material.init_gpu_resources(device, queue);
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_always_has_default_material() {
        let manager = MaterialManager::new();
        assert!(manager.get_material(DEFAULT_MATERIAL).is_some());
    }

    #[test]
    fn test_unknown_names_resolve_to_default() {
        let manager = MaterialManager::new();
        let material = manager.resolve("no_such_material");
        assert_eq!(material.name, DEFAULT_MATERIAL);
    }

    #[test]
    fn test_added_materials_resolve_by_name() {
        let mut manager = MaterialManager::new();
        manager.add_material(Material::new("copper", [0.9, 0.5, 0.3, 1.0]));
        assert_eq!(manager.resolve("copper").name, "copper");
    }
}
