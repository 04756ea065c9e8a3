// src/gfx/scene/entity.rs
//! Entities and their renderable components

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;
use wgpu::Device;

use crate::assets::MeshData;
use crate::gfx::scene::transform::TransformId;
use crate::gfx::scene::vertex::Vertex3D;

/// Mesh geometry with lazily-created GPU buffers
///
/// CPU vertex data is built from [`MeshData`] immediately; buffers are
/// uploaded once the device exists, via `init_gpu_resources`.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn from_data(data: &MeshData) -> Self {
        let mut vertices = Vec::with_capacity(data.vertex_count());
        for i in 0..data.vertex_count() {
            vertices.push(Vertex3D {
                position: [
                    data.positions[i * 3],
                    data.positions[i * 3 + 1],
                    data.positions[i * 3 + 2],
                ],
                normal: [
                    data.normals[i * 3],
                    data.normals[i * 3 + 1],
                    data.normals[i * 3 + 2],
                ],
                tex_coords: [data.tex_coords[i * 2], data.tex_coords[i * 2 + 1]],
            });
        }

        let index_count = data.indices.len() as u32;
        Self {
            vertices,
            indices: data.indices.clone(),
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn init_gpu_resources(&mut self, device: &Device) {
        self.vertex_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Per-entity GPU state: the world matrix uniform and its bind group
pub struct EntityGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A mesh + material attached to an entity
pub struct Renderable {
    pub mesh: Mesh,
    pub material: String,
    gpu: Option<EntityGpuResources>,
}

impl Renderable {
    pub fn new(data: &MeshData, material: &str) -> Self {
        Self {
            mesh: Mesh::from_data(data),
            material: material.to_string(),
            gpu: None,
        }
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        transform_layout: &wgpu::BindGroupLayout,
    ) {
        self.mesh.init_gpu_resources(device);

        let identity: Matrix4<f32> = Matrix4::identity();
        let matrix_data: &[f32; 16] = identity.as_ref();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Entity Transform Buffer"),
            contents: bytemuck::cast_slice(matrix_data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Entity Transform Bind Group"),
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu = Some(EntityGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    /// Uploads this frame's world matrix
    pub fn write_world_matrix(&self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        if let Some(gpu) = &self.gpu {
            // cgmath matrices are column-major, which is what the GPU expects
            let matrix_data: &[f32; 16] = world.as_ref();
            queue.write_buffer(&gpu.transform_buffer, 0, bytemuck::cast_slice(matrix_data));
        }
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.transform_bind_group)
    }
}

/// An entity in the scene: a name, a transform, and an optional renderable
///
/// Entities are created at scene setup and live for the scene's lifetime.
pub struct Entity {
    pub name: String,
    pub transform: TransformId,
    pub renderable: Option<Renderable>,
    pub visible: bool,
}
