// src/wgpu_utils/uniform_buffer.rs
//! Typed uniform buffers
//!
//! Wraps a `wgpu::Buffer` together with the Pod type it carries. Uploads go
//! through [`UniformBuffer::write`], which skips the queue submission when
//! the content matches the previous upload.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

pub struct UniformBuffer<C> {
    buffer: wgpu::Buffer,
    last_written: Vec<u8>,
    _content: PhantomData<C>,
}

impl<C: bytemuck::Pod> UniformBuffer<C> {
    /// Creates an uninitialized uniform buffer sized for `C`
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<C>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            last_written: Vec::new(),
            _content: PhantomData,
        }
    }

    /// Creates a uniform buffer holding `content`
    pub fn with_content(device: &wgpu::Device, label: &str, content: &C) -> Self {
        let bytes = bytemuck::bytes_of(content);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            last_written: bytes.to_vec(),
            _content: PhantomData,
        }
    }

    /// Uploads `content`, unless it matches the previous upload
    pub fn write(&mut self, queue: &wgpu::Queue, content: &C) {
        let bytes = bytemuck::bytes_of(content);
        if self.last_written == bytes {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_written.clear();
        self.last_written.extend_from_slice(bytes);
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
