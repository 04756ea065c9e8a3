// src/gfx/rendering/gbuffer.rs
//! G-buffer target set for deferred shading
//!
//! Three color attachments (world position, world normal, albedo) plus the
//! depth attachment. Attachment count and formats are fixed at init; resizing
//! reallocates at the new dimensions and keeps the formats.

use crate::gfx::resources::texture_resource::TextureResource;

pub struct GBuffer {
    pub position: TextureResource,
    pub normal: TextureResource,
    pub albedo: TextureResource,
    pub depth: TextureResource,
    width: u32,
    height: u32,
}

impl GBuffer {
    pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        Self {
            position: TextureResource::color_target(
                device,
                width,
                height,
                Self::POSITION_FORMAT,
                "GBuffer Position",
            ),
            normal: TextureResource::color_target(
                device,
                width,
                height,
                Self::NORMAL_FORMAT,
                "GBuffer Normal",
            ),
            albedo: TextureResource::color_target(
                device,
                width,
                height,
                Self::ALBEDO_FORMAT,
                "GBuffer Albedo",
            ),
            depth: TextureResource::depth_target(device, width, height, "GBuffer Depth"),
            width,
            height,
        }
    }

    /// Reallocates every attachment at the new dimensions
    ///
    /// The caller must rebuild any bind group that references the old views
    /// before the next draw.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color target states for the geometry pipeline, in attachment order
    pub fn color_targets() -> Vec<Option<wgpu::ColorTargetState>> {
        [Self::POSITION_FORMAT, Self::NORMAL_FORMAT, Self::ALBEDO_FORMAT]
            .into_iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect()
    }

    /// Render pass color attachments, cleared to zero
    ///
    /// A zero normal marks "no geometry" for the lighting pass.
    pub fn color_attachments(&self) -> [Option<wgpu::RenderPassColorAttachment<'_>>; 3] {
        let clear = wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        };
        [
            Some(wgpu::RenderPassColorAttachment {
                view: &self.position.view,
                resolve_target: None,
                ops: clear,
            }),
            Some(wgpu::RenderPassColorAttachment {
                view: &self.normal.view,
                resolve_target: None,
                ops: clear,
            }),
            Some(wgpu::RenderPassColorAttachment {
                view: &self.albedo.view,
                resolve_target: None,
                ops: clear,
            }),
        ]
    }
}
