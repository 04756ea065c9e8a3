// src/gfx/resources/texture_resource.rs
//! GPU texture bundles
//!
//! A texture with its default view and a matching sampler, plus constructors
//! for the specific kinds the viewer needs: depth targets, the shadow map,
//! G-buffer color targets, and uploaded RGBA images.

#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Clamped linear sampler; a compare function turns it into a comparison
/// sampler for shadow lookups
fn edge_sampler(
    device: &wgpu::Device,
    label: &str,
    compare: Option<wgpu::CompareFunction>,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        compare,
        ..Default::default()
    })
}

/// Descriptor for a texture that is both a render attachment and sampled
/// by a later pass
fn attachment_descriptor(
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }
}

impl TextureResource {
    /// Depth format used by every depth attachment in the viewer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Depth attachment for the G-buffer
    pub fn depth_target(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture =
            device.create_texture(&attachment_descriptor(label, width, height, Self::DEPTH_FORMAT));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = edge_sampler(device, label, None);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// The shadow map: a square depth target with a comparison sampler, so
    /// shaders get hardware depth-compare filtering
    pub fn shadow_map(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&attachment_descriptor(
            "Shadow Map",
            size,
            size,
            Self::DEPTH_FORMAT,
        ));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = edge_sampler(
            device,
            "Shadow Sampler",
            Some(wgpu::CompareFunction::LessEqual),
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Off-screen color target the lighting pass can sample; used for the
    /// G-buffer attachments
    pub fn color_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&attachment_descriptor(label, width, height, format));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = edge_sampler(device, label, None);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads raw RGBA8 pixels as a sampled sRGB texture
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Repeat so material textures tile across large surfaces
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
