// src/gfx/rendering/render_engine.rs
//! WGPU-based deferred rendering engine
//!
//! Owns the surface, device, and all pass resources. Each frame renders in
//! three passes: shadow depth from the light's view, geometry attributes
//! into the G-buffer, and a fullscreen lighting resolve to the surface,
//! followed by an optional UI overlay pass.

use std::sync::Arc;

use cgmath::{EuclideanSpace, Point3, Vector3};
use wgpu::TextureFormat;

use crate::gfx::{
    camera::Camera,
    resources::{
        global_bindings::{GlobalBindings, LightConfig},
        material,
        texture_resource::TextureResource,
    },
    scene::{entity::Renderable, scene::Scene},
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
};

use super::gbuffer::GBuffer;
use super::pipeline_manager::{PipelineDesc, PipelineManager};

/// Shadow map resolution; fixed, independent of the viewport
pub const SHADOW_MAP_RESOLUTION: u32 = 2048;

/// World-space extent of the shadow light's orthographic box
const LIGHT_EXTENT: f32 = 32.0;

/// Extension for drawing a renderable's mesh into the current pass
trait DrawRenderable<'a> {
    fn draw_renderable(&mut self, renderable: &'a Renderable);
}

impl<'a> DrawRenderable<'a> for wgpu::RenderPass<'a> {
    fn draw_renderable(&mut self, renderable: &'a Renderable) {
        let (Some(vertex_buffer), Some(index_buffer), Some(transform_bind_group)) = (
            renderable.mesh.vertex_buffer(),
            renderable.mesh.index_buffer(),
            renderable.transform_bind_group(),
        ) else {
            return;
        };

        self.set_bind_group(1, transform_bind_group, &[]);
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..renderable.mesh.index_count(), 0, 0..1);
    }
}

/// Core rendering engine managing GPU resources and the deferred passes
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,
    transform_bind_group_layout: wgpu::BindGroupLayout,

    // Deferred targets
    gbuffer: GBuffer,
    gbuffer_sampler: wgpu::Sampler,
    lighting_bind_group_layout: BindGroupLayoutWithDesc,
    lighting_bind_group: wgpu::BindGroup,

    // Shadow mapping
    shadow_map: TextureResource,
    light_camera: Camera,
    light_config: LightConfig,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, allocates the G-buffer and shadow map, and builds
    /// the shadow/geometry/lighting pipelines.
    ///
    /// # Panics
    /// Panics when no adapter, device, or surface can be created, and when
    /// a pipeline fails to build; the viewer cannot run without them.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .expect("surface creation failed");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("no compatible gpu adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("device request failed");

        // Prefer a non-sRGB surface; the lighting shader writes linear color
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Deferred targets
        let gbuffer = GBuffer::new(&device, width, height);
        let gbuffer_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("GBuffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Shadow map and the light's own camera
        let shadow_map = TextureResource::shadow_map(&device, SHADOW_MAP_RESOLUTION);
        let light_camera = Camera::orthographic(LIGHT_EXTENT, LIGHT_EXTENT, 1.0, 60.0)
            .expect("light projection parameters are valid");
        let light_config = LightConfig::default();

        let global_bindings = GlobalBindings::new(&device);

        // Per-entity transform bind group layout (group 1 in mesh passes)
        let transform_bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform_buffer())
            .create(&device, "Transform Bind Group Layout")
            .layout;

        // Material layout comes from the material system so they stay in sync
        let material_bind_group_layout = material::bind_group_layout(&device).layout;

        // Lighting pass inputs: G-buffer attachments + shadow map
        let lighting_bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::sampled_texture_2d()) // position
            .next_binding_fragment(binding_types::sampled_texture_2d()) // normal
            .next_binding_fragment(binding_types::sampled_texture_2d()) // albedo
            .next_binding_fragment(binding_types::filtering_sampler())
            .next_binding_fragment(binding_types::depth_texture_2d()) // shadow map
            .next_binding_fragment(binding_types::comparison_sampler())
            .create(&device, "Lighting Bind Group Layout");

        let lighting_bind_group = Self::create_lighting_bind_group(
            &device,
            &lighting_bind_group_layout,
            &gbuffer,
            &gbuffer_sampler,
            &shadow_map,
        );

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();

        let mut pipeline_manager = PipelineManager::new(device_handle.clone());
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));
        pipeline_manager.load_shader("geometry", include_str!("geometry.wgsl"));
        pipeline_manager.load_shader("lighting", include_str!("lighting.wgsl"));

        // Shadow depth pass; no culling to limit light leaks through
        // single-sided geometry
        pipeline_manager
            .register(
                "Shadow",
                PipelineDesc::new("shadow")
                    .depth_only()
                    .depth_format(TextureResource::DEPTH_FORMAT)
                    .cull_mode(None)
                    .bind_group_layouts(vec![
                        global_bindings.layout().clone(),
                        transform_bind_group_layout.clone(),
                    ]),
            )
            .expect("shadow pipeline builds");

        // Geometry pass writing all G-buffer attachments
        pipeline_manager
            .register(
                "Geometry",
                PipelineDesc::new("geometry")
                    .depth_format(TextureResource::DEPTH_FORMAT)
                    .bind_group_layouts(vec![
                        global_bindings.layout().clone(),
                        transform_bind_group_layout.clone(),
                        material_bind_group_layout,
                    ])
                    .color_targets(GBuffer::color_targets()),
            )
            .expect("geometry pipeline builds");

        // Fullscreen lighting resolve to the surface
        pipeline_manager
            .register(
                "Lighting",
                PipelineDesc::new("lighting")
                    .fullscreen()
                    .bind_group_layouts(vec![
                        global_bindings.layout().clone(),
                        lighting_bind_group_layout.layout.clone(),
                    ])
                    .color_targets(vec![Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })]),
            )
            .expect("lighting pipeline builds");

        RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            format,
            pipeline_manager,
            global_bindings,
            transform_bind_group_layout,
            gbuffer,
            gbuffer_sampler,
            lighting_bind_group_layout,
            lighting_bind_group,
            shadow_map,
            light_camera,
            light_config,
        }
    }

    fn create_lighting_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        gbuffer: &GBuffer,
        gbuffer_sampler: &wgpu::Sampler,
        shadow_map: &TextureResource,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .texture(&gbuffer.position.view)
            .texture(&gbuffer.normal.view)
            .texture(&gbuffer.albedo.view)
            .sampler(gbuffer_sampler)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(device, "Lighting Bind Group")
    }

    /// Updates the global uniforms for this frame
    ///
    /// Positions the shadow-light camera from the light config and writes
    /// camera + light matrices. Must run after the camera's `update_matrix`
    /// and before `render_frame`.
    pub fn update(&mut self, camera: &Camera) {
        let [x, y, z] = self.light_config.position;
        self.light_camera.position = Point3::new(x, y, z);
        self.light_camera.look_at(Point3::origin(), Vector3::unit_y());
        self.light_camera.update_matrix();

        self.global_bindings.write(
            &self.queue,
            camera.uniform(),
            self.light_config,
            self.light_camera.uniform().view_proj,
        );
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// Pass order: shadow depth, G-buffer geometry, fullscreen lighting
    /// resolve, UI overlay. World matrices are uploaded once up front so the
    /// shadow and geometry passes read identical transform state.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        scene.write_transforms(&self.queue);

        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("surface texture acquisition failed");

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Shadow depth from the light's view
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get("Shadow") {
                shadow_pass.set_pipeline(pipeline);
                for entity in scene.entities.iter() {
                    if !entity.visible {
                        continue;
                    }
                    if let Some(renderable) = &entity.renderable {
                        shadow_pass.draw_renderable(renderable);
                    }
                }
            }
        }

        // PASS 2: Geometry attributes into the G-buffer
        {
            let color_attachments = self.gbuffer.color_attachments();
            let mut geometry_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Geometry Pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gbuffer.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            geometry_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get("Geometry") {
                geometry_pass.set_pipeline(pipeline);
                for entity in scene.entities.iter() {
                    if !entity.visible {
                        continue;
                    }
                    let Some(renderable) = &entity.renderable else {
                        continue;
                    };

                    let material = scene.materials.resolve(&renderable.material);
                    if let Some(material_bind_group) = material.bind_group() {
                        geometry_pass.set_bind_group(2, material_bind_group, &[]);
                        geometry_pass.draw_renderable(renderable);
                    } else {
                        log::debug!(
                            "skipping '{}' - material '{}' has no GPU resources",
                            entity.name,
                            material.name
                        );
                    }
                }
            }
        }

        // PASS 3: Fullscreen lighting resolve, reading the G-buffer and
        // shadow map, writing the surface
        {
            let mut lighting_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lighting Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            lighting_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            lighting_pass.set_bind_group(1, &self.lighting_bind_group, &[]);

            if let Some(pipeline) = self.pipeline_manager.get("Lighting") {
                lighting_pass.set_pipeline(pipeline);
                lighting_pass.draw(0..3, 0..1);
            }
        }

        // PASS 4: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Convenience method for rendering without a UI overlay
    pub fn render_frame_simple(&mut self, scene: &Scene) {
        self.render_frame(
            scene,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        );
    }

    /// Resizes the surface and reallocates the G-buffer
    ///
    /// The lighting bind group is rebuilt against the new attachments, so
    /// the next draw already targets the new dimensions. The shadow map has
    /// a fixed resolution and is untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.gbuffer.resize(&self.device, width, height);
        self.lighting_bind_group = Self::create_lighting_bind_group(
            &self.device,
            &self.lighting_bind_group_layout,
            &self.gbuffer,
            &self.gbuffer_sampler,
            &self.shadow_map,
        );
    }

    /// Updates the light used for shading and shadows
    pub fn set_light(&mut self, light_config: LightConfig) {
        self.light_config = light_config;
    }

    pub fn get_light(&self) -> LightConfig {
        self.light_config
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Layout for per-entity transform bind groups, used at scene GPU init
    pub fn transform_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.transform_bind_group_layout
    }
}
