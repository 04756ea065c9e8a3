// src/gfx/rendering/pipeline_manager.rs
//! Declarative render pipeline construction
//!
//! Each pass describes itself as a [`PipelineDesc`]; the manager compiles
//! descriptions against stored shader modules and hands out the finished
//! pipelines by name. Compilation happens at registration, so shader or
//! layout problems surface during engine construction rather than in the
//! frame loop.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::gfx::scene::vertex::Vertex3D;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline '{pipeline}' references unknown shader '{shader}'")]
    UnknownShader { pipeline: String, shader: String },
}

/// Description of a render pipeline
///
/// The defaults describe an opaque triangle-list draw of [`Vertex3D`]
/// meshes with back-face culling, no depth attachment, and no color
/// targets; builder methods override what a pass needs.
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    shader: String,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    cull_mode: Option<wgpu::Face>,
    depth_format: Option<wgpu::TextureFormat>,
    color_targets: Vec<Option<wgpu::ColorTargetState>>,
    has_fragment_stage: bool,
    reads_meshes: bool,
}

impl PipelineDesc {
    pub fn new(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(wgpu::Face::Back),
            depth_format: None,
            color_targets: Vec::new(),
            has_fragment_stage: true,
            reads_meshes: true,
        }
    }

    pub fn bind_group_layouts(mut self, layouts: Vec<wgpu::BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Enables depth testing against an attachment of the given format
    pub fn depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn color_targets(mut self, targets: Vec<Option<wgpu::ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    /// Depth-only pass with no fragment stage (the shadow pass)
    pub fn depth_only(mut self) -> Self {
        self.has_fragment_stage = false;
        self
    }

    /// Fullscreen pass whose vertices come from the shader, not a buffer
    /// (the lighting resolve)
    pub fn fullscreen(mut self) -> Self {
        self.reads_meshes = false;
        self.cull_mode = None;
        self
    }
}

/// Compiles and stores the viewer's render pipelines
pub struct PipelineManager {
    device: Arc<wgpu::Device>,
    shaders: HashMap<String, wgpu::ShaderModule>,
    pipelines: HashMap<String, wgpu::RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module and stores it under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.shaders.insert(name.to_string(), module);
    }

    /// Builds the pipeline described by `desc` and stores it under `name`
    ///
    /// `name` doubles as the pipeline's debug label.
    pub fn register(&mut self, name: &str, desc: PipelineDesc) -> Result<(), PipelineError> {
        let shader = self
            .shaders
            .get(&desc.shader)
            .ok_or_else(|| PipelineError::UnknownShader {
                pipeline: name.to_string(),
                shader: desc.shader.clone(),
            })?;

        let layout_refs: Vec<&wgpu::BindGroupLayout> = desc.bind_group_layouts.iter().collect();
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name} Layout")),
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            });

        let mesh_buffers = [Vertex3D::layout()];
        let vertex_buffers: &[wgpu::VertexBufferLayout] = if desc.reads_meshes {
            &mesh_buffers
        } else {
            &[]
        };

        let fragment = desc.has_fragment_stage.then_some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &desc.color_targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let depth_stencil = desc.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(name),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: desc.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        self.pipelines.insert(name.to_string(), pipeline);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(name)
    }

    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }
}
