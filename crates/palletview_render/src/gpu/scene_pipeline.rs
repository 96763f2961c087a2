//! Scene render pipelines
//!
//! One shader drives every variant: filled meshes per culling mode and line
//! lists, each with an opaque and an alpha-blended flavor.

use palletview_core::Side;

use super::types::Vertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Which pipeline variant a draw uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineKind {
    Mesh(Side),
    Lines,
}

/// Opaque and blended versions of one variant
struct PipelinePair {
    opaque: wgpu::RenderPipeline,
    blended: wgpu::RenderPipeline,
}

/// Pipelines and bind groups of the main pass
pub struct ScenePipelines {
    node_layout: wgpu::BindGroupLayout,
    globals_bind_group: wgpu::BindGroup,
    mesh_front: PipelinePair,
    mesh_back: PipelinePair,
    mesh_double: PipelinePair,
    lines: PipelinePair,
    depth_texture: Option<wgpu::TextureView>,
    depth_size: (u32, u32),
}

impl ScenePipelines {
    /// Layout of the per-node uniform bind group (group 1)
    pub fn create_node_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Node Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        node_layout: wgpu::BindGroupLayout,
        globals: &wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) -> Self {
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[
                // Globals
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Shadow map
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Shadow comparison sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow_sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &node_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
        });

        let builder = PipelineBuilder {
            device,
            layout: &layout,
            shader: &shader,
            format: surface_format,
        };

        Self {
            mesh_front: builder.pair("Mesh Front", wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back)),
            mesh_back: builder.pair("Mesh Back", wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Front)),
            mesh_double: builder.pair("Mesh Double", wgpu::PrimitiveTopology::TriangleList, None),
            lines: builder.pair("Lines", wgpu::PrimitiveTopology::LineList, None),
            node_layout,
            globals_bind_group,
            depth_texture: None,
            depth_size: (0, 0),
        }
    }

    pub fn node_layout(&self) -> &wgpu::BindGroupLayout {
        &self.node_layout
    }

    pub fn pipeline(&self, kind: PipelineKind, blended: bool) -> &wgpu::RenderPipeline {
        let pair = match kind {
            PipelineKind::Mesh(Side::Front) => &self.mesh_front,
            PipelineKind::Mesh(Side::Back) => &self.mesh_back,
            PipelineKind::Mesh(Side::Double) => &self.mesh_double,
            PipelineKind::Lines => &self.lines,
        };
        if blended {
            &pair.blended
        } else {
            &pair.opaque
        }
    }

    /// Depth attachment matching a color target of the given size
    pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensure depth texture exists and is the right size
    pub fn ensure_depth_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.depth_texture.is_none() || self.depth_size != (width, height) {
            self.depth_texture = Some(Self::create_depth_view(device, width, height));
            self.depth_size = (width, height);
        }
    }

    /// Begin the main pass into the surface, cleared to `clear_color`
    ///
    /// Returns `None` until [`ensure_depth_texture`](Self::ensure_depth_texture)
    /// has been called.
    pub fn begin<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &'e wgpu::TextureView,
        clear_color: wgpu::Color,
    ) -> Option<wgpu::RenderPass<'e>> {
        let depth_view = self.depth_texture.as_ref()?;
        Some(self.begin_with_depth(encoder, view, depth_view, clear_color))
    }

    /// Begin the main pass with an explicit depth attachment, globals bound
    pub fn begin_with_depth<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &'e wgpu::TextureView,
        depth_view: &'e wgpu::TextureView,
        clear_color: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass
    }
}

struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    format: wgpu::TextureFormat,
}

impl PipelineBuilder<'_> {
    fn pair(&self, label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>) -> PipelinePair {
        PipelinePair {
            opaque: self.create(&format!("{} Opaque Pipeline", label), topology, cull_mode, None),
            blended: self.create(
                &format!("{} Blended Pipeline", label),
                topology,
                cull_mode,
                Some(wgpu::BlendState::ALPHA_BLENDING),
            ),
        }
    }

    fn create(
        &self,
        label: &str,
        topology: wgpu::PrimitiveTopology,
        cull_mode: Option<wgpu::Face>,
        blend: Option<wgpu::BlendState>,
    ) -> wgpu::RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend.or(Some(wgpu::BlendState::REPLACE)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Blended surfaces still write depth
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}
