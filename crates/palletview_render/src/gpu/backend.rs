//! wgpu render backend and the window host that creates it
//!
//! Frames go to the window surface; captures go to an offscreen texture that
//! is copied into a mapped buffer.

use std::sync::{mpsc, Arc};

use palletview_core::{Light, SceneGraph};
use palletview_math::mat4;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::context::RenderContext;
use super::gpu_scene::{draw_mode, GpuScene};
use super::scene_pipeline::{PipelineKind, ScenePipelines};
use super::shadow_pass::ShadowPass;
use super::types::{clear_color, GlobalUniforms};
use crate::backend::{CapabilityError, GraphicsHost, RenderBackend, RenderError, RendererSettings};
use crate::camera::PerspectiveCamera;
use crate::draw_list::DrawList;
use crate::shadow::light_view_projection;
use crate::snapshot::Snapshot;

/// Everything dropped by [`RenderBackend::release`]
struct GpuState {
    context: RenderContext,
    pipelines: ScenePipelines,
    shadow: ShadowPass,
    globals: wgpu::Buffer,
    scene: GpuScene,
}

/// Renders a scene graph into a window surface
pub struct WgpuBackend {
    state: Option<GpuState>,
    size: (u32, u32),
}

impl WgpuBackend {
    /// Create the graphics context and pipelines for `window`
    pub async fn new(window: Arc<Window>, settings: &RendererSettings) -> Result<Self, CapabilityError> {
        let context = RenderContext::new(window, settings.vsync).await?;
        let device = &context.device;

        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Uniform Buffer"),
            size: std::mem::size_of::<GlobalUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let node_layout = ScenePipelines::create_node_layout(device);
        let shadow = ShadowPass::new(device, &node_layout, &globals, settings.shadow_map_size);
        let mut pipelines = ScenePipelines::new(
            device,
            context.config.format,
            node_layout,
            &globals,
            shadow.view(),
            shadow.sampler(),
        );
        pipelines.ensure_depth_texture(device, context.config.width, context.config.height);

        let size = (context.size.width, context.size.height);
        log::info!("wgpu backend ready ({}x{}, {:?})", size.0, size.1, context.config.format);

        Ok(Self {
            state: Some(GpuState {
                context,
                pipelines,
                shadow,
                globals,
                scene: GpuScene::new(),
            }),
            size,
        })
    }
}

impl GpuState {
    fn globals(&self, scene: &SceneGraph, camera: &PerspectiveCamera) -> GlobalUniforms {
        let linear = self.context.is_srgb();
        let bounds = scene.bounding_box();
        let key = scene.lights().iter().find_map(|light| match light {
            Light::Directional(light) => Some(*light),
            Light::Ambient { .. } => None,
        });
        let light_view_proj = key
            .map(|light| light_view_projection(&light, &bounds))
            .unwrap_or(mat4::IDENTITY);

        let position = camera.position();
        let mut globals = GlobalUniforms {
            view_proj: camera.view_projection(),
            camera_pos: [position.x, position.y, position.z, 1.0],
            ..Default::default()
        }
        .with_lights(scene, light_view_proj, linear);
        if globals.shadow[2] > 0.0 {
            globals.shadow[1] = 1.0 / self.shadow.size() as f32;
        }
        globals
    }

    /// Upload dirty nodes and the per-frame globals
    fn prepare(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> GlobalUniforms {
        let linear = self.context.is_srgb();
        let uploads = self.scene.sync(
            &self.context.device,
            &self.context.queue,
            scene,
            self.pipelines.node_layout(),
            linear,
        );
        if uploads > 0 {
            log::debug!("Uploaded uniforms for {} node(s)", uploads);
        }

        let globals = self.globals(scene, camera);
        self.context
            .queue
            .write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));
        globals
    }

    /// Record the shadow pass and the main pass into `view`
    ///
    /// Uses the surface depth texture unless `depth_view` is given.
    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        globals: &GlobalUniforms,
    ) -> Result<(), RenderError> {
        let draw_list = DrawList::build(scene, camera.position());

        if globals.shadow[2] > 0.0 {
            let mut pass = self.shadow.begin(encoder);
            for key in draw_list.iter() {
                let Some(node) = scene.node(key) else { continue };
                if !node.casts_shadow() {
                    continue;
                }
                let (kind, source) = draw_mode(node);
                if kind == PipelineKind::Lines {
                    continue;
                }
                if let (Some(gpu_node), Some(geometry)) =
                    (self.scene.node(key), self.scene.geometry(node.geometry()))
                {
                    pass.set_bind_group(1, gpu_node.bind_group(), &[]);
                    geometry.draw(&mut pass, source);
                }
            }
        }

        let clear = clear_color(scene.background(), self.context.is_srgb());
        let mut pass = match depth_view {
            Some(depth_view) => self.pipelines.begin_with_depth(encoder, view, depth_view, clear),
            None => self
                .pipelines
                .begin(encoder, view, clear)
                .ok_or_else(|| RenderError::Other("depth texture missing".to_string()))?,
        };

        for key in draw_list.iter() {
            let Some(node) = scene.node(key) else { continue };
            let (Some(gpu_node), Some(geometry)) =
                (self.scene.node(key), self.scene.geometry(node.geometry()))
            else {
                continue;
            };
            let (kind, source) = draw_mode(node);
            pass.set_pipeline(self.pipelines.pipeline(kind, node.material().is_blended()));
            pass.set_bind_group(1, gpu_node.bind_group(), &[]);
            geometry.draw(&mut pass, source);
        }
        Ok(())
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let globals = self.prepare(scene, camera);

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                return Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.encode(&mut encoder, &view, None, scene, camera, &globals)?;

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Render into an offscreen texture of the surface format and read it back
    fn capture(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        width: u32,
        height: u32,
    ) -> Result<Snapshot, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::Other(format!("cannot capture {}x{}", width, height)));
        }
        let format = self.context.config.format;
        let swap_red_blue = match format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
            other => {
                return Err(RenderError::Other(format!("cannot read back {:?} frames", other)));
            }
        };

        let globals = self.prepare(scene, camera);
        let device = &self.context.device;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = ScenePipelines::create_depth_view(device, width, height);

        // Rows in the staging buffer are padded to the copy alignment
        let unpadded_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Staging Buffer"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        self.encode(&mut encoder, &view, Some(&depth_view), scene, camera, &globals)?;
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            size,
        );
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RenderError::Other(format!("capture readback failed: {}", e))),
            Err(_) => return Err(RenderError::Other("capture readback was dropped".to_string())),
        }

        let mut pixels = Vec::with_capacity((unpadded_row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded_row as usize) {
                pixels.extend_from_slice(&row[..unpadded_row as usize]);
            }
        }
        staging.unmap();

        if swap_red_blue {
            for pixel in pixels.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }
        log::info!("Captured {}x{} frame", width, height);
        Snapshot::from_rgba(width, height, pixels)
            .ok_or_else(|| RenderError::Other("capture size mismatch".to_string()))
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        if let Some(state) = self.state.as_mut() {
            if width == state.context.config.width && height == state.context.config.height {
                state.context.reconfigure();
                return;
            }
            state.context.resize(PhysicalSize::new(width, height));
            state
                .pipelines
                .ensure_depth_texture(&state.context.device, state.context.config.width, state.context.config.height);
        }
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        match self.state.as_mut() {
            Some(state) => state.render(scene, camera),
            None => Err(RenderError::Other("backend already released".to_string())),
        }
    }

    fn capture(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        width: u32,
        height: u32,
    ) -> Result<Snapshot, RenderError> {
        match self.state.as_mut() {
            Some(state) => state.capture(scene, camera, width, height),
            None => Err(RenderError::Other("backend already released".to_string())),
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!("GPU resources released");
        }
    }
}

/// Host for a winit window
#[derive(Clone)]
pub struct WindowHost {
    window: Arc<Window>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl GraphicsHost for WindowHost {
    type Backend = WgpuBackend;

    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn create_backend(&self, settings: &RendererSettings) -> Result<WgpuBackend, CapabilityError> {
        pollster::block_on(WgpuBackend::new(Arc::clone(&self.window), settings))
    }
}
