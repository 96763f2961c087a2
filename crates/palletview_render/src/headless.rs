//! Headless rendering
//!
//! A backend that draws nothing but records what it was asked to draw. Used
//! to drive a [`Viewer`](crate::Viewer) without a window or a GPU.

use palletview_core::SceneGraph;
use palletview_math::Vec3;

use crate::backend::{CapabilityError, GraphicsHost, RenderBackend, RenderError, RendererSettings};
use crate::camera::PerspectiveCamera;
use crate::draw_list::DrawList;
use crate::snapshot::Snapshot;

/// Host with a fixed size and no real graphics context
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    width: u32,
    height: u32,
    capable: bool,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, capable: true }
    }

    /// Host whose capability check always fails
    pub fn without_graphics(width: u32, height: u32) -> Self {
        Self { width, height, capable: false }
    }
}

impl GraphicsHost for HeadlessHost {
    type Backend = HeadlessBackend;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_backend(&self, settings: &RendererSettings) -> Result<HeadlessBackend, CapabilityError> {
        if !self.capable {
            return Err(CapabilityError::new("headless host has no graphics context"));
        }
        Ok(HeadlessBackend::new(settings.width, settings.height))
    }
}

/// What the last rendered frame looked like
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub aspect: f32,
    pub draw_list: DrawList,
    /// Nodes that had dirty flags when the frame was drawn
    pub dirty_nodes: usize,
}

impl FrameRecord {
    fn new(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        Self {
            camera_position: camera.position(),
            camera_target: camera.target(),
            aspect: camera.aspect,
            draw_list: DrawList::build(scene, camera.position()),
            dirty_nodes: scene.iter().filter(|(_, n)| n.is_dirty()).count(),
        }
    }
}

/// Recording backend
#[derive(Debug)]
pub struct HeadlessBackend {
    size: (u32, u32),
    frames: u64,
    last_frame: Option<FrameRecord>,
    resizes: Vec<(u32, u32)>,
    captures: Vec<FrameRecord>,
    released: bool,
    pending_error: Option<RenderError>,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            frames: 0,
            last_frame: None,
            resizes: Vec::new(),
            captures: Vec::new(),
            released: false,
            pending_error: None,
        }
    }

    /// Number of frames rendered
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }

    /// Every size passed to [`RenderBackend::resize`]
    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    /// Every frame requested through [`RenderBackend::capture`]
    pub fn captures(&self) -> &[FrameRecord] {
        &self.captures
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Make the next render call fail with `error`
    pub fn fail_next_frame(&mut self, error: RenderError) {
        self.pending_error = Some(error);
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resizes.push((width, height));
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Other("backend already released".to_string()));
        }
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }

        self.frames += 1;
        self.last_frame = Some(FrameRecord::new(scene, camera));
        Ok(())
    }

    fn capture(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        width: u32,
        height: u32,
    ) -> Result<Snapshot, RenderError> {
        if self.released {
            return Err(RenderError::Other("backend already released".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::Other(format!("cannot capture {}x{}", width, height)));
        }
        self.captures.push(FrameRecord::new(scene, camera));
        Ok(Snapshot::filled(width, height, scene.background()))
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn release(&mut self) {
        self.released = true;
    }
}
