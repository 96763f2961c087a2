//! Interactive scene viewer
//!
//! [`Viewer`] ties a scene document to a render backend: it builds the scene
//! graph, frames the camera, attaches orbit controls and renders one frame per
//! host redraw until disposed.

use std::fmt;

use palletview_core::{
    BuildReport, DocumentError, GraphBuilder, SceneDocument, SceneGraph, CONTAINER_NODE_NAME,
};
use palletview_input::OrbitControls;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::backend::{CapabilityError, GraphicsHost, RenderBackend, RenderError, RendererSettings};
use crate::camera::PerspectiveCamera;
use crate::framing::Framing;
use crate::render_loop::RenderLoop;
use crate::settings::ViewerSettings;
use crate::snapshot::Snapshot;

/// Fatal viewer construction error
#[derive(Debug)]
pub enum ViewerError {
    /// No usable graphics context
    Capability(CapabilityError),
    /// Input could not be parsed into a scene document
    MalformedInput(DocumentError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Capability(e) => write!(f, "{}", e),
            ViewerError::MalformedInput(e) => write!(f, "Malformed scene document: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Capability(e) => Some(e),
            ViewerError::MalformedInput(e) => Some(e),
        }
    }
}

impl From<CapabilityError> for ViewerError {
    fn from(e: CapabilityError) -> Self {
        ViewerError::Capability(e)
    }
}

impl From<DocumentError> for ViewerError {
    fn from(e: DocumentError) -> Self {
        ViewerError::MalformedInput(e)
    }
}

/// Scene input in any of the accepted forms
#[derive(Clone, Debug)]
pub enum SceneInput {
    /// JSON text
    Text(String),
    /// Already parsed JSON
    Value(serde_json::Value),
    /// Typed document
    Document(SceneDocument),
}

impl SceneInput {
    /// Parse into a typed document
    pub fn into_document(self) -> Result<SceneDocument, DocumentError> {
        match self {
            SceneInput::Text(text) => SceneDocument::from_json(&text),
            SceneInput::Value(value) => SceneDocument::from_value(value),
            SceneInput::Document(doc) => Ok(doc),
        }
    }
}

impl From<String> for SceneInput {
    fn from(text: String) -> Self {
        SceneInput::Text(text)
    }
}

impl From<&str> for SceneInput {
    fn from(text: &str) -> Self {
        SceneInput::Text(text.to_string())
    }
}

impl From<serde_json::Value> for SceneInput {
    fn from(value: serde_json::Value) -> Self {
        SceneInput::Value(value)
    }
}

impl From<SceneDocument> for SceneInput {
    fn from(doc: SceneDocument) -> Self {
        SceneInput::Document(doc)
    }
}

/// Live view of a scene document
pub struct Viewer<B: RenderBackend> {
    backend: B,
    scene: SceneGraph,
    report: BuildReport,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    render_loop: RenderLoop,
    settings: ViewerSettings,
    /// Boxes shown by the step-by-step reveal, `None` when all are shown
    reveal: Option<usize>,
    disposed: bool,
}

impl<B: RenderBackend> Viewer<B> {
    /// Create a viewer on `host` showing `input`
    ///
    /// Fails when the host cannot create a backend or the input is not a
    /// scene document. Objects with unresolved references are skipped, not
    /// fatal; see [`Viewer::build_report`].
    pub fn new<H>(host: &H, input: impl Into<SceneInput>, settings: ViewerSettings) -> Result<Self, ViewerError>
    where
        H: GraphicsHost<Backend = B>,
    {
        let (width, height) = host.size();
        let mut backend = host.create_backend(&RendererSettings {
            width,
            height,
            vsync: settings.vsync,
            shadow_map_size: settings.shadow_map_size,
        })?;

        let document = match input.into().into_document() {
            Ok(doc) => doc,
            Err(e) => {
                backend.release();
                return Err(e.into());
            }
        };

        let camera = PerspectiveCamera::new(
            settings.fov_degrees,
            PerspectiveCamera::aspect_for_size(width, height),
            settings.near,
            settings.far,
        );

        let built = GraphBuilder::new()
            .with_background(settings.background)
            .with_lighting(settings.lighting.clone())
            .with_shadow_map_size(settings.shadow_map_size)
            .build(&document);

        let mut controls = settings.controls.build();
        controls.set_viewport_height(height);

        let mut viewer = Self {
            backend,
            scene: built.graph,
            report: built.report,
            camera,
            controls,
            render_loop: RenderLoop::new(),
            settings,
            reveal: None,
            disposed: false,
        };
        let framing = viewer.frame_camera();
        log::info!(
            "Viewer ready: {} node(s), camera at {:?} looking at {:?}",
            viewer.scene.node_count(),
            framing.position,
            framing.center
        );
        Ok(viewer)
    }

    fn frame_camera(&mut self) -> Framing {
        let bounds = self.scene.bounding_box();
        let framing = self.settings.framing.apply(&mut self.camera, &bounds);
        self.controls.reset_to(framing.center);
        framing
    }

    /// Produce one frame
    ///
    /// Returns whether the host should schedule another one.
    pub fn frame(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let Some(tick) = self.render_loop.tick() else {
            return false;
        };

        if self.controls.enable_damping {
            self.controls.update(&mut self.camera);
        }

        match self.backend.render(&self.scene, &self.camera) {
            Ok(()) => self.scene.clear_all_dirty(),
            Err(RenderError::SurfaceLost) => {
                log::debug!("Surface lost on frame {}, reconfiguring", tick.frame);
                let (width, height) = self.backend.size();
                self.backend.resize(width, height);
            }
            Err(RenderError::OutOfMemory) => {
                log::error!("Out of memory, stopping render loop");
                self.dispose();
                return false;
            }
            Err(e) => log::warn!("Frame {} failed: {}", tick.frame, e),
        }
        self.render_loop.is_running()
    }

    /// Follow a change of the drawable size
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        log::debug!("Viewer resized to {}x{}", width, height);
        self.camera.set_viewport(width, height);
        self.backend.resize(width, height);
        self.controls.set_viewport_height(height);
    }

    /// Reframe the whole scene and reset the controls
    pub fn reset_camera(&mut self) {
        if self.disposed {
            return;
        }
        self.frame_camera();
    }

    /// Flip wireframe rendering on every mesh
    pub fn toggle_wireframe(&mut self) {
        if self.disposed {
            return;
        }
        let count = self.scene.toggle_wireframe();
        log::debug!("Toggled wireframe on {} mesh(es)", count);
    }

    /// Toggle the visibility of every named node other than the container
    ///
    /// Calling it twice restores the previous visibility.
    pub fn show_only_container(&mut self) {
        if self.disposed {
            return;
        }
        let count = self.scene.toggle_all_except(CONTAINER_NODE_NAME);
        log::debug!("Toggled visibility of {} node(s)", count);
    }

    /// Number of packed boxes in the scene
    pub fn box_count(&self) -> usize {
        self.scene.box_count()
    }

    /// Number of boxes currently revealed in packing order
    pub fn revealed_boxes(&self) -> usize {
        self.reveal.unwrap_or_else(|| self.scene.box_count())
    }

    /// Show the first `count` boxes in packing order, plus the container
    ///
    /// A count at or past the number of boxes shows them all. Returns the
    /// number of boxes shown.
    pub fn show_first_boxes(&mut self, count: usize) -> usize {
        if self.disposed {
            return 0;
        }
        let total = self.scene.box_count();
        let count = count.min(total);
        self.reveal = (count < total).then_some(count);
        let shown = self.scene.show_first_boxes(count);
        log::debug!("Showing {} of {} box(es)", shown, total);
        shown
    }

    /// Reveal one more box; does nothing when every box is shown
    pub fn step_forward(&mut self) -> usize {
        match self.reveal {
            Some(count) => self.show_first_boxes(count + 1),
            None => self.revealed_boxes(),
        }
    }

    /// Hide the last revealed box
    pub fn step_back(&mut self) -> usize {
        let count = self.revealed_boxes();
        self.show_first_boxes(count.saturating_sub(1))
    }

    /// Render the current view offscreen at `width` x `height`
    ///
    /// The on-screen camera and drawable are left as they are.
    pub fn snapshot(&mut self, width: u32, height: u32) -> Result<Snapshot, RenderError> {
        if self.disposed {
            return Err(RenderError::Other("viewer is disposed".to_string()));
        }
        let mut camera = self.camera.clone();
        camera.set_viewport(width, height);
        let snapshot = self.backend.capture(&self.scene, &camera, width, height)?;
        log::debug!("Snapshot taken at {}x{}", width, height);
        Ok(snapshot)
    }

    /// Stop rendering and release every resource
    pub fn dispose(&mut self) {
        if self.disposed {
            log::debug!("Viewer already disposed");
            return;
        }
        self.render_loop.cancel();
        self.controls.dispose();
        self.backend.release();
        self.disposed = true;
        log::info!("Viewer disposed after {} frame(s)", self.render_loop.frame_count());
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether frames are still being produced
    pub fn is_running(&self) -> bool {
        !self.disposed && self.render_loop.is_running()
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.controls.process_mouse_button(button, state);
    }

    pub fn handle_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.controls.process_mouse_motion(delta_x, delta_y);
        self.apply_undamped_input();
    }

    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        self.controls.process_scroll(delta);
        self.apply_undamped_input();
    }

    // Without damping the frame loop does not update the controls.
    fn apply_undamped_input(&mut self) {
        if !self.controls.enable_damping {
            self.controls.update(&mut self.camera);
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Objects built and skipped while loading
    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }
}

/// Create a viewer, logging and swallowing construction errors
pub fn init_viewer<H: GraphicsHost>(
    host: &H,
    input: impl Into<SceneInput>,
    settings: ViewerSettings,
) -> Option<Viewer<H::Backend>> {
    match Viewer::new(host, input, settings) {
        Ok(viewer) => Some(viewer),
        Err(e) => {
            log::error!("Failed to initialize viewer: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;

    #[test]
    fn test_scene_input_forms() {
        let text = r#"{"materials": [], "geometries": [], "objects": []}"#;
        assert!(SceneInput::from(text).into_document().unwrap().is_empty());

        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert!(SceneInput::from(value).into_document().is_ok());

        assert!(SceneInput::from("[1, 2").into_document().is_err());
    }

    #[test]
    fn test_viewer_error_display() {
        let err = ViewerError::from(CapabilityError::new("no adapter"));
        assert!(err.to_string().contains("no adapter"));
        assert!(std::error::Error::source(&err).is_some());

        let parse = SceneDocument::from_json("{").unwrap_err();
        let err = ViewerError::from(parse);
        assert!(err.to_string().starts_with("Malformed scene document"));
    }

    #[test]
    fn test_operations_after_dispose_are_noops() {
        let host = HeadlessHost::new(800, 600);
        let mut viewer = Viewer::new(&host, SceneDocument::default(), ViewerSettings::default()).unwrap();
        viewer.dispose();
        viewer.dispose();
        assert!(viewer.is_disposed());
        assert!(!viewer.frame());
        viewer.reset_camera();
        viewer.toggle_wireframe();
        viewer.show_only_container();
        assert_eq!(viewer.show_first_boxes(1), 0);
        assert!(viewer.snapshot(64, 64).is_err());
        assert!(viewer.backend().captures().is_empty());
        assert!(viewer.backend().is_released());
        assert!(viewer.backend().resizes().is_empty());
    }
}
