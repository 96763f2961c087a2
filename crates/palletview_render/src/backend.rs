//! Render backend abstraction
//!
//! A [`GraphicsHost`] owns the drawable area (a window, or nothing at all for
//! headless use) and is the only way to obtain a [`RenderBackend`]. Creating
//! the backend is the capability check: a host that cannot provide a graphics
//! context reports a [`CapabilityError`].

use std::fmt;

use palletview_core::SceneGraph;

use crate::camera::PerspectiveCamera;
use crate::snapshot::Snapshot;

/// Graphics context could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityError {
    reason: String,
}

impl CapabilityError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "3D rendering is not available: {}", self.reason)
    }
}

impl std::error::Error for CapabilityError {}

/// Per-frame render error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Settings a backend is created with
#[derive(Clone, Debug, PartialEq)]
pub struct RendererSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Key-light depth map resolution
    pub shadow_map_size: u32,
}

/// Draws a scene graph through a camera
pub trait RenderBackend {
    /// Resize the drawable area
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame
    ///
    /// Nodes carrying dirty flags have changed since the previous frame; the
    /// caller clears the flags after a successful render.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError>;

    /// Render one frame offscreen at `width` x `height` and read it back
    ///
    /// The drawable surface is left untouched.
    fn capture(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        width: u32,
        height: u32,
    ) -> Result<Snapshot, RenderError>;

    /// Current drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Free every graphics resource; the backend must not be used afterwards
    fn release(&mut self);
}

/// Something that can host a renderer
pub trait GraphicsHost {
    type Backend: RenderBackend;

    /// Pixel size of the drawable area
    fn size(&self) -> (u32, u32);

    /// Create the graphics context and a backend drawing into it
    fn create_backend(&self, settings: &RendererSettings) -> Result<Self::Backend, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
    }

    #[test]
    fn test_capability_error_display() {
        let err = CapabilityError::new("no compatible adapter");
        assert_eq!(err.reason(), "no compatible adapter");
        assert!(err.to_string().contains("not available"));
    }
}
