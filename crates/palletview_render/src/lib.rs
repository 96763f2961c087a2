//! Scene viewer for palletview
//!
//! This crate shows a [`SceneDocument`](palletview_core::SceneDocument) as an
//! interactive 3D view.
//!
//! ## Key Components
//!
//! - [`Viewer`] - builds the scene graph, frames the camera and drives frames
//! - [`PerspectiveCamera`] / [`FramingConfig`] - camera and auto-framing
//! - [`RenderBackend`] / [`GraphicsHost`] - drawing abstraction and capability check
//! - [`gpu::WgpuBackend`] - wgpu renderer with shadow mapping
//! - [`HeadlessBackend`] - recording backend without a GPU
//! - [`Snapshot`] - offscreen still image, saved as PNG
//! - [`RenderLoop`] - frame scheduling with a [`CancellationToken`]

pub mod backend;
pub mod camera;
pub mod framing;
pub mod render_loop;
pub mod draw_list;
pub mod shadow;
pub mod settings;
pub mod headless;
pub mod snapshot;
pub mod viewer;
pub mod gpu;

pub use backend::{CapabilityError, GraphicsHost, RenderBackend, RenderError, RendererSettings};
pub use camera::PerspectiveCamera;
pub use framing::{Framing, FramingConfig};
pub use render_loop::{CancellationToken, FrameTick, RenderLoop};
pub use draw_list::DrawList;
pub use settings::{ControlSettings, ViewerSettings};
pub use headless::{FrameRecord, HeadlessBackend, HeadlessHost};
pub use snapshot::{Snapshot, SNAPSHOT_SIZE};
pub use viewer::{init_viewer, SceneInput, Viewer, ViewerError};
pub use gpu::{WgpuBackend, WindowHost};

// Re-export core types for convenience
pub use palletview_core::{SceneDocument, SceneGraph};
