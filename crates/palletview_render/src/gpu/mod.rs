//! wgpu implementation of [`RenderBackend`](crate::RenderBackend)
//!
//! A depth-only pass renders shadow casters from the key light, then the
//! scene pass draws opaque nodes followed by blended nodes back-to-front.

pub mod context;
pub mod types;
pub mod shadow_pass;
pub mod scene_pipeline;
pub mod gpu_scene;
mod backend;

pub use backend::{WgpuBackend, WindowHost};
pub use context::RenderContext;
