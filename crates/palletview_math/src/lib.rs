//! 3D Mathematics Library
//!
//! This crate provides the vector, matrix and bounds types used by the
//! palletview scene graph, camera and orbit controls.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (y is up)
//! - [`Mat4`] - column-major 4x4 matrix and transform helpers
//! - [`Aabb`] - axis-aligned bounding box
//! - [`Spherical`] - spherical coordinates for orbiting a target

mod vec3;
pub mod mat4;
pub mod aabb;
pub mod spherical;

pub use vec3::Vec3;
pub use mat4::Mat4;
pub use aabb::Aabb;
pub use spherical::Spherical;
