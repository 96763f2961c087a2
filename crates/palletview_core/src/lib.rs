//! Core types for palletview
//!
//! This crate turns a serialized scene description into a render graph:
//!
//! - [`SceneDocument`] - JSON payload of materials, geometries and objects
//! - [`Material`] / [`Geometry`] - constructed resources
//! - [`SceneNode`] / [`SceneGraph`] - renderable nodes, lights and background
//! - [`GraphBuilder`] - document to graph, with a [`BuildReport`] of skipped objects
//! - [`DocumentValidator`] - static checks over a document
//! - [`SceneExporter`] - produce documents from packing results

mod color;
mod error;
pub mod document;
mod material;
mod geometry;
mod node;
mod light;
mod graph;
mod builder;
mod validator;
mod export;

pub use color::Color;
pub use error::DocumentError;
pub use document::{
    BoxData, DocumentMetadata, EdgesData, GeometryKind, GeometrySpec, MaterialKind, MaterialSpec,
    ObjectKind, ObjectSpec, SceneDocument, Side,
};
pub use material::{Material, Shading};
pub use geometry::{Geometry, Topology};
pub use node::{DirtyFlags, NodeFlags, NodeKind, SceneNode};
pub use light::{DirectionalLight, Light, LightingConfig, ShadowSettings};
pub use graph::{box_number, NodeKey, SceneGraph, BOX_NODE_PREFIX, CONTAINER_NODE_NAME};
pub use builder::{BuildReport, BuiltScene, GraphBuilder, ResourceTable, SkipReason, SkippedObject};
pub use validator::{DocumentValidator, ValidationIssue};
pub use export::{box_color, PlacedBox, SceneExporter, DEFAULT_GENERATOR};

// Re-export commonly used math types for convenience
pub use palletview_math::{Aabb, Mat4, Vec3};
