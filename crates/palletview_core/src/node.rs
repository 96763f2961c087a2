//! Scene nodes
//!
//! A [`SceneNode`] is one renderable object in the scene graph: a shared
//! geometry, an owned material and a world transform.

use std::sync::Arc;

use bitflags::bitflags;
use palletview_math::{mat4, Aabb, Mat4, Vec3};

use crate::geometry::Geometry;
use crate::material::Material;

bitflags! {
    /// Per-node render flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Node is drawn
        const VISIBLE = 1 << 0;
        /// Node is drawn into the shadow map
        const CAST_SHADOW = 1 << 1;
        /// Node samples the shadow map
        const RECEIVE_SHADOW = 1 << 2;
    }
}

bitflags! {
    /// Flags indicating which parts of a node changed since the last upload
    ///
    /// Used by render backends to refresh only the per-node GPU data that
    /// actually changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// World matrix changed
        const TRANSFORM = 1 << 0;
        /// Material (color, opacity, wireframe) changed
        const MATERIAL = 1 << 1;
        /// Visibility changed
        const VISIBILITY = 1 << 2;
        /// Node needs a full upload
        const ALL = Self::TRANSFORM.bits() | Self::MATERIAL.bits() | Self::VISIBILITY.bits();
    }
}

/// Kind of primitive a node draws
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Solid triangle mesh
    Mesh,
    /// Set of line segments
    LineSegments,
}

/// A renderable object in the scene graph
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Name from the document (may be empty)
    pub name: String,
    kind: NodeKind,
    geometry: Arc<Geometry>,
    material: Material,
    matrix: Mat4,
    flags: NodeFlags,
    dirty: DirtyFlags,
}

impl SceneNode {
    /// Create a visible node with an identity transform
    ///
    /// Meshes cast and receive shadows; line segments do neither.
    pub fn new(kind: NodeKind, geometry: Arc<Geometry>, material: Material) -> Self {
        let flags = match kind {
            NodeKind::Mesh => NodeFlags::VISIBLE | NodeFlags::CAST_SHADOW | NodeFlags::RECEIVE_SHADOW,
            NodeKind::LineSegments => NodeFlags::VISIBLE,
        };
        Self {
            name: String::new(),
            kind,
            geometry,
            material,
            matrix: mat4::IDENTITY,
            flags,
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == NodeKind::Mesh
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Mutable access to the material (marks the node dirty)
    pub fn material_mut(&mut self) -> &mut Material {
        self.dirty |= DirtyFlags::MATERIAL;
        &mut self.material
    }

    /// World transform (column-major)
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.dirty |= DirtyFlags::TRANSFORM;
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.is_visible() != visible {
            self.flags.set(NodeFlags::VISIBLE, visible);
            self.dirty |= DirtyFlags::VISIBILITY;
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.flags.contains(NodeFlags::CAST_SHADOW)
    }

    pub fn receives_shadow(&self) -> bool {
        self.flags.contains(NodeFlags::RECEIVE_SHADOW)
    }

    /// Bounds of the geometry after the world transform
    pub fn world_bounds(&self) -> Aabb {
        self.geometry.bounds().transformed(&self.matrix)
    }

    /// Center of the world bounds
    pub fn world_center(&self) -> Vec3 {
        self.world_bounds().center()
    }

    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }
}
