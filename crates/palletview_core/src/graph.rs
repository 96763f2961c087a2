//! Scene graph
//!
//! The [`SceneGraph`] owns every renderable node plus the light rig and the
//! background color. Nodes are addressed by generational [`NodeKey`]s. Nodes
//! are never removed, so iteration order is insertion (document) order.

use slotmap::{new_key_type, SlotMap};
use palletview_math::Aabb;

use crate::color::Color;
use crate::light::Light;
use crate::node::SceneNode;

/// Name of the node outlining the packing container
pub const CONTAINER_NODE_NAME: &str = "Container";

/// Prefix of packed box node names, followed by the 1-based packing order
pub const BOX_NODE_PREFIX: &str = "Box ";

/// Packing order of a node named like `Box 3`
pub fn box_number(name: &str) -> Option<usize> {
    name.strip_prefix(BOX_NODE_PREFIX)?.parse().ok()
}

new_key_type! {
    /// Key to a node in the scene graph
    pub struct NodeKey;
}

/// Container for scene nodes and lights
#[derive(Clone, Debug)]
pub struct SceneGraph {
    background: Color,
    nodes: SlotMap<NodeKey, SceneNode>,
    lights: Vec<Light>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl SceneGraph {
    /// Create an empty graph with the given clear color
    pub fn new(background: Color) -> Self {
        Self {
            background,
            nodes: SlotMap::with_key(),
            lights: Vec::new(),
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Add a node, returning its key
    pub fn add_node(&mut self, node: SceneNode) -> NodeKey {
        self.nodes.insert(node)
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<(NodeKey, &SceneNode)> {
        self.nodes.iter().find(|(_, n)| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Iterate nodes mutably in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeKey, &mut SceneNode)> {
        self.nodes.iter_mut()
    }

    /// World-space bounds of every node, visible or not
    pub fn bounding_box(&self) -> Aabb {
        self.nodes
            .values()
            .fold(Aabb::EMPTY, |acc, node| acc.union(&node.world_bounds()))
    }

    /// Flip the wireframe flag on every mesh material
    ///
    /// Returns the number of meshes touched.
    pub fn toggle_wireframe(&mut self) -> usize {
        let mut count = 0;
        for node in self.nodes.values_mut().filter(|n| n.is_mesh()) {
            let material = node.material_mut();
            material.wireframe = !material.wireframe;
            count += 1;
        }
        count
    }

    /// Flip visibility of every named node except `keep`
    ///
    /// Unnamed nodes are left alone. Returns the number of nodes touched.
    pub fn toggle_all_except(&mut self, keep: &str) -> usize {
        let mut count = 0;
        for node in self.nodes.values_mut() {
            if node.name.is_empty() || node.name == keep {
                continue;
            }
            let visible = node.is_visible();
            node.set_visible(!visible);
            count += 1;
        }
        count
    }

    /// Number of packed box nodes
    pub fn box_count(&self) -> usize {
        self.nodes.values().filter(|n| box_number(&n.name).is_some()).count()
    }

    /// Show boxes `1..=count` in packing order and hide the rest
    ///
    /// The container is always shown; nodes that are neither keep their
    /// visibility. Returns the number of boxes shown.
    pub fn show_first_boxes(&mut self, count: usize) -> usize {
        let mut shown = 0;
        for node in self.nodes.values_mut() {
            if node.name == CONTAINER_NODE_NAME {
                node.set_visible(true);
                continue;
            }
            let Some(number) = box_number(&node.name) else { continue };
            let visible = number <= count;
            node.set_visible(visible);
            if visible {
                shown += 1;
            }
        }
        shown
    }

    /// True if any node has pending changes
    pub fn has_dirty_nodes(&self) -> bool {
        self.nodes.values().any(|n| n.is_dirty())
    }

    pub fn clear_all_dirty(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_dirty();
        }
    }
}
