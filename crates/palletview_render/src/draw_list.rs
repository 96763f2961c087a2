//! Draw ordering
//!
//! Opaque nodes are drawn first in document order, then blended nodes from
//! the farthest to the nearest so they composite correctly over what is
//! behind them.

use palletview_core::{NodeKey, SceneGraph};
use palletview_math::Vec3;

/// Visible nodes split by blending, in draw order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub opaque: Vec<NodeKey>,
    pub transparent: Vec<NodeKey>,
}

impl DrawList {
    /// Order the visible nodes of `scene` for a camera at `eye`
    ///
    /// Transparent nodes at equal distance keep document order.
    pub fn build(scene: &SceneGraph, eye: Vec3) -> Self {
        let mut list = Self::default();
        let mut blended = Vec::new();

        for (key, node) in scene.iter().filter(|(_, n)| n.is_visible()) {
            if node.material().is_blended() {
                blended.push((key, node.world_center().distance(eye)));
            } else {
                list.opaque.push(key);
            }
        }

        blended.sort_by(|a, b| b.1.total_cmp(&a.1));
        list.transparent = blended.into_iter().map(|(key, _)| key).collect();
        list
    }

    /// All keys in draw order
    pub fn iter(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.opaque.iter().chain(self.transparent.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use palletview_core::{Color, Geometry, Material, NodeKind, SceneNode, Shading};
    use palletview_math::mat4;

    fn node(name: &str, x: f32, transparent: bool) -> SceneNode {
        let mut material = Material::new(Shading::Phong, Color::WHITE);
        if transparent {
            material.transparent = true;
            material.opacity = 0.5;
        }
        SceneNode::new(NodeKind::Mesh, Arc::new(Geometry::unit_cube()), material)
            .with_name(name)
            .with_matrix(mat4::translation(Vec3::new(x, 0.0, 0.0)))
    }

    fn names(scene: &SceneGraph, keys: &[NodeKey]) -> Vec<String> {
        keys.iter().map(|k| scene.node(*k).unwrap().name.clone()).collect()
    }

    #[test]
    fn test_opaque_first_then_back_to_front() {
        let mut scene = SceneGraph::default();
        scene.add_node(node("near", 1.0, true));
        scene.add_node(node("solid", 5.0, false));
        scene.add_node(node("far", 8.0, true));
        scene.add_node(node("mid", 4.0, true));

        let list = DrawList::build(&scene, Vec3::ZERO);
        assert_eq!(names(&scene, &list.opaque), ["solid"]);
        assert_eq!(names(&scene, &list.transparent), ["far", "mid", "near"]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_ties_keep_document_order() {
        let mut scene = SceneGraph::default();
        scene.add_node(node("a", 3.0, true));
        scene.add_node(node("b", 3.0, true));
        scene.add_node(node("c", 3.0, true));

        let list = DrawList::build(&scene, Vec3::ZERO);
        assert_eq!(names(&scene, &list.transparent), ["a", "b", "c"]);
    }

    #[test]
    fn test_hidden_nodes_are_not_drawn() {
        let mut scene = SceneGraph::default();
        let key = scene.add_node(node("hidden", 0.0, false));
        scene.node_mut(key).unwrap().set_visible(false);
        assert!(DrawList::build(&scene, Vec3::ZERO).is_empty());
    }
}
