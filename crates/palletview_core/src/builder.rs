//! Scene graph construction
//!
//! [`GraphBuilder`] turns a [`SceneDocument`] into a [`SceneGraph`]: resource
//! tables first (uuid -> material / geometry, in document order), then one node
//! per object in document order. Objects whose references do not resolve are
//! skipped and recorded in the [`BuildReport`]; construction itself never fails.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use palletview_math::mat4;

use crate::color::Color;
use crate::document::{ObjectKind, ObjectSpec, SceneDocument};
use crate::geometry::Geometry;
use crate::graph::SceneGraph;
use crate::light::LightingConfig;
use crate::material::Material;
use crate::node::{NodeKind, SceneNode};

/// Constructed resources keyed by uuid
#[derive(Default)]
pub struct ResourceTable {
    materials: HashMap<String, Material>,
    geometries: HashMap<String, Arc<Geometry>>,
}

impl ResourceTable {
    /// Build every material and geometry of a document
    ///
    /// A repeated uuid replaces the earlier entry.
    pub fn from_document(doc: &SceneDocument) -> Self {
        let mut table = Self::default();
        for spec in &doc.materials {
            table.materials.insert(spec.uuid.clone(), Material::from_spec(spec));
        }
        for spec in &doc.geometries {
            table
                .geometries
                .insert(spec.uuid.clone(), Arc::new(Geometry::from_spec(spec)));
        }
        table
    }

    pub fn material(&self, uuid: &str) -> Option<&Material> {
        self.materials.get(uuid)
    }

    pub fn geometry(&self, uuid: &str) -> Option<&Arc<Geometry>> {
        self.geometries.get(uuid)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }
}

/// Why an object was left out of the graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingGeometry(String),
    MissingMaterial(String),
    UnknownType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingGeometry(uuid) => write!(f, "geometry '{}' not found", uuid),
            SkipReason::MissingMaterial(uuid) => write!(f, "material '{}' not found", uuid),
            SkipReason::UnknownType(tag) => write!(f, "unknown object type '{}'", tag),
        }
    }
}

/// An object that was not instantiated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedObject {
    /// Position in the document's object list
    pub index: usize,
    pub name: String,
    pub reason: SkipReason,
}

/// Summary of a graph build
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    /// Number of nodes added to the graph
    pub built: usize,
    pub skipped: Vec<SkippedObject>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Result of building a document
pub struct BuiltScene {
    pub graph: SceneGraph,
    pub report: BuildReport,
}

/// Builds scene graphs from documents
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    background: Color,
    lighting: LightingConfig,
    shadow_map_size: u32,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Default clear color
    pub const DEFAULT_BACKGROUND: u32 = 0xf0f0f0;

    pub fn new() -> Self {
        Self {
            background: Color::from_hex(Self::DEFAULT_BACKGROUND),
            lighting: LightingConfig::default(),
            shadow_map_size: LightingConfig::DEFAULT_SHADOW_MAP_SIZE,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingConfig) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size;
        self
    }

    /// Build the graph for a document
    pub fn build(&self, doc: &SceneDocument) -> BuiltScene {
        let mut graph = SceneGraph::new(self.background);
        for light in self.lighting.lights(self.shadow_map_size) {
            graph.add_light(light);
        }

        let resources = ResourceTable::from_document(doc);
        log::debug!(
            "Built {} material(s) and {} geometry resource(s)",
            resources.material_count(),
            resources.geometry_count()
        );

        let mut report = BuildReport::default();
        for (index, spec) in doc.objects.iter().enumerate() {
            match Self::instantiate(spec, &resources) {
                Ok(node) => {
                    graph.add_node(node);
                    report.built += 1;
                }
                Err(reason) => {
                    log::warn!("Skipping object {} '{}': {}", index, spec.name, reason);
                    report.skipped.push(SkippedObject {
                        index,
                        name: spec.name.clone(),
                        reason,
                    });
                }
            }
        }

        log::info!(
            "Scene graph built: {} node(s), {} skipped",
            report.built,
            report.skipped.len()
        );
        BuiltScene { graph, report }
    }

    fn instantiate(spec: &ObjectSpec, resources: &ResourceTable) -> Result<SceneNode, SkipReason> {
        let kind = match &spec.kind {
            ObjectKind::Mesh => NodeKind::Mesh,
            ObjectKind::LineSegments => NodeKind::LineSegments,
            ObjectKind::Other(tag) => return Err(SkipReason::UnknownType(tag.clone())),
        };
        let geometry = resources
            .geometry(&spec.geometry)
            .ok_or_else(|| SkipReason::MissingGeometry(spec.geometry.clone()))?;
        let material = resources
            .material(&spec.material)
            .ok_or_else(|| SkipReason::MissingMaterial(spec.material.clone()))?;

        let mut node = SceneNode::new(kind, Arc::clone(geometry), material.clone())
            .with_name(spec.name.clone());
        if let Some(elements) = &spec.matrix {
            node = node.with_matrix(mat4::from_column_major(elements));
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palletview_math::Vec3;
    use crate::document::{BoxData, GeometryKind, GeometrySpec, MaterialKind, MaterialSpec};

    fn make_doc() -> SceneDocument {
        let mut doc = SceneDocument::default();
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshPhong, Color::WHITE));
        doc.geometries.push(GeometrySpec::new("g", GeometryKind::Box(BoxData::new(2.0, 2.0, 2.0))));
        doc
    }

    #[test]
    fn test_builds_one_node_per_object() {
        let mut doc = make_doc();
        for i in 0..4 {
            doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, format!("Box {}", i + 1), "g", "m"));
        }
        let built = GraphBuilder::new().build(&doc);
        assert_eq!(built.graph.node_count(), 4);
        assert_eq!(built.report.built, 4);
        assert!(built.report.is_complete());
        assert_eq!(built.graph.lights().len(), 3);
        assert_eq!(built.graph.background().to_hex(), 0xf0f0f0);
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let mut doc = make_doc();
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "ok", "g", "m"));
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "no-geo", "nope", "m"));
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "no-mat", "g", "nope"));
        doc.objects.push(ObjectSpec::new(ObjectKind::Other("Sprite".into()), "sprite", "g", "m"));

        let built = GraphBuilder::new().build(&doc);
        assert_eq!(built.graph.node_count(), 1);
        assert!(built.graph.find_by_name("ok").is_some());

        let reasons: Vec<_> = built.report.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingGeometry("nope".into()),
                SkipReason::MissingMaterial("nope".into()),
                SkipReason::UnknownType("Sprite".into()),
            ]
        );
        assert_eq!(built.report.skipped[0].index, 1);
    }

    #[test]
    fn test_matrix_is_applied() {
        let mut doc = make_doc();
        let mut matrix = mat4::to_column_major(&mat4::IDENTITY);
        matrix[12] = 3.0;
        matrix[13] = 4.0;
        matrix[14] = 5.0;
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "moved", "g", "m").with_matrix(matrix));

        let built = GraphBuilder::new().build(&doc);
        let (_, node) = built.graph.find_by_name("moved").unwrap();
        assert_eq!(node.world_center(), Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_materials_are_per_node_and_geometry_shared() {
        let mut doc = make_doc();
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "a", "g", "m"));
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "b", "g", "m"));

        let mut built = GraphBuilder::new().build(&doc);
        let (key_a, _) = built.graph.find_by_name("a").unwrap();
        built.graph.node_mut(key_a).unwrap().material_mut().wireframe = true;

        let (_, a) = built.graph.find_by_name("a").unwrap();
        let (_, b) = built.graph.find_by_name("b").unwrap();
        assert!(a.material().wireframe);
        assert!(!b.material().wireframe);
        assert!(Arc::ptr_eq(a.geometry(), b.geometry()));
    }

    #[test]
    fn test_duplicate_uuid_last_wins() {
        let mut doc = make_doc();
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshBasic, Color::BLACK));
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "a", "g", "m"));

        let built = GraphBuilder::new().build(&doc);
        let (_, a) = built.graph.find_by_name("a").unwrap();
        assert_eq!(a.material().color, Color::BLACK);
    }
}
