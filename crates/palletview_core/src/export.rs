//! Scene export
//!
//! [`SceneExporter`] produces a [`SceneDocument`] from packing output: the
//! container dimensions plus every placed box given by its lower corner and
//! size. The container becomes a line outline named
//! [`CONTAINER_NODE_NAME`]; each box becomes a translucent double-sided mesh.

use serde::{Serialize, Deserialize};

use crate::color::Color;
use crate::document::{
    BoxData, DocumentMetadata, EdgesData, GeometryKind, GeometrySpec, MaterialKind, MaterialSpec,
    ObjectKind, ObjectSpec, SceneDocument, Side,
};
use crate::error::DocumentError;
use crate::graph::{BOX_NODE_PREFIX, CONTAINER_NODE_NAME};

/// Generator string written into exported metadata
pub const DEFAULT_GENERATOR: &str = "palletview SceneExporter";

const CONTAINER_COLOR: u32 = 0x666666;
const BOX_OPACITY: f32 = 0.8;

/// A box placed by the packer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedBox {
    /// Extent along x, y, z
    pub size: [f32; 3],
    /// Lower corner
    pub position: [f32; 3],
}

impl PlacedBox {
    pub fn new(size: [f32; 3], position: [f32; 3]) -> Self {
        Self { size, position }
    }

    pub fn center(&self) -> [f32; 3] {
        [
            self.position[0] + self.size[0] / 2.0,
            self.position[1] + self.size[1] / 2.0,
            self.position[2] + self.size[2] / 2.0,
        ]
    }
}

/// Builds scene documents from packing results
#[derive(Clone, Debug)]
pub struct SceneExporter {
    container: [f32; 3],
    boxes: Vec<PlacedBox>,
    generator: String,
}

impl SceneExporter {
    /// Exporter for a container of the given width, length and height
    pub fn new(container: [f32; 3]) -> Self {
        Self {
            container,
            boxes: Vec::new(),
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn with_boxes<I: IntoIterator<Item = PlacedBox>>(mut self, boxes: I) -> Self {
        self.boxes.extend(boxes);
        self
    }

    pub fn add_box(&mut self, placed: PlacedBox) {
        self.boxes.push(placed);
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Build the document
    pub fn export(&self) -> SceneDocument {
        let mut doc = SceneDocument {
            metadata: Some(DocumentMetadata::new("Object", 4.5, &self.generator)),
            ..Default::default()
        };

        self.add_container(&mut doc);
        for (index, placed) in self.boxes.iter().enumerate() {
            Self::add_box_to(&mut doc, index, placed);
        }
        doc
    }

    /// Build the document and render it as pretty JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        self.export().to_json_pretty()
    }

    fn add_container(&self, doc: &mut SceneDocument) {
        let [w, l, h] = self.container;
        let vertices = vec![
            [0.0, 0.0, 0.0],
            [w, 0.0, 0.0],
            [w, l, 0.0],
            [0.0, l, 0.0],
            [0.0, 0.0, h],
            [w, 0.0, h],
            [w, l, h],
            [0.0, l, h],
        ];
        let edges = vec![
            [0, 1], [1, 2], [2, 3], [3, 0],
            [4, 5], [5, 6], [6, 7], [7, 4],
            [0, 4], [1, 5], [2, 6], [3, 7],
        ];

        doc.geometries.push(GeometrySpec::new(
            "container_geometry",
            GeometryKind::Edges(EdgesData { vertices, edges }),
        ));
        doc.materials.push(
            MaterialSpec::new(
                "container_material",
                MaterialKind::LineBasic,
                Color::from_hex(CONTAINER_COLOR),
            )
            .with_linewidth(2.0),
        );
        doc.objects.push(
            ObjectSpec::new(
                ObjectKind::LineSegments,
                CONTAINER_NODE_NAME,
                "container_geometry",
                "container_material",
            )
            .with_uuid("container_object")
            .with_matrix(translation_elements([0.0; 3])),
        );
    }

    fn add_box_to(doc: &mut SceneDocument, index: usize, placed: &PlacedBox) {
        let geometry_id = format!("box_geometry_{}", index);
        let material_id = format!("box_material_{}", index);
        let [sx, sy, sz] = placed.size;

        doc.geometries.push(GeometrySpec::new(
            geometry_id.clone(),
            GeometryKind::Box(BoxData::new(sx, sy, sz)),
        ));
        doc.materials.push(
            MaterialSpec::new(material_id.clone(), MaterialKind::MeshPhong, box_color(index))
                .with_opacity(BOX_OPACITY)
                .with_side(Side::Double),
        );
        doc.objects.push(
            ObjectSpec::new(ObjectKind::Mesh, format!("{}{}", BOX_NODE_PREFIX, index + 1), geometry_id, material_id)
                .with_uuid(format!("box_object_{}", index))
                .with_matrix(translation_elements(placed.center())),
        );
    }
}

/// Column-major translation matrix elements
fn translation_elements(t: [f32; 3]) -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        t[0], t[1], t[2], 1.0,
    ]
}

/// Deterministic per-box color with every channel in `[60, 220)`
pub fn box_color(index: usize) -> Color {
    let mut state = (index as u64).wrapping_mul(2_654_435_761) % (1 << 32);
    let mut channel = || {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (60 + z % 160) as u8
    };
    let r = channel();
    let g = channel();
    let b = channel();
    Color::from_rgb8(r, g, b)
}
